//! Help overlay and quit confirmation dialog.
//!
//! Both draw a centred modal over the panels inside the same `terminal.draw()`
//! closure: `Clear` erases the area first, then a bordered `Paragraph` goes on
//! top.

use ratatui::{
    Frame,
    layout::Constraint,
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped below 40 columns so the modal never gets a zero-sized area.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 40 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  j/k scroll, ? or Esc to dismiss ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

/// Renders the "unsaved changes" confirmation shown before quitting.
pub fn render_confirm_quit(frame: &mut Frame, theme: &Theme, unsaved: usize) {
    let area = frame
        .area()
        .centered(Constraint::Length(44), Constraint::Length(5));
    frame.render_widget(Clear, area);

    let block = Block::bordered()
        .title(" Quit ")
        .border_style(Style::default().fg(theme.status_error));
    let text = Text::from(vec![
        Line::from(format!("{unsaved} document(s) have unsaved changes.")),
        Line::from(""),
        Line::from("Quit anyway?  y / n"),
    ]);
    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Documents"),
        Line::from("  j / k         Move selection down / up"),
        Line::from("  Enter         Open the selected document"),
        Line::from("  b             Back up the selected document"),
        Line::from("  r             Refresh the document list"),
        Line::from(""),
        Line::from("Editing"),
        Line::from("  i             Insert mode in the editor"),
        Line::from("  Esc           Back to normal mode"),
        Line::from("  u / Ctrl-r    Undo / redo"),
        Line::from("  R             Revert to the last saved content"),
        Line::from("  Ctrl-s        Save the active document"),
        Line::from("  S             Save every modified document"),
        Line::from(""),
        Line::from("Layout"),
        Line::from("  Tab           Switch panel focus"),
        Line::from("  Ctrl-d / u    Half page down / up"),
        Line::from("  < / >         Shrink / grow the document list"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?             Open / close this help"),
        Line::from("  q             Quit (asks first if anything is unsaved)"),
    ])
}
