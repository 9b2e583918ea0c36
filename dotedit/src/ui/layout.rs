//! Two-panel layout for dotedit.
//!
//! Pure layout arithmetic plus the shared panel chrome; called inside
//! `terminal.draw()` on every render so each frame reflects the live terminal
//! size.
//!
//! The document list takes `AppState.list_pct` of the width and the editor the
//! rest. Below 60 columns the list collapses and the editor fills the screen.
//! `Spacing::Overlap(1)` with `MergeStrategy::Fuzzy` makes the two borders
//! share one column.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;

/// Returns `[documents, editor, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame, state: &AppState) -> [Rect; 3] {
    let [main_area, status_bar] =
        frame.area().layout(&Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]));

    let horizontal = if frame.area().width >= 60 {
        Layout::horizontal([Constraint::Percentage(state.list_pct), Constraint::Fill(1)])
    } else {
        Layout::horizontal([Constraint::Length(0), Constraint::Fill(1)])
    }
    .spacing(Spacing::Overlap(1));

    let [documents, editor] = main_area.layout(&horizontal);
    [documents, editor, status_bar]
}

/// Inner `Rect` of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered panel block; thick border when focused.
pub fn panel_block<'a>(title: impl Into<Line<'a>>, is_focused: bool, theme: &Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Renders the 1-row status bar.
///
/// Left: mode, active document name with a `●` when modified, the count of
/// unsaved documents, a loading marker and the current error. Right: cursor
/// position in the editor.
pub fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let (mode_text, mode_fg) = match state.mode {
        Mode::Insert => (" INSERT ", theme.status_mode_insert),
        Mode::Normal | Mode::ConfirmQuit | Mode::HelpOverlay => {
            (" NORMAL ", theme.status_mode_normal)
        }
    };

    let session = &state.session;
    let mut spans = vec![Span::styled(
        mode_text,
        Style::default().fg(mode_fg).add_modifier(Modifier::BOLD),
    )];

    if let Some(id) = session.active_id() {
        let name = session.active_document().map_or(id, |d| d.name.as_str());
        spans.push(Span::raw(format!(" {name}")));
        if session.is_document_modified(id) {
            spans.push(Span::styled(" ●", Style::default().fg(theme.doc_modified)));
        }
    }

    let unsaved = session.modified_ids().len();
    if unsaved > 0 {
        spans.push(Span::raw(format!("  [{unsaved} unsaved]")));
    }

    if session.is_loading() {
        spans.push(Span::styled("  loading…", Style::default().fg(theme.status_loading)));
    }

    if let Some(err) = session.error() {
        spans.push(Span::styled(
            format!("  {err}"),
            Style::default().fg(theme.status_error).add_modifier(Modifier::BOLD),
        ));
    }

    let bar_style = Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg);
    let [left, right] =
        area.layout(&Layout::horizontal([Constraint::Fill(1), Constraint::Length(18)]));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bar_style), left);

    let position = if session.active_id().is_some() {
        format!("Ln {}, Col {} ", state.cursor.row + 1, state.cursor.col + 1)
    } else {
        String::new()
    };
    frame.render_widget(
        Paragraph::new(position).alignment(Alignment::Right).style(bar_style),
        right,
    );
}
