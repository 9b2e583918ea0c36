//! Editor panel renderer.
//!
//! Renders the cached highlighted lines of the active document with a line
//! number gutter. Only `highlighted[editor_scroll..editor_scroll + height]` is
//! materialized per frame, so large files cost O(viewport).

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::{AppState, Mode, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_editor(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Editor;
    let session = &state.session;

    let title = match session.active_document() {
        Some(d) if session.is_document_modified(&d.id) => format!("{} ● {}", d.name, d.path),
        Some(d) => format!("{} {}", d.name, d.path),
        None => "Editor".to_owned(),
    };
    frame.render_widget(panel_block(title, is_focused, theme), area);
    let inner = inner_rect(area);

    if session.active_id().is_none() {
        let msg = match session.pending_load() {
            Some(id) => format!("Loading {id}..."),
            None => "Select a document and press Enter.".to_owned(),
        };
        frame.render_widget(Paragraph::new(msg), inner);
        return;
    }

    let total = state.highlighted.len();
    let gutter_width = total.max(1).to_string().len() + 1;
    let start = state.editor_scroll.min(total.saturating_sub(1));
    let end = (start + inner.height as usize).min(total);

    let gutter_style = Style::default().fg(theme.gutter);
    let lines: Vec<Line> = state.highlighted[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let mut spans = Vec::with_capacity(line.spans.len() + 1);
            spans.push(Span::styled(
                format!("{:>w$} ", start + i + 1, w = gutter_width - 1),
                gutter_style,
            ));
            spans.extend(line.spans.iter().cloned());
            Line::from(spans)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);

    if state.mode == Mode::Insert && is_focused {
        let row = state.cursor.row;
        if row >= start && row < start + inner.height as usize {
            let col = u16::try_from(gutter_width + state.cursor.col).unwrap_or(u16::MAX);
            let x = inner.x.saturating_add(col).min(inner.right().saturating_sub(1));
            let y = inner.y + (row - start) as u16;
            frame.set_cursor_position(Position { x, y });
        }
    }
}
