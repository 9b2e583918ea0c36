//! Document list panel renderer.
//!
//! Documents are grouped under a heading per category. Each document row has
//! a `●` marker when it has unsaved edits, the file name (bold when it is the
//! active document), then its size. Host facts sit in the bottom border.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem},
};

use dotedit_core::Document;

use crate::app::{AppState, DocRow, PanelFocus};
use crate::theme::Theme;
use crate::ui::layout::panel_block;

pub fn render_document_list(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme) {
    let is_focused = state.focus == PanelFocus::Documents;
    let session = &state.session;
    let count = session.documents().len();
    let title = if count > 0 { format!("Documents ({count})") } else { "Documents".to_owned() };
    let mut block = panel_block(title, is_focused, theme);
    if let Some(info) = session.system_info() {
        let host = format!(" {}@{} · {} ", info.user, info.os, info.kernel);
        block = block.title_bottom(Line::styled(host, Style::default().fg(theme.doc_meta)).right_aligned());
    }

    let rows = state.document_rows();
    let items: Vec<ListItem> = if count == 0 {
        let msg = if session.is_loading() { "Loading..." } else { "No documents" };
        vec![ListItem::new(Line::raw(msg))]
    } else {
        let documents = session.documents();
        rows.iter()
            .map(|row| match row {
                DocRow::Header(title) => header_item(title, theme),
                DocRow::Document(i) => {
                    let d = &documents[*i];
                    let modified = session.is_document_modified(&d.id);
                    let active = session.active_id() == Some(d.id.as_str());
                    document_item(d, modified, active, theme)
                }
            })
            .collect()
    };

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().fg(theme.doc_selected).add_modifier(Modifier::REVERSED));

    let selected_row = state
        .doc_list_state
        .selected()
        .and_then(|i| rows.iter().position(|r| *r == DocRow::Document(i)));
    state.doc_row_state.select(selected_row);
    frame.render_stateful_widget(list, area, &mut state.doc_row_state);
}

fn header_item(title: &str, theme: &Theme) -> ListItem<'static> {
    ListItem::new(Line::styled(
        title.to_owned(),
        Style::default().fg(theme.doc_meta).add_modifier(Modifier::BOLD),
    ))
}

fn document_item(d: &Document, modified: bool, active: bool, theme: &Theme) -> ListItem<'static> {
    let marker = if modified {
        Span::styled("● ", Style::default().fg(theme.doc_modified))
    } else {
        Span::raw("  ")
    };
    let name_style = if active {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let mut meta = format!("  {}", human_size(d.size));
    if d.backup_exists {
        meta.push_str(" ⎘");
    }

    ListItem::new(Line::from(vec![
        marker,
        Span::styled(d.name.clone(), name_style),
        Span::styled(meta, Style::default().fg(theme.doc_meta)),
    ]))
}

fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else {
        format!("{:.1}K", bytes as f64 / 1024.0)
    }
}
