//! UI rendering for dotedit.
//!
//! `render()` is the single entry point called from the event loop's
//! `terminal.draw()` closure. Layout arithmetic lives in `layout.rs`; each
//! panel has its own module.

mod document_list;
mod editor_view;
mod help;
pub mod keybindings;
mod layout;

use ratatui::Frame;

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_status_bar};

/// Renders one complete frame.
///
/// Panel rects and the editor viewport height are written back into `state`
/// before drawing so the next key or mouse event sees the current geometry.
pub fn render(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let [documents, editor, status_bar] = compute_layout(frame, state);

    state.panel_rects = [documents, editor];
    state.editor_viewport_height = inner_rect(editor).height;

    if documents.width > 0 {
        document_list::render_document_list(frame, documents, state, theme);
    }
    editor_view::render_editor(frame, editor, state, theme);
    render_status_bar(frame, status_bar, state, theme);

    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ConfirmQuit => {
            help::render_confirm_quit(frame, theme, state.session.modified_ids().len());
        }
        Mode::Normal | Mode::Insert => {}
    }
}
