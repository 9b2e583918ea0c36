//! Keybinding dispatcher for dotedit.
//!
//! Translates crossterm `KeyEvent`s into `AppState` intents and returns a
//! `KeyAction` telling the event loop whether to continue or quit. Dispatch
//! branches first on `state.mode` so each mode has an isolated handler.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{AppState, Mode, PanelFocus};
use crate::cursor::Cursor;
use crate::ui::layout::inner_rect;

/// Control-flow signal returned from the key dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ConfirmQuit => handle_confirm_quit(key, state),
        Mode::Normal => handle_normal(key, state),
        Mode::Insert => handle_insert(key, state),
    }
}

// ---------------------------------------------------------------------------
// Normal mode
// ---------------------------------------------------------------------------

fn handle_normal(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => state.save(),
            KeyCode::Char('r') => state.redo(),
            KeyCode::Char('d') => state.scroll_down(state.half_page()),
            KeyCode::Char('u') => state.scroll_up(state.half_page()),
            KeyCode::Char('c') => return quit(state),
            _ => {}
        }
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_up(1),
        KeyCode::Tab => state.focus = state.focus.toggle(),
        KeyCode::Enter if state.focus == PanelFocus::Documents => state.open_selected(),

        KeyCode::Char('i') => {
            if state.session.active_id().is_some() {
                state.focus = PanelFocus::Editor;
                state.mode = Mode::Insert;
            }
        }
        KeyCode::Char('u') => state.undo(),
        KeyCode::Char('R') => state.revert(),
        KeyCode::Char('S') => state.save_all(),
        KeyCode::Char('b') => state.backup_selected(),
        KeyCode::Char('r') => state.refresh(),

        KeyCode::Char('<') => state.shrink_list_panel(),
        KeyCode::Char('>') => state.grow_list_panel(),

        KeyCode::Char('?') => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
        }
        KeyCode::Char('q') => return quit(state),
        _ => {}
    }
    KeyAction::Continue
}

fn quit(state: &mut AppState) -> KeyAction {
    if state.request_quit() {
        KeyAction::Quit
    } else {
        KeyAction::Continue
    }
}

// ---------------------------------------------------------------------------
// Insert mode
// ---------------------------------------------------------------------------

fn handle_insert(key: KeyEvent, state: &mut AppState) -> KeyAction {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            state.save();
        }
        return KeyAction::Continue;
    }

    match key.code {
        KeyCode::Esc => state.mode = Mode::Normal,
        KeyCode::Char(ch) => state.insert_char(ch),
        KeyCode::Enter => state.insert_char('\n'),
        KeyCode::Tab => state.insert_char('\t'),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Delete => state.delete_forward(),
        KeyCode::Left => state.move_cursor(Cursor::left),
        KeyCode::Right => state.move_cursor(Cursor::right),
        KeyCode::Up => state.move_cursor(Cursor::up),
        KeyCode::Down => state.move_cursor(Cursor::down),
        KeyCode::Home => state.move_cursor(|c, _| c.home()),
        KeyCode::End => state.move_cursor(Cursor::end),
        _ => {}
    }
    KeyAction::Continue
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => state.mode = Mode::Normal,
        _ => {}
    }
    KeyAction::Continue
}

/// `y` quits, `n` or `Esc` cancels, anything else is ignored.
fn handle_confirm_quit(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            state.mode = Mode::Normal;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Left click focuses a panel (and picks a row in the document list); the
/// wheel scrolls the focused panel or the help overlay by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => handle_mouse_click(mouse.column, mouse.row, state),
        MouseEventKind::ScrollUp if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_sub(3);
        }
        MouseEventKind::ScrollDown if state.mode == Mode::HelpOverlay => {
            state.help_scroll = state.help_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp => state.scroll_up(3),
        MouseEventKind::ScrollDown => state.scroll_down(3),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_mouse_click(col: u16, row: u16, state: &mut AppState) {
    let pos = Position { x: col, y: row };
    let [documents, editor] = state.panel_rects;

    if documents.width > 0 && documents.contains(pos) {
        state.focus = PanelFocus::Documents;
        let inner = inner_rect(documents);
        if inner.contains(pos) {
            state.click_document_row(usize::from(row - inner.y));
        }
    } else if editor.contains(pos) {
        state.focus = PanelFocus::Editor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn insert_requires_an_active_document() {
        let mut state = AppState::default();
        handle_key(key(KeyCode::Char('i')), &mut state);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn help_opens_and_closes() {
        let mut state = AppState::default();
        handle_key(key(KeyCode::Char('?')), &mut state);
        assert_eq!(state.mode, Mode::HelpOverlay);
        handle_key(key(KeyCode::Char('j')), &mut state);
        assert_eq!(state.help_scroll, 1);
        handle_key(key(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn quit_without_changes_is_immediate() {
        let mut state = AppState::default();
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut state), KeyAction::Quit);
    }

    #[test]
    fn tab_toggles_focus() {
        let mut state = AppState::default();
        handle_key(key(KeyCode::Tab), &mut state);
        assert_eq!(state.focus, PanelFocus::Editor);
    }
}
