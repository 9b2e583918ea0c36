//! Central application state for dotedit.
//!
//! `AppState` owns the [`SessionStore`] plus everything that is purely
//! presentational: mode, focus, list selection, cursor, scroll offsets, the
//! cached highlighted lines, and the error display timer. No ratatui
//! rendering happens here; `ui` reads this state and `keybindings` mutates it.

use std::time::{Duration, Instant};

use dotedit_core::{DocumentId, Selection, SessionError, SessionStore};
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::ListState;
use tracing::debug;

use crate::cursor::Cursor;
use crate::dispatch::{Dispatcher, RepoEvent};
use crate::highlight;

/// Editor mode controlling which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Keystrokes edit the active document.
    Insert,
    HelpOverlay,
    /// Shown when quitting with unsaved documents.
    ConfirmQuit,
}

/// Which panel currently has keyboard focus.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    #[default]
    Documents,
    Editor,
}

impl PanelFocus {
    pub fn toggle(self) -> Self {
        match self {
            PanelFocus::Documents => PanelFocus::Editor,
            PanelFocus::Editor => PanelFocus::Documents,
        }
    }
}

/// One row of the grouped document list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocRow {
    /// Category heading; never selectable.
    Header(String),
    /// Index into `session.documents()`.
    Document(usize),
}

/// All mutable UI state passed through every render cycle.
pub struct AppState {
    pub mode: Mode,
    pub focus: PanelFocus,
    pub session: SessionStore,
    dispatcher: Option<Dispatcher>,

    /// Selected document, as an index into `session.documents()`.
    pub doc_list_state: ListState,
    /// Render state of the grouped rows, headers included; owns the scroll offset.
    pub doc_row_state: ListState,
    pub cursor: Cursor,
    /// First visible row of the editor.
    pub editor_scroll: usize,
    /// Inner height of the editor panel, cached after each render.
    pub editor_viewport_height: u16,
    pub help_scroll: u16,

    /// Width percentage of the document list. Default: 25.
    pub list_pct: u16,
    /// `[documents, editor]` outer rects from the last render, for mouse hit-testing.
    pub panel_rects: [Rect; 2],

    /// Highlighted lines of the active document; rebuilt whenever content changes.
    pub highlighted: Vec<Line<'static>>,

    error_timeout: Duration,
    /// The error currently displayed and when it first appeared.
    error_seen: Option<(SessionError, Instant)>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl AppState {
    pub fn new(error_timeout: Duration) -> Self {
        Self {
            mode: Mode::default(),
            focus: PanelFocus::default(),
            session: SessionStore::new(),
            dispatcher: None,
            doc_list_state: ListState::default(),
            doc_row_state: ListState::default(),
            cursor: Cursor::default(),
            editor_scroll: 0,
            editor_viewport_height: 0,
            help_scroll: 0,
            list_pct: 25,
            panel_rects: [Rect::default(); 2],
            highlighted: Vec::new(),
            error_timeout,
            error_seen: None,
        }
    }

    /// Attaches the dispatcher that runs repository calls.
    ///
    /// Without one (tests), intents that need the repository do nothing.
    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    /// Id of the document highlighted in the list.
    pub fn selected_document_id(&self) -> Option<DocumentId> {
        let idx = self.doc_list_state.selected()?;
        self.session.documents().get(idx).map(|d| d.id.clone())
    }

    // -----------------------------------------------------------------------
    // Repository-backed intents
    // -----------------------------------------------------------------------

    /// Opens the document highlighted in the list.
    pub fn open_selected(&mut self) {
        if let Some(id) = self.selected_document_id() {
            self.select(&id);
        }
    }

    pub fn select(&mut self, id: &str) {
        match self.session.begin_select(id) {
            Selection::Unchanged => self.focus = PanelFocus::Editor,
            Selection::Restored => self.on_document_switched(),
            Selection::Fetch(ticket) => match &self.dispatcher {
                Some(d) => d.fetch(ticket),
                None => {
                    debug!(id, "no dispatcher, fetch skipped");
                    self.session.cancel_select(ticket);
                }
            },
        }
    }

    /// Saves the active document. Ignored while a request is outstanding.
    pub fn save(&mut self) {
        if self.session.is_loading() {
            return;
        }
        let Some(d) = &self.dispatcher else { return };
        if let Some(ticket) = self.session.begin_save() {
            d.save(ticket);
        }
    }

    /// Saves every modified document. Ignored while a request is outstanding.
    pub fn save_all(&mut self) {
        if self.session.is_loading() {
            return;
        }
        let Some(d) = &self.dispatcher else { return };
        if let Some(ticket) = self.session.begin_save_all() {
            d.save_all(ticket);
        }
    }

    /// Backs up the document highlighted in the list.
    pub fn backup_selected(&mut self) {
        let Some(id) = self.selected_document_id() else { return };
        let Some(d) = &self.dispatcher else { return };
        self.session.begin_request();
        d.backup(id);
    }

    pub fn refresh(&mut self) {
        let Some(d) = &self.dispatcher else { return };
        self.session.begin_request();
        d.list();
    }

    /// Requests category metadata and host facts; issued once at startup.
    pub fn load_metadata(&mut self) {
        let Some(d) = &self.dispatcher else { return };
        self.session.begin_request();
        d.categories();
        self.session.begin_request();
        d.system_info();
    }

    /// Documents grouped under a heading per category, in session order.
    pub fn document_rows(&self) -> Vec<DocRow> {
        let mut rows = Vec::new();
        let mut current: Option<&str> = None;
        for (i, d) in self.session.documents().iter().enumerate() {
            if current != Some(d.category.as_str()) {
                current = Some(d.category.as_str());
                let title = match self.session.category(&d.category) {
                    Some(c) => c.name.clone(),
                    None if d.category.is_empty() => "Other".to_owned(),
                    None => d.category.clone(),
                };
                rows.push(DocRow::Header(title));
            }
            rows.push(DocRow::Document(i));
        }
        rows
    }

    /// Selects the document on visible row `row` of the list, if it is one.
    pub fn click_document_row(&mut self, row: usize) -> bool {
        let rows = self.document_rows();
        match rows.get(self.doc_row_state.offset() + row) {
            Some(DocRow::Document(i)) => {
                self.doc_list_state.select(Some(*i));
                true
            }
            _ => false,
        }
    }

    /// Applies a settled repository call to the session and issues follow-ups.
    pub fn apply_repo_event(&mut self, event: RepoEvent) {
        match event {
            RepoEvent::Listed(result) => {
                self.session.complete_list(result);
                let count = self.session.documents().len();
                match self.doc_list_state.selected() {
                    None if count > 0 => self.doc_list_state.select(Some(0)),
                    Some(i) if i >= count => {
                        self.doc_list_state.select(count.checked_sub(1));
                    }
                    _ => {}
                }
            }
            RepoEvent::Categories(result) => {
                let selected = self.selected_document_id();
                self.session.complete_categories(result);
                if let Some(id) = selected {
                    let idx = self.session.documents().iter().position(|d| d.id == id);
                    self.doc_list_state.select(idx);
                }
            }
            RepoEvent::SystemInfo(result) => self.session.complete_system_info(result),
            RepoEvent::Fetched(ticket, result) => {
                if self.session.complete_select(ticket, result) {
                    self.on_document_switched();
                }
            }
            RepoEvent::Saved(ticket, result) => {
                if self.session.complete_save(ticket, result) {
                    self.refresh();
                }
            }
            RepoEvent::SavedAll(results) => {
                if self.session.complete_save_all(results).is_complete() {
                    self.refresh();
                }
            }
            RepoEvent::BackedUp(id, result) => {
                if self.session.complete_backup(&id, result) {
                    self.refresh();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // History intents
    // -----------------------------------------------------------------------

    pub fn undo(&mut self) {
        if self.session.undo() {
            self.after_edit();
        }
    }

    pub fn redo(&mut self) {
        if self.session.redo() {
            self.after_edit();
        }
    }

    pub fn revert(&mut self) {
        if self.session.revert() {
            self.after_edit();
        }
    }

    // -----------------------------------------------------------------------
    // Text editing
    // -----------------------------------------------------------------------

    fn active_text(&self) -> Option<String> {
        self.session.active_content().map(str::to_owned)
    }

    pub fn insert_char(&mut self, ch: char) {
        let Some(text) = self.active_text() else { return };
        let next = self.cursor.insert(&text, ch);
        self.session.update_content(next);
        self.after_edit();
    }

    pub fn backspace(&mut self) {
        let Some(text) = self.active_text() else { return };
        if let Some(next) = self.cursor.backspace(&text) {
            self.session.update_content(next);
            self.after_edit();
        }
    }

    pub fn delete_forward(&mut self) {
        let Some(text) = self.active_text() else { return };
        if let Some(next) = self.cursor.delete(&text) {
            self.session.update_content(next);
            self.after_edit();
        }
    }

    /// Moves the cursor with `motion` and keeps it on screen.
    pub fn move_cursor(&mut self, motion: fn(&mut Cursor, &str)) {
        let Some(text) = self.session.active_content() else { return };
        motion(&mut self.cursor, text);
        self.ensure_cursor_visible();
    }

    // -----------------------------------------------------------------------
    // Scrolling and layout
    // -----------------------------------------------------------------------

    pub fn scroll_down(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Documents => {
                self.doc_list_state.scroll_down_by(lines);
                self.clamp_document_selection();
            }
            PanelFocus::Editor => {
                for _ in 0..lines {
                    self.move_cursor(Cursor::down);
                }
            }
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        match self.focus {
            PanelFocus::Documents => {
                self.doc_list_state.scroll_up_by(lines);
                self.clamp_document_selection();
            }
            PanelFocus::Editor => {
                for _ in 0..lines {
                    self.move_cursor(Cursor::up);
                }
            }
        }
    }

    pub fn half_page(&self) -> u16 {
        (self.editor_viewport_height / 2).max(1)
    }

    /// Widens the document list by 5%, up to 50%.
    pub fn grow_list_panel(&mut self) {
        self.list_pct = (self.list_pct + 5).min(50);
    }

    /// Narrows the document list by 5%, down to 15%.
    pub fn shrink_list_panel(&mut self) {
        self.list_pct = self.list_pct.saturating_sub(5).max(15);
    }

    /// Returns `true` if the app may exit now; otherwise asks for confirmation.
    pub fn request_quit(&mut self) -> bool {
        if self.session.has_unsaved_changes() {
            self.mode = Mode::ConfirmQuit;
            false
        } else {
            true
        }
    }

    // -----------------------------------------------------------------------
    // Ticks
    // -----------------------------------------------------------------------

    /// Clears the session error once it has been on screen for the timeout.
    ///
    /// A different error replacing the current one restarts the timer.
    pub fn on_tick(&mut self, now: Instant) {
        let Some(current) = self.session.error().cloned() else {
            self.error_seen = None;
            return;
        };
        let since = match &self.error_seen {
            Some((seen, since)) if *seen == current => Some(*since),
            _ => None,
        };
        match since {
            Some(since) if now.duration_since(since) >= self.error_timeout => {
                self.session.clear_error();
                self.error_seen = None;
            }
            Some(_) => {}
            None => self.error_seen = Some((current, now)),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn on_document_switched(&mut self) {
        self.cursor = Cursor::default();
        self.editor_scroll = 0;
        self.focus = PanelFocus::Editor;
        self.rehighlight();
    }

    fn after_edit(&mut self) {
        if let Some(text) = self.session.active_content() {
            self.cursor.clamp(text);
        }
        self.rehighlight();
        self.ensure_cursor_visible();
    }

    fn clamp_document_selection(&mut self) {
        let last = self.session.documents().len().checked_sub(1);
        let selected = self.doc_list_state.selected();
        self.doc_list_state.select(selected.zip(last).map(|(s, l)| s.min(l)));
    }

    fn rehighlight(&mut self) {
        let Some(state) = self.session.active_state() else {
            self.highlighted.clear();
            return;
        };
        let name = self
            .session
            .active_document()
            .map(|d| d.name.as_str())
            .or(self.session.active_id())
            .unwrap_or_default();
        self.highlighted = highlight::highlight(name, state.content());
    }

    fn ensure_cursor_visible(&mut self) {
        let height = usize::from(self.editor_viewport_height.max(1));
        if self.cursor.row < self.editor_scroll {
            self.editor_scroll = self.cursor.row;
        } else if self.cursor.row >= self.editor_scroll + height {
            self.editor_scroll = self.cursor.row + 1 - height;
        }
    }
}
