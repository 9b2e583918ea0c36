//! The edit session store.
//!
//! `SessionStore` owns every document's [`EditState`] in one map plus a nullable
//! cursor naming the active document. Documents that are not active are the
//! "suspended" ones; a suspended state is only retained while it carries
//! modifications or history.
//!
//! # Async intents
//!
//! Transitions are synchronous. The three intents that talk to the repository
//! (select on a cache miss, save, save-all) are split into a `begin_*` call that
//! captures what the request needs and a `complete_*` call that applies the
//! result. A UI loop can keep accepting edits between the two; the saved value
//! is whatever was captured at issue time. The `async fn` wrappers at the bottom
//! of the impl drive both halves against a [`DocumentRepository`] directly.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::edit_state::EditState;
use crate::error::SessionError;
use crate::repository::{persist_all, DocumentRepository, RepoResult};
use crate::types::{CategoryInfo, Document, DocumentId, SystemInfo};

/// Outstanding fetch issued by [`SessionStore::begin_select`].
///
/// Only the most recent ticket is honoured; completions for older tickets are
/// dropped so a slow fetch cannot switch focus after the user moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: DocumentId,
    seq: u64,
}

/// Content captured for a persist call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub id: DocumentId,
    pub content: String,
}

/// Every modified document captured by [`SessionStore::begin_save_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveAllTicket {
    pub entries: Vec<SaveTicket>,
}

/// What [`SessionStore::begin_select`] decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// The document is already active.
    Unchanged,
    /// A suspended state was restored without a fetch.
    Restored,
    /// Content must be fetched; pass the result to `complete_select`.
    Fetch(LoadTicket),
}

/// Outcome of a save-all batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveAllReport {
    pub saved: Vec<DocumentId>,
    pub failed: Vec<DocumentId>,
}

impl SaveAllReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Observable view of the session emitted after each intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub active_document_id: Option<DocumentId>,
    pub content: String,
    pub original_content: String,
    pub undo_history: Vec<String>,
    pub redo_history: Vec<String>,
    pub is_modified: bool,
    pub is_loading: bool,
    pub error: Option<SessionError>,
    pub modified_documents: Vec<DocumentId>,
    pub documents: Vec<Document>,
}

/// The edit session: one active document plus suspended per-document states.
#[derive(Debug, Default)]
pub struct SessionStore {
    documents: Vec<Document>,
    categories: Vec<CategoryInfo>,
    system_info: Option<SystemInfo>,
    states: HashMap<DocumentId, EditState>,
    active_id: Option<DocumentId>,
    pending_load: Option<LoadTicket>,
    next_seq: u64,
    in_flight: usize,
    error: Option<SessionError>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Known categories in display order. Empty until the first
    /// [`complete_categories`](Self::complete_categories).
    pub fn categories(&self) -> &[CategoryInfo] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&CategoryInfo> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn system_info(&self) -> Option<&SystemInfo> {
        self.system_info.as_ref()
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_state(&self) -> Option<&EditState> {
        self.active_id.as_ref().and_then(|id| self.states.get(id))
    }

    pub fn active_content(&self) -> Option<&str> {
        self.active_state().map(EditState::content)
    }

    pub fn active_document(&self) -> Option<&Document> {
        let id = self.active_id.as_deref()?;
        self.documents.iter().find(|d| d.id == id)
    }

    /// Edit state retained for a document that is not active.
    pub fn suspended(&self, id: &str) -> Option<&EditState> {
        if self.active_id.as_deref() == Some(id) {
            return None;
        }
        self.states.get(id)
    }

    pub fn suspended_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self
            .states
            .keys()
            .filter(|id| self.active_id.as_ref() != Some(*id))
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// The id whose fetch is outstanding, if any.
    pub fn pending_load(&self) -> Option<&str> {
        self.pending_load.as_ref().map(|t| t.id.as_str())
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn is_document_modified(&self, id: &str) -> bool {
        self.states.get(id).is_some_and(EditState::is_modified)
    }

    /// Ids of every modified document, active or suspended, sorted.
    pub fn modified_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self
            .states
            .iter()
            .filter(|(_, s)| s.is_modified())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.states.values().any(EditState::is_modified)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let active = self.active_state();
        SessionSnapshot {
            active_document_id: self.active_id.clone(),
            content: active.map(|s| s.content().to_owned()).unwrap_or_default(),
            original_content: active.map(|s| s.original_content().to_owned()).unwrap_or_default(),
            undo_history: active.map(|s| s.undo_history().to_vec()).unwrap_or_default(),
            redo_history: active.map(|s| s.redo_history().to_vec()).unwrap_or_default(),
            is_modified: active.is_some_and(EditState::is_modified),
            is_loading: self.is_loading(),
            error: self.error.clone(),
            modified_documents: self.modified_ids(),
            documents: self.documents.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Synchronous intents
    // -----------------------------------------------------------------------

    /// Replaces the active content. No-op without an active document or when
    /// the content is unchanged.
    pub fn update_content(&mut self, new_content: String) -> bool {
        self.active_state_mut().is_some_and(|s| s.update(new_content))
    }

    pub fn undo(&mut self) -> bool {
        self.active_state_mut().is_some_and(EditState::undo)
    }

    pub fn redo(&mut self) -> bool {
        self.active_state_mut().is_some_and(EditState::redo)
    }

    /// Discards all pending work on the active document.
    ///
    /// The active state is never in the suspended set, so resetting it to its
    /// baseline is all the eviction a revert needs; it is dropped as pristine
    /// on the next switch.
    pub fn revert(&mut self) -> bool {
        let Some(state) = self.active_state_mut() else {
            return false;
        };
        state.revert();
        true
    }

    // -----------------------------------------------------------------------
    // Select
    // -----------------------------------------------------------------------

    /// Starts switching focus to `id`.
    ///
    /// A suspended state is restored immediately. Otherwise a [`LoadTicket`] is
    /// returned and the current document stays active until the fetch succeeds.
    pub fn begin_select(&mut self, id: &str) -> Selection {
        if self.active_id.as_deref() == Some(id) {
            self.pending_load = None;
            return Selection::Unchanged;
        }
        if self.states.contains_key(id) {
            self.pending_load = None;
            self.activate(id.to_owned());
            debug!(id, "restored suspended edit state");
            return Selection::Restored;
        }
        self.next_seq += 1;
        let ticket = LoadTicket { id: id.to_owned(), seq: self.next_seq };
        self.pending_load = Some(ticket.clone());
        self.in_flight += 1;
        Selection::Fetch(ticket)
    }

    /// Applies a fetch result. Returns `true` when `ticket.id` became active.
    pub fn complete_select(&mut self, ticket: LoadTicket, result: RepoResult<Document>) -> bool {
        self.finish_request();
        if self.pending_load.as_ref() != Some(&ticket) {
            debug!(id = %ticket.id, "dropping superseded fetch result");
            return false;
        }
        self.pending_load = None;

        match result {
            Ok(mut document) => {
                let content = document.content.take().unwrap_or_default();
                self.upsert_document(document);
                self.states
                    .entry(ticket.id.clone())
                    .or_insert_with(|| EditState::new(content));
                self.activate(ticket.id);
                true
            }
            Err(e) => {
                warn!(id = %ticket.id, error = %e, "fetch failed");
                self.error = Some(SessionError::Load { id: ticket.id, message: e.message });
                false
            }
        }
    }

    /// Abandons a fetch that was never issued, releasing its loading slot.
    pub fn cancel_select(&mut self, ticket: LoadTicket) {
        if self.pending_load.as_ref() == Some(&ticket) {
            self.pending_load = None;
        }
        self.finish_request();
    }

    // -----------------------------------------------------------------------
    // Save
    // -----------------------------------------------------------------------

    /// Captures the active document for a persist call.
    ///
    /// Returns `None`, issuing nothing, when there is no active document or it
    /// is unmodified.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        let id = self.active_id.clone()?;
        let state = self.states.get(&id)?;
        if !state.is_modified() {
            return None;
        }
        let ticket = SaveTicket { id, content: state.content().to_owned() };
        self.in_flight += 1;
        Some(ticket)
    }

    /// Applies a persist result. Returns `true` when the document list should
    /// be refreshed.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: RepoResult<()>) -> bool {
        self.finish_request();
        match result {
            Ok(()) => {
                info!(id = %ticket.id, "saved");
                self.commit_saved(&ticket);
                true
            }
            Err(e) => {
                warn!(id = %ticket.id, error = %e, "save failed");
                self.error = Some(SessionError::Save { id: ticket.id, message: e.message });
                false
            }
        }
    }

    /// Captures every modified document, active and suspended.
    ///
    /// With nothing modified this records [`SessionError::NothingToSave`] and
    /// returns `None`.
    pub fn begin_save_all(&mut self) -> Option<SaveAllTicket> {
        let mut entries: Vec<SaveTicket> = self
            .states
            .iter()
            .filter(|(_, s)| s.is_modified())
            .map(|(id, s)| SaveTicket { id: id.clone(), content: s.content().to_owned() })
            .collect();
        if entries.is_empty() {
            self.error = Some(SessionError::NothingToSave);
            return None;
        }
        entries.sort_by(|a, b| a.id.cmp(&b.id));
        self.in_flight += 1;
        Some(SaveAllTicket { entries })
    }

    /// Applies the settled results of a save-all batch.
    ///
    /// Succeeded documents are committed exactly as a single save would;
    /// failed ones keep their content and history. Any failure is reported as
    /// one aggregated [`SessionError::SaveAllPartial`].
    pub fn complete_save_all(&mut self, results: Vec<(SaveTicket, RepoResult<()>)>) -> SaveAllReport {
        self.finish_request();
        let mut report = SaveAllReport::default();
        for (ticket, result) in results {
            match result {
                Ok(()) => {
                    self.commit_saved(&ticket);
                    report.saved.push(ticket.id);
                }
                Err(e) => {
                    warn!(id = %ticket.id, error = %e, "save failed in batch");
                    report.failed.push(ticket.id);
                }
            }
        }
        if report.is_complete() {
            info!(count = report.saved.len(), "saved all documents");
        } else {
            self.error = Some(SessionError::SaveAllPartial { failed: report.failed.clone() });
        }
        report
    }

    // -----------------------------------------------------------------------
    // List and backup
    // -----------------------------------------------------------------------

    /// Marks a list or backup request as outstanding.
    pub fn begin_request(&mut self) {
        self.in_flight += 1;
    }

    pub fn complete_list(&mut self, result: RepoResult<Vec<Document>>) {
        self.finish_request();
        match result {
            Ok(documents) => {
                self.documents = documents.iter().map(Document::metadata).collect();
                self.group_documents();
            }
            Err(e) => {
                warn!(error = %e, "list failed");
                self.error = Some(SessionError::List { message: e.message });
            }
        }
    }

    /// Stores category metadata and regroups the document list by it.
    ///
    /// A failure keeps the previous categories; it is logged, not surfaced.
    pub fn complete_categories(&mut self, result: RepoResult<Vec<CategoryInfo>>) {
        self.finish_request();
        match result {
            Ok(categories) => {
                self.categories = categories;
                self.group_documents();
            }
            Err(e) => warn!(error = %e, "category lookup failed"),
        }
    }

    /// Stores host facts. A failure leaves them unknown; it is logged, not surfaced.
    pub fn complete_system_info(&mut self, result: RepoResult<SystemInfo>) {
        self.finish_request();
        match result {
            Ok(info) => self.system_info = Some(info),
            Err(e) => warn!(error = %e, "system info lookup failed"),
        }
    }

    /// Applies a backup result. Returns `true` when the list should be
    /// refreshed so `backup_exists` catches up.
    pub fn complete_backup(&mut self, id: &str, result: RepoResult<()>) -> bool {
        self.finish_request();
        match result {
            Ok(()) => {
                info!(id, "backup created");
                true
            }
            Err(e) => {
                self.error = Some(SessionError::Backup { id: id.to_owned(), message: e.message });
                false
            }
        }
    }

    // -----------------------------------------------------------------------
    // Repository-driven wrappers
    // -----------------------------------------------------------------------

    /// Selects `id`, fetching it from `repo` on a cache miss.
    pub async fn select_document<R>(&mut self, repo: &R, id: &str) -> bool
    where
        R: DocumentRepository + ?Sized,
    {
        match self.begin_select(id) {
            Selection::Unchanged | Selection::Restored => true,
            Selection::Fetch(ticket) => {
                let result = repo.fetch(&ticket.id).await;
                self.complete_select(ticket, result)
            }
        }
    }

    /// Saves the active document. Returns `true` when a persist succeeded.
    pub async fn save<R>(&mut self, repo: &R) -> bool
    where
        R: DocumentRepository + ?Sized,
    {
        let Some(ticket) = self.begin_save() else {
            return false;
        };
        let result = repo.persist(&ticket.id, &ticket.content).await;
        let saved = self.complete_save(ticket, result);
        if saved {
            self.refresh_documents(repo).await;
        }
        saved
    }

    /// Saves every modified document concurrently.
    ///
    /// Returns `None` when there was nothing to save.
    pub async fn save_all<R>(&mut self, repo: &R) -> Option<SaveAllReport>
    where
        R: DocumentRepository + ?Sized,
    {
        let ticket = self.begin_save_all()?;
        let results = persist_all(repo, ticket.entries).await;
        let report = self.complete_save_all(results);
        if report.is_complete() {
            self.refresh_documents(repo).await;
        }
        Some(report)
    }

    pub async fn refresh_documents<R>(&mut self, repo: &R)
    where
        R: DocumentRepository + ?Sized,
    {
        self.begin_request();
        let result = repo.list().await;
        self.complete_list(result);
    }

    /// Loads category metadata and host facts.
    pub async fn refresh_metadata<R>(&mut self, repo: &R)
    where
        R: DocumentRepository + ?Sized,
    {
        self.begin_request();
        let result = repo.categories().await;
        self.complete_categories(result);
        self.begin_request();
        let result = repo.system_info().await;
        self.complete_system_info(result);
    }

    /// Backs up `id`. Edit state is untouched.
    pub async fn backup<R>(&mut self, repo: &R, id: &str) -> bool
    where
        R: DocumentRepository + ?Sized,
    {
        self.begin_request();
        let result = repo.backup(id).await;
        let ok = self.complete_backup(id, result);
        if ok {
            self.refresh_documents(repo).await;
        }
        ok
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn active_state_mut(&mut self) -> Option<&mut EditState> {
        let id = self.active_id.as_ref()?;
        self.states.get_mut(id)
    }

    /// Moves the cursor to `id`, dropping the previous state if pristine.
    fn activate(&mut self, id: DocumentId) {
        if let Some(previous) = self.active_id.replace(id.clone()) {
            if previous != id && self.states.get(&previous).is_some_and(EditState::is_pristine) {
                self.states.remove(&previous);
            }
        }
    }

    fn commit_saved(&mut self, ticket: &SaveTicket) {
        let Some(state) = self.states.get_mut(&ticket.id) else {
            return;
        };
        state.mark_saved(&ticket.content);
        let is_active = self.active_id.as_deref() == Some(ticket.id.as_str());
        if !is_active && state.is_pristine() {
            self.states.remove(&ticket.id);
        }
    }

    /// Orders documents by category rank, keeping repository order within a
    /// category. Unknown categories sort last.
    fn group_documents(&mut self) {
        let categories = &self.categories;
        let rank = |doc: &Document| {
            categories.iter().position(|c| c.id == doc.category).unwrap_or(categories.len())
        };
        self.documents.sort_by_key(rank);
    }

    fn upsert_document(&mut self, document: Document) {
        match self.documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document,
            None => {
                self.documents.push(document);
                self.group_documents();
            }
        }
    }

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }
}
