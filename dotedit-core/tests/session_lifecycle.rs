//! Integration tests for the edit session store.
//!
//! Exercises: select (fetch and restore), update, undo, redo, revert, save,
//! save-all with partial failure, and the split begin/complete API.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use dotedit_core::history::HISTORY_LIMIT;
use dotedit_core::{
    CategoryInfo, Document, DocumentRepository, RepoResult, RepositoryError, Selection, SessionError,
    SessionStore,
};
use tokio::sync::Barrier;

#[derive(Default)]
struct MemoryRepo {
    files: Mutex<HashMap<String, String>>,
    fail_fetch: HashSet<String>,
    fail_persist: HashSet<String>,
    /// When set, every persist waits here, so a batch only completes if its
    /// writes are in flight together.
    persist_barrier: Option<Barrier>,
    persists: AtomicUsize,
    fetches: AtomicUsize,
    lists: AtomicUsize,
}

impl MemoryRepo {
    fn with(files: &[(&str, &str)]) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.files.lock().unwrap();
            for (id, content) in files {
                map.insert((*id).to_owned(), (*content).to_owned());
            }
        }
        repo
    }

    fn stored(&self, id: &str) -> String {
        self.files.lock().unwrap()[id].clone()
    }
}

fn doc(id: &str, content: Option<String>) -> Document {
    Document {
        id: id.to_owned(),
        name: id.to_owned(),
        path: format!("~/{id}"),
        category: String::new(),
        description: String::new(),
        last_modified: None,
        size: content.as_ref().map_or(0, |c| c.len() as u64),
        is_symlink: false,
        backup_exists: false,
        content,
    }
}

#[async_trait]
impl DocumentRepository for MemoryRepo {
    async fn list(&self) -> RepoResult<Vec<Document>> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        let files = self.files.lock().unwrap();
        let mut ids: Vec<&String> = files.keys().collect();
        ids.sort();
        Ok(ids.into_iter().map(|id| doc(id, None)).collect())
    }

    async fn fetch(&self, id: &str) -> RepoResult<Document> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.contains(id) {
            return Err(RepositoryError::new("connection refused"));
        }
        let content = self.files.lock().unwrap().get(id).cloned();
        content
            .map(|c| doc(id, Some(c)))
            .ok_or_else(|| RepositoryError::new(format!("document not found: {id}")))
    }

    async fn persist(&self, id: &str, content: &str) -> RepoResult<()> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if let Some(barrier) = &self.persist_barrier {
            barrier.wait().await;
        }
        if self.fail_persist.contains(id) {
            return Err(RepositoryError::new("disk full"));
        }
        self.files.lock().unwrap().insert(id.to_owned(), content.to_owned());
        Ok(())
    }

    async fn backup(&self, _id: &str) -> RepoResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn undo_twice_returns_to_baseline() {
    let repo = MemoryRepo::with(&[("x", "a")]);
    let mut store = SessionStore::new();

    assert!(store.select_document(&repo, "x").await);
    store.update_content("ab".into());
    store.update_content("abc".into());
    store.undo();
    store.undo();

    let snap = store.snapshot();
    assert_eq!(snap.content, "a");
    assert!(!snap.is_modified);
    assert!(snap.undo_history.is_empty());
    assert_eq!(snap.redo_history, vec!["ab", "abc"]);

    store.redo();
    let snap = store.snapshot();
    assert_eq!(snap.content, "ab");
    assert_eq!(snap.undo_history, vec!["a"]);
    assert_eq!(snap.redo_history, vec!["abc"]);
}

#[tokio::test]
async fn intents_without_active_document_are_noops() {
    let mut store = SessionStore::new();
    assert!(!store.update_content("x".into()));
    assert!(!store.undo());
    assert!(!store.redo());
    assert!(!store.revert());
    assert!(store.begin_save().is_none());
    assert_eq!(store.snapshot().active_document_id, None);
}

#[tokio::test]
async fn update_with_same_content_is_noop() {
    let repo = MemoryRepo::with(&[("x", "a")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    store.update_content("ab".into());
    store.undo();
    let before = store.snapshot();

    assert!(!store.update_content("a".into()));
    assert_eq!(store.snapshot(), before);
}

#[tokio::test]
async fn undo_history_is_bounded() {
    let repo = MemoryRepo::with(&[("x", "")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    for i in 0..=HISTORY_LIMIT {
        store.update_content(format!("v{i}"));
    }
    let snap = store.snapshot();
    assert_eq!(snap.undo_history.len(), HISTORY_LIMIT);
    assert_eq!(snap.undo_history.first().map(String::as_str), Some("v0"));
    assert_eq!(snap.undo_history.last().map(String::as_str), Some("v49"));
}

#[tokio::test]
async fn revert_discards_everything() {
    let repo = MemoryRepo::with(&[("x", "base")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    store.update_content("one".into());
    store.update_content("two".into());
    store.undo();

    assert!(store.revert());
    let snap = store.snapshot();
    assert_eq!(snap.content, "base");
    assert_eq!(snap.content, snap.original_content);
    assert!(snap.undo_history.is_empty());
    assert!(snap.redo_history.is_empty());
    assert!(!snap.is_modified);
    assert!(snap.modified_documents.is_empty());
}

#[tokio::test]
async fn switching_documents_preserves_edit_state() {
    let repo = MemoryRepo::with(&[("a", "alpha"), ("b", "beta")]);
    let mut store = SessionStore::new();

    store.select_document(&repo, "a").await;
    store.update_content("alpha1".into());
    store.update_content("alpha12".into());
    store.undo();
    let before = store.snapshot();

    store.select_document(&repo, "b").await;
    assert_eq!(store.active_id(), Some("b"));
    assert_eq!(store.suspended_ids(), vec!["a".to_owned()]);
    assert!(store.suspended("b").is_none(), "active state is never suspended");

    let fetches = repo.fetches.load(Ordering::SeqCst);
    assert_eq!(store.begin_select("a"), Selection::Restored);
    assert_eq!(repo.fetches.load(Ordering::SeqCst), fetches, "restore must not re-fetch");

    let after = store.snapshot();
    assert_eq!(after.content, before.content);
    assert_eq!(after.undo_history, before.undo_history);
    assert_eq!(after.redo_history, before.redo_history);
    assert_eq!(after.is_modified, before.is_modified);
    assert!(store.suspended_ids().is_empty(), "pristine b should be dropped");
}

#[tokio::test]
async fn pristine_document_is_refetched_after_switch() {
    let repo = MemoryRepo::with(&[("a", "alpha"), ("b", "beta")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;
    store.select_document(&repo, "b").await;
    assert!(matches!(store.begin_select("a"), Selection::Fetch(_)));
}

#[tokio::test]
async fn failed_fetch_keeps_previous_document() {
    let mut repo = MemoryRepo::with(&[("a", "alpha"), ("b", "beta")]);
    repo.fail_fetch.insert("b".into());
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;
    store.update_content("alpha!".into());

    assert!(!store.select_document(&repo, "b").await);
    assert_eq!(store.active_id(), Some("a"));
    assert_eq!(store.snapshot().content, "alpha!");
    assert!(matches!(store.error(), Some(SessionError::Load { id, .. }) if id == "b"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn previous_document_stays_active_while_fetch_pending() {
    let repo = MemoryRepo::with(&[("a", "alpha"), ("b", "beta")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;

    let Selection::Fetch(ticket) = store.begin_select("b") else {
        panic!("expected a fetch");
    };
    assert!(store.is_loading());
    assert_eq!(store.active_id(), Some("a"));
    assert!(store.update_content("alpha?".into()), "edits continue while loading");

    let result = repo.fetch(&ticket.id).await;
    assert!(store.complete_select(ticket, result));
    assert_eq!(store.active_id(), Some("b"));
    assert!(!store.is_loading());
    assert!(store.is_document_modified("a"));
}

#[tokio::test]
async fn superseded_fetch_is_ignored() {
    let repo = MemoryRepo::with(&[("a", "alpha"), ("b", "beta"), ("c", "gamma")]);
    let mut store = SessionStore::new();

    let Selection::Fetch(first) = store.begin_select("b") else { panic!() };
    let Selection::Fetch(second) = store.begin_select("c") else { panic!() };

    let late = repo.fetch("c").await;
    assert!(store.complete_select(second, late));
    let stale = repo.fetch("b").await;
    assert!(!store.complete_select(first, stale));

    assert_eq!(store.active_id(), Some("c"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn save_unmodified_issues_no_call() {
    let repo = MemoryRepo::with(&[("x", "a")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;

    assert!(!store.save(&repo).await);
    assert_eq!(repo.persists.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn save_commits_and_refreshes() {
    let repo = MemoryRepo::with(&[("x", "a")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    store.update_content("ab".into());

    assert!(store.save(&repo).await);
    let snap = store.snapshot();
    assert_eq!(repo.stored("x"), "ab");
    assert_eq!(snap.original_content, "ab");
    assert!(!snap.is_modified);
    assert!(snap.undo_history.is_empty());
    assert_eq!(repo.lists.load(Ordering::SeqCst), 1);
    assert_eq!(snap.documents.len(), 1);
}

#[tokio::test]
async fn failed_save_is_retryable() {
    let mut repo = MemoryRepo::with(&[("x", "a")]);
    repo.fail_persist.insert("x".into());
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    store.update_content("ab".into());

    assert!(!store.save(&repo).await);
    let snap = store.snapshot();
    assert!(snap.is_modified);
    assert_eq!(snap.undo_history, vec!["a"]);
    assert!(matches!(snap.error, Some(SessionError::Save { .. })));

    repo.fail_persist.clear();
    assert!(store.save(&repo).await);
    assert_eq!(repo.stored("x"), "ab");
}

#[tokio::test]
async fn edits_during_save_survive() {
    let repo = MemoryRepo::with(&[("x", "a")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "x").await;
    store.update_content("ab".into());

    let ticket = store.begin_save().unwrap();
    store.update_content("abc".into());
    let result = repo.persist(&ticket.id, &ticket.content).await;
    assert!(store.complete_save(ticket, result));

    let snap = store.snapshot();
    assert_eq!(snap.original_content, "ab");
    assert_eq!(snap.content, "abc");
    assert!(snap.is_modified, "the later edit belongs to the next save");
    assert_eq!(repo.stored("x"), "ab");
}

#[tokio::test]
async fn save_all_with_partial_failure() {
    let mut repo = MemoryRepo::with(&[("a", "1"), ("b", "2"), ("c", "3")]);
    repo.fail_persist.insert("c".into());
    let mut store = SessionStore::new();

    store.select_document(&repo, "a").await;
    store.update_content("1a".into());
    store.select_document(&repo, "b").await;
    store.select_document(&repo, "c").await;
    store.update_content("3c".into());

    let report = store.save_all(&repo).await.unwrap();
    assert_eq!(report.saved, vec!["a".to_owned()]);
    assert_eq!(report.failed, vec!["c".to_owned()]);
    assert_eq!(repo.persists.load(Ordering::SeqCst), 2, "b was never modified");

    assert!(!store.is_document_modified("a"));
    assert!(store.suspended("a").is_none(), "saved suspended state is evicted");
    assert_eq!(repo.stored("a"), "1a");
    assert_eq!(repo.stored("b"), "2");

    let snap = store.snapshot();
    assert_eq!(snap.active_document_id.as_deref(), Some("c"));
    assert!(snap.is_modified);
    assert_eq!(snap.undo_history, vec!["3"]);
    assert_eq!(snap.error, Some(SessionError::SaveAllPartial { failed: vec!["c".into()] }));
    assert_eq!(repo.lists.load(Ordering::SeqCst), 0, "partial batch does not refresh");
}

#[tokio::test]
async fn save_all_with_nothing_modified() {
    let repo = MemoryRepo::with(&[("a", "1")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;

    assert!(store.save_all(&repo).await.is_none());
    assert_eq!(repo.persists.load(Ordering::SeqCst), 0);
    assert_eq!(store.error(), Some(&SessionError::NothingToSave));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn save_all_success_refreshes_once() {
    let repo = MemoryRepo::with(&[("a", "1"), ("b", "2")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;
    store.update_content("1!".into());
    store.select_document(&repo, "b").await;
    store.update_content("2!".into());

    let report = store.save_all(&repo).await.unwrap();
    assert!(report.is_complete());
    assert_eq!(report.saved, vec!["a".to_owned(), "b".to_owned()]);
    assert!(!store.has_unsaved_changes());
    assert!(store.suspended_ids().is_empty());
    assert_eq!(repo.lists.load(Ordering::SeqCst), 1);
    assert_eq!(store.error(), None);
}

#[tokio::test]
async fn clear_error_resets_current_error() {
    let repo = MemoryRepo::with(&[("a", "1")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;
    store.save_all(&repo).await;
    assert!(store.error().is_some());
    store.clear_error();
    assert!(store.error().is_none());
}

#[tokio::test]
async fn save_all_persists_concurrently() {
    let mut repo = MemoryRepo::with(&[("a", "1"), ("b", "2"), ("c", "3")]);
    repo.persist_barrier = Some(Barrier::new(3));
    repo.fail_persist.insert("a".into());
    let mut store = SessionStore::new();
    for id in ["a", "b", "c"] {
        store.select_document(&repo, id).await;
        store.update_content(format!("{id}!"));
    }

    // Three writes behind a barrier of three only finish if none waits on another.
    let report = tokio::time::timeout(Duration::from_secs(5), store.save_all(&repo))
        .await
        .expect("save-all must issue its writes together")
        .unwrap();

    assert_eq!(report.saved, vec!["b".to_owned(), "c".to_owned()]);
    assert_eq!(report.failed, vec!["a".to_owned()]);
    assert_eq!(
        store.error().map(ToString::to_string).as_deref(),
        Some("failed to save 1 document(s): a")
    );
    assert!(store.is_document_modified("a"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn single_save_completing_after_switch_evicts_state() {
    let repo = MemoryRepo::with(&[("a", "1"), ("b", "2")]);
    let mut store = SessionStore::new();
    store.select_document(&repo, "a").await;
    store.update_content("1!".into());

    let ticket = store.begin_save().unwrap();
    store.select_document(&repo, "b").await;
    assert!(store.suspended("a").is_some(), "modified state is kept while saving");

    let result = repo.persist(&ticket.id, &ticket.content).await;
    assert!(store.complete_save(ticket, result));

    assert!(store.suspended("a").is_none(), "saved suspended state is evicted");
    assert!(!store.has_unsaved_changes());
    assert_eq!(store.active_id(), Some("b"));
    assert_eq!(repo.stored("a"), "1!");
    assert!(!store.is_loading());
}

#[test]
fn cancelled_fetch_releases_loading() {
    let mut store = SessionStore::new();
    let Selection::Fetch(ticket) = store.begin_select("a") else {
        panic!("fresh session must fetch");
    };
    assert!(store.is_loading());

    store.cancel_select(ticket);
    assert!(!store.is_loading());
    assert_eq!(store.pending_load(), None);
    assert_eq!(store.active_id(), None);
}

fn categorized(id: &str, category: &str) -> Document {
    Document { category: category.to_owned(), ..doc(id, None) }
}

#[test]
fn documents_are_grouped_by_category_order() {
    let mut store = SessionStore::new();
    store.begin_request();
    store.complete_list(Ok(vec![
        categorized("gitconfig", "git"),
        categorized("tmux", "misc"),
        categorized("bashrc", "shell"),
        categorized("zshrc", "shell"),
    ]));
    // No categories yet: repository order is kept.
    let ids: Vec<&str> = store.documents().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["gitconfig", "tmux", "bashrc", "zshrc"]);

    store.begin_request();
    store.complete_categories(Ok(vec![
        CategoryInfo { id: "shell".into(), name: "Shell".into(), description: String::new() },
        CategoryInfo { id: "git".into(), name: "Git".into(), description: String::new() },
    ]));
    let ids: Vec<&str> = store.documents().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, ["bashrc", "zshrc", "gitconfig", "tmux"]);
    assert_eq!(store.category("git").map(|c| c.name.as_str()), Some("Git"));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn metadata_failures_are_not_surfaced() {
    let repo = MemoryRepo::with(&[("a", "1")]);
    let mut store = SessionStore::new();

    store.refresh_metadata(&repo).await;

    // Built-in categories from the trait default; system info is unsupported.
    assert_eq!(store.categories().first().map(|c| c.id.as_str()), Some("shell"));
    assert!(store.system_info().is_none());
    assert!(store.error().is_none());
    assert!(!store.is_loading());
}
