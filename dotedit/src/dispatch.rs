//! Runs repository calls off the event loop.
//!
//! Each request is spawned as its own tokio task against the shared
//! repository; the settled result is posted back as `AppEvent::Repo` and
//! applied to the session on the main loop. The session itself never leaves
//! the main loop, so no locking is needed.

use std::sync::Arc;

use dotedit_core::repository::persist_all;
use dotedit_core::{
    CategoryInfo, Document, DocumentId, DocumentRepository, LoadTicket, RepoResult, RepositoryError,
    SaveAllTicket, SaveTicket, SystemInfo,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error};

use crate::event::AppEvent;

/// A settled repository call, ready to apply to the session.
#[derive(Debug)]
pub enum RepoEvent {
    Listed(RepoResult<Vec<Document>>),
    Categories(RepoResult<Vec<CategoryInfo>>),
    SystemInfo(RepoResult<SystemInfo>),
    Fetched(LoadTicket, RepoResult<Document>),
    Saved(SaveTicket, RepoResult<()>),
    SavedAll(Vec<(SaveTicket, RepoResult<()>)>),
    BackedUp(DocumentId, RepoResult<()>),
}

fn panicked() -> RepositoryError {
    RepositoryError::new("repository task panicked")
}

/// Cloneable handle that spawns repository calls.
#[derive(Clone)]
pub struct Dispatcher {
    repo: Arc<dyn DocumentRepository>,
    tx: UnboundedSender<AppEvent>,
}

impl Dispatcher {
    pub fn new(repo: Arc<dyn DocumentRepository>, tx: UnboundedSender<AppEvent>) -> Self {
        Self { repo, tx }
    }

    pub fn list(&self) {
        self.spawn(RepoEvent::Listed(Err(panicked())), |repo| async move {
            RepoEvent::Listed(repo.list().await)
        });
    }

    pub fn categories(&self) {
        self.spawn(RepoEvent::Categories(Err(panicked())), |repo| async move {
            RepoEvent::Categories(repo.categories().await)
        });
    }

    pub fn system_info(&self) {
        self.spawn(RepoEvent::SystemInfo(Err(panicked())), |repo| async move {
            RepoEvent::SystemInfo(repo.system_info().await)
        });
    }

    pub fn fetch(&self, ticket: LoadTicket) {
        let fallback = RepoEvent::Fetched(ticket.clone(), Err(panicked()));
        self.spawn(fallback, |repo| async move {
            let result = repo.fetch(&ticket.id).await;
            RepoEvent::Fetched(ticket, result)
        });
    }

    pub fn save(&self, ticket: SaveTicket) {
        let fallback = RepoEvent::Saved(ticket.clone(), Err(panicked()));
        self.spawn(fallback, |repo| async move {
            let result = repo.persist(&ticket.id, &ticket.content).await;
            RepoEvent::Saved(ticket, result)
        });
    }

    /// Persists the whole batch concurrently; one event once all have settled.
    pub fn save_all(&self, ticket: SaveAllTicket) {
        let fallback = RepoEvent::SavedAll(
            ticket.entries.iter().map(|t| (t.clone(), Err(panicked()))).collect(),
        );
        self.spawn(fallback, |repo| async move {
            let results = persist_all(repo.as_ref(), ticket.entries).await;
            RepoEvent::SavedAll(results)
        });
    }

    pub fn backup(&self, id: DocumentId) {
        let fallback = RepoEvent::BackedUp(id.clone(), Err(panicked()));
        self.spawn(fallback, |repo| async move {
            let result = repo.backup(&id).await;
            RepoEvent::BackedUp(id, result)
        });
    }

    /// Runs `call` on its own task and posts its event.
    ///
    /// If the call panics, `on_panic` is posted instead so the session still
    /// sees the request settle.
    fn spawn<F, Fut>(&self, on_panic: RepoEvent, call: F)
    where
        F: FnOnce(Arc<dyn DocumentRepository>) -> Fut,
        Fut: std::future::Future<Output = RepoEvent> + Send + 'static,
    {
        let tx = self.tx.clone();
        let call = tokio::spawn(call(Arc::clone(&self.repo)));
        tokio::spawn(async move {
            let event = match call.await {
                Ok(event) => {
                    debug!("repository call settled");
                    event
                }
                Err(e) => {
                    error!(error = %e, "repository task failed");
                    on_panic
                }
            };
            // A closed channel means the UI is shutting down; drop the result.
            let _ = tx.send(AppEvent::Repo(Box::new(event)));
        });
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dotedit_core::{Selection, SessionStore};
    use tokio::sync::mpsc;

    use super::*;

    struct PanickingRepo;

    #[async_trait]
    impl DocumentRepository for PanickingRepo {
        async fn list(&self) -> RepoResult<Vec<Document>> {
            Ok(Vec::new())
        }

        async fn fetch(&self, _id: &str) -> RepoResult<Document> {
            panic!("backend crashed");
        }

        async fn persist(&self, _id: &str, _content: &str) -> RepoResult<()> {
            Ok(())
        }

        async fn backup(&self, _id: &str) -> RepoResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn panicking_fetch_still_settles_the_request() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(Arc::new(PanickingRepo), tx);
        let mut session = SessionStore::new();
        let Selection::Fetch(ticket) = session.begin_select("bashrc") else {
            panic!("fresh session must fetch");
        };

        dispatcher.fetch(ticket.clone());
        let Some(AppEvent::Repo(event)) = rx.recv().await else {
            panic!("expected a repository event");
        };
        let RepoEvent::Fetched(settled, result) = *event else {
            panic!("expected a fetch result");
        };

        assert_eq!(settled, ticket);
        assert_eq!(result.clone().unwrap_err().message, "repository task panicked");
        assert!(!session.complete_select(settled, result));
        assert!(!session.is_loading());
        assert!(session.error().is_some());
    }
}
