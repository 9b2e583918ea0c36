//! The document repository contract consumed by the session.
//!
//! Every call is asynchronous and independently failable. Failures are values
//! ([`RepositoryError`]), never panics, so the session can treat all calls as
//! returning a success/failure envelope.

use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::RepositoryError;
use crate::session::SaveTicket;
use crate::types::{default_categories, CategoryInfo, Document, SystemInfo};

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Durable storage for documents.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Lists documents with metadata only (no content).
    async fn list(&self) -> RepoResult<Vec<Document>>;

    /// Fetches one document including its content.
    async fn fetch(&self, id: &str) -> RepoResult<Document>;

    async fn persist(&self, id: &str, content: &str) -> RepoResult<()>;

    /// Writes a backup copy. Does not touch edit state.
    async fn backup(&self, id: &str) -> RepoResult<()>;

    /// Category metadata in display order.
    async fn categories(&self) -> RepoResult<Vec<CategoryInfo>> {
        Ok(default_categories())
    }

    /// Describes the host. Repositories with no host to describe fail.
    async fn system_info(&self) -> RepoResult<SystemInfo> {
        Err(RepositoryError::new("system info not available"))
    }
}

/// Persists every ticket concurrently and waits for all of them to settle.
///
/// Results come back in ticket order, one per ticket; a failure never cancels
/// or short-circuits the others.
pub async fn persist_all<R>(repo: &R, tickets: Vec<SaveTicket>) -> Vec<(SaveTicket, RepoResult<()>)>
where
    R: DocumentRepository + ?Sized,
{
    let calls = tickets.into_iter().map(|ticket| async move {
        let result = repo.persist(&ticket.id, &ticket.content).await;
        (ticket, result)
    });
    join_all(calls).await
}

/// The uniform JSON response envelope spoken by a remote document service.
///
/// `{"success": true, "data": ...}` on success,
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Converts the envelope into a `Result`.
    ///
    /// A successful envelope without `data` is treated as a failure; use
    /// [`ApiResponse::into_ack`] for calls that carry no payload.
    pub fn into_result(self) -> RepoResult<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            (true, None) => Err(RepositoryError::new("response carried no data")),
            (false, _) => Err(failure(self.error)),
        }
    }

    /// Converts the envelope into a payload-less acknowledgement.
    pub fn into_ack(self) -> RepoResult<()> {
        if self.success {
            Ok(())
        } else {
            Err(failure(self.error))
        }
    }
}

fn failure(error: Option<String>) -> RepositoryError {
    RepositoryError::new(error.unwrap_or_else(|| "request failed".to_owned()))
}
