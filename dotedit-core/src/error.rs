//! Error types for the document repository and the edit session.
//!
//! Repository calls never panic past their boundary: every failure becomes a
//! [`RepositoryError`] carrying a human-readable message. The session turns
//! those into a single current [`SessionError`] (last error wins).

use crate::types::DocumentId;

/// Failure half of a repository response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RepositoryError {
    pub message: String,
}

impl RepositoryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// The error currently shown by the session, if any.
///
/// None of these are fatal; the session stays valid and continuable after each.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Fetch failed; the active document was not switched.
    #[error("failed to load {id}: {message}")]
    Load { id: DocumentId, message: String },
    /// A single persist failed; edits and history are kept for a retry.
    #[error("failed to save {id}: {message}")]
    Save { id: DocumentId, message: String },
    /// Some documents in a save-all batch failed.
    #[error("failed to save {} document(s): {}", .failed.len(), .failed.join(", "))]
    SaveAllPartial { failed: Vec<DocumentId> },
    /// Save-all was invoked with no modified documents.
    #[error("nothing to save")]
    NothingToSave,
    #[error("failed to back up {id}: {message}")]
    Backup { id: DocumentId, message: String },
    #[error("failed to list documents: {message}")]
    List { message: String },
}

/// Failure of a bundle export or import as a whole.
///
/// Per-document failures are not errors; they are collected in the report.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
