//! Core of dotedit: the per-document edit session and the repository it
//! persists through.

pub mod bundle;
pub mod edit_state;
pub mod error;
pub mod fs_repo;
pub mod history;
pub mod repository;
pub mod session;
pub mod types;

pub use bundle::{export_bundle, import_bundle, ExportReport, ImportReport};
pub use edit_state::EditState;
pub use error::{BundleError, RepositoryError, SessionError};
pub use fs_repo::FsRepository;
pub use repository::{ApiResponse, DocumentRepository, RepoResult};
pub use session::{LoadTicket, SaveAllReport, SaveAllTicket, SaveTicket, Selection, SessionSnapshot, SessionStore};
pub use types::{CatalogEntry, CategoryInfo, Document, DocumentId, SystemInfo};
