//! Filesystem-backed document repository.
//!
//! Documents are the entries of a catalog of dotfiles, each naming a path that
//! may start with `~`. Reads and writes go through `tokio::fs`, so every call
//! is safe to await from the UI's runtime. All I/O failures are mapped to
//! [`RepositoryError`] with the offending path in the message.
//!
//! Backups are written next to the original: a timestamped copy plus a plain
//! `<path>.backup` marker whose presence `list` reports as `backup_exists`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::RepositoryError;
use crate::repository::{DocumentRepository, RepoResult};
use crate::types::{default_catalog, CatalogEntry, Document, SystemInfo};

/// Suffix of the marker copy that `list` checks to report `backup_exists`.
const BACKUP_SUFFIX: &str = ".backup";

const OS_RELEASE: &str = "/etc/os-release";
const KERNEL_RELEASE: &str = "/proc/sys/kernel/osrelease";

/// A [`DocumentRepository`] over the local filesystem.
///
/// Serves a fixed catalog of dotfiles rooted at `home`. Catalog paths starting
/// with `~` are expanded against `home`, so tests can point the repository at a
/// temporary directory.
#[derive(Debug, Clone)]
pub struct FsRepository {
    home: PathBuf,
    catalog: Vec<CatalogEntry>,
}

impl FsRepository {
    /// Creates a repository over the built-in catalog.
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self::with_catalog(home, default_catalog())
    }

    pub fn with_catalog(home: impl Into<PathBuf>, catalog: Vec<CatalogEntry>) -> Self {
        Self { home: home.into(), catalog }
    }

    /// Appends extra entries, replacing any built-in entry with the same id.
    pub fn extend_catalog(&mut self, entries: impl IntoIterator<Item = CatalogEntry>) {
        for entry in entries {
            match self.catalog.iter_mut().find(|e| e.id == entry.id) {
                Some(existing) => *existing = entry,
                None => self.catalog.push(entry),
            }
        }
    }

    pub fn catalog(&self) -> &[CatalogEntry] {
        &self.catalog
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Expands a catalog path to an absolute path under `home`.
    pub fn resolve(&self, path: &str) -> PathBuf {
        match path.strip_prefix('~') {
            Some(rest) => self.home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(path),
        }
    }

    /// Looks up the catalog entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if `id` is not in the catalog.
    pub fn entry(&self, id: &str) -> RepoResult<&CatalogEntry> {
        self.catalog
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| RepositoryError::new(format!("document not found: {id}")))
    }

    /// Builds a metadata-only document from `lstat`, or `None` if the file is absent.
    async fn describe(&self, entry: &CatalogEntry) -> Option<Document> {
        let real = self.resolve(&entry.path);
        let meta = tokio::fs::symlink_metadata(&real).await.ok()?;
        let backup_exists = tokio::fs::try_exists(backup_marker(&real)).await.unwrap_or(false);
        Some(Document {
            id: entry.id.clone(),
            name: entry.name.clone(),
            path: entry.path.clone(),
            category: entry.category.clone(),
            description: entry.description.clone(),
            last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
            size: meta.len(),
            is_symlink: meta.file_type().is_symlink(),
            backup_exists,
            content: None,
        })
    }
}

fn backup_marker(real: &Path) -> PathBuf {
    let mut os = real.as_os_str().to_owned();
    os.push(BACKUP_SUFFIX);
    PathBuf::from(os)
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> RepositoryError {
    RepositoryError::new(format!("cannot {action} {}: {e}", path.display()))
}

#[async_trait]
impl DocumentRepository for FsRepository {
    /// Lists catalog entries that exist on disk. Missing files are skipped.
    ///
    /// # Errors
    ///
    /// Never fails; unreadable entries are left out of the result.
    async fn list(&self) -> RepoResult<Vec<Document>> {
        let mut documents = Vec::with_capacity(self.catalog.len());
        for entry in &self.catalog {
            if let Some(doc) = self.describe(entry).await {
                documents.push(doc);
            }
        }
        debug!(count = documents.len(), "listed documents");
        Ok(documents)
    }

    /// Reads the document's current content along with its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if `id` is unknown, the file does not exist,
    /// or it cannot be read as UTF-8 text.
    async fn fetch(&self, id: &str) -> RepoResult<Document> {
        let entry = self.entry(id)?;
        let real = self.resolve(&entry.path);
        let content = match tokio::fs::read_to_string(&real).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RepositoryError::new(format!(
                    "document does not exist: {}",
                    real.display()
                )));
            }
            Err(e) => return Err(io_error("read", &real, e)),
        };
        let mut doc = self
            .describe(entry)
            .await
            .ok_or_else(|| RepositoryError::new(format!("document vanished: {}", real.display())))?;
        doc.content = Some(content);
        Ok(doc)
    }

    /// Overwrites the document with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if `id` is unknown or the write fails.
    async fn persist(&self, id: &str, content: &str) -> RepoResult<()> {
        let entry = self.entry(id)?;
        let real = self.resolve(&entry.path);
        tokio::fs::write(&real, content).await.map_err(|e| {
            warn!(id, path = %real.display(), error = %e, "write failed");
            io_error("write", &real, e)
        })?;
        debug!(id, bytes = content.len(), "persisted");
        Ok(())
    }

    /// Copies the file to `<path>.backup.<timestamp>` and refreshes the
    /// `<path>.backup` marker that `list` reports as `backup_exists`.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError`] if `id` is unknown, the original cannot be
    /// read, or either copy cannot be written.
    async fn backup(&self, id: &str) -> RepoResult<()> {
        let entry = self.entry(id)?;
        let real = self.resolve(&entry.path);
        let content = tokio::fs::read(&real).await.map_err(|e| io_error("read", &real, e))?;

        let marker = backup_marker(&real);
        let mut stamped = marker.clone().into_os_string();
        stamped.push(format!(".{}", Utc::now().format("%Y%m%d-%H%M%S")));
        let stamped = PathBuf::from(stamped);

        tokio::fs::write(&stamped, &content).await.map_err(|e| io_error("write", &stamped, e))?;
        tokio::fs::write(&marker, &content).await.map_err(|e| io_error("write", &marker, e))?;
        debug!(id, path = %stamped.display(), "backup written");
        Ok(())
    }

    /// Describes the local host. Missing sources fall back to placeholders.
    ///
    /// # Errors
    ///
    /// Never fails.
    async fn system_info(&self) -> RepoResult<SystemInfo> {
        let os = match tokio::fs::read_to_string(OS_RELEASE).await {
            Ok(raw) => pretty_name(&raw),
            Err(_) => None,
        }
        .unwrap_or_else(|| std::env::consts::OS.to_owned());
        let kernel = tokio::fs::read_to_string(KERNEL_RELEASE)
            .await
            .map(|k| k.trim().to_owned())
            .unwrap_or_else(|_| "unknown".to_owned());
        Ok(SystemInfo {
            os,
            kernel,
            shell: std::env::var("SHELL").unwrap_or_default(),
            home_dir: self.home.display().to_string(),
            user: std::env::var("USER").unwrap_or_default(),
        })
    }
}

/// Extracts `PRETTY_NAME` from an os-release file.
fn pretty_name(os_release: &str) -> Option<String> {
    os_release.lines().find_map(|line| {
        let value = line.strip_prefix("PRETTY_NAME=")?.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_owned())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_expands_tilde() {
        let repo = FsRepository::new("/home/me");
        assert_eq!(repo.resolve("~/.ssh/config"), PathBuf::from("/home/me/.ssh/config"));
        assert_eq!(repo.resolve("/etc/hosts"), PathBuf::from("/etc/hosts"));
    }

    #[test]
    fn extend_catalog_replaces_by_id() {
        let mut repo = FsRepository::new("/home/me");
        let before = repo.catalog().len();
        repo.extend_catalog([
            CatalogEntry {
                id: "vimrc".into(),
                name: "init.vim".into(),
                path: "~/.config/nvim/init.vim".into(),
                category: "editor".into(),
                description: String::new(),
            },
            CatalogEntry {
                id: "tmux".into(),
                name: ".tmux.conf".into(),
                path: "~/.tmux.conf".into(),
                category: "app".into(),
                description: String::new(),
            },
        ]);
        assert_eq!(repo.catalog().len(), before + 1);
        let vim = repo.entry("vimrc").unwrap();
        assert_eq!(vim.name, "init.vim");
    }

    #[test]
    fn pretty_name_reads_quoted_value() {
        let raw = "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\nID=debian\n";
        assert_eq!(pretty_name(raw).as_deref(), Some("Debian GNU/Linux 12 (bookworm)"));
        assert_eq!(pretty_name("ID=arch\n"), None);
    }

    #[tokio::test]
    async fn system_info_reports_configured_home() {
        let repo = FsRepository::new("/home/me");
        let info = repo.system_info().await.unwrap();
        assert_eq!(info.home_dir, "/home/me");
        assert!(!info.os.is_empty());
        assert!(!info.kernel.is_empty());
    }
}
