//! Export and import of document bundles.
//!
//! A bundle is a plain directory: one subdirectory per category (named by the
//! category's display name) holding a copy of each document, plus a
//! `manifest.json` at the root that maps every copy back to its document id.
//!
//! Export fetches each listed document through the repository; import persists
//! through it, so a bundle round-trips through whatever repository is in use.
//! A single document failing never aborts the batch; it is recorded in the
//! report instead.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::BundleError;
use crate::repository::DocumentRepository;
use crate::types::{default_categories, CategoryInfo, Document, DocumentId};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Directory used for documents whose category is not known.
const OTHER_CATEGORY: &str = "Other";

/// Index written at the bundle root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub export_time: DateTime<Utc>,
    pub total_files: usize,
    pub categories: Vec<String>,
    pub files: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: DocumentId,
    pub name: String,
    pub category: String,
    /// Path of the copy relative to the bundle root, `/`-separated.
    pub bundle_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub exported: Vec<DocumentId>,
    /// Documents that could not be fetched, with the reason.
    pub failed: Vec<(DocumentId, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<DocumentId>,
    /// Bundle entries with no matching copy or document.
    pub skipped: Vec<String>,
    pub errors: Vec<String>,
}

/// Copies every listed document into `dest`, grouped by category.
///
/// `dest` is created if missing. Existing copies are overwritten.
///
/// # Errors
///
/// Returns [`BundleError`] if the document list cannot be read, or `dest` or
/// the manifest cannot be written. Individual fetch failures land in
/// [`ExportReport::failed`].
pub async fn export_bundle<R>(repo: &R, dest: &Path) -> Result<ExportReport, BundleError>
where
    R: DocumentRepository + ?Sized,
{
    let documents = repo.list().await?;
    let categories = repo.categories().await.unwrap_or_else(|e| {
        warn!(error = %e, "using built-in categories for export");
        default_categories()
    });
    create_dir(dest).await?;

    let mut report = ExportReport::default();
    let mut files = Vec::with_capacity(documents.len());
    let mut used_paths = HashSet::new();
    let mut used_categories: Vec<String> = Vec::new();

    for listed in &documents {
        let document = match repo.fetch(&listed.id).await {
            Ok(d) => d,
            Err(e) => {
                warn!(id = %listed.id, error = %e, "skipping document in export");
                report.failed.push((listed.id.clone(), e.message));
                continue;
            }
        };
        let dir = category_dir(&categories, &document.category);
        let mut file = file_name(&document);
        if !used_paths.insert(format!("{dir}/{file}")) {
            file = format!("{}_{file}", document.id);
            used_paths.insert(format!("{dir}/{file}"));
        }

        let dir_path = dest.join(&dir);
        create_dir(&dir_path).await?;
        let target = dir_path.join(&file);
        let content = document.content.as_deref().unwrap_or_default();
        tokio::fs::write(&target, content)
            .await
            .map_err(|source| BundleError::Io { path: target.clone(), source })?;

        if !used_categories.contains(&dir) {
            used_categories.push(dir.clone());
        }
        files.push(ManifestEntry {
            id: document.id.clone(),
            name: document.name.clone(),
            category: document.category.clone(),
            bundle_path: format!("{dir}/{file}"),
        });
        report.exported.push(document.id);
    }

    let manifest = Manifest {
        export_time: Utc::now(),
        total_files: files.len(),
        categories: used_categories,
        files,
    };
    let manifest_path = dest.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)?;
    tokio::fs::write(&manifest_path, json)
        .await
        .map_err(|source| BundleError::Io { path: manifest_path, source })?;

    info!(dir = %dest.display(), count = report.exported.len(), "bundle exported");
    Ok(report)
}

/// Writes the copies found in bundle `src` back through the repository.
///
/// With a manifest, each entry is persisted under its recorded id. Without
/// one, every file one level below a category directory is matched to a
/// listed document by file name.
///
/// # Errors
///
/// Returns [`BundleError`] if `src` cannot be read, the manifest is malformed,
/// or (without a manifest) the document list cannot be read. Per-document
/// failures land in [`ImportReport::errors`].
pub async fn import_bundle<R>(repo: &R, src: &Path) -> Result<ImportReport, BundleError>
where
    R: DocumentRepository + ?Sized,
{
    let manifest_path = src.join(MANIFEST_FILE);
    let entries: Vec<(String, Option<DocumentId>)> = match tokio::fs::read_to_string(&manifest_path).await {
        Ok(raw) => {
            let manifest: Manifest = serde_json::from_str(&raw)?;
            manifest.files.into_iter().map(|f| (f.bundle_path, Some(f.id))).collect()
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %src.display(), "no manifest, scanning category directories");
            scan_bundle(src).await?.into_iter().map(|p| (p, None)).collect()
        }
        Err(source) => return Err(BundleError::Io { path: manifest_path, source }),
    };

    let listed = if entries.iter().any(|(_, id)| id.is_none()) {
        repo.list().await?
    } else {
        Vec::new()
    };

    let mut report = ImportReport::default();
    for (bundle_path, id) in entries {
        let Some(relative) = safe_relative(&bundle_path) else {
            warn!(path = %bundle_path, "rejecting path outside the bundle");
            report.errors.push(format!("{bundle_path}: path escapes the bundle"));
            continue;
        };
        let id = match id {
            Some(id) => id,
            None => match match_by_name(&listed, &relative) {
                Some(id) => id,
                None => {
                    report.skipped.push(bundle_path);
                    continue;
                }
            },
        };

        let content = match tokio::fs::read_to_string(src.join(&relative)).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                report.skipped.push(bundle_path);
                continue;
            }
            Err(e) => {
                report.errors.push(format!("{bundle_path}: {e}"));
                continue;
            }
        };
        match repo.persist(&id, &content).await {
            Ok(()) => report.imported.push(id),
            Err(e) => report.errors.push(format!("{id}: {e}")),
        }
    }

    info!(
        imported = report.imported.len(),
        skipped = report.skipped.len(),
        errors = report.errors.len(),
        "bundle imported"
    );
    Ok(report)
}

fn category_dir(categories: &[CategoryInfo], id: &str) -> String {
    categories
        .iter()
        .find(|c| c.id == id)
        .map_or_else(|| OTHER_CATEGORY.to_owned(), |c| c.name.replace('/', "_"))
}

fn file_name(document: &Document) -> String {
    document.name.replace('/', "_")
}

/// Accepts only plain relative paths, so an entry cannot write outside `src`.
fn safe_relative(bundle_path: &str) -> Option<PathBuf> {
    let path = Path::new(bundle_path);
    let plain = path.components().all(|c| matches!(c, Component::Normal(_)));
    (plain && path.components().count() >= 2).then(|| path.to_path_buf())
}

fn match_by_name(listed: &[Document], relative: &Path) -> Option<DocumentId> {
    let file = relative.file_name()?.to_str()?;
    listed.iter().find(|d| file_name(d) == file).map(|d| d.id.clone())
}

/// Lists `<category>/<file>` paths one level below `src`.
async fn scan_bundle(src: &Path) -> Result<Vec<String>, BundleError> {
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BundleError::Io { path, source }
    };
    let mut found = Vec::new();
    let mut dirs = tokio::fs::read_dir(src).await.map_err(io(src))?;
    while let Some(dir) = dirs.next_entry().await.map_err(io(src))? {
        if !dir.file_type().await.map_err(io(&dir.path()))?.is_dir() {
            continue;
        }
        let dir_name = dir.file_name().to_string_lossy().into_owned();
        let mut files = tokio::fs::read_dir(dir.path()).await.map_err(io(&dir.path()))?;
        while let Some(file) = files.next_entry().await.map_err(io(&dir.path()))? {
            if file.file_type().await.map_err(io(&file.path()))?.is_file() {
                found.push(format!("{dir_name}/{}", file.file_name().to_string_lossy()));
            }
        }
    }
    found.sort();
    Ok(found)
}

async fn create_dir(path: &Path) -> Result<(), BundleError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| BundleError::Io { path: path.to_path_buf(), source })
}
