use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable identifier of a document in the catalog (e.g. `"bashrc"`).
pub type DocumentId = String;

/// A named text document owned by the repository.
///
/// Field names serialize in camelCase so the type matches the JSON shape the
/// document service speaks (`lastModified`, `isSymlink`, `backupExists`).
/// `content` is only populated by a fetch; list results carry metadata only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub is_symlink: bool,
    #[serde(default)]
    pub backup_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Document {
    /// Returns a copy of this document with `content` stripped.
    ///
    /// The session keeps list entries metadata-only; edit state owns the text.
    pub fn metadata(&self) -> Document {
        Document { content: None, ..self.clone() }
    }
}

/// A catalog entry describing where a document lives.
///
/// `path` may start with `~`, which the filesystem repository expands to the
/// configured home directory. Extra entries can be declared in the user config
/// under `[[documents]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DocumentId,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl CatalogEntry {
    fn new(id: &str, name: &str, path: &str, category: &str, description: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            path: path.to_owned(),
            category: category.to_owned(),
            description: description.to_owned(),
        }
    }
}

/// The built-in set of dotfiles the editor manages.
pub fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry::new("bashrc", ".bashrc", "~/.bashrc", "shell", "Bash shell configuration"),
        CatalogEntry::new("zshrc", ".zshrc", "~/.zshrc", "shell", "Zsh shell configuration"),
        CatalogEntry::new("profile", ".profile", "~/.profile", "shell", "Login shell environment"),
        CatalogEntry::new("gitconfig", ".gitconfig", "~/.gitconfig", "git", "Global git configuration"),
        CatalogEntry::new("vimrc", ".vimrc", "~/.vimrc", "editor", "Vim configuration"),
        CatalogEntry::new("sshconfig", "config", "~/.ssh/config", "ssh", "SSH client configuration"),
    ]
}

/// Display metadata for a document category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl CategoryInfo {
    fn new(id: &str, name: &str, description: &str) -> Self {
        Self { id: id.to_owned(), name: name.to_owned(), description: description.to_owned() }
    }
}

/// The built-in categories, in display order.
pub fn default_categories() -> Vec<CategoryInfo> {
    vec![
        CategoryInfo::new("shell", "Shell", "Shell startup and environment files"),
        CategoryInfo::new("editor", "Editor", "Text editor configuration"),
        CategoryInfo::new("git", "Git", "Version control settings"),
        CategoryInfo::new("ssh", "SSH", "Secure shell client configuration"),
        CategoryInfo::new("system", "System", "System-wide settings"),
        CategoryInfo::new("app", "Applications", "Other application configuration"),
    ]
}

/// Facts about the host the repository runs on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub os: String,
    pub kernel: String,
    pub shell: String,
    pub home_dir: String,
    pub user: String,
}
