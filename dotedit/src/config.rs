//! User configuration loaded from `config.toml`.
//!
//! Every field is optional. A missing file, a parse error, or an unknown key
//! falls back to defaults; config problems are logged, never fatal.

use std::path::PathBuf;

use dotedit_core::CatalogEntry;
use serde::Deserialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme name, `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
    /// Directory that `~` in catalog paths expands to. Defaults to `$HOME`.
    pub home: Option<PathBuf>,
    /// How long an error stays in the status bar.
    pub error_timeout_secs: u64,
    /// Extra documents appended to (or overriding) the built-in catalog.
    pub documents: Vec<CatalogEntry>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            home: None,
            error_timeout_secs: 5,
            documents: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the config from [`config_path`], falling back to defaults.
    pub fn load() -> Self {
        let path = config_path();
        match std::fs::read_to_string(&path) {
            Ok(raw) => Self::parse(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "config parse error, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Returns the path to the dotedit config file.
///
/// Prefers `$XDG_CONFIG_HOME/dotedit/config.toml`; falls back to
/// `~/.config/dotedit/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("dotedit").join("config.toml")
}
