//! Configuration Settings
//!
//! Settings are read from `scriptdok.toml`. Every section and field has a
//! default, so a partial file (or none at all) is valid.
//!
//! ```toml
//! [import]
//! imported_by = "editor"
//! scratch_dir = "/tmp"
//!
//! [revision]
//! track = true
//! default_name = "Revision"
//!
//! [pdf]
//! character_indent = 266.0
//! indent_tolerance = 18.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use scriptdok_import::ColumnLayout;
use serde::{Deserialize, Serialize};

/// File looked up in the working directory when no `--config` is given
pub const CONFIG_FILE_NAME: &str = "scriptdok.toml";

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub import: ImportSettings,
    pub revision: RevisionSettings,
    /// Column layout for PDF classification
    pub pdf: ColumnLayout,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from a file; a missing file means defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Recorded as the importer on every revision
    pub imported_by: String,
    /// Root for archive scratch directories (system temp when unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            imported_by: "scriptdok".to_string(),
            scratch_dir: None,
        }
    }
}

/// Revision tracking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevisionSettings {
    /// Record a revision for imports into a store
    pub track: bool,
    /// Suffix of generated revision names ("Blue Revision")
    pub default_name: String,
}

impl Default for RevisionSettings {
    fn default() -> Self {
        Self {
            track: true,
            default_name: "Revision".to_string(),
        }
    }
}
