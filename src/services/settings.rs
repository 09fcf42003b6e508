//! User settings from `~/.tallytable/config.toml`
//!
//! ```toml
//! target_year = 2020
//! diff_year = 2019
//! show_diff = true
//! css_class = "report"
//! ```

use directories::BaseDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{ReportOptions, Result, TallyError};

/// Report defaults; unset keys leave the report's own options alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_year: Option<i32>,
    pub diff_year: Option<i32>,
    pub show_diff: Option<bool>,
    pub css_class: Option<String>,
}

impl Settings {
    pub fn default_path() -> Result<PathBuf> {
        let base_dirs = BaseDirs::new()
            .ok_or_else(|| TallyError::Config("Cannot determine home directory".into()))?;
        Ok(base_dirs.home_dir().join(".tallytable").join("config.toml"))
    }

    /// Load from the default location; a missing file yields defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)
            .map_err(|e| TallyError::Parse(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), ?settings, "settings loaded");
        Ok(settings)
    }

    pub fn apply(&self, options: &mut ReportOptions) {
        if let Some(year) = self.target_year {
            options.target_year = year;
        }
        if let Some(year) = self.diff_year {
            options.diff_year = year;
        }
        if let Some(show) = self.show_diff {
            options.show_diff = show;
        }
        if let Some(class) = &self.css_class {
            options.css_class = class.clone();
        }
    }
}
