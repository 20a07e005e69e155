//! Configuration management for docsearch
//!
//! Configuration hierarchy (project overrides global):
//!
//! ~/.config/docsearch/config.toml    # Global settings
//! .docsearch/config.toml             # Project settings (replaces global)
//!
//! CLI flags override both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Global config directory name
const GLOBAL_CONFIG_DIR: &str = "docsearch";

/// Project-level config directory name
const PROJECT_DIR: &str = ".docsearch";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the document search backend
    pub base_url: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Tick rate for the event loop, in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 250 }
    }
}

impl Config {
    /// Load configuration, preferring the project file over the global one
    ///
    /// Missing files are not an error; defaults fill the gaps. The
    /// `DOCSEARCH_BASE_URL` environment variable overrides the backend URL
    /// from either file.
    pub fn load(working_dir: impl AsRef<Path>) -> Result<Self> {
        let mut config = match global_config_path() {
            Some(path) => Self::load_file(&path)?.unwrap_or_default(),
            None => Self::default(),
        };

        let project_path = working_dir.as_ref().join(PROJECT_DIR).join("config.toml");
        if let Some(project) = Self::load_file(&project_path)? {
            config = project;
        }

        if let Ok(base_url) = std::env::var("DOCSEARCH_BASE_URL") {
            if !base_url.is_empty() {
                config.backend.base_url = base_url;
            }
        }

        Ok(config)
    }

    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Save configuration to the project config file
    pub fn save(&self, working_dir: impl AsRef<Path>) -> Result<()> {
        let dir = working_dir.as_ref().join(PROJECT_DIR);
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(self)?;
        std::fs::write(dir.join("config.toml"), content)?;
        Ok(())
    }
}

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONFIG_DIR).join("config.toml"))
}
