//! Configuration file management.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use depin_core::{DataSource, FileStore, Intervals, SettingsStore, Simulator, SourceKind};

/// Default backend URL when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection
    #[serde(default)]
    pub api: ApiConfig,

    /// Where view data comes from (live or simulated)
    #[serde(default)]
    pub source: SourceKind,

    /// Per-view sync interval overrides in milliseconds
    #[serde(default)]
    pub intervals: Intervals,

    /// Directory for CSV and settings exports (defaults to the current directory)
    #[serde(default)]
    pub export_directory: Option<PathBuf>,

    /// Disable colored output
    #[serde(default)]
    pub no_color: bool,
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Credential sent as `X-API-Key`
    #[serde(default)]
    pub key: Option<String>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            key: None,
        }
    }
}

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    pub source: Option<SourceKind>,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub seed: Option<u64>,
}

impl Config {
    /// Get the config file path
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depin")
            .join("config.toml")
    }

    /// Directory holding the key-value store and log files
    pub fn data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depin")
    }

    /// Path of the persisted settings/theme/auth store
    pub fn store_path() -> PathBuf {
        Self::data_dir().join("store.json")
    }

    /// Path of the TUI log file
    pub fn log_path() -> PathBuf {
        Self::data_dir().join("depin.log")
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        let path = Self::path();
        if path.exists() {
            match fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config: {}", e);
                    }
                },
                Err(e) => {
                    eprintln!("Warning: Failed to read config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Directory exports are written to: the configured one, else the
    /// user's downloads directory, else the working directory.
    pub fn export_dir(&self) -> PathBuf {
        self.export_directory
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve which source to use: flags and env override the file.
    pub fn resolve_source(&self, overrides: &SourceOverrides) -> SourceKind {
        overrides.source.unwrap_or(self.source)
    }

    /// Build the data source described by this config and the overrides.
    pub fn build_source(&self, overrides: &SourceOverrides) -> Result<Arc<dyn DataSource>> {
        match self.resolve_source(overrides) {
            SourceKind::Simulated => {
                let sim = match overrides.seed {
                    Some(seed) => Simulator::with_seed(seed),
                    None => Simulator::new(),
                };
                Ok(Arc::new(sim))
            }
            SourceKind::Live => self.build_live(overrides),
        }
    }

    /// Backend URL after overrides.
    pub fn api_url<'a>(&'a self, overrides: &'a SourceOverrides) -> &'a str {
        overrides.api_url.as_deref().unwrap_or(&self.api.url)
    }

    /// Client for the configured backend.
    #[cfg(feature = "live")]
    pub fn api_client(&self, overrides: &SourceOverrides) -> Result<depin_core::ApiClient> {
        let url = self.api_url(overrides);
        let key = overrides.api_key.as_deref().or(self.api.key.as_deref());
        depin_core::ApiClient::new(url, key)
            .with_context(|| format!("Failed to create API client for {}", url))
    }

    #[cfg(feature = "live")]
    fn build_live(&self, overrides: &SourceOverrides) -> Result<Arc<dyn DataSource>> {
        Ok(Arc::new(self.api_client(overrides)?))
    }

    #[cfg(not(feature = "live"))]
    fn build_live(&self, _overrides: &SourceOverrides) -> Result<Arc<dyn DataSource>> {
        anyhow::bail!("This build does not include the live backend client (feature `live`)")
    }
}

/// Open the persisted store, falling back to memory if the file is unusable.
pub fn open_store() -> SettingsStore {
    let path = Config::store_path();
    match FileStore::open(&path) {
        Ok(store) => SettingsStore::new(Arc::new(store)),
        Err(e) => {
            tracing::warn!(
                "Failed to open store {}: {}, settings will not persist",
                path.display(),
                e
            );
            SettingsStore::in_memory()
        }
    }
}
