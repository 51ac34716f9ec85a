use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AdminError, Result};

// Default configuration values
const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TOKEN_STORE_FILE: &str = "shopadmin.tokens.json";
const DEFAULT_EXPORT_DIR: &str = "exports";

/// Environment variable overriding the API base URL
const API_BASE_URL_ENV: &str = "SHOPADMIN_API_BASE_URL";
/// Environment variable overriding the token store location
const TOKEN_STORE_ENV: &str = "SHOPADMIN_TOKEN_STORE";

/// Main configuration for the admin console
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base address of the REST backend, including the `/api` prefix
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Where the credential pair is persisted between runs
    #[serde(default = "default_token_store_path")]
    pub token_store_path: PathBuf,
    /// Directory that receives HTML reports and invoice PDFs
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_token_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_TOKEN_STORE_FILE)
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token_store_path: default_token_store_path(),
            export_dir: default_export_dir(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file, then apply environment overrides.
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .map_err(|e| AdminError::Config(format!("failed to read {}: {}", path.display(), e)))?;
            let config: Config = serde_json::from_str(&raw)
                .map_err(|e| AdminError::Config(format!("invalid config {}: {}", path.display(), e)))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        } else {
            debug!(path = %path.display(), "No configuration file, using defaults");
            Config::default()
        };

        if let Ok(url) = std::env::var(API_BASE_URL_ENV) {
            if !url.is_empty() {
                config.api_base_url = url;
            }
        }
        if let Ok(store) = std::env::var(TOKEN_STORE_ENV) {
            if !store.is_empty() {
                config.token_store_path = PathBuf::from(store);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject base addresses the rest of the client cannot work with. This is
    /// a startup-time concern; the asset helper assumes a well-formed base.
    pub fn validate(&self) -> Result<()> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(AdminError::Config(format!(
                "api_base_url must be an absolute http(s) address, got '{}'",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// The origin that serves uploaded media: the API base with any trailing
    /// `/api` segment stripped.
    pub fn file_base_url(&self) -> String {
        let base = self.api_base_url.trim_end_matches('/');
        base.strip_suffix("/api").unwrap_or(base).to_string()
    }
}
