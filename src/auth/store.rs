use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::token::TokenPair;
use crate::error::{AdminError, Result};

/// Storage key for the access token
const ACCESS_TOKEN_KEY: &str = "authToken";
/// Storage key for the refresh token
const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Persistent key/value store for the credential pair.
///
/// Entries live in a JSON file on disk with an in-memory cache in front.
/// Access is process-wide and read-then-write without compare-and-swap;
/// the last writer wins. Both keys are absent when logged out.
pub struct TokenStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl TokenStore {
    /// Open the store, loading any previously persisted entries.
    pub async fn open(path: PathBuf) -> Result<Self> {
        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => {
                    debug!(path = %path.display(), entries = map.len(), "Loaded token store");
                    map
                }
                Err(e) => {
                    // A corrupt store is treated as logged-out rather than fatal
                    warn!(path = %path.display(), error = %e, "Token store unreadable, starting empty");
                    HashMap::new()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "No token store on disk");
                HashMap::new()
            }
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Current access token, if any. Absence is not an error; calls simply
    /// proceed unauthenticated.
    pub async fn access_token(&self) -> Option<String> {
        self.entries.read().await.get(ACCESS_TOKEN_KEY).cloned()
    }

    /// Current refresh token, if any.
    pub async fn refresh_token(&self) -> Option<String> {
        self.entries.read().await.get(REFRESH_TOKEN_KEY).cloned()
    }

    /// Persist a freshly issued credential pair (login).
    pub async fn store_pair(&self, pair: &TokenPair) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), pair.access_token.clone());
        match &pair.refresh_token {
            Some(refresh) => {
                entries.insert(REFRESH_TOKEN_KEY.to_string(), refresh.clone());
            }
            None => {
                entries.remove(REFRESH_TOKEN_KEY);
            }
        }
        self.save(&entries).await?;
        info!("Credential pair stored");
        Ok(())
    }

    /// Replace only the access token (successful silent refresh).
    pub async fn set_access_token(&self, token: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(ACCESS_TOKEN_KEY.to_string(), token.to_string());
        self.save(&entries).await?;
        debug!("Access token replaced after refresh");
        Ok(())
    }

    /// Destroy both tokens (logout or irrecoverable authentication failure).
    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(ACCESS_TOKEN_KEY);
        entries.remove(REFRESH_TOKEN_KEY);
        self.save(&entries).await?;
        info!("Credential pair cleared");
        Ok(())
    }

    /// Write the current entries back to disk.
    async fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| AdminError::Storage(format!("failed to serialize token store: {}", e)))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AdminError::Storage(format!("failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        tokio::fs::write(&self.path, raw).await.map_err(|e| {
            AdminError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}
