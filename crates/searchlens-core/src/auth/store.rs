use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// Durable slot holding at most one bearer token.
///
/// Storage is treated as always available: backends log failures and
/// carry on rather than surfacing them to callers.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, token: &str);
    fn clear(&self);
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredToken {
    access_token: String,
    saved_at: DateTime<Utc>,
}

/// Token persisted as JSON in the origin-scoped data directory.
pub struct FileTokenStore {
    data_dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    fn read(path: &Path) -> Result<Option<StoredToken>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).context("Failed to read session file")?;
        let stored: StoredToken =
            serde_json::from_str(&contents).context("Failed to parse session file")?;
        Ok(Some(stored))
    }

    fn write(&self, token: &str) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).context("Failed to create data directory")?;
        let stored = StoredToken {
            access_token: token.to_string(),
            saved_at: Utc::now(),
        };
        let contents = serde_json::to_string_pretty(&stored)?;
        std::fs::write(self.path(), contents).context("Failed to write session file")?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Option<String> {
        match Self::read(&self.path()) {
            Ok(stored) => stored
                .map(|s| s.access_token)
                .filter(|token| !token.is_empty()),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable session file");
                None
            }
        }
    }

    fn set(&self, token: &str) {
        match self.write(token) {
            Ok(()) => debug!(path = ?self.path(), "Token saved"),
            Err(e) => warn!(error = %e, "Failed to save token"),
        }
    }

    fn clear(&self) {
        let path = self.path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove session file");
            }
        }
    }
}

/// Process-local token slot. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned slot still holds a usable Option
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.slot().clone()
    }

    fn set(&self, token: &str) {
        *self.slot() = Some(token.to_string());
    }

    fn clear(&self) {
        *self.slot() = None;
    }
}
