//! Cookie jar - file-backed persistence for session fields
//!
//! The browser analog stores the session in named cookies with a fixed
//! expiry; this is the same contract over a JSON file. Every mutation writes
//! through synchronously, reads treat expired or unreadable entries as
//! absent, and no operation fails outward: a broken jar is just an empty one.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, warn};

/// Persisted session field names
pub const COOKIE_TOKEN: &str = "token";
pub const COOKIE_USER_ID: &str = "userId";
pub const COOKIE_USER_ROLE: &str = "userRole";
pub const COOKIE_USER_NAME: &str = "userName";
pub const COOKIE_USER_EMAIL: &str = "userEmail";

/// Every field the session writes, in wipe order
pub const SESSION_COOKIES: [&str; 5] = [
    COOKIE_TOKEN,
    COOKIE_USER_ID,
    COOKIE_USER_ROLE,
    COOKIE_USER_NAME,
    COOKIE_USER_EMAIL,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CookieRecord {
    value: String,
    expires_at: DateTime<Utc>,
}

/// File-backed named values with per-value expiry
pub struct CookieJar {
    path: PathBuf,
    entries: RwLock<HashMap<String, CookieRecord>>,
}

impl CookieJar {
    /// Open a jar at the given path, loading whatever is already there
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = Self::load(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Default jar location under the platform data directory
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .or_else(|| dirs::home_dir().map(|d| d.join(".local/share")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rently")
            .join("cookies.json")
    }

    /// Read a value; expired entries count as absent
    pub fn get(&self, name: &str) -> Option<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let record = entries.get(name)?;
        if record.expires_at <= Utc::now() {
            debug!("Cookie '{}' has expired", name);
            return None;
        }
        Some(record.value.clone())
    }

    /// Store a value with a time-to-live, writing through to disk
    pub fn set(&self, name: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            name.to_string(),
            CookieRecord {
                value: value.to_string(),
                expires_at: Utc::now() + ttl,
            },
        );
        self.save(&entries);
    }

    /// Store several values with one write to disk
    pub fn set_many(&self, values: &[(&str, &str)], ttl: Duration) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let expires_at = Utc::now() + ttl;
        for (name, value) in values {
            entries.insert(
                name.to_string(),
                CookieRecord {
                    value: value.to_string(),
                    expires_at,
                },
            );
        }
        self.save(&entries);
    }

    /// Remove a single value
    pub fn remove(&self, name: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(name);
        self.save(&entries);
    }

    /// Remove several values with one write to disk
    pub fn remove_many(&self, names: &[&str]) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for name in names {
            entries.remove(*name);
        }
        self.save(&entries);
    }

    fn load(path: &Path) -> HashMap<String, CookieRecord> {
        if !path.exists() {
            return HashMap::new();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Cookie file at {} is malformed, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) => {
                warn!("Failed to read cookie file at {}: {}", path.display(), e);
                HashMap::new()
            }
        }
    }

    fn save(&self, entries: &HashMap<String, CookieRecord>) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("Failed to create cookie directory {}: {}", parent.display(), e);
                return;
            }
        }

        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!("Failed to write cookie file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize cookies: {}", e),
        }
    }
}
