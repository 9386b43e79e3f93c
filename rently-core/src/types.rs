//! Core data structures shared across the Rently crates

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The authenticated principal as the API reports it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Free-form role string, e.g. "admin" or "user"
    pub role: String,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }

    pub fn is_user(&self) -> bool {
        self.role == "user"
    }
}

/// Top-level Rently configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentlyConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Persisted session settings
    pub session: SessionConfig,
    /// Query cache settings
    pub cache: CacheConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the Rently REST API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

/// Persisted session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie file path; platform data dir when unset
    pub cookie_file: Option<PathBuf>,
    /// Days before persisted session fields expire
    pub expiry_days: i64,
}

/// Query cache settings
///
/// Defaults mirror the freshness policy every screen relies on: a long
/// global staleness window, a shorter per-screen one, bounded retention,
/// and asymmetric retry counts for reads and writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Default freshness window in seconds
    pub default_stale_seconds: u64,
    /// Freshness window used by the resource screens, in seconds
    pub screen_stale_seconds: u64,
    /// Unused entries are dropped after this many seconds
    pub gc_seconds: u64,
    /// Retry count for failed reads
    pub read_retries: u32,
    /// Retry count for failed writes
    pub write_retries: u32,
    /// Mark everything stale when the network comes back
    pub refetch_on_reconnect: bool,
    /// Refetch when the window regains focus (kept off)
    pub refetch_on_focus: bool,
}
