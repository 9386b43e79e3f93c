//! Rently Core - Shared data structures, errors, configuration and logging
//!
//! This crate defines the foundations every other Rently crate builds on

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external crates
pub use tracing;
