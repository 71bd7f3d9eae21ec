//! Configuration management for slotbox
//!
//! Layered loading: struct defaults, then `config/slotbox.toml` (path
//! overridable via `SLOTBOX_CONFIG`), then `.env`, then environment
//! variables with the pattern `SLOTBOX__<SECTION>__<KEY>`, e.g.
//! `SLOTBOX__SERVICE__SLOT_API=https://svc.example.com/api/slots/slot-017`
//! or `SLOTBOX__SLOT__UPLOAD_LIMIT=20MB`.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{Config, HttpConfig, ServiceConfig, SlotConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment).
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path.
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
