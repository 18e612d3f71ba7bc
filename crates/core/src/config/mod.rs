mod loader;
mod types;
mod validate;

pub use loader::{load_settings, load_settings_from_path, load_settings_from_str, CONFIG_PATH_ENV, ENV_KEYS};
pub use types::*;
pub use validate::validate_settings;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required settings: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}
