//! Error types for the validator

use thiserror::Error;

use crate::validation::ValidationFailure;

/// Result type for validator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced outside the validation pipeline itself
#[derive(Error, Debug)]
pub enum Error {
    #[error("Specification is invalid:\n{0}")]
    Validation(#[from] ValidationFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}
