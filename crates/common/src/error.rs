//! Error types

use thiserror::Error;

/// Main error type for the gamification engine
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid activity: {module}/{activity_type}")]
    InvalidActivity {
        module: String,
        activity_type: String,
    },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
