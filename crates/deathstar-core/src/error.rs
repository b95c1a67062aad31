//! Error types for the Death Star pipeline

use thiserror::Error;

/// Main error type for all Death Star operations
#[derive(Error, Debug)]
pub enum DeathStarError {
    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No template for industry: {0}")]
    TemplateNotFound(String),

    #[error("Mail client error: {0}")]
    MailClient(String),

    #[error("Concurrent run detected: {0}")]
    ConcurrentRun(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Result type for Death Star operations
pub type Result<T> = std::result::Result<T, DeathStarError>;
