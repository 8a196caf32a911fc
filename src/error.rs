//! Error types for the harness.

use thiserror::Error;

/// Top-level error type for runs, searches and their collaborators.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown runner class: {0}")]
    UnknownRunner(String),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("SigOpt API error: {0}")]
    SigOpt(String),

    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Raised by `RunMe::execute` once a run failure has been logged.
    #[error("Execution finished with errors: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
