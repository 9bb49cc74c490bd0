//! Error types for the generation client

use thiserror::Error;

/// Generation backend error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("generation backend returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("stream error: {0}")]
    Stream(String),
}

/// Result type alias for generation operations
pub type Result<T> = std::result::Result<T, AiError>;
