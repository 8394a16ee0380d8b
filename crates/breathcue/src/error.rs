//! Error types for Breathcue
//!
//! Centralized error handling using thiserror. Notifier operations never
//! surface these; they are logged and turned into no-ops.

use thiserror::Error;

/// Main error type for Breathcue
#[derive(Error, Debug)]
pub enum CueError {
    #[error("Audio error: {0}")]
    Audio(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Breathcue
pub type Result<T> = std::result::Result<T, CueError>;
