//! Error types for duesync.

use thiserror::Error;

/// Errors that can occur in duesync operations.
#[derive(Error, Debug)]
pub enum DueSyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to fetch feed {url}: {reason}")]
    Feed { url: String, reason: String },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Notion API error (HTTP {status}): {message}")]
    Notion { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for duesync operations.
pub type DueSyncResult<T> = Result<T, DueSyncError>;
