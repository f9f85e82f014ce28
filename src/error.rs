//! # Error Types
//!
//! This module defines error types used throughout the bingocard library.

use thiserror::Error;

/// Main error type for bingocard operations
#[derive(Debug, Error)]
pub enum BingoError {
    /// No export surface was available when an export was requested
    #[error("Export canvas not found")]
    MissingSurface,

    /// The surface holds cross-origin pixels and cannot be read back
    #[error(
        "Cannot export: the card contains a cross-origin image that taints the canvas. \
         Re-upload the image from a local file and try again."
    )]
    TaintedSurface,

    /// Encoding the finished surface failed or produced no data
    #[error("Rendering error while encoding the card: {0}")]
    Encode(String),

    /// Cell index outside the grid
    #[error("Invalid cell index: {0}")]
    InvalidCell(usize),

    /// Image decoding or fetching error
    #[error("Image error: {0}")]
    Image(String),

    /// No session is stored under the requested name
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Session store content could not be read or written
    #[error("Session store error: {0}")]
    Session(String),

    /// Invalid configuration or card file
    #[error("Config error: {0}")]
    Config(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
