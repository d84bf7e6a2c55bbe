//! # Error Types
//!
//! This module defines error types used throughout the ardoise library.
//!
//! Failures local to one visual element (a dish photo, a template background)
//! are contained by the composers and never reach the caller as an error.
//! What does reach the caller is one of the variants below.

use thiserror::Error;

/// Main error type for ardoise operations
#[derive(Debug, Error)]
pub enum ArdoiseError {
    /// Content fetch from the CMS failed (network, HTTP status, bad payload)
    #[error("Query error: {0}")]
    Query(String),

    /// Image download or decode failed
    #[error("Image load error: {0}")]
    ImageLoad(String),

    /// The drawing surface could not be allocated
    #[error("Canvas unavailable: {0}")]
    CanvasUnavailable(String),

    /// A blocking paint or encode task panicked or was cancelled
    #[error("Task error: {0}")]
    Task(String),

    /// PNG encoding failed
    #[error("Encode error: {0}")]
    Encode(String),

    /// Configuration file could not be parsed or is invalid
    #[error("Config error: {0}")]
    Config(String),

    /// Font file could not be read or parsed
    #[error("Font error: {0}")]
    Font(String),

    /// HTTP server error (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ArdoiseError>;
