//! Common error types for Frameline
//!
//! Handlers convert these into structured JSON error responses at the HTTP
//! boundary; nothing in this taxonomy is allowed to crash the process.

use thiserror::Error;

/// Common result type for Frameline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Frameline crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource already exists (duplicate email, duplicate key)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Payment callback signature did not match the recomputed value
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// Disallowed project status transition
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    /// Payment gateway request failed
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
