//! Error types for the arena service
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific arena scenarios
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    #[error("Invalid submission: {reason}")]
    InvalidSubmission { reason: String },

    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: String },

    #[error("No qualifying file in category '{category}' after {attempts} attempts")]
    CategoryExhausted { category: String, attempts: u32 },

    #[error("Media source request failed: {message}")]
    MediaSourceFailed { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}
