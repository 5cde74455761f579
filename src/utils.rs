//! Utility functions for the arena service

use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Case-insensitive check of a file title against an accepted-extension list.
/// Extensions are configured without the leading dot.
pub fn has_accepted_extension(title: &str, accepted: &[String]) -> bool {
    let lower = title.to_lowercase();
    accepted
        .iter()
        .any(|ext| lower.ends_with(&format!(".{}", ext.to_lowercase())))
}
