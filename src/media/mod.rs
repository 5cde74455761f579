//! Media source integration for Wikimedia Commons
//!
//! This module defines the interface for the external media API and the
//! Commons-backed implementation, plus extraction of Structured Data
//! statements into presentable metadata.

pub mod commons;
pub mod source;
pub mod statements;

// Re-export commonly used types
pub use commons::CommonsClient;
pub use source::{MediaSource, MockMediaSource};
pub use statements::extract_statements;
