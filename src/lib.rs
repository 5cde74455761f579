//! Commons Arena - Pairwise image comparison service for Wikimedia Commons
//!
//! This crate serves comparison pairs drawn from a Commons category,
//! applies Elo rating updates from submitted choices, and exposes a
//! leaderboard over HTTP.

pub mod config;
pub mod error;
pub mod matchmaker;
pub mod media;
pub mod metrics;
pub mod rating;
pub mod service;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{ArenaError, Result};
pub use types::*;

// Re-export key components
pub use matchmaker::Matchmaker;
pub use rating::{CatalogStore, EloEngine, InMemoryCatalogStore};
pub use service::{create_router, AppState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
