//! Matchmaking system for the arena
//!
//! This module selects which two items face each other next, mixing
//! exploratory fetches from the media source with rating-driven pairings
//! from the catalog.

pub mod policy;
pub mod selector;

// Re-export commonly used types
pub use policy::PolicyWeights;
pub use selector::Matchmaker;
