//! Elo rating engine and catalog storage
//!
//! This module provides the pure rating calculation, the catalog store
//! interface and the in-memory implementation backing the arena.

pub mod elo;
pub mod storage;

// Re-export commonly used types
pub use elo::EloEngine;
pub use storage::{CatalogStore, InMemoryCatalogStore};
