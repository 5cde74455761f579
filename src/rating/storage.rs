//! Catalog store interface and in-memory implementation
//!
//! This module defines the interface for persisting items and match history,
//! with an in-memory implementation suitable for single-process deployments
//! and tests.

use crate::error::{ArenaError, Result};
use crate::types::{Item, ItemId, MatchRecord};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};

/// Trait for catalog storage operations
///
/// Names are unique: inserting a known name returns the existing row instead
/// of a duplicate, which is how concurrent discovery of the same file is
/// resolved.
pub trait CatalogStore: Send + Sync {
    /// Look an item up by id
    fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>>;

    /// Look an item up by file name
    fn find_by_name(&self, name: &str) -> Result<Option<Item>>;

    /// Insert a new item at the baseline rating, or return the existing
    /// item when the name is already catalogued
    fn insert(&self, name: &str, initial_rating: f64) -> Result<Item>;

    /// Persist updated rating and tallies for an existing item
    fn update(&self, item: &Item) -> Result<()>;

    /// Total number of catalogued items
    fn count(&self) -> Result<usize>;

    /// The n highest-rated items, rating descending
    fn top_by_rating(&self, n: usize) -> Result<Vec<Item>>;

    /// n uniform picks from the whole catalog; picks are independent and
    /// may repeat
    fn sample_random(&self, n: usize) -> Result<Vec<Item>>;

    /// A uniform pick among items rated below the threshold, optionally
    /// excluding one id
    fn rating_below(&self, threshold: f64, exclude: Option<ItemId>) -> Result<Option<Item>>;

    /// All items ordered by rating descending (the leaderboard)
    fn ranked(&self) -> Result<Vec<Item>>;

    /// Append an immutable match record
    fn record_match(&self, record: MatchRecord) -> Result<()>;

    /// Number of recorded matches
    fn match_count(&self) -> Result<usize>;
}

/// In-memory catalog store implementation
pub struct InMemoryCatalogStore {
    items: RwLock<HashMap<ItemId, Item>>,
    matches: RwLock<Vec<MatchRecord>>,
    rng: Mutex<StdRng>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Create a store with a seeded RNG for reproducible sampling in tests
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            matches: RwLock::new(Vec::new()),
            rng: Mutex::new(rng),
        }
    }

    fn read_items(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ItemId, Item>>> {
        self.items.read().map_err(|_| {
            ArenaError::InternalError {
                message: "Failed to acquire items read lock".to_string(),
            }
            .into()
        })
    }

    fn write_items(&self) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ItemId, Item>>> {
        self.items.write().map_err(|_| {
            ArenaError::InternalError {
                message: "Failed to acquire items write lock".to_string(),
            }
            .into()
        })
    }

    fn sorted_by_rating_desc(items: &HashMap<ItemId, Item>) -> Vec<Item> {
        let mut sorted: Vec<Item> = items.values().cloned().collect();
        sorted.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        sorted
    }
}

impl Default for InMemoryCatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore for InMemoryCatalogStore {
    fn find_by_id(&self, id: &ItemId) -> Result<Option<Item>> {
        Ok(self.read_items()?.get(id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Item>> {
        Ok(self
            .read_items()?
            .values()
            .find(|item| item.name == name)
            .cloned())
    }

    fn insert(&self, name: &str, initial_rating: f64) -> Result<Item> {
        let mut items = self.write_items()?;

        // Uniqueness check and insert under one lock, so two requests
        // discovering the same file resolve to a single row
        if let Some(existing) = items.values().find(|item| item.name == name) {
            return Ok(existing.clone());
        }

        let item = Item::new(name, initial_rating);
        items.insert(item.id, item.clone());
        Ok(item)
    }

    fn update(&self, item: &Item) -> Result<()> {
        let mut items = self.write_items()?;
        match items.get_mut(&item.id) {
            Some(stored) => {
                *stored = item.clone();
                Ok(())
            }
            None => Err(ArenaError::ItemNotFound {
                item_id: item.id.to_string(),
            }
            .into()),
        }
    }

    fn count(&self) -> Result<usize> {
        Ok(self.read_items()?.len())
    }

    fn top_by_rating(&self, n: usize) -> Result<Vec<Item>> {
        let items = self.read_items()?;
        let mut sorted = Self::sorted_by_rating_desc(&items);
        sorted.truncate(n);
        Ok(sorted)
    }

    fn sample_random(&self, n: usize) -> Result<Vec<Item>> {
        let items = self.read_items()?;
        let pool: Vec<&Item> = items.values().collect();
        if pool.is_empty() {
            return Ok(Vec::new());
        }

        let mut rng = self.rng.lock().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire sampling rng lock".to_string(),
        })?;

        Ok((0..n)
            .filter_map(|_| pool.choose(&mut *rng).map(|item| (*item).clone()))
            .collect())
    }

    fn rating_below(&self, threshold: f64, exclude: Option<ItemId>) -> Result<Option<Item>> {
        let items = self.read_items()?;
        let candidates: Vec<&Item> = items
            .values()
            .filter(|item| item.rating < threshold && Some(item.id) != exclude)
            .collect();

        let mut rng = self.rng.lock().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire sampling rng lock".to_string(),
        })?;

        Ok(candidates.choose(&mut *rng).map(|item| (*item).clone()))
    }

    fn ranked(&self) -> Result<Vec<Item>> {
        let items = self.read_items()?;
        Ok(Self::sorted_by_rating_desc(&items))
    }

    fn record_match(&self, record: MatchRecord) -> Result<()> {
        let mut matches = self.matches.write().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire matches write lock".to_string(),
        })?;
        matches.push(record);
        Ok(())
    }

    fn match_count(&self) -> Result<usize> {
        let matches = self.matches.read().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire matches read lock".to_string(),
        })?;
        Ok(matches.len())
    }
}
