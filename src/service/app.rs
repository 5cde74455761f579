//! Main application state and service coordination
//!
//! This module contains the AppState that wires the catalog store, the
//! media source client, the matchmaker and the rating engine together,
//! and implements the operations the HTTP handlers delegate to.

use crate::config::AppConfig;
use crate::error::{ArenaError, Result};
use crate::matchmaker::Matchmaker;
use crate::media::{extract_statements, CommonsClient, MediaSource};
use crate::metrics::MetricsCollector;
use crate::rating::{CatalogStore, EloEngine, InMemoryCatalogStore};
use crate::types::{
    ChoiceSubmission, ComparisonPair, Contender, Item, MatchRecord,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Main application state containing all service components
pub struct AppState {
    config: AppConfig,
    store: Arc<dyn CatalogStore>,
    media: Arc<dyn MediaSource>,
    matchmaker: Matchmaker,
    engine: EloEngine,
    metrics: Arc<MetricsCollector>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Initialize the application against the live media source
    pub fn new(config: AppConfig) -> Result<Self> {
        let store: Arc<dyn CatalogStore> = Arc::new(InMemoryCatalogStore::new());
        let media: Arc<dyn MediaSource> = Arc::new(CommonsClient::new(config.media.clone()));
        Self::with_components(config, store, media)
    }

    /// Initialize with injected collaborators (used by tests)
    pub fn with_components(
        config: AppConfig,
        store: Arc<dyn CatalogStore>,
        media: Arc<dyn MediaSource>,
    ) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new()?);
        let matchmaker = Matchmaker::new(store.clone(), media.clone(), metrics.clone(), &config);
        let engine = EloEngine::new(&config.rating);

        Ok(Self {
            config,
            store,
            media,
            matchmaker,
            engine,
            metrics,
            started_at: Utc::now(),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn store(&self) -> Arc<dyn CatalogStore> {
        self.store.clone()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Pre-populate an empty catalog at startup. Fetch trouble here is
    /// logged and tolerated; the first comparison request will try again.
    pub async fn seed_if_empty(&self) {
        let target = self.config.media.seed_target;
        match self.store.count() {
            Ok(0) if target > 0 => {
                info!("Seeding empty catalog with up to {} items", target);
                match self
                    .matchmaker
                    .seed_catalog(&self.config.media.category, target)
                    .await
                {
                    Ok(fetched) => info!("Seeded catalog with {} fetches", fetched),
                    Err(e) => {
                        self.metrics.record_media_failure();
                        warn!("Catalog seeding incomplete: {}", e);
                    }
                }
            }
            Ok(count) => info!("Catalog already holds {} items, skipping seed", count),
            Err(e) => warn!("Could not inspect catalog for seeding: {}", e),
        }
        if let Ok(count) = self.store.count() {
            self.metrics.update_catalog_size(count);
        }
    }

    /// Select the next pair and enrich both items with extracted statements
    pub async fn next_comparison(&self) -> Result<ComparisonPair> {
        let category = &self.config.media.category;
        let (policy, first, second) = self.matchmaker.select_pair(category).await?;

        info!(
            "Serving {} comparison: '{}' ({:.1}) vs '{}' ({:.1})",
            policy, first.name, first.rating, second.name, second.rating
        );

        let first = self.enrich(first).await?;
        let second = self.enrich(second).await?;

        self.metrics.record_comparison(policy);
        if let Ok(count) = self.store.count() {
            self.metrics.update_catalog_size(count);
        }

        Ok(ComparisonPair {
            policy,
            contenders: [first, second],
        })
    }

    async fn enrich(&self, item: Item) -> Result<Contender> {
        let raw = self.media.file_statements(&item.name).await.map_err(|e| {
            self.metrics.record_media_failure();
            e
        })?;
        let statements = extract_statements(&raw);
        Ok(Contender { item, statements })
    }

    /// Apply a submitted outcome: validate both ids, run the rating engine,
    /// persist both items and the match record.
    pub fn submit_choice(&self, submission: &ChoiceSubmission) -> Result<(Item, Item)> {
        let winner = self
            .store
            .find_by_id(&submission.winner)?
            .ok_or_else(|| ArenaError::ItemNotFound {
                item_id: submission.winner.to_string(),
            })?;
        let loser = self
            .store
            .find_by_id(&submission.loser)?
            .ok_or_else(|| ArenaError::ItemNotFound {
                item_id: submission.loser.to_string(),
            })?;

        let (winner, loser) = self.engine.rate(&winner, &loser, submission.draw)?;

        // Both updates plus the match record commit before the response
        self.store.update(&winner)?;
        self.store.update(&loser)?;
        let record_winner = if submission.draw { None } else { Some(winner.id) };
        self.store
            .record_match(MatchRecord::new(winner.id, loser.id, record_winner))?;

        self.metrics.record_choice(submission.draw);
        info!(
            "Applied {} outcome: '{}' -> {:.1}, '{}' -> {:.1}",
            if submission.draw { "draw" } else { "decisive" },
            winner.name,
            winner.rating,
            loser.name,
            loser.rating
        );

        Ok((winner, loser))
    }

    /// All items ordered by rating descending
    pub fn leaderboard(&self) -> Result<Vec<Item>> {
        self.store.ranked()
    }
}
