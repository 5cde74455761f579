//! Pair selection over the catalog and media source
//!
//! The matchmaker draws a policy from the configured weight table and
//! resolves it into two items, fetching fresh files from the media source
//! where the policy calls for them. All fetch loops are bounded: a category
//! that never yields a qualifying file surfaces as an error instead of
//! spinning forever.

use crate::config::AppConfig;
use crate::error::{ArenaError, Result};
use crate::matchmaker::policy::PolicyWeights;
use crate::media::MediaSource;
use crate::metrics::MetricsCollector;
use crate::rating::CatalogStore;
use crate::types::{Item, MatchPolicy};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// Selects comparison pairs using the weighted policy mix
pub struct Matchmaker {
    store: Arc<dyn CatalogStore>,
    media: Arc<dyn MediaSource>,
    metrics: Arc<MetricsCollector>,
    weights: PolicyWeights,
    top_pool_size: usize,
    challenge_rating_threshold: f64,
    max_fetch_attempts: u32,
    initial_rating: f64,
    rng: Mutex<StdRng>,
}

impl Matchmaker {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        media: Arc<dyn MediaSource>,
        metrics: Arc<MetricsCollector>,
        config: &AppConfig,
    ) -> Self {
        Self::with_rng(store, media, metrics, config, StdRng::from_os_rng())
    }

    /// Create a matchmaker with a seeded RNG for reproducible selection
    pub fn with_rng(
        store: Arc<dyn CatalogStore>,
        media: Arc<dyn MediaSource>,
        metrics: Arc<MetricsCollector>,
        config: &AppConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            store,
            media,
            metrics,
            weights: config.matchmaking.policy_weights.clone(),
            top_pool_size: config.matchmaking.top_pool_size,
            challenge_rating_threshold: config.matchmaking.challenge_rating_threshold,
            max_fetch_attempts: config.media.max_fetch_attempts,
            initial_rating: config.rating.initial_rating,
            rng: Mutex::new(rng),
        }
    }

    /// Run a closure against the matchmaker RNG. The lock is never held
    /// across an await point.
    fn with_locked_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> Result<T> {
        let mut rng = self.rng.lock().map_err(|_| ArenaError::InternalError {
            message: "Failed to acquire matchmaker rng lock".to_string(),
        })?;
        Ok(f(&mut rng))
    }

    /// Fetch one qualifying random file from the category and catalog it.
    ///
    /// Probes the media source up to the configured attempt bound; a title
    /// already in the catalog resolves to the existing item. Exhausting the
    /// bound yields `CategoryExhausted`.
    pub async fn fetch_fresh_item(&self, category: &str) -> Result<Item> {
        for attempt in 1..=self.max_fetch_attempts {
            match self.media.random_file_in_category(category).await? {
                Some(title) => {
                    let item = self.store.insert(&title, self.initial_rating)?;
                    debug!(
                        "Fetched qualifying file '{}' on attempt {} (rating {:.1})",
                        item.name, attempt, item.rating
                    );
                    return Ok(item);
                }
                None => {
                    self.metrics.record_media_miss();
                    debug!("Attempt {}: random page was not a qualifying file", attempt);
                }
            }
        }

        Err(ArenaError::CategoryExhausted {
            category: category.to_string(),
            attempts: self.max_fetch_attempts,
        }
        .into())
    }

    /// Bootstrap invariant: the catalog must hold at least two items before
    /// any sampling-based policy runs.
    pub async fn ensure_seeded(&self, category: &str) -> Result<()> {
        let mut attempts = 0;
        while self.store.count()? < 2 {
            attempts += 1;
            if attempts > self.max_fetch_attempts {
                return Err(ArenaError::CategoryExhausted {
                    category: category.to_string(),
                    attempts: self.max_fetch_attempts,
                }
                .into());
            }
            info!("Catalog below two items, fetching to seed it");
            self.fetch_fresh_item(category).await?;
        }
        Ok(())
    }

    /// Pre-populate an empty catalog up to the target size. Used at startup;
    /// fetch failures propagate to the caller.
    pub async fn seed_catalog(&self, category: &str, target: usize) -> Result<usize> {
        let mut fetched = 0;
        while self.store.count()? < target {
            self.fetch_fresh_item(category).await?;
            fetched += 1;
            // Dedup can keep the count flat, so bound on fetches too
            if fetched >= target * 2 {
                break;
            }
        }
        Ok(fetched)
    }

    /// Select the next comparison pair for the category
    pub async fn select_pair(&self, category: &str) -> Result<(MatchPolicy, Item, Item)> {
        self.ensure_seeded(category).await?;

        let policy = self.with_locked_rng(|rng| self.weights.choose(rng))??;
        debug!("Selected match policy: {}", policy);

        let (first, second) = match policy {
            MatchPolicy::Exploratory => self.exploratory(category).await?,
            MatchPolicy::ExploratoryChallenge => self.exploratory_challenge(category).await?,
            MatchPolicy::TopMatch => self.top_match(category).await?,
            MatchPolicy::Random => self.random_pair()?,
            MatchPolicy::Challenge => self.challenge(category).await?,
        };

        Ok((policy, first, second))
    }

    /// Two fresh fetches; a repeat of the same file triggers one refetch
    async fn exploratory(&self, category: &str) -> Result<(Item, Item)> {
        let first = self.fetch_fresh_item(category).await?;
        let mut second = self.fetch_fresh_item(category).await?;
        if second.id == first.id {
            second = self.fetch_fresh_item(category).await?;
        }
        Ok((first, second))
    }

    /// One top-pool item against one fresh fetch
    async fn exploratory_challenge(&self, category: &str) -> Result<(Item, Item)> {
        let mut fresh = self.fetch_fresh_item(category).await?;
        let champion = self.sample_top_item()?;
        if fresh.id == champion.id {
            fresh = self.fetch_fresh_item(category).await?;
        }
        Ok((champion, fresh))
    }

    /// Two distinct top-pool items; falls back to top-plus-fresh when the
    /// pool is too small
    async fn top_match(&self, category: &str) -> Result<(Item, Item)> {
        let top = self.store.top_by_rating(self.top_pool_size)?;

        if top.len() >= 2 {
            let pair = self.with_locked_rng(|rng| {
                top.choose_multiple(rng, 2).cloned().collect::<Vec<Item>>()
            })?;
            Ok((pair[0].clone(), pair[1].clone()))
        } else {
            let champion = top.into_iter().next().ok_or_else(|| {
                ArenaError::InternalError {
                    message: "Catalog empty after seeding".to_string(),
                }
            })?;
            let fresh = self.fetch_fresh_item(category).await?;
            Ok((champion, fresh))
        }
    }

    /// Two uniform picks over the whole catalog. Picks are independent and
    /// may coincide, matching the observed behavior.
    fn random_pair(&self) -> Result<(Item, Item)> {
        let sample = self.store.sample_random(2)?;
        if sample.len() < 2 {
            return Err(ArenaError::InternalError {
                message: "Catalog empty after seeding".to_string(),
            }
            .into());
        }
        Ok((sample[0].clone(), sample[1].clone()))
    }

    /// One top-pool item against an underdog rated below the threshold
    async fn challenge(&self, category: &str) -> Result<(Item, Item)> {
        let champion = self.sample_top_item()?;

        let underdog = match self
            .store
            .rating_below(self.challenge_rating_threshold, None)?
        {
            Some(pick) if pick.id == champion.id => self
                .store
                .rating_below(self.challenge_rating_threshold, Some(champion.id))?,
            other => other,
        };

        match underdog {
            Some(underdog) => Ok((champion, underdog)),
            None => {
                // Nothing below the threshold: fetch a challenger instead
                let mut fresh = self.fetch_fresh_item(category).await?;
                if fresh.id == champion.id {
                    fresh = self.fetch_fresh_item(category).await?;
                }
                Ok((champion, fresh))
            }
        }
    }

    fn sample_top_item(&self) -> Result<Item> {
        let top = self.store.top_by_rating(self.top_pool_size)?;
        self.with_locked_rng(|rng| top.choose(rng).cloned())?
            .ok_or_else(|| {
                ArenaError::InternalError {
                    message: "Catalog empty after seeding".to_string(),
                }
                .into()
            })
    }
}
