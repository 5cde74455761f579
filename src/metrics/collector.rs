//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the commons-arena service
//! using Prometheus metrics.

use crate::types::MatchPolicy;
use anyhow::Result;
use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;

/// Main metrics collector for the arena service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Comparisons served, labelled by selection policy
    comparisons_total: IntCounterVec,

    /// Choice submissions, labelled by outcome (decisive/draw)
    choices_total: IntCounterVec,

    /// Rejected submissions (unknown ids, self-pairings)
    invalid_submissions_total: IntCounter,

    /// Media source probes that did not yield a qualifying file
    media_misses_total: IntCounter,

    /// Media source request failures
    media_failures_total: IntCounter,

    /// Current catalog size
    catalog_size: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let comparisons_total = IntCounterVec::new(
            Opts::new(
                "commons_arena_comparisons_total",
                "Comparison pairs served",
            ),
            &["policy"],
        )?;
        registry.register(Box::new(comparisons_total.clone()))?;

        let choices_total = IntCounterVec::new(
            Opts::new("commons_arena_choices_total", "Choice submissions applied"),
            &["outcome"],
        )?;
        registry.register(Box::new(choices_total.clone()))?;

        let invalid_submissions_total = IntCounter::new(
            "commons_arena_invalid_submissions_total",
            "Choice submissions rejected before any rating mutation",
        )?;
        registry.register(Box::new(invalid_submissions_total.clone()))?;

        let media_misses_total = IntCounter::new(
            "commons_arena_media_misses_total",
            "Random-page probes that were not a qualifying file",
        )?;
        registry.register(Box::new(media_misses_total.clone()))?;

        let media_failures_total = IntCounter::new(
            "commons_arena_media_failures_total",
            "Failed requests against the media source",
        )?;
        registry.register(Box::new(media_failures_total.clone()))?;

        let catalog_size = IntGauge::new(
            "commons_arena_catalog_size",
            "Number of catalogued items",
        )?;
        registry.register(Box::new(catalog_size.clone()))?;

        Ok(Self {
            registry,
            comparisons_total,
            choices_total,
            invalid_submissions_total,
            media_misses_total,
            media_failures_total,
            catalog_size,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Record a comparison pair being served
    pub fn record_comparison(&self, policy: MatchPolicy) {
        self.comparisons_total
            .with_label_values(&[policy.as_str()])
            .inc();
    }

    /// Record an applied choice submission
    pub fn record_choice(&self, draw: bool) {
        let outcome = if draw { "draw" } else { "decisive" };
        self.choices_total.with_label_values(&[outcome]).inc();
    }

    /// Record a rejected submission
    pub fn record_invalid_submission(&self) {
        self.invalid_submissions_total.inc();
    }

    /// Record a media probe miss
    pub fn record_media_miss(&self) {
        self.media_misses_total.inc();
    }

    /// Record a media request failure
    pub fn record_media_failure(&self) {
        self.media_failures_total.inc();
    }

    /// Update the catalog size gauge
    pub fn update_catalog_size(&self, size: usize) {
        self.catalog_size.set(size as i64);
    }
}
