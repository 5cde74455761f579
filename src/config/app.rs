//! Main application configuration
//!
//! This module defines the primary configuration structures for the
//! commons-arena service, including environment variable loading,
//! TOML file loading and validation.

use crate::matchmaker::PolicyWeights;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub media: MediaSettings,
    pub matchmaking: MatchmakingSettings,
    pub rating: RatingSettings,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Port for the HTTP API
    pub http_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout_seconds: u64,
}

/// Media source (Wikimedia Commons) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Base URL of the MediaWiki action API
    pub api_base_url: String,
    /// Base URL of the wiki pages (Special:RandomInCategory lives here)
    pub wiki_base_url: String,
    /// Category the arena draws random files from
    pub category: String,
    /// Timeout for outbound requests in seconds
    pub request_timeout_seconds: u64,
    /// Maximum attempts when hunting for a qualifying random file
    pub max_fetch_attempts: u32,
    /// Accepted file extensions, without the leading dot
    pub accepted_extensions: Vec<String>,
    /// Number of items to pre-fetch into an empty catalog at startup
    pub seed_target: usize,
}

/// Matchmaking-specific settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchmakingSettings {
    /// Size of the top-rated pool the challenge policies sample from
    pub top_pool_size: usize,
    /// Ratings below this count as underdogs for the challenge policy
    pub challenge_rating_threshold: f64,
    /// Weighted distribution over the five selection policies
    pub policy_weights: PolicyWeights,
}

/// Rating engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// K-factor controlling rating volatility per match
    pub k_factor: f64,
    /// Baseline rating for newly catalogued items
    pub initial_rating: f64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "commons-arena".to_string(),
            log_level: "info".to_string(),
            http_port: 8080,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            api_base_url: "https://commons.wikimedia.org/w/api.php".to_string(),
            wiki_base_url: "https://commons.wikimedia.org/wiki".to_string(),
            category: "Files from the Biodiversity Heritage Library".to_string(),
            request_timeout_seconds: 10,
            max_fetch_attempts: 25,
            accepted_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
            ],
            seed_target: 10,
        }
    }
}

impl Default for MatchmakingSettings {
    fn default() -> Self {
        Self {
            top_pool_size: 20,
            challenge_rating_threshold: 1500.0,
            policy_weights: PolicyWeights::default(),
        }
    }
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: 100.0,
            initial_rating: 1200.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }
        if let Ok(port) = env::var("HTTP_PORT") {
            config.service.http_port = port
                .parse()
                .map_err(|_| anyhow!("Invalid HTTP_PORT value: {}", port))?;
        }
        if let Ok(timeout) = env::var("SHUTDOWN_TIMEOUT_SECONDS") {
            config.service.shutdown_timeout_seconds = timeout
                .parse()
                .map_err(|_| anyhow!("Invalid SHUTDOWN_TIMEOUT_SECONDS value: {}", timeout))?;
        }

        // Media source settings
        if let Ok(url) = env::var("MEDIA_API_BASE_URL") {
            config.media.api_base_url = url;
        }
        if let Ok(url) = env::var("MEDIA_WIKI_BASE_URL") {
            config.media.wiki_base_url = url;
        }
        if let Ok(category) = env::var("ARENA_CATEGORY") {
            config.media.category = category;
        }
        if let Ok(timeout) = env::var("MEDIA_REQUEST_TIMEOUT_SECONDS") {
            config.media.request_timeout_seconds = timeout.parse().map_err(|_| {
                anyhow!("Invalid MEDIA_REQUEST_TIMEOUT_SECONDS value: {}", timeout)
            })?;
        }
        if let Ok(attempts) = env::var("MEDIA_MAX_FETCH_ATTEMPTS") {
            config.media.max_fetch_attempts = attempts
                .parse()
                .map_err(|_| anyhow!("Invalid MEDIA_MAX_FETCH_ATTEMPTS value: {}", attempts))?;
        }
        if let Ok(extensions) = env::var("MEDIA_ACCEPTED_EXTENSIONS") {
            config.media.accepted_extensions = extensions
                .split(',')
                .map(|ext| ext.trim().trim_start_matches('.').to_string())
                .filter(|ext| !ext.is_empty())
                .collect();
        }
        if let Ok(target) = env::var("MEDIA_SEED_TARGET") {
            config.media.seed_target = target
                .parse()
                .map_err(|_| anyhow!("Invalid MEDIA_SEED_TARGET value: {}", target))?;
        }

        // Matchmaking settings
        if let Ok(pool) = env::var("TOP_POOL_SIZE") {
            config.matchmaking.top_pool_size = pool
                .parse()
                .map_err(|_| anyhow!("Invalid TOP_POOL_SIZE value: {}", pool))?;
        }
        if let Ok(threshold) = env::var("CHALLENGE_RATING_THRESHOLD") {
            config.matchmaking.challenge_rating_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("Invalid CHALLENGE_RATING_THRESHOLD value: {}", threshold))?;
        }
        if let Ok(weights) = env::var("POLICY_WEIGHTS") {
            config.matchmaking.policy_weights = PolicyWeights::parse_csv(&weights)?;
        }

        // Rating settings
        if let Ok(k_factor) = env::var("ELO_K_FACTOR") {
            config.rating.k_factor = k_factor
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_K_FACTOR value: {}", k_factor))?;
        }
        if let Ok(initial) = env::var("ELO_INITIAL_RATING") {
            config.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid ELO_INITIAL_RATING value: {}", initial))?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        validate_config(&config)?;
        Ok(config)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.service.shutdown_timeout_seconds)
    }
}

impl MediaSettings {
    /// Get the outbound request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    // Validate ports and timeouts
    if config.service.http_port == 0 {
        return Err(anyhow!("HTTP port cannot be 0"));
    }
    if config.service.shutdown_timeout_seconds == 0 {
        return Err(anyhow!("Shutdown timeout must be greater than 0"));
    }
    if config.media.request_timeout_seconds == 0 {
        return Err(anyhow!("Media request timeout must be greater than 0"));
    }

    // Validate media settings
    if config.media.api_base_url.is_empty() {
        return Err(anyhow!("Media API base URL cannot be empty"));
    }
    if config.media.wiki_base_url.is_empty() {
        return Err(anyhow!("Media wiki base URL cannot be empty"));
    }
    if config.media.category.is_empty() {
        return Err(anyhow!("Arena category cannot be empty"));
    }
    if config.media.max_fetch_attempts == 0 {
        return Err(anyhow!("Max fetch attempts must be greater than 0"));
    }
    if config.media.accepted_extensions.is_empty() {
        return Err(anyhow!("Accepted extension list cannot be empty"));
    }

    // Validate matchmaking settings
    if config.matchmaking.top_pool_size < 2 {
        return Err(anyhow!("Top pool size must be at least 2"));
    }
    config.matchmaking.policy_weights.validate()?;

    // Validate rating settings
    if config.rating.k_factor <= 0.0 || !config.rating.k_factor.is_finite() {
        return Err(anyhow!("K-factor must be a positive finite number"));
    }
    if !config.rating.initial_rating.is_finite() {
        return Err(anyhow!("Initial rating must be finite"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.rating.k_factor, 100.0);
        assert_eq!(config.rating.initial_rating, 1200.0);
        assert_eq!(config.matchmaking.top_pool_size, 20);
        assert_eq!(config.matchmaking.challenge_rating_threshold, 1500.0);
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let mut config = AppConfig::default();
        config.service.log_level = "verbose".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_fetch_attempts_rejected() {
        let mut config = AppConfig::default();
        config.media.max_fetch_attempts = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_nonpositive_k_factor_rejected() {
        let mut config = AppConfig::default();
        config.rating.k_factor = 0.0;
        assert!(validate_config(&config).is_err());
        config.rating.k_factor = -32.0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_timeout_helpers_reflect_configured_seconds() {
        let mut config = AppConfig::default();
        config.service.shutdown_timeout_seconds = 7;
        config.media.request_timeout_seconds = 3;

        assert_eq!(config.shutdown_timeout(), Duration::from_secs(7));
        assert_eq!(config.media.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let toml = r#"
            [rating]
            k_factor = 24.0

            [media]
            category = "Paintings in the Rijksmuseum"
        "#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.rating.k_factor, 24.0);
        assert_eq!(config.rating.initial_rating, 1200.0);
        assert_eq!(config.media.category, "Paintings in the Rijksmuseum");
        assert_eq!(config.service.http_port, 8080);
    }
}
