//! Test fixtures and helpers for integration testing

use commons_arena::config::AppConfig;
use commons_arena::matchmaker::PolicyWeights;
use commons_arena::media::MockMediaSource;
use commons_arena::rating::InMemoryCatalogStore;
use commons_arena::service::AppState;
use commons_arena::types::MatchPolicy;
use std::sync::Arc;

/// Configuration with tight fetch bounds so failing probes surface quickly
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.media.max_fetch_attempts = 5;
    config.media.seed_target = 4;
    config
}

/// Test configuration pinned to a single selection policy
pub fn pinned_config(policy: MatchPolicy) -> AppConfig {
    let mut config = test_config();
    config.matchmaking.policy_weights = PolicyWeights::only(policy);
    config
}

/// Integration test setup that creates a complete system around mocks
pub fn create_test_system(
    config: AppConfig,
) -> (
    Arc<InMemoryCatalogStore>,
    Arc<MockMediaSource>,
    Arc<AppState>,
) {
    let store = Arc::new(InMemoryCatalogStore::new());
    let media = Arc::new(MockMediaSource::new());
    let state = Arc::new(
        AppState::with_components(config, store.clone(), media.clone())
            .expect("Failed to create test app state"),
    );
    (store, media, state)
}

/// Queue `count` distinct qualifying file probes on the mock source
pub fn script_files(media: &MockMediaSource, count: usize) {
    for i in 0..count {
        media.push_file(&format!("Plate {i}.jpg"));
    }
}

/// A realistic Structured Data statements response with one depicts claim
pub fn depicts_statements(entity_id: &str) -> serde_json::Value {
    serde_json::json!({
        "entities": {
            "M114623": {
                "statements": {
                    "P180": [
                        {
                            "mainsnak": {
                                "snaktype": "value",
                                "property": "P180",
                                "datavalue": {
                                    "value": {
                                        "entity-type": "item",
                                        "id": entity_id
                                    },
                                    "type": "wikibase-entityid"
                                }
                            },
                            "rank": "normal"
                        }
                    ]
                }
            }
        }
    })
}
