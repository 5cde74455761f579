//! HTTP endpoints for the arena using Axum
//!
//! Thin handlers over AppState: comparison page data, choice submission,
//! leaderboard, health and Prometheus metrics.

use crate::error::ArenaError;
use crate::service::app::AppState;
use crate::types::ChoiceSubmission;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Create the Axum router with all arena endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(comparison_handler))
        .route("/submit_choice", post(submit_choice_handler))
        .route("/rank", get(rank_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Map a service error onto an HTTP status and JSON body
fn error_response(error: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    let (status, message) = match error.downcast_ref::<ArenaError>() {
        Some(ArenaError::InvalidSubmission { .. }) | Some(ArenaError::ItemNotFound { .. }) => {
            (StatusCode::BAD_REQUEST, error.to_string())
        }
        Some(ArenaError::CategoryExhausted { .. }) => {
            (StatusCode::SERVICE_UNAVAILABLE, error.to_string())
        }
        Some(ArenaError::MediaSourceFailed { .. }) => (StatusCode::BAD_GATEWAY, error.to_string()),
        _ => {
            error!("Internal error serving request: {:#}", error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal service error".to_string(),
            )
        }
    };

    (status, Json(json!({ "error": message })))
}

/// Comparison endpoint: select a pair and return it with metadata
async fn comparison_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Comparison requested");

    match state.next_comparison().await {
        Ok(pair) => (StatusCode::OK, Json(json!(pair))).into_response(),
        Err(e) => {
            warn!("Comparison selection failed: {}", e);
            error_response(e).into_response()
        }
    }
}

/// Submission endpoint: apply a winner/loser/draw outcome
async fn submit_choice_handler(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<ChoiceSubmission>,
) -> impl IntoResponse {
    debug!(
        "Choice submitted: winner={}, loser={}, draw={}",
        submission.winner, submission.loser, submission.draw
    );

    match state.submit_choice(&submission) {
        Ok((winner, loser)) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "winner": winner,
                "loser": loser,
            })),
        )
            .into_response(),
        Err(e) => {
            state.metrics().record_invalid_submission();
            warn!("Choice submission rejected: {}", e);
            error_response(e).into_response()
        }
    }
}

/// Leaderboard endpoint: items ordered by rating descending
async fn rank_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Leaderboard requested");

    match state.leaderboard() {
        Ok(items) => (
            StatusCode::OK,
            Json(json!({
                "count": items.len(),
                "items": items,
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.store().count() {
        Ok(count) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "service": state.config().service.name,
                "version": env!("CARGO_PKG_VERSION"),
                "catalog_size": count,
                "started_at": state.started_at(),
            })),
        ),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": state.config().service.name,
                "version": env!("CARGO_PKG_VERSION"),
            })),
        ),
    }
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<Arc<AppState>>) -> Response {
    let registry = state.metrics().registry();
    let metric_families = registry.gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(output) => Response::builder()
            .status(StatusCode::OK)
            .header("content-type", encoder.format_type())
            .body(output.into())
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to encode metrics",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::media::MockMediaSource;
    use crate::rating::{CatalogStore, InMemoryCatalogStore};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt; // for oneshot
    use uuid::Uuid;

    fn test_app() -> (Arc<InMemoryCatalogStore>, Arc<MockMediaSource>, Router) {
        let store = Arc::new(InMemoryCatalogStore::new());
        let media = Arc::new(MockMediaSource::new());
        let state = Arc::new(
            AppState::with_components(AppConfig::default(), store.clone(), media.clone())
                .expect("Failed to create app state"),
        );
        (store, media, create_router(state))
    }

    #[tokio::test]
    async fn test_comparison_endpoint_serves_pair() {
        let (_, media, app) = test_app();
        for i in 0..8 {
            media.push_file(&format!("Plate {i}.jpg"));
        }

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_comparison_endpoint_unavailable_when_category_empty() {
        // No scripted probes: every fetch misses, the bounded loop exhausts
        let (_, _, app) = test_app();

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_submit_choice_applies_ratings() {
        let (store, _, app) = test_app();
        let winner = store.insert("A.jpg", 1200.0).unwrap();
        let loser = store.insert("B.jpg", 1200.0).unwrap();

        let body = json!({ "winner": winner.id, "loser": loser.id }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/submit_choice")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let updated = store.find_by_id(&winner.id).unwrap().unwrap();
        assert!((updated.rating - 1250.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_submit_choice_unknown_id_is_client_error() {
        let (store, _, app) = test_app();
        let loser = store.insert("B.jpg", 1200.0).unwrap();

        let body = json!({ "winner": Uuid::new_v4(), "loser": loser.id }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/submit_choice")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // No rating mutation happened
        let untouched = store.find_by_id(&loser.id).unwrap().unwrap();
        assert_eq!(untouched.rating, 1200.0);
    }

    #[tokio::test]
    async fn test_rank_endpoint() {
        let (store, _, app) = test_app();
        store.insert("A.jpg", 1200.0).unwrap();
        store.insert("B.jpg", 1200.0).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/rank")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (_, _, app) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (_, _, app) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert!(content_type.to_str().unwrap().contains("text/plain"));
    }

    #[tokio::test]
    async fn test_404_handling() {
        let (_, _, app) = test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
