//! REST endpoint for the training-type listing.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use super::catalog::{TrainingTypeCatalog, etag_matches};

/// Shared state for training-type routes.
#[derive(Clone)]
pub struct TrainingTypeRouteState {
    pub catalog: Arc<TrainingTypeCatalog>,
}

/// GET /api/training-types
///
/// Answers 304 when the caller's `If-None-Match` still matches.
async fn list_training_types(
    State(state): State<TrainingTypeRouteState>,
    headers: HeaderMap,
) -> Response {
    let listing = match state.catalog.current().await {
        Ok(listing) => listing,
        Err(e) => {
            tracing::warn!("Failed to load training types: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };

    let Some(etag) = listing.etag else {
        return Json(serde_json::json!({ "data": listing.types })).into_response();
    };

    let not_modified = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|inm| etag_matches(inm, &etag));

    if not_modified {
        return (StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response();
    }

    (
        [(header::ETAG, etag)],
        Json(serde_json::json!({ "data": listing.types })),
    )
        .into_response()
}

/// Build the training-type REST routes.
pub fn training_type_routes(state: TrainingTypeRouteState) -> Router {
    Router::new()
        .route("/api/training-types", get(list_training_types))
        .with_state(state)
}
