//! REST endpoint for the user's goal.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::put;
use axum::{Json, Router};
use chrono::Utc;

use super::model::{GoalForm, apply_goal};
use crate::backend::Backend;
use crate::error::GoalError;

/// Shared state for goal routes.
#[derive(Clone)]
pub struct GoalRouteState {
    pub backend: Arc<dyn Backend>,
}

/// PUT /api/goal
///
/// Saves the goal, or deletes it when the description is blank.
async fn put_goal(State(state): State<GoalRouteState>, Json(form): Json<GoalForm>) -> Response {
    let today = Utc::now().date_naive();
    match apply_goal(state.backend.as_ref(), &form, today).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            let status = match &e {
                GoalError::DescriptionTooLong { .. } | GoalError::TargetDateInPast(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                GoalError::Backend(_) => {
                    tracing::warn!("Goal update failed: {}", e);
                    StatusCode::BAD_GATEWAY
                }
            };
            (status, Json(serde_json::json!({ "error": e.to_string() }))).into_response()
        }
    }
}

/// Build the goal REST routes.
pub fn goal_routes(state: GoalRouteState) -> Router {
    Router::new()
        .route("/api/goal", put(put_goal))
        .with_state(state)
}
