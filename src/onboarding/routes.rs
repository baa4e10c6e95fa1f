//! REST endpoints for the onboarding wizard.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use super::flow::{FlowOutcome, OnboardingFlow};
use crate::error::OnboardingError;
use crate::workouts::{WorkoutEntryDraft, WorkoutField};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub flow: Arc<OnboardingFlow>,
}

/// Map an onboarding error to a status code and JSON body.
fn error_response(err: OnboardingError) -> Response {
    let status = match &err {
        OnboardingError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        OnboardingError::AlreadySubmitting
        | OnboardingError::AlreadyCompleted
        | OnboardingError::InvalidTransition { .. } => StatusCode::CONFLICT,
        OnboardingError::Submission(_) => StatusCode::BAD_GATEWAY,
    };

    let mut body = serde_json::json!({ "error": err.to_string() });
    if let OnboardingError::Submission(source) = &err {
        body["failed_step"] = serde_json::json!(source.step());
        body["backend_status"] = serde_json::json!(source.status());
    }

    (status, Json(body)).into_response()
}

/// POST /api/onboarding/sessions
///
/// Starts a wizard session at step 1.
async fn start_session(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let snapshot = state.flow.start().await;
    (StatusCode::CREATED, Json(snapshot))
}

/// GET /api/onboarding/sessions/{id}
async fn get_session(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<Uuid>,
) -> Response {
    match state.flow.snapshot(id).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

/// DELETE /api/onboarding/sessions/{id}
async fn abandon_session(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<Uuid>,
) -> Response {
    if state.flow.abandon(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error_response(OnboardingError::SessionNotFound(id))
    }
}

/// POST /api/onboarding/sessions/{id}/workouts
///
/// Submits the current step's form. Answers 200 with the next step, 422
/// with field errors, or 303 to the destination once every workout is saved.
async fn submit_workout(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<WorkoutEntryDraft>,
) -> Response {
    match state.flow.submit_workout(id, &draft).await {
        Ok(FlowOutcome::Step(snapshot)) => Json(snapshot).into_response(),
        Ok(FlowOutcome::Invalid(snapshot)) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(snapshot)).into_response()
        }
        Ok(FlowOutcome::Redirect(url)) => Redirect::to(&url).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/onboarding/sessions/{id}/fields/{field}/edit
///
/// Clears the error on a field the user started editing.
async fn edit_field(
    State(state): State<OnboardingRouteState>,
    Path((id, field)): Path<(Uuid, String)>,
) -> Response {
    let field: WorkoutField = match field.parse() {
        Ok(field) => field,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response();
        }
    };

    match state.flow.clear_field_error(id, field).await {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => error_response(e),
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/sessions", post(start_session))
        .route(
            "/api/onboarding/sessions/{id}",
            get(get_session).delete(abandon_session),
        )
        .route("/api/onboarding/sessions/{id}/workouts", post(submit_workout))
        .route(
            "/api/onboarding/sessions/{id}/fields/{field}/edit",
            post(edit_field),
        )
        .with_state(state)
}
