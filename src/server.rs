//! HTTP surface: the feature routers merged behind one CORS layer.

use std::sync::Arc;

use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;

use crate::backend::Backend;
use crate::goals::{GoalRouteState, goal_routes};
use crate::onboarding::{OnboardingFlow, OnboardingRouteState, onboarding_routes};
use crate::training_types::{TrainingTypeCatalog, TrainingTypeRouteState, training_type_routes};

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "training-planner"
    }))
}

/// Build the full application router on top of one backend.
pub fn app_router(backend: Arc<dyn Backend>, onboarding_redirect: impl Into<String>) -> Router {
    let flow = Arc::new(OnboardingFlow::new(Arc::clone(&backend), onboarding_redirect));
    app_router_with_flow(backend, flow)
}

/// Build the router around an existing onboarding flow, e.g. one that also
/// has a session expiry task running.
pub fn app_router_with_flow(backend: Arc<dyn Backend>, flow: Arc<OnboardingFlow>) -> Router {
    let catalog = Arc::new(TrainingTypeCatalog::new(Arc::clone(&backend)));

    Router::new()
        .route("/health", get(health))
        .merge(onboarding_routes(OnboardingRouteState { flow }))
        .merge(goal_routes(GoalRouteState { backend }))
        .merge(training_type_routes(TrainingTypeRouteState { catalog }))
        .layer(CorsLayer::permissive())
}
