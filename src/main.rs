use std::sync::Arc;

use training_planner::backend::{Backend, BackendClient};
use training_planner::config::PlannerConfig;
use training_planner::onboarding::{OnboardingFlow, spawn_session_expiry};
use training_planner::server::app_router_with_flow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = PlannerConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        eprintln!("  export PLANNER_BACKEND_URL=https://<project>.example.co/rest/v1");
        eprintln!("  export PLANNER_BACKEND_KEY=<anon key>");
        std::process::exit(1);
    });

    eprintln!("🏃 Training Planner v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Backend: {}", config.backend_url);
    eprintln!("   Onboarding redirect: {}", config.onboarding_redirect);
    eprintln!(
        "   Idle sessions expire after: {} min",
        config.session_max_idle.num_minutes()
    );
    eprintln!("   API: http://0.0.0.0:{}/api", config.port);

    let backend: Arc<dyn Backend> = Arc::new(BackendClient::from_config(&config));
    let flow = Arc::new(OnboardingFlow::new(
        Arc::clone(&backend),
        config.onboarding_redirect.clone(),
    ));
    let _expiry = spawn_session_expiry(Arc::clone(&flow), config.session_max_idle);
    let app = app_router_with_flow(backend, flow);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "Training planner listening");
    axum::serve(listener, app).await?;

    Ok(())
}
