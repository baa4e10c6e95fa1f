//! Onboarding wizard — three workout forms, then one batch submission.
//!
//! The user enters their three most recent workouts, one per step. Nothing
//! is sent to the backend until the third form is accepted; then all three
//! workouts are created concurrently and, once every one is saved, the user
//! is redirected to the configured destination.

pub mod flow;
pub mod routes;
pub mod session;
pub mod state;

pub use flow::{FlowOutcome, OnboardingFlow, spawn_session_expiry};
pub use routes::{OnboardingRouteState, onboarding_routes};
pub use session::{OnboardingSession, SessionSnapshot, StepOutcome};
pub use state::{OnboardingStep, WORKOUTS_PER_ONBOARDING};
