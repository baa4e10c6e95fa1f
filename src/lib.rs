//! Training Planner — onboarding, goal, and training-type services.

pub mod backend;
pub mod config;
pub mod error;
pub mod goals;
pub mod onboarding;
pub mod server;
pub mod training_types;
pub mod workouts;
