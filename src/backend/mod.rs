//! Persistence backend access: the `Backend` trait, its HTTP client, and
//! batch submission of onboarding workouts.

pub mod client;
pub mod submission;
pub mod traits;

pub use client::BackendClient;
pub use submission::{BatchReceipt, PendingWorkout, submit_batch};
pub use traits::{Backend, Conditional};
