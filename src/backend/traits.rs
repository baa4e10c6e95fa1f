//! `Backend` trait — single async interface to the persistence backend.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::BackendError;
use crate::goals::GoalCommand;
use crate::training_types::TrainingType;
use crate::workouts::WorkoutPersistCommand;

/// Result of a conditional GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional<T> {
    /// The backend answered 304; the caller's cached copy is current.
    NotModified,
    /// Fresh content, with the entity tag to send next time.
    Modified { etag: Option<String>, value: T },
}

/// Operations the planner needs from the managed backend.
#[async_trait]
pub trait Backend: Send + Sync {
    // ── Workouts ────────────────────────────────────────────────────

    /// Create one workout. Returns the created record (the response's
    /// `data` payload).
    ///
    /// `idempotency_key` stays the same when the same workout is resent.
    async fn create_workout(
        &self,
        command: &WorkoutPersistCommand,
        idempotency_key: Uuid,
    ) -> Result<serde_json::Value, BackendError>;

    // ── Goal ────────────────────────────────────────────────────────

    /// Create or replace the user's single goal.
    async fn upsert_goal(&self, goal: &GoalCommand) -> Result<serde_json::Value, BackendError>;

    /// Remove the user's goal. Succeeds when there is none.
    async fn delete_goal(&self) -> Result<(), BackendError>;

    // ── Training types ──────────────────────────────────────────────

    /// List training types, sending `etag` as `If-None-Match` when given.
    async fn list_training_types(
        &self,
        etag: Option<&str>,
    ) -> Result<Conditional<Vec<TrainingType>>, BackendError>;
}
