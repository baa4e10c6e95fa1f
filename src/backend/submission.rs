//! Sends every accumulated onboarding workout to the backend at once.

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::traits::Backend;
use crate::error::SubmissionError;
use crate::workouts::WorkoutPersistCommand;

/// A workout waiting to be sent, with the key that identifies it to the
/// backend across retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWorkout {
    pub idempotency_key: Uuid,
    pub command: WorkoutPersistCommand,
}

impl PendingWorkout {
    pub fn new(command: WorkoutPersistCommand) -> Self {
        Self {
            idempotency_key: Uuid::new_v4(),
            command,
        }
    }
}

/// Records created by a fully successful batch, in submission order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReceipt {
    pub workouts: Vec<serde_json::Value>,
}

/// Send each workout as an independent create request, concurrently, and
/// wait for all of them to settle.
///
/// Succeeds only if every request succeeds. Otherwise reports the first
/// failure in submission order. Requests that did succeed are not undone.
pub async fn submit_batch(
    backend: &dyn Backend,
    workouts: &[PendingWorkout],
) -> Result<BatchReceipt, SubmissionError> {
    if workouts.is_empty() {
        return Err(SubmissionError::EmptyBatch);
    }

    let total = workouts.len();
    info!(total, "Submitting workout batch");

    let results = join_all(
        workouts
            .iter()
            .map(|w| backend.create_workout(&w.command, w.idempotency_key)),
    )
    .await;

    let failed = results.iter().filter(|r| r.is_err()).count();
    let mut created = Vec::with_capacity(total);
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(record) => created.push(record),
            Err(source) => {
                warn!(
                    step = index + 1,
                    total,
                    failed,
                    error = %source,
                    "Workout batch rejected"
                );
                return Err(SubmissionError::Rejected {
                    step: index + 1,
                    total,
                    source,
                });
            }
        }
    }

    info!(total, "Workout batch accepted");
    Ok(BatchReceipt { workouts: created })
}
