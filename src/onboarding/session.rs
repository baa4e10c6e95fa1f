//! Wizard state for one user, from mount to redirect.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use super::state::{OnboardingStep, WORKOUTS_PER_ONBOARDING};
use crate::backend::{BatchReceipt, PendingWorkout};
use crate::error::{OnboardingError, SubmissionError};
use crate::workouts::{
    FieldErrors, WorkoutEntryDraft, WorkoutField, WorkoutPersistCommand, validate_workout_on,
};

/// What happened to a submitted workout form.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// At least one field failed; nothing was recorded.
    Invalid(FieldErrors),
    /// The workout was recorded and the wizard moved to this step.
    Advanced(OnboardingStep),
    /// The last workout was recorded; this batch must now be submitted and
    /// its result passed to [`OnboardingSession::finish_submission`].
    ReadyToSubmit(Vec<PendingWorkout>),
}

/// State of one onboarding wizard.
///
/// Holds `step.number() - 1` recorded workouts while a form step is open,
/// and all of them while the batch is in flight.
#[derive(Debug, Clone)]
pub struct OnboardingSession {
    id: Uuid,
    step: OnboardingStep,
    workouts: Vec<PendingWorkout>,
    errors: FieldErrors,
    last_error: Option<String>,
    last_touched: DateTime<Utc>,
}

impl Default for OnboardingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl OnboardingSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: OnboardingStep::default(),
            workouts: Vec::with_capacity(WORKOUTS_PER_ONBOARDING),
            errors: FieldErrors::default(),
            last_error: None,
            last_touched: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// 1-based form step currently shown.
    pub fn current_step(&self) -> usize {
        self.step.number()
    }

    pub fn is_submitting(&self) -> bool {
        self.step == OnboardingStep::Submitting
    }

    pub fn is_complete(&self) -> bool {
        self.step.is_terminal()
    }

    pub fn workouts(&self) -> &[PendingWorkout] {
        &self.workouts
    }

    /// Field errors from the most recent attempt, minus any cleared since.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message of the most recent failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// When the user last interacted with this session.
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.last_touched
    }

    pub fn touch(&mut self) {
        self.touch_at(Utc::now());
    }

    pub(crate) fn touch_at(&mut self, at: DateTime<Utc>) {
        self.last_touched = at;
    }

    /// Idle for at least `max_idle` as of `now`. A session with a batch in
    /// flight is never idle.
    pub fn is_idle(&self, now: DateTime<Utc>, max_idle: chrono::Duration) -> bool {
        !self.is_submitting() && now - self.last_touched >= max_idle
    }

    fn transition(&mut self, target: OnboardingStep) -> Result<(), OnboardingError> {
        if !self.step.can_transition_to(target) {
            return Err(OnboardingError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }
        debug!(session_id = %self.id, from = %self.step, to = %target, "Onboarding transition");
        self.step = target;
        Ok(())
    }

    /// Validate the current step's form and record it.
    ///
    /// Rejected while a batch is in flight or after completion.
    pub fn record_workout(
        &mut self,
        draft: &WorkoutEntryDraft,
        today: NaiveDate,
    ) -> Result<StepOutcome, OnboardingError> {
        match self.step {
            OnboardingStep::Submitting => return Err(OnboardingError::AlreadySubmitting),
            OnboardingStep::Done => return Err(OnboardingError::AlreadyCompleted),
            _ => {}
        }

        let validated = match validate_workout_on(draft, today) {
            Ok(validated) => validated,
            Err(errors) => {
                debug!(
                    session_id = %self.id,
                    step = self.current_step(),
                    failed_fields = errors.len(),
                    "Workout form rejected"
                );
                self.errors = errors.clone();
                return Ok(StepOutcome::Invalid(errors));
            }
        };

        debug_assert_eq!(self.workouts.len(), self.current_step() - 1);
        self.errors = FieldErrors::default();
        self.workouts
            .push(PendingWorkout::new(WorkoutPersistCommand::from(validated)));

        let next = match self.step.next() {
            Some(next) => next,
            None => return Err(OnboardingError::AlreadyCompleted),
        };
        self.transition(next)?;

        if next == OnboardingStep::Submitting {
            info!(
                session_id = %self.id,
                workouts = self.workouts.len(),
                "All onboarding workouts recorded"
            );
            Ok(StepOutcome::ReadyToSubmit(self.workouts.clone()))
        } else {
            info!(session_id = %self.id, step = next.number(), "Onboarding step advanced");
            Ok(StepOutcome::Advanced(next))
        }
    }

    /// Apply the result of submitting the batch from
    /// [`StepOutcome::ReadyToSubmit`].
    ///
    /// On failure the wizard returns to the last step and forgets the last
    /// workout, so the user can correct and resend it; the earlier workouts
    /// keep their idempotency keys and are sent again with it.
    pub fn finish_submission(
        &mut self,
        result: Result<BatchReceipt, SubmissionError>,
    ) -> Result<BatchReceipt, OnboardingError> {
        if self.step != OnboardingStep::Submitting {
            let target = if result.is_ok() {
                OnboardingStep::Done
            } else {
                OnboardingStep::Step3
            };
            return Err(OnboardingError::InvalidTransition {
                from: self.step,
                to: target,
            });
        }

        match result {
            Ok(receipt) => {
                self.transition(OnboardingStep::Done)?;
                self.last_error = None;
                info!(session_id = %self.id, "Onboarding complete");
                Ok(receipt)
            }
            Err(err) => {
                self.transition(OnboardingStep::Step3)?;
                self.workouts.pop();
                self.last_error = Some(err.to_string());
                Err(OnboardingError::Submission(err))
            }
        }
    }

    /// Clear one field's error after the user edits it. The field is not
    /// re-validated until the next submit.
    pub fn clear_field_error(&mut self, field: WorkoutField) {
        self.errors.clear(field);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id,
            step: self.step,
            current_step: self.current_step(),
            workouts_recorded: self.workouts.len(),
            is_submitting: self.is_submitting(),
            errors: self.errors.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Serializable view of a session for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub step: OnboardingStep,
    pub current_step: usize,
    pub workouts_recorded: usize,
    pub is_submitting: bool,
    pub errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
