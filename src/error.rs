//! Error types for the training planner.

use crate::onboarding::OnboardingStep;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Onboarding error: {0}")]
    Onboarding(#[from] OnboardingError),

    #[error("Goal error: {0}")]
    Goal(#[from] GoalError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// A single request to the persistence backend failed.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("Request failed: {reason}")]
    Transport { reason: String },

    #[error("Backend responded with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response is missing the `data` payload")]
    MissingData,

    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl BackendError {
    /// HTTP status returned by the backend, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                body: e.to_string(),
            },
            None if e.is_decode() => Self::Decode(e.to_string()),
            None => Self::Transport {
                reason: e.to_string(),
            },
        }
    }
}

/// Aggregated failure of an onboarding batch submission.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Workout {step} of {total} was not saved: {source}")]
    Rejected {
        /// 1-based position of the first failed workout.
        step: usize,
        total: usize,
        #[source]
        source: BackendError,
    },

    #[error("Nothing to submit")]
    EmptyBatch,
}

impl SubmissionError {
    /// 1-based index of the workout that failed, if any.
    pub fn step(&self) -> Option<usize> {
        match self {
            Self::Rejected { step, .. } => Some(*step),
            Self::EmptyBatch => None,
        }
    }

    /// HTTP status of the failed request, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { source, .. } => source.status(),
            Self::EmptyBatch => None,
        }
    }
}

/// Onboarding wizard errors. Field validation failures are not errors; they
/// are reported as a step outcome.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("Onboarding session {0} not found")]
    SessionNotFound(uuid::Uuid),

    #[error("Workouts are already being submitted")]
    AlreadySubmitting,

    #[error("Onboarding is already complete")]
    AlreadyCompleted,

    #[error("Cannot transition from {from} to {to}")]
    InvalidTransition {
        from: OnboardingStep,
        to: OnboardingStep,
    },

    #[error("Could not save your workouts: {0}")]
    Submission(#[from] SubmissionError),
}

/// Goal management errors.
#[derive(Debug, thiserror::Error)]
pub enum GoalError {
    #[error("Goal description is too long: {length} > {max} characters")]
    DescriptionTooLong { length: usize, max: usize },

    #[error("Goal target date {0} is in the past")]
    TargetDateInPast(chrono::NaiveDate),

    #[error("Could not save goal: {0}")]
    Backend(#[from] BackendError),
}

/// Result type alias for the planner.
pub type Result<T> = std::result::Result<T, Error>;
