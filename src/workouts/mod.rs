//! Workout form input, validation, and the backend record it turns into.

pub mod command;
pub mod draft;
pub mod duration;
pub mod validation;

pub use command::{StepKind, WorkoutPersistCommand, WorkoutStatus, WorkoutStep};
pub use draft::{WorkoutEntryDraft, WorkoutField};
pub use duration::DurationInput;
pub use validation::{
    FieldError, FieldErrors, ValidatedWorkout, validate_workout, validate_workout_on,
};
