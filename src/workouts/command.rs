//! Backend-ready workout records.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::ValidatedWorkout;

/// Training type assigned to every onboarding workout.
pub const DEFAULT_TRAINING_TYPE: &str = "easy_run";
/// Neutral rating on the 1–5 scale.
pub const NEUTRAL_RATING: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutStatus {
    Planned,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Warmup,
    Main,
    Cooldown,
}

/// One segment of a workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutStep {
    pub kind: StepKind,
    pub distance_m: u64,
    pub duration_s: u64,
}

/// The normalized body of a `POST /workouts` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutPersistCommand {
    pub training_type: String,
    pub distance_m: u64,
    pub duration_s: u64,
    pub avg_hr_bpm: u16,
    pub completed_at: DateTime<Utc>,
    pub steps: Vec<WorkoutStep>,
    pub status: WorkoutStatus,
    pub rating: u8,
}

impl From<ValidatedWorkout> for WorkoutPersistCommand {
    fn from(workout: ValidatedWorkout) -> Self {
        Self::from(&workout)
    }
}

impl From<&ValidatedWorkout> for WorkoutPersistCommand {
    fn from(workout: &ValidatedWorkout) -> Self {
        let distance_m = workout.distance_m();
        let duration_s = workout.duration_secs();

        Self {
            training_type: DEFAULT_TRAINING_TYPE.to_string(),
            distance_m,
            duration_s,
            avg_hr_bpm: workout.avg_hr_bpm(),
            completed_at: workout
                .completed_on()
                .and_time(NaiveTime::MIN)
                .and_utc(),
            steps: vec![WorkoutStep {
                kind: StepKind::Main,
                distance_m,
                duration_s,
            }],
            status: WorkoutStatus::Completed,
            rating: NEUTRAL_RATING,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::workouts::draft::WorkoutEntryDraft;
    use crate::workouts::duration::DurationInput;
    use crate::workouts::validation::validate_workout_on;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
    }

    fn command_for(distance_km: &str, duration: DurationInput) -> WorkoutPersistCommand {
        let draft = WorkoutEntryDraft {
            distance_km: distance_km.to_string(),
            duration,
            avg_hr: "145".to_string(),
            completed_at: NaiveDate::from_ymd_opt(2024, 11, 10),
        };
        validate_workout_on(&draft, today()).unwrap().into()
    }

    #[test]
    fn transform_converts_units_and_date() {
        let command = command_for("5.5", DurationInput::from_parts(0, 30, 15));

        assert_eq!(command.distance_m, 5500);
        assert_eq!(command.duration_s, 1815);
        assert_eq!(command.avg_hr_bpm, 145);
        assert_eq!(command.completed_at.to_rfc3339(), "2024-11-10T00:00:00+00:00");
    }

    #[test]
    fn transform_injects_defaults() {
        let command = command_for("10", DurationInput::from_parts(1, 0, 0));

        assert_eq!(command.training_type, DEFAULT_TRAINING_TYPE);
        assert_eq!(command.status, WorkoutStatus::Completed);
        assert_eq!(command.rating, NEUTRAL_RATING);
        assert_eq!(
            command.steps,
            vec![WorkoutStep {
                kind: StepKind::Main,
                distance_m: 10_000,
                duration_s: 3600,
            }]
        );
    }

    #[test]
    fn sub_metre_distances_round() {
        assert_eq!(command_for("0.1", DurationInput::from_parts(0, 1, 0)).distance_m, 100);
        assert_eq!(command_for("1.2345", DurationInput::from_parts(0, 10, 0)).distance_m, 1234);
        assert_eq!(command_for("1.2346", DurationInput::from_parts(0, 10, 0)).distance_m, 1235);
    }

    #[test]
    fn transform_is_deterministic() {
        let a = command_for("21.1", DurationInput::from_parts(1, 45, 3));
        let b = command_for("21.1", DurationInput::from_parts(1, 45, 3));
        assert_eq!(a, b);
    }

    #[test]
    fn serializes_to_backend_shape() {
        let command = command_for("5.5", DurationInput::from_parts(0, 30, 15));
        let json = serde_json::to_value(&command).unwrap();

        assert_eq!(json["training_type"], "easy_run");
        assert_eq!(json["distance_m"], 5500);
        assert_eq!(json["duration_s"], 1815);
        assert_eq!(json["avg_hr_bpm"], 145);
        assert_eq!(json["completed_at"], "2024-11-10T00:00:00Z");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["rating"], 3);
        assert_eq!(json["steps"][0]["kind"], "main");
        assert_eq!(json["steps"][0]["distance_m"], 5500);
    }
}
