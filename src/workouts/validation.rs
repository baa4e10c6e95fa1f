//! Workout form validation.
//!
//! Every rule runs on every attempt, so a form with four bad fields gets
//! four messages at once. Validation is a pure function of the draft and
//! the date treated as "today".

use std::str::FromStr;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};

use super::draft::{WorkoutEntryDraft, WorkoutField};

/// Shortest accepted distance, in kilometres.
pub const MIN_DISTANCE_KM: Decimal = dec!(0.1);
/// Shortest accepted duration, in seconds.
pub const MIN_DURATION_SECS: u64 = 60;
/// Inclusive heart-rate bounds, in bpm.
pub const MIN_AVG_HR: u16 = 40;
pub const MAX_AVG_HR: u16 = 220;

/// Why a single field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    DistanceTooSmall,
    DurationTooShort,
    HeartRateOutOfRange,
    DateRequired,
    DateInFuture,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::DistanceTooSmall => "Distance must be at least 0.1 km",
            Self::DurationTooShort => "Duration must be at least 1 minute",
            Self::HeartRateOutOfRange => "Average heart rate must be between 40 and 220 bpm",
            Self::DateRequired => "Date is required",
            Self::DateInFuture => "Date must be in the past",
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for FieldError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// One optional error slot per form field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_hr: Option<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<FieldError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.distance.is_none()
            && self.duration.is_none()
            && self.avg_hr.is_none()
            && self.completed_at.is_none()
    }

    pub fn get(&self, field: WorkoutField) -> Option<FieldError> {
        match field {
            WorkoutField::Distance => self.distance,
            WorkoutField::Duration => self.duration,
            WorkoutField::AvgHr => self.avg_hr,
            WorkoutField::CompletedAt => self.completed_at,
        }
    }

    /// Drop the error for one field, e.g. as soon as the user edits it.
    pub fn clear(&mut self, field: WorkoutField) {
        match field {
            WorkoutField::Distance => self.distance = None,
            WorkoutField::Duration => self.duration = None,
            WorkoutField::AvgHr => self.avg_hr = None,
            WorkoutField::CompletedAt => self.completed_at = None,
        }
    }

    pub fn len(&self) -> usize {
        WorkoutField::ALL
            .into_iter()
            .filter(|f| self.get(*f).is_some())
            .count()
    }
}

/// A draft that passed every rule, with its values already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWorkout {
    distance_km: Decimal,
    distance_m: u64,
    duration_secs: u64,
    avg_hr_bpm: u16,
    completed_on: NaiveDate,
}

impl ValidatedWorkout {
    pub fn distance_km(&self) -> Decimal {
        self.distance_km
    }

    /// Distance in whole metres, rounded half to even.
    pub fn distance_m(&self) -> u64 {
        self.distance_m
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn avg_hr_bpm(&self) -> u16 {
        self.avg_hr_bpm
    }

    pub fn completed_on(&self) -> NaiveDate {
        self.completed_on
    }
}

/// Validate against the current UTC date.
pub fn validate_workout(draft: &WorkoutEntryDraft) -> Result<ValidatedWorkout, FieldErrors> {
    validate_workout_on(draft, Utc::now().date_naive())
}

/// Validate a draft, treating `today` as the latest acceptable completion date.
pub fn validate_workout_on(
    draft: &WorkoutEntryDraft,
    today: NaiveDate,
) -> Result<ValidatedWorkout, FieldErrors> {
    let distance = check_distance(&draft.distance_km);
    let duration = check_duration(draft);
    let avg_hr = check_avg_hr(&draft.avg_hr);
    let completed_at = check_completed_at(draft.completed_at, today);

    match (distance, duration, avg_hr, completed_at) {
        (Ok((distance_km, distance_m)), Ok(duration_secs), Ok(avg_hr_bpm), Ok(completed_on)) => {
            Ok(ValidatedWorkout {
                distance_km,
                distance_m,
                duration_secs,
                avg_hr_bpm,
                completed_on,
            })
        }
        (distance, duration, avg_hr, completed_at) => Err(FieldErrors {
            distance: distance.err(),
            duration: duration.err(),
            avg_hr: avg_hr.err(),
            completed_at: completed_at.err(),
        }),
    }
}

/// Parse kilometres and convert to whole metres. A distance with no metre
/// representation is rejected like any other unusable input.
fn check_distance(raw: &str) -> Result<(Decimal, u64), FieldError> {
    let km = Decimal::from_str(raw.trim()).map_err(|_| FieldError::DistanceTooSmall)?;
    if km < MIN_DISTANCE_KM {
        return Err(FieldError::DistanceTooSmall);
    }
    let metres = km
        .checked_mul(Decimal::ONE_THOUSAND)
        .and_then(|m| m.round().to_u64())
        .ok_or(FieldError::DistanceTooSmall)?;
    Ok((km, metres))
}

fn check_duration(draft: &WorkoutEntryDraft) -> Result<u64, FieldError> {
    match draft.duration.total_seconds() {
        Some(total) if total >= MIN_DURATION_SECS => Ok(total),
        _ => Err(FieldError::DurationTooShort),
    }
}

fn check_avg_hr(raw: &str) -> Result<u16, FieldError> {
    let bpm: u16 = raw
        .trim()
        .parse()
        .map_err(|_| FieldError::HeartRateOutOfRange)?;
    if !(MIN_AVG_HR..=MAX_AVG_HR).contains(&bpm) {
        return Err(FieldError::HeartRateOutOfRange);
    }
    Ok(bpm)
}

fn check_completed_at(date: Option<NaiveDate>, today: NaiveDate) -> Result<NaiveDate, FieldError> {
    let date = date.ok_or(FieldError::DateRequired)?;
    if date > today {
        return Err(FieldError::DateInFuture);
    }
    Ok(date)
}
