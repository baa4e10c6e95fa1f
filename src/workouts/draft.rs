//! User-entered workout form data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::duration::DurationInput;

/// One workout as typed into the onboarding form, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkoutEntryDraft {
    /// Distance in kilometres, decimal text.
    pub distance_km: String,
    pub duration: DurationInput,
    /// Average heart rate in bpm, integer text.
    pub avg_hr: String,
    /// Completion date, no time component.
    pub completed_at: Option<NaiveDate>,
}

/// The form fields that can carry a validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutField {
    Distance,
    Duration,
    AvgHr,
    CompletedAt,
}

impl WorkoutField {
    pub const ALL: [WorkoutField; 4] = [
        Self::Distance,
        Self::Duration,
        Self::AvgHr,
        Self::CompletedAt,
    ];
}

impl std::fmt::Display for WorkoutField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Distance => "distance",
            Self::Duration => "duration",
            Self::AvgHr => "avg_hr",
            Self::CompletedAt => "completed_at",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WorkoutField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.to_string() == s)
            .ok_or_else(|| format!("Unknown workout field: {s}"))
    }
}
