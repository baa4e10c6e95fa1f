//! Elapsed-time input as three independent text fields.

use serde::{Deserialize, Serialize};

/// Hours, minutes and seconds exactly as the user typed them.
///
/// The usual 0–23 / 0–59 ranges are UI hints only. Nothing here rejects
/// `minutes = "75"`; only the derived total is validated downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationInput {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl DurationInput {
    pub fn new(hours: impl Into<String>, minutes: impl Into<String>, seconds: impl Into<String>) -> Self {
        Self {
            hours: hours.into(),
            minutes: minutes.into(),
            seconds: seconds.into(),
        }
    }

    /// Build an input from numeric parts.
    pub fn from_parts(hours: u32, minutes: u32, seconds: u32) -> Self {
        Self::new(hours.to_string(), minutes.to_string(), seconds.to_string())
    }

    /// `hours*3600 + minutes*60 + seconds`.
    ///
    /// Blank fields count as zero. Returns `None` when any field is not a
    /// non-negative integer or the total overflows.
    pub fn total_seconds(&self) -> Option<u64> {
        let hours = parse_field(&self.hours)?;
        let minutes = parse_field(&self.minutes)?;
        let seconds = parse_field(&self.seconds)?;

        hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)
    }
}

fn parse_field(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    raw.parse().ok()
}
