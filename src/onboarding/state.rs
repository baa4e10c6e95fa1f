//! Onboarding state machine — tracks which wizard step the user is on.

use serde::{Deserialize, Serialize};

/// Number of workouts collected before the batch is submitted.
pub const WORKOUTS_PER_ONBOARDING: usize = 3;

/// The states of the onboarding wizard.
///
/// Progresses linearly: Step1 → Step2 → Step3 → Submitting → Done.
/// A failed submission goes back from Submitting to Step3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Step1,
    Step2,
    Step3,
    Submitting,
    Done,
}

impl OnboardingStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: OnboardingStep) -> bool {
        use OnboardingStep::*;
        matches!(
            (self, target),
            (Step1, Step2)
                | (Step2, Step3)
                | (Step3, Submitting)
                | (Submitting, Done)
                | (Submitting, Step3)
        )
    }

    /// Whether this state is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// The next state on the success path, if any.
    pub fn next(&self) -> Option<OnboardingStep> {
        use OnboardingStep::*;
        match self {
            Step1 => Some(Step2),
            Step2 => Some(Step3),
            Step3 => Some(Submitting),
            Submitting => Some(Done),
            Done => None,
        }
    }

    /// The 1-based form step shown to the user. Submitting and Done still
    /// show the last form.
    pub fn number(&self) -> usize {
        match self {
            Self::Step1 => 1,
            Self::Step2 => 2,
            Self::Step3 | Self::Submitting | Self::Done => WORKOUTS_PER_ONBOARDING,
        }
    }

    /// Whether a workout form is currently accepted.
    pub fn accepts_workout(&self) -> bool {
        matches!(self, Self::Step1 | Self::Step2 | Self::Step3)
    }
}

impl Default for OnboardingStep {
    fn default() -> Self {
        Self::Step1
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Step1 => "step1",
            Self::Step2 => "step2",
            Self::Step3 => "step3",
            Self::Submitting => "submitting",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}
