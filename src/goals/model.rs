//! The user's single training goal and the upsert-or-delete rule.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::backend::Backend;
use crate::error::GoalError;

/// Longest accepted goal description, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Goal form as submitted by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GoalForm {
    pub description: String,
    pub target_date: Option<NaiveDate>,
}

/// Body of the backend's goal upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCommand {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
}

/// What to do with the stored goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalAction {
    Upsert(GoalCommand),
    Delete,
}

/// Result of applying a goal form.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GoalOutcome {
    Saved { goal: serde_json::Value },
    Deleted,
}

/// An empty description clears the goal; anything else replaces it.
pub fn decide_goal_action(form: &GoalForm, today: NaiveDate) -> Result<GoalAction, GoalError> {
    let description = form.description.trim();
    if description.is_empty() {
        return Ok(GoalAction::Delete);
    }

    let length = description.chars().count();
    if length > MAX_DESCRIPTION_CHARS {
        return Err(GoalError::DescriptionTooLong {
            length,
            max: MAX_DESCRIPTION_CHARS,
        });
    }

    if let Some(date) = form.target_date {
        if date < today {
            return Err(GoalError::TargetDateInPast(date));
        }
    }

    Ok(GoalAction::Upsert(GoalCommand {
        description: description.to_string(),
        target_date: form.target_date,
    }))
}

/// Decide and carry out the goal change against the backend.
pub async fn apply_goal(
    backend: &dyn Backend,
    form: &GoalForm,
    today: NaiveDate,
) -> Result<GoalOutcome, GoalError> {
    match decide_goal_action(form, today)? {
        GoalAction::Upsert(command) => {
            let goal = backend.upsert_goal(&command).await?;
            info!(target_date = ?command.target_date, "Goal saved");
            Ok(GoalOutcome::Saved { goal })
        }
        GoalAction::Delete => {
            backend.delete_goal().await?;
            info!("Goal deleted");
            Ok(GoalOutcome::Deleted)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::*;
    use crate::backend::Conditional;
    use crate::error::BackendError;
    use crate::training_types::TrainingType;
    use crate::workouts::WorkoutPersistCommand;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
    }

    fn form(description: &str, target_date: Option<NaiveDate>) -> GoalForm {
        GoalForm {
            description: description.to_string(),
            target_date,
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        upserts: Mutex<Vec<GoalCommand>>,
        deletes: Mutex<usize>,
    }

    #[async_trait]
    impl Backend for RecordingBackend {
        async fn create_workout(
            &self,
            _command: &WorkoutPersistCommand,
            _idempotency_key: Uuid,
        ) -> Result<serde_json::Value, BackendError> {
            unimplemented!("not used in goal tests")
        }

        async fn upsert_goal(&self, goal: &GoalCommand) -> Result<serde_json::Value, BackendError> {
            self.upserts.lock().unwrap().push(goal.clone());
            Ok(serde_json::json!({"id": 1, "description": goal.description}))
        }

        async fn delete_goal(&self) -> Result<(), BackendError> {
            *self.deletes.lock().unwrap() += 1;
            Ok(())
        }

        async fn list_training_types(
            &self,
            _etag: Option<&str>,
        ) -> Result<Conditional<Vec<TrainingType>>, BackendError> {
            unimplemented!("not used in goal tests")
        }
    }

    #[test]
    fn blank_description_deletes() {
        assert_eq!(decide_goal_action(&form("", None), today()).unwrap(), GoalAction::Delete);
        assert_eq!(
            decide_goal_action(&form("   ", NaiveDate::from_ymd_opt(2020, 1, 1)), today()).unwrap(),
            GoalAction::Delete
        );
    }

    #[test]
    fn description_upserts_trimmed() {
        let target = NaiveDate::from_ymd_opt(2025, 4, 21);
        let action = decide_goal_action(&form("  Sub-3 marathon ", target), today()).unwrap();
        assert_eq!(
            action,
            GoalAction::Upsert(GoalCommand {
                description: "Sub-3 marathon".to_string(),
                target_date: target,
            })
        );
    }

    #[test]
    fn target_date_today_is_allowed_past_is_not() {
        assert!(decide_goal_action(&form("10k PB", Some(today())), today()).is_ok());

        let yesterday = today().pred_opt().unwrap();
        let err = decide_goal_action(&form("10k PB", Some(yesterday)), today()).unwrap_err();
        assert!(matches!(err, GoalError::TargetDateInPast(d) if d == yesterday));
    }

    #[test]
    fn overlong_description_is_rejected() {
        let long = "x".repeat(MAX_DESCRIPTION_CHARS + 1);
        let err = decide_goal_action(&form(&long, None), today()).unwrap_err();
        assert!(matches!(err, GoalError::DescriptionTooLong { length: 201, max: 200 }));

        let exact = "x".repeat(MAX_DESCRIPTION_CHARS);
        assert!(decide_goal_action(&form(&exact, None), today()).is_ok());
    }

    #[tokio::test]
    async fn apply_goal_calls_the_matching_backend_operation() {
        let backend = RecordingBackend::default();

        let saved = apply_goal(&backend, &form("Half marathon", None), today())
            .await
            .unwrap();
        assert!(matches!(saved, GoalOutcome::Saved { .. }));
        assert_eq!(backend.upserts.lock().unwrap().len(), 1);

        let deleted = apply_goal(&backend, &form("", None), today()).await.unwrap();
        assert_eq!(deleted, GoalOutcome::Deleted);
        assert_eq!(*backend.deletes.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn invalid_goal_makes_no_backend_call() {
        let backend = RecordingBackend::default();
        let yesterday = today().pred_opt();

        assert!(apply_goal(&backend, &form("5k", yesterday), today()).await.is_err());
        assert!(backend.upserts.lock().unwrap().is_empty());
        assert_eq!(*backend.deletes.lock().unwrap(), 0);
    }

    #[test]
    fn outcome_serializes_with_action_tag() {
        let json = serde_json::to_value(GoalOutcome::Deleted).unwrap();
        assert_eq!(json, serde_json::json!({"action": "deleted"}));
    }
}
