//! OnboardingFlow — owns live wizard sessions, drives submission, and
//! decides where the user goes when onboarding is finished.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use super::session::{OnboardingSession, SessionSnapshot, StepOutcome};
use crate::backend::{Backend, submit_batch};
use crate::error::OnboardingError;
use crate::workouts::{WorkoutEntryDraft, WorkoutField};

/// What the caller should show after a workout form is submitted.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// The form was accepted; show the next step.
    Step(SessionSnapshot),
    /// The form was rejected; show the same step with field errors.
    Invalid(SessionSnapshot),
    /// Every workout was saved; navigate to this URL.
    Redirect(String),
}

/// Coordinates onboarding sessions against the backend.
///
/// Each session sits behind its own mutex. The lock is released while a
/// batch is in flight, so a second submit sees `Submitting` and is turned
/// away instead of waiting.
pub struct OnboardingFlow {
    backend: Arc<dyn Backend>,
    redirect_to: String,
    sessions: RwLock<HashMap<Uuid, Arc<Mutex<OnboardingSession>>>>,
}

impl OnboardingFlow {
    pub fn new(backend: Arc<dyn Backend>, redirect_to: impl Into<String>) -> Self {
        Self {
            backend,
            redirect_to: redirect_to.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Start a new wizard session.
    pub async fn start(&self) -> SessionSnapshot {
        let session = OnboardingSession::new();
        let snapshot = session.snapshot();
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::new(Mutex::new(session)));
        info!(session_id = %snapshot.session_id, "Onboarding session started");
        snapshot
    }

    async fn session(&self, id: Uuid) -> Result<Arc<Mutex<OnboardingSession>>, OnboardingError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(OnboardingError::SessionNotFound(id))
    }

    pub async fn snapshot(&self, id: Uuid) -> Result<SessionSnapshot, OnboardingError> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        Ok(guard.snapshot())
    }

    /// Drop a session, e.g. when the user navigates away. Requests already
    /// in flight are left to finish on their own.
    pub async fn abandon(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Onboarding session abandoned");
        }
        removed
    }

    pub async fn clear_field_error(
        &self,
        id: Uuid,
        field: WorkoutField,
    ) -> Result<SessionSnapshot, OnboardingError> {
        let session = self.session(id).await?;
        let mut guard = session.lock().await;
        guard.touch();
        guard.clear_field_error(field);
        Ok(guard.snapshot())
    }

    /// Submit the current step's form, judging dates against today (UTC).
    pub async fn submit_workout(
        &self,
        id: Uuid,
        draft: &WorkoutEntryDraft,
    ) -> Result<FlowOutcome, OnboardingError> {
        self.submit_workout_on(id, draft, Utc::now().date_naive())
            .await
    }

    pub async fn submit_workout_on(
        &self,
        id: Uuid,
        draft: &WorkoutEntryDraft,
        today: NaiveDate,
    ) -> Result<FlowOutcome, OnboardingError> {
        let session = self.session(id).await?;

        let batch = {
            let mut guard = session.lock().await;
            guard.touch();
            match guard.record_workout(draft, today)? {
                StepOutcome::Invalid(_) => return Ok(FlowOutcome::Invalid(guard.snapshot())),
                StepOutcome::Advanced(_) => return Ok(FlowOutcome::Step(guard.snapshot())),
                StepOutcome::ReadyToSubmit(batch) => batch,
            }
        };

        let result = submit_batch(self.backend.as_ref(), &batch).await;

        let mut guard = session.lock().await;
        guard.touch();
        match guard.finish_submission(result) {
            Ok(receipt) => {
                drop(guard);
                self.sessions.write().await.remove(&id);
                info!(
                    session_id = %id,
                    workouts = receipt.workouts.len(),
                    redirect_to = %self.redirect_to,
                    "Onboarding finished, redirecting"
                );
                Ok(FlowOutcome::Redirect(self.redirect_to.clone()))
            }
            Err(e) => {
                debug!(session_id = %id, "Onboarding back on last step after failed submission");
                Err(e)
            }
        }
    }

    /// Drop sessions idle for at least `max_idle`. Covers users who leave
    /// without abandoning. Returns the number of sessions dropped.
    pub async fn expire_idle(&self, max_idle: chrono::Duration) -> usize {
        self.expire_idle_at(Utc::now(), max_idle).await
    }

    pub async fn expire_idle_at(&self, now: DateTime<Utc>, max_idle: chrono::Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();

        // A session locked right now is in use.
        sessions.retain(|id, session| match session.try_lock() {
            Ok(guard) if guard.is_idle(now, max_idle) => {
                debug!(session_id = %id, "Onboarding session expired");
                false
            }
            _ => true,
        });

        let expired = before - sessions.len();
        if expired > 0 {
            info!(expired, remaining = sessions.len(), "Expired idle onboarding sessions");
        }
        expired
    }
}

/// Spawn a background task that periodically drops idle onboarding sessions.
pub fn spawn_session_expiry(
    flow: Arc<OnboardingFlow>,
    max_idle: chrono::Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(60));
        loop {
            interval.tick().await;
            flow.expire_idle(max_idle).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::backend::Conditional;
    use crate::error::BackendError;
    use crate::goals::GoalCommand;
    use crate::onboarding::OnboardingStep;
    use crate::training_types::TrainingType;
    use crate::workouts::{DurationInput, WorkoutPersistCommand};

    /// Backend that accepts workouts until `fail_from` calls have been made.
    struct StubBackend {
        calls: AtomicUsize,
        fail_from: usize,
        gate: Option<Arc<Semaphore>>,
    }

    impl StubBackend {
        fn accepting() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_from: usize::MAX,
                gate: None,
            }
        }

        fn failing_after(n: usize) -> Self {
            Self {
                fail_from: n,
                ..Self::accepting()
            }
        }
    }

    #[async_trait]
    impl Backend for StubBackend {
        async fn create_workout(
            &self,
            command: &WorkoutPersistCommand,
            _idempotency_key: Uuid,
        ) -> Result<serde_json::Value, BackendError> {
            if let Some(gate) = &self.gate {
                gate.acquire().await.unwrap().forget();
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n >= self.fail_from {
                return Err(BackendError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(serde_json::json!({"id": n, "distance_m": command.distance_m}))
        }

        async fn upsert_goal(&self, _goal: &GoalCommand) -> Result<serde_json::Value, BackendError> {
            unimplemented!("not used in onboarding tests")
        }

        async fn delete_goal(&self) -> Result<(), BackendError> {
            unimplemented!("not used in onboarding tests")
        }

        async fn list_training_types(
            &self,
            _etag: Option<&str>,
        ) -> Result<Conditional<Vec<TrainingType>>, BackendError> {
            unimplemented!("not used in onboarding tests")
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 11, 15).unwrap()
    }

    fn draft(km: &str) -> WorkoutEntryDraft {
        WorkoutEntryDraft {
            distance_km: km.to_string(),
            duration: DurationInput::from_parts(0, 30, 15),
            avg_hr: "145".to_string(),
            completed_at: NaiveDate::from_ymd_opt(2024, 11, 10),
        }
    }

    #[tokio::test]
    async fn three_valid_workouts_redirect_exactly_once() {
        let backend = Arc::new(StubBackend::accepting());
        let flow = OnboardingFlow::new(backend.clone(), "/calendar");
        assert_eq!(flow.redirect_to(), "/calendar");
        let id = flow.start().await.session_id;

        let mut redirects = Vec::new();
        let mut steps = Vec::new();
        for km in ["5", "6", "7"] {
            match flow.submit_workout_on(id, &draft(km), today()).await.unwrap() {
                FlowOutcome::Step(snap) => steps.push(snap.current_step),
                FlowOutcome::Redirect(url) => redirects.push(url),
                FlowOutcome::Invalid(snap) => panic!("unexpected errors: {:?}", snap.errors),
            }
        }

        assert_eq!(steps, vec![2, 3]);
        assert_eq!(redirects, vec!["/calendar".to_string()]);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 3);

        // The session is gone after the redirect.
        assert_eq!(flow.session_count().await, 0);
        assert!(matches!(
            flow.submit_workout_on(id, &draft("8"), today()).await,
            Err(OnboardingError::SessionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn no_network_call_before_the_last_step() {
        let backend = Arc::new(StubBackend::accepting());
        let flow = OnboardingFlow::new(backend.clone(), "/calendar");
        let id = flow.start().await.session_id;

        flow.submit_workout_on(id, &draft("5"), today()).await.unwrap();
        flow.submit_workout_on(id, &draft("6"), today()).await.unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_submission_stays_on_step_three_without_redirect() {
        let backend = Arc::new(StubBackend::failing_after(2));
        let flow = OnboardingFlow::new(backend, "/calendar");
        let id = flow.start().await.session_id;

        flow.submit_workout_on(id, &draft("5"), today()).await.unwrap();
        flow.submit_workout_on(id, &draft("6"), today()).await.unwrap();
        let err = flow
            .submit_workout_on(id, &draft("7"), today())
            .await
            .unwrap_err();

        assert!(matches!(err, OnboardingError::Submission(_)));
        let snap = flow.snapshot(id).await.unwrap();
        assert_eq!(snap.current_step, 3);
        assert_eq!(snap.step, OnboardingStep::Step3);
        assert!(!snap.is_submitting);
        assert!(snap.last_error.is_some());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn failed_submission_warns_once() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let flow = OnboardingFlow::new(Arc::new(StubBackend::failing_after(2)), "/calendar");
        let id = flow.start().await.session_id;
        flow.submit_workout_on(id, &draft("5"), today()).await.unwrap();
        flow.submit_workout_on(id, &draft("6"), today()).await.unwrap();
        assert!(flow.submit_workout_on(id, &draft("7"), today()).await.is_err());

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let warnings: Vec<_> = output.lines().filter(|l| l.contains("WARN")).collect();
        assert_eq!(warnings.len(), 1, "{output}");
        assert!(warnings[0].contains("Workout batch rejected"));
        assert!(output.contains(&id.to_string()));
    }

    #[tokio::test]
    async fn invalid_form_returns_errors_and_keeps_step() {
        let flow = OnboardingFlow::new(Arc::new(StubBackend::accepting()), "/calendar");
        let id = flow.start().await.session_id;

        let outcome = flow
            .submit_workout_on(id, &WorkoutEntryDraft::default(), today())
            .await
            .unwrap();
        let snap = match outcome {
            FlowOutcome::Invalid(snap) => snap,
            other => panic!("Expected Invalid, got {other:?}"),
        };
        assert_eq!(snap.current_step, 1);
        assert_eq!(snap.errors.len(), 4);

        let snap = flow
            .clear_field_error(id, WorkoutField::AvgHr)
            .await
            .unwrap();
        assert!(snap.errors.avg_hr.is_none());
        assert_eq!(snap.errors.len(), 3);
    }

    #[tokio::test]
    async fn concurrent_submit_is_rejected_while_in_flight() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Arc::new(StubBackend {
            gate: Some(gate.clone()),
            ..StubBackend::accepting()
        });
        let flow = Arc::new(OnboardingFlow::new(backend, "/calendar"));
        let id = flow.start().await.session_id;

        flow.submit_workout_on(id, &draft("5"), today()).await.unwrap();
        flow.submit_workout_on(id, &draft("6"), today()).await.unwrap();

        let in_flight = {
            let flow = Arc::clone(&flow);
            tokio::spawn(async move { flow.submit_workout_on(id, &draft("7"), today()).await })
        };

        // Wait until the batch is in flight.
        while !flow.snapshot(id).await.unwrap().is_submitting {
            tokio::task::yield_now().await;
        }

        let second = flow.submit_workout_on(id, &draft("7"), today()).await;
        assert!(matches!(second, Err(OnboardingError::AlreadySubmitting)));

        // Release all three stub requests.
        gate.add_permits(3);
        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, FlowOutcome::Redirect(_)));
    }

    #[tokio::test]
    async fn idle_sessions_expire_and_active_ones_stay() {
        let flow = OnboardingFlow::new(Arc::new(StubBackend::accepting()), "/calendar");
        let max_idle = chrono::Duration::minutes(30);
        let stale = flow.start().await.session_id;
        let fresh = flow.start().await.session_id;

        assert_eq!(flow.expire_idle(max_idle).await, 0);
        assert_eq!(flow.session_count().await, 2);

        let an_hour_ago = Utc::now() - chrono::Duration::hours(1);
        flow.session(stale).await.unwrap().lock().await.touch_at(an_hour_ago);
        flow.session(fresh).await.unwrap().lock().await.touch_at(an_hour_ago);
        // Any request counts as activity.
        flow.submit_workout_on(fresh, &draft("5"), today()).await.unwrap();

        assert_eq!(flow.expire_idle(max_idle).await, 1);
        assert_eq!(flow.session_count().await, 1);
        assert!(matches!(
            flow.snapshot(stale).await,
            Err(OnboardingError::SessionNotFound(_))
        ));
        assert_eq!(flow.snapshot(fresh).await.unwrap().current_step, 2);
    }

    #[tokio::test]
    async fn in_flight_sessions_survive_expiry() {
        let gate = Arc::new(Semaphore::new(0));
        let backend = Arc::new(StubBackend {
            gate: Some(gate.clone()),
            ..StubBackend::accepting()
        });
        let flow = Arc::new(OnboardingFlow::new(backend, "/calendar"));
        let id = flow.start().await.session_id;
        flow.submit_workout_on(id, &draft("5"), today()).await.unwrap();
        flow.submit_workout_on(id, &draft("6"), today()).await.unwrap();

        let in_flight = {
            let flow = Arc::clone(&flow);
            tokio::spawn(async move { flow.submit_workout_on(id, &draft("7"), today()).await })
        };
        while !flow.snapshot(id).await.unwrap().is_submitting {
            tokio::task::yield_now().await;
        }

        let far_future = Utc::now() + chrono::Duration::days(1);
        assert_eq!(flow.expire_idle_at(far_future, chrono::Duration::minutes(30)).await, 0);

        gate.add_permits(3);
        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, FlowOutcome::Redirect(_)));
    }

    #[tokio::test]
    async fn abandon_removes_session() {
        let flow = OnboardingFlow::new(Arc::new(StubBackend::accepting()), "/calendar");
        let id = flow.start().await.session_id;

        assert!(flow.abandon(id).await);
        assert!(!flow.abandon(id).await);
        assert!(matches!(
            flow.snapshot(id).await,
            Err(OnboardingError::SessionNotFound(_))
        ));
    }
}
