//! HTTP client for the managed REST backend.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};
use uuid::Uuid;

use super::traits::{Backend, Conditional};
use crate::config::PlannerConfig;
use crate::error::BackendError;
use crate::goals::GoalCommand;
use crate::training_types::TrainingType;
use crate::workouts::WorkoutPersistCommand;

/// Header carrying the per-workout idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";

/// Backend client. Every request carries the API key both as `apikey`
/// and as a bearer token.
pub struct BackendClient {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &PlannerConfig) -> Self {
        Self::new(config.backend_url.clone(), config.backend_key.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let key = self.api_key.expose_secret();
        self.client
            .request(method, self.url(path))
            .header("apikey", key)
            .bearer_auth(key)
    }
}

/// Fail on non-2xx; otherwise return the parsed JSON body.
async fn read_body(resp: Response) -> Result<serde_json::Value, BackendError> {
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        warn!(status = status.as_u16(), "Backend request failed");
        return Err(BackendError::Status {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
}

/// Pull the non-null `data` payload out of a success body.
fn take_data(mut body: serde_json::Value) -> Result<serde_json::Value, BackendError> {
    match body.get_mut("data").map(serde_json::Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(BackendError::MissingData),
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn create_workout(
        &self,
        command: &WorkoutPersistCommand,
        idempotency_key: Uuid,
    ) -> Result<serde_json::Value, BackendError> {
        debug!(
            idempotency_key = %idempotency_key,
            distance_m = command.distance_m,
            "Creating workout"
        );
        let resp = self
            .request(Method::POST, "workouts")
            .header(IDEMPOTENCY_KEY_HEADER, idempotency_key.to_string())
            .json(command)
            .send()
            .await?;
        take_data(read_body(resp).await?)
    }

    async fn upsert_goal(&self, goal: &GoalCommand) -> Result<serde_json::Value, BackendError> {
        let resp = self.request(Method::PUT, "goal").json(goal).send().await?;
        take_data(read_body(resp).await?)
    }

    async fn delete_goal(&self) -> Result<(), BackendError> {
        let resp = self.request(Method::DELETE, "goal").send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let body = resp.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Goal delete failed");
        Err(BackendError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn list_training_types(
        &self,
        etag: Option<&str>,
    ) -> Result<Conditional<Vec<TrainingType>>, BackendError> {
        let mut request = self.request(Method::GET, "training-types");
        if let Some(tag) = etag {
            request = request.header(header::IF_NONE_MATCH, tag);
        }
        let resp = request.send().await?;

        if resp.status() == StatusCode::NOT_MODIFIED {
            debug!("Training types not modified");
            return Ok(Conditional::NotModified);
        }

        let etag = resp
            .headers()
            .get(header::ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = take_data(read_body(resp).await?)?;
        let value: Vec<TrainingType> =
            serde_json::from_value(data).map_err(|e| BackendError::Decode(e.to_string()))?;

        Ok(Conditional::Modified { etag, value })
    }
}
