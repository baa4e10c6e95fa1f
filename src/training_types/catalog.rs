//! Training-type listing cached with its entity tag.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::backend::{Backend, Conditional};
use crate::error::BackendError;

/// A kind of training session, e.g. easy run or intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingType {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The listing plus the tag the backend gave it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedListing {
    pub etag: Option<String>,
    pub types: Vec<TrainingType>,
}

/// Keeps the last listing and revalidates it with a conditional GET on
/// every read.
pub struct TrainingTypeCatalog {
    backend: Arc<dyn Backend>,
    cached: RwLock<Option<CachedListing>>,
}

impl TrainingTypeCatalog {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            cached: RwLock::new(None),
        }
    }

    /// The current listing, fetched or revalidated against the backend.
    pub async fn current(&self) -> Result<CachedListing, BackendError> {
        let cached = self.cached.read().await.clone();
        let etag = cached.as_ref().and_then(|c| c.etag.clone());

        match self.backend.list_training_types(etag.as_deref()).await? {
            Conditional::NotModified => match cached {
                Some(listing) => {
                    debug!(etag = ?listing.etag, "Training types revalidated");
                    Ok(listing)
                }
                // 304 without having sent a tag; nothing to fall back on.
                None => Err(BackendError::MissingData),
            },
            Conditional::Modified { etag, value } => {
                debug!(etag = ?etag, count = value.len(), "Training types refreshed");
                let listing = CachedListing { etag, types: value };
                *self.cached.write().await = Some(listing.clone());
                Ok(listing)
            }
        }
    }
}

/// Whether an `If-None-Match` header value matches `etag`, using weak
/// comparison.
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    fn opaque(tag: &str) -> &str {
        tag.trim().trim_start_matches("W/")
    }

    if_none_match
        .split(',')
        .map(str::trim)
        .any(|candidate| candidate == "*" || opaque(candidate) == opaque(etag))
}
