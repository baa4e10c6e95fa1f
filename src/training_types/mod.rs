//! Training types, served with ETag revalidation.

pub mod catalog;
pub mod routes;

pub use catalog::{CachedListing, TrainingType, TrainingTypeCatalog, etag_matches};
pub use routes::{TrainingTypeRouteState, training_type_routes};
