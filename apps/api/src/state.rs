use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::sentiment::SentimentClassifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Classifier instance owning the per-process sentiment cache.
    pub classifier: Arc<SentimentClassifier>,
    pub config: Config,
}
