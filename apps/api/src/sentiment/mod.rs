//! Sentiment classification core.
//!
//! Classifies freeform text as positive/neutral/negative with a confidence
//! score by calling an external LLM, tolerating the model's loosely
//! structured output, and caching per-text results for the process lifetime.
//!
//! ARCHITECTURAL RULE: the cache is owned exclusively by the classifier.
//! No other module may read or write it.

pub mod gemini;
mod parse;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// The three sentiment classes surfaced to callers. Nothing else ever is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

/// A classification outcome: label plus confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub score: f64,
}

#[derive(Debug, Error)]
pub enum SentimentError {
    /// No provider credential. A normal runtime condition, mapped to a
    /// client-error status by the HTTP layer.
    #[error("no LLM available: set GEMINI_API_KEY in the environment")]
    Unconfigured,

    /// The provider rejected or failed the request. Not retried here.
    #[error("LLM provider returned HTTP {status}")]
    Provider { status: u16 },

    /// Transport failure (DNS, connection reset). Callers treat this the
    /// same as a provider failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider responded but its text contained no parseable JSON.
    #[error("model did not return valid JSON: {excerpt}")]
    MalformedResponse { excerpt: String },
}

/// Seam between the classifier and the LLM provider.
///
/// Returns the model's raw generated text; the classifier owns parsing,
/// normalization, and caching.
#[async_trait::async_trait]
pub trait SentimentProvider: Send + Sync {
    async fn generate(&self, text: &str) -> Result<String, SentimentError>;
}

pub struct SentimentClassifier {
    provider: Arc<dyn SentimentProvider>,
    /// Keyed by trimmed input text. Grows for the life of the process —
    /// no eviction, no TTL, no capacity bound (known limitation).
    cache: RwLock<HashMap<String, SentimentResult>>,
}

impl SentimentClassifier {
    pub fn new(provider: Arc<dyn SentimentProvider>) -> Self {
        Self {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Classifies `text`, consulting the cache first.
    ///
    /// Empty (after trimming) input returns `{neutral, 0.5}` without calling
    /// the provider or touching the cache. Failures propagate to the caller;
    /// a failed classification is never reported as neutral.
    pub async fn classify(&self, text: &str) -> Result<SentimentResult, SentimentError> {
        let input = text.trim();
        if input.is_empty() {
            return Ok(SentimentResult {
                label: SentimentLabel::Neutral,
                score: 0.5,
            });
        }

        if let Some(cached) = self.cache.read().await.get(input) {
            debug!("sentiment cache hit");
            return Ok(*cached);
        }

        // Duplicate concurrent misses each call the provider; the write below
        // is a plain overwrite of an identical value, so no coordination is
        // needed beyond the lock.
        let raw = self.provider.generate(input).await?;

        let parsed =
            parse::extract_json(&raw).ok_or_else(|| SentimentError::MalformedResponse {
                excerpt: parse::excerpt(&raw),
            })?;

        let result = SentimentResult {
            label: parse::normalize_label(parsed.get("label")),
            score: parse::clamp_score(parsed.get("score")),
        };

        self.cache.write().await.insert(input.to_string(), result);
        Ok(result)
    }
}
