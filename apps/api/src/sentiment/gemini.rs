//! Gemini provider — the single point of entry for all LLM calls.
//!
//! Builds `generateContent` requests and navigates the response envelope.
//! Parsing and normalization of the generated text live in the classifier;
//! this module only transports.

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::sentiment::{SentimentError, SentimentProvider};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default model; override via `GEMINI_MODEL` so a provider-side rename does
/// not require a redeployment.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const SYSTEM_PROMPT: &str = "You are a strict sentiment classifier. \
    Classify the text as exactly one of: POSITIVE, NEUTRAL, NEGATIVE. \
    Respond ONLY with JSON: {\"label\":\"positive|neutral|negative\",\"score\":0..1}. \
    The \"score\" is your confidence for the chosen label.";

/// Path to the generated text inside the response envelope.
const GENERATED_TEXT_POINTER: &str = "/candidates/0/content/parts/0/text";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: Turn<'a>,
    contents: Vec<Turn<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

/// Deterministic, minimal-randomness generation with a JSON response hint.
#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    temperature: f32,
    #[serde(rename = "topP")]
    top_p: f32,
}

/// Client for the Gemini `generateContent` API.
///
/// The API key is optional: its absence is a normal runtime condition checked
/// on every call, never a startup failure.
pub struct GeminiClient {
    client: Client,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            model: model.into(),
            api_key,
        }
    }

    fn request_body<'a>(&self, text: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            system_instruction: Turn {
                role: "system",
                parts: vec![Part {
                    text: SYSTEM_PROMPT,
                }],
            },
            contents: vec![Turn {
                role: "user",
                parts: vec![Part { text }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: 0.0,
                top_p: 0.0,
            },
        }
    }
}

/// Extracts the generated text from the response envelope.
///
/// The envelope shape is provider-specific and not guaranteed stable; any
/// missing path degrades to the empty string rather than an error.
fn generated_text(envelope: &Value) -> &str {
    envelope
        .pointer(GENERATED_TEXT_POINTER)
        .and_then(Value::as_str)
        .unwrap_or("")
}

#[async_trait::async_trait]
impl SentimentProvider for GeminiClient {
    async fn generate(&self, text: &str) -> Result<String, SentimentError> {
        let api_key = self.api_key.as_deref().ok_or(SentimentError::Unconfigured)?;

        let url = format!(
            "{GEMINI_API_BASE}/models/{}:generateContent?key={api_key}",
            self.model
        );

        let response = self
            .client
            .post(&url)
            .json(&self.request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini returned {status}: {body}");
            return Err(SentimentError::Provider {
                status: status.as_u16(),
            });
        }

        let envelope: Value = response.json().await?;
        debug!("Gemini call succeeded (model: {})", self.model);

        Ok(generated_text(&envelope).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_generated_text_happy_path() {
        let envelope = json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"label\":\"positive\"}" }] } }
            ]
        });
        assert_eq!(generated_text(&envelope), "{\"label\":\"positive\"}");
    }

    #[test]
    fn test_generated_text_missing_paths_degrade_to_empty() {
        for envelope in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "content": {} }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": 42 }] } }] }),
            json!("not an object"),
        ] {
            assert_eq!(generated_text(&envelope), "");
        }
    }

    #[test]
    fn test_request_body_shape() {
        let client = GeminiClient::new(None, DEFAULT_MODEL);
        let body = serde_json::to_value(client.request_body("love it")).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "love it");
        assert_eq!(body["systemInstruction"]["role"], "system");
        assert_eq!(
            body["generationConfig"]["response_mime_type"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["temperature"], json!(0.0));
        assert_eq!(body["generationConfig"]["topP"], json!(0.0));
    }
}
