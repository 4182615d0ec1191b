//! Google Gemini translator.
//!
//! Calls the Generative Language `generateContent` endpoint with a JSON
//! response schema so the model answers with a bare feature object.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use sonority_core::model::PartialFeatures;

use super::prompt::SYSTEM_PROMPT;
use super::FeatureTranslator;
use crate::error::{TranslateError, TranslateResult};

const PROVIDER: &str = "Gemini";
const MAX_RETRIES: usize = 3;

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Translator
// ---------------------------------------------------------------------------

/// Translates mood text through a Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiTranslator {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiTranslator {
    /// Create a translator for `model`.
    ///
    /// # Errors
    /// Fails with [`TranslateError::MissingApiKey`] when `api_key` is empty,
    /// or if the HTTP client cannot be built.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> TranslateResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(TranslateError::MissingApiKey { provider: PROVIDER });
        }

        let http = Client::builder()
            .user_agent(concat!("sonority/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            api_key,
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build a translator from the loaded configuration.
    pub fn from_config(config: &crate::Config) -> TranslateResult<Self> {
        let key = config
            .google_api_key
            .clone()
            .ok_or(TranslateError::MissingApiKey { provider: PROVIDER })?;
        Self::new(key, config.model.clone(), config.gemini_base_url.clone())
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    async fn generate(&self, text: &str) -> TranslateResult<PartialFeatures> {
        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Http {
                provider: PROVIDER,
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

#[async_trait]
impl FeatureTranslator for GeminiTranslator {
    async fn translate(&self, text: &str) -> TranslateResult<PartialFeatures> {
        (|| self.generate(text))
            .retry(ExponentialBuilder::default().with_max_times(MAX_RETRIES))
            .when(TranslateError::is_transient)
            .notify(|err, after| {
                log::warn!("Gemini request failed ({err}); retrying in {after:?}");
            })
            .await
    }
}

fn request_body(text: &str) -> Value {
    json!({
        "system_instruction": {
            "parts": [{ "text": SYSTEM_PROMPT }]
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": text }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

fn response_schema() -> Value {
    let number = json!({ "type": "NUMBER", "nullable": true });
    let integer = json!({ "type": "INTEGER", "nullable": true });
    json!({
        "type": "OBJECT",
        "properties": {
            "danceability": number,
            "energy": number,
            "key": integer,
            "loudness": number,
            "mode": integer,
            "speechiness": number,
            "acousticness": number,
            "instrumentalness": number,
            "liveness": number,
            "valence": number,
            "tempo": number,
            "duration_ms": integer
        }
    })
}

fn parse_response(body: &str) -> TranslateResult<PartialFeatures> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| TranslateError::Parse {
            provider: PROVIDER,
            message: e.to_string(),
        })?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .ok_or(TranslateError::EmptyResponse { provider: PROVIDER })?;

    serde_json::from_str(strip_fence(&text)).map_err(|e| TranslateError::Parse {
        provider: PROVIDER,
        message: e.to_string(),
    })
}

/// Models sometimes wrap JSON in a markdown code fence despite the mime type.
fn strip_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map_or(trimmed, str::trim)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect())
}
