//! Google Gemini client (GenerateContent API).
//!
//! One non-streaming `generateContent` call per verification. The request
//! carries the fixed prompt followed by the three images as `inline_data`
//! parts, and asks for a JSON reply matching [`reply_schema`].

use crate::prompt::{VERIFICATION_PROMPT, reply_schema};
use crate::response_types as typed;
use crate::{
    DEFAULT_REQUEST_TIMEOUT_SECS, GEMINI_API_BASE_URL, Oracle, OracleError,
    classify_status, classify_transport_error, http_client_with_timeout, read_capped_error_body,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use idcheck_types::{ApiKey, ImageBlob, ModelName, RawModelReply, VerificationRequest};
use serde_json::{Value, json};
use std::time::Duration;

/// Everything the client needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct OracleSettings {
    pub api_key: ApiKey,
    pub model: ModelName,
    pub base_url: String,
    pub timeout: Duration,
}

impl OracleSettings {
    #[must_use]
    pub fn new(api_key: ApiKey, model: ModelName) -> Self {
        Self {
            api_key,
            model,
            base_url: GEMINI_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: ApiKey,
    model: ModelName,
    url: String,
}

impl GeminiClient {
    pub fn new(settings: OracleSettings) -> Result<Self, OracleError> {
        let base = settings.base_url.trim_end_matches('/');
        let https_only = base.starts_with("https://");
        let http = http_client_with_timeout(settings.timeout, https_only)
            .map_err(|e| OracleError::Internal(format!("failed to build HTTP client: {e}")))?;
        let url = format!("{base}/models/{}:generateContent", settings.model);

        Ok(Self {
            http,
            api_key: settings.api_key,
            model: settings.model,
            url,
        })
    }

    #[must_use]
    pub fn model(&self) -> &ModelName {
        &self.model
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send(&self, request: &VerificationRequest) -> Result<RawModelReply, OracleError> {
        let body = build_request_body(request);

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", self.api_key.as_str())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, timeout = e.is_timeout(), "Gemini request failed");
                classify_transport_error(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = read_capped_error_body(response).await;
            tracing::warn!(%status, body = %error_text, "Gemini returned error status");
            return Err(classify_status(status)
                .unwrap_or_else(|| OracleError::Internal(format!("API error {status}: {error_text}"))));
        }

        let payload = response.text().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read Gemini response body");
            classify_transport_error(&e)
        })?;

        let parsed: typed::Response = serde_json::from_str(&payload).map_err(|e| {
            tracing::warn!(%e, payload_bytes = payload.len(), "Failed to parse Gemini response");
            OracleError::Internal(format!("invalid response envelope: {e}"))
        })?;

        if let Some(error) = &parsed.error {
            return Err(OracleError::Internal(error.message_or_default().to_string()));
        }

        if let Some(usage) = &parsed.usage_metadata {
            tracing::debug!(
                prompt_tokens = usage.prompt_token_count,
                output_tokens = usage.candidates_token_count,
                "Gemini usage"
            );
        }

        match parsed.answer_text() {
            Some(text) => Ok(RawModelReply::new(text)),
            None => {
                let block_reason = parsed
                    .prompt_feedback
                    .as_ref()
                    .and_then(|feedback| feedback.block_reason.as_deref());
                let finish_reason = parsed.finish_reason();
                tracing::warn!(?block_reason, ?finish_reason, "Gemini returned no text");
                Err(OracleError::Unavailable)
            }
        }
    }
}

impl Oracle for GeminiClient {
    async fn generate(&self, request: &VerificationRequest) -> Result<RawModelReply, OracleError> {
        self.send(request).await
    }
}

/// Build a content part for Gemini API.
fn text_part(text: &str) -> Value {
    json!({ "text": text })
}

fn inline_data_part(image: &ImageBlob) -> Value {
    json!({
        "inline_data": {
            "mime_type": image.media_type().as_str(),
            "data": STANDARD.encode(image.bytes())
        }
    })
}

/// Build the request body for Gemini API.
///
/// Note: Gemini API uses mixed casing:
/// - `inline_data` / `mime_type` (snake_case)
/// - `generationConfig`, `responseMimeType`, `responseSchema` (camelCase)
/// - `contents`, `parts` (lowercase)
fn build_request_body(request: &VerificationRequest) -> Value {
    let mut parts = Vec::with_capacity(4);
    parts.push(text_part(VERIFICATION_PROMPT));
    parts.extend(request.images().map(|(_, image)| inline_data_part(image)));

    json!({
        "contents": [{
            "role": "user",
            "parts": parts
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": reply_schema()
        }
    })
}
