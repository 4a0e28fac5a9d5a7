//! Google Gemini API gateway implementation.
//!
//! Implements [`ModelGateway`] against the native Gemini `generateContent`
//! endpoint:
//! - Auth via `?key=API_KEY` query parameter
//! - Structured output via `generationConfig.responseMimeType` +
//!   `responseSchema`
//! - Search augmentation via the `google_search` tool
//!
//! The `reqwest::Client` is long-lived, but the credential is re-resolved
//! on every call entry so key rotation takes effect without a restart.

use super::{resolve_api_key, ModelGateway, NO_RESEARCH_DATA};
use crate::config::LlmConfig;
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

/// The default Google Gemini API base URL.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gateway to the Google Gemini API.
pub struct GeminiGateway {
    client: Client,
    config: LlmConfig,
    base_url: String,
    timeout_secs: u64,
}

impl GeminiGateway {
    /// Create a gateway from configuration. Builds the HTTP client with
    /// request and connect timeouts; does not touch the credential yet.
    pub fn new(config: &LlmConfig) -> Result<Self, GatewayError> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .connect_timeout(std::time::Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Connection {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            config: config.clone(),
            base_url,
            timeout_secs: config.timeout_secs,
        })
    }

    fn endpoint_url(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.config.model, api_key
        )
    }

    fn base_body(&self, prompt: &str) -> Value {
        serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "maxOutputTokens": self.config.max_output_tokens,
                "temperature": self.config.temperature,
            },
        })
    }

    /// Map an HTTP status code to the appropriate structured error.
    fn map_http_error(status: reqwest::StatusCode, body_text: &str) -> GatewayError {
        match status.as_u16() {
            401 | 403 => GatewayError::Unauthorized,
            429 => GatewayError::RateLimited,
            code => GatewayError::Api {
                status: code,
                message: body_text.chars().take(500).collect(),
            },
        }
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                secs: self.timeout_secs,
            }
        } else {
            GatewayError::Connection {
                message: format!("request to Gemini API failed: {e}"),
            }
        }
    }

    /// Concatenate the text parts of the first candidate.
    ///
    /// Missing `candidates` or `parts` is a parse error; present-but-empty
    /// text is reported as `None` so callers can apply their own emptiness
    /// policy.
    fn extract_text(body: &Value) -> Result<Option<String>, GatewayError> {
        let candidates = body["candidates"]
            .as_array()
            .ok_or_else(|| GatewayError::ResponseParse {
                message: "missing 'candidates' array in response".to_string(),
            })?;

        let Some(candidate) = candidates.first() else {
            return Ok(None);
        };

        let parts = candidate["content"]["parts"].as_array();
        let Some(parts) = parts else {
            return Ok(None);
        };

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect();

        if text.trim().is_empty() {
            Ok(None)
        } else {
            Ok(text.into())
        }
    }

    async fn post(&self, body: &Value) -> Result<Value, GatewayError> {
        // Credential resolution happens here, per call, before any I/O.
        let api_key = resolve_api_key(&self.config)?;
        let url = self.endpoint_url(&api_key);

        debug!(model = self.config.model.as_str(), "sending Gemini request");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        let body_text = response
            .text()
            .await
            .map_err(|e| GatewayError::ResponseParse {
                message: format!("failed to read response body: {e}"),
            })?;

        if !status.is_success() {
            return Err(Self::map_http_error(status, &body_text));
        }

        serde_json::from_str(&body_text).map_err(|e| GatewayError::ResponseParse {
            message: format!("invalid JSON in response: {e}"),
        })
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<String, GatewayError> {
        let mut body = self.base_body(prompt);
        body["generationConfig"]["responseMimeType"] = Value::String("application/json".into());
        body["generationConfig"]["responseSchema"] = schema.clone();

        let response = self.post(&body).await?;
        Self::extract_text(&response)?.ok_or(GatewayError::EmptyResponse)
    }

    async fn generate_with_search(&self, prompt: &str) -> Result<String, GatewayError> {
        let mut body = self.base_body(prompt);
        body["tools"] = serde_json::json!([{"google_search": {}}]);

        let response = self.post(&body).await?;
        Ok(Self::extract_text(&response)?.unwrap_or_else(|| NO_RESEARCH_DATA.to_string()))
    }
}
