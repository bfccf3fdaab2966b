//! `OpenAI`-compatible chat completions provider

use super::types::{LlmRequest, LlmResponse, Message, ReplyText, Usage};
use super::{LlmError, LlmService};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default API base when `OPENAI_BASE_URL` is not set
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat completions client. Holds no credential; the caller supplies one per call.
pub struct OpenAIService {
    client: Client,
    endpoint: String,
}

impl OpenAIService {
    /// Build a service against `base_url` (e.g. `https://api.openai.com/v1`).
    ///
    /// No request timeout is configured; the HTTP client's defaults apply.
    pub fn new(base_url: &str) -> Result<Self, LlmError> {
        let client = Client::builder()
            .build()
            .map_err(|e| LlmError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn translate_request(request: &LlmRequest) -> OpenAIRequest<'_> {
        OpenAIRequest {
            model: &request.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl LlmService for OpenAIService {
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let body = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::network(format!("Connection failed: {e}"))
                } else {
                    LlmError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LlmError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            let message = serde_json::from_str::<OpenAIErrorResponse>(&body)
                .map_or(body, |resp| resp.error.message);
            return Err(LlmError::from_status(status.as_u16(), &message));
        }

        normalize_response(&body)
    }
}

/// Decode a successful response body.
///
/// Only a body that is not JSON at all is malformed. Any JSON document is
/// read leniently: the first choice's string `message.content`, then its
/// string `text`, else [`ReplyText::Raw`]. Usage counts that are missing or
/// not integers read as zero.
pub(crate) fn normalize_response(body: &str) -> Result<LlmResponse, LlmError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| LlmError::unknown(format!("Failed to parse response: {e} - body: {body}")))?;

    let usage = Usage {
        input_tokens: token_count(&value, "prompt_tokens"),
        output_tokens: token_count(&value, "completion_tokens"),
    };

    let choice = value.pointer("/choices/0");
    let non_empty = |pointer: &str| {
        choice
            .and_then(|c| c.pointer(pointer))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let reply = if let Some(content) = non_empty("/message/content") {
        ReplyText::Message(content)
    } else if let Some(text) = non_empty("/text") {
        ReplyText::Text(text)
    } else {
        ReplyText::Raw(body.to_string())
    };

    Ok(LlmResponse { reply, usage })
}

fn token_count(value: &Value, field: &str) -> u64 {
    value
        .get("usage")
        .and_then(|u| u.get(field))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}

// OpenAI API types

#[derive(Debug, Serialize)]
struct OpenAIRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorResponse {
    error: OpenAIError,
}

#[derive(Debug, Deserialize)]
struct OpenAIError {
    message: String,
}
