//! Completion client
//!
//! Turns a conversation history into a single assistant reply string. Every
//! failure mode resolves to a displayable message; nothing propagates to the
//! caller.

use crate::config::ModelParams;
use crate::history::{trim_messages, DEFAULT_KEEP};
use crate::llm::{CredentialResolver, LlmRequest, LlmService, Message};
use std::sync::Arc;

/// Reply used when no credential can be resolved
pub const NOT_AVAILABLE_REPLY: &str =
    "AI not available: configure OPENAI_API_KEY in the secret store or the environment.";

/// Reply used when the service call fails
pub const APOLOGY_REPLY: &str = "Sorry, I'm having trouble talking to the AI service right now.";

/// Completion client shared by all sessions
pub struct CompletionClient {
    service: Arc<dyn LlmService>,
    resolver: CredentialResolver,
    params: ModelParams,
    keep: usize,
}

impl CompletionClient {
    pub fn new(
        service: Arc<dyn LlmService>,
        resolver: CredentialResolver,
        params: ModelParams,
    ) -> Self {
        Self {
            service,
            resolver,
            params,
            keep: DEFAULT_KEEP,
        }
    }

    pub fn model(&self) -> &str {
        &self.params.default_model
    }

    /// Build the request for `history`, trimmed to the most recent turns
    pub fn build_request(&self, history: &[Message]) -> LlmRequest {
        LlmRequest {
            model: self.params.default_model.clone(),
            messages: trim_messages(history, self.keep),
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        }
    }

    /// One-shot completion for `history`. Never retried.
    pub async fn reply(&self, history: &[Message], session_key: Option<&str>) -> String {
        let Some(credential) = self.resolver.resolve(session_key) else {
            tracing::warn!("No API credential available, skipping completion call");
            return NOT_AVAILABLE_REPLY.to_string();
        };

        let request = self.build_request(history);
        tracing::debug!(
            credential_source = credential.source.as_str(),
            sent = request.messages.len(),
            total = history.len(),
            "Requesting completion"
        );

        match self.service.complete(&credential.api_key, &request).await {
            Ok(response) => response.reply.into_string(),
            Err(e) => {
                tracing::error!(error = %e, kind = e.kind.as_str(), "Completion call failed");
                APOLOGY_REPLY.to_string()
            }
        }
    }
}
