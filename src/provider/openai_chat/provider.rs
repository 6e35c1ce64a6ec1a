use std::collections::HashMap;

use async_trait::async_trait;
use tracing::debug;

use crate::config::{DEFAULT_MAX_ATTEMPTS, ModelConfig};
use crate::error::ChatError;
use crate::http::{DynHttpTransport, HttpResponse, post_json_with_headers};
use crate::provider::ChatProvider;
use crate::provider::retry::with_transient_retry;
use crate::types::Message;

use super::error::parse_openai_error;
use super::request::build_openai_body;
use super::response::map_response;
use super::types::OpenAiChatResponse;

/// OpenAI-compatible chat-completions provider bound to one base URL and model.
pub struct OpenAiChatProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) max_attempts: u32,
}

impl OpenAiChatProvider {
    pub fn new(
        transport: DynHttpTransport,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Creates a provider for a registry entry with an already resolved key.
    pub fn from_model_config(
        config: &ModelConfig,
        transport: DynHttpTransport,
        api_key: impl Into<String>,
    ) -> Self {
        Self::new(transport, &config.base_url, api_key, &config.model_id)
    }

    /// Sets the total attempts for transient transport failures.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// `{base_url}/chat/completions`, tolerating a trailing slash on the base.
    ///
    /// The base already carries its version segment (`/v1`, `/v1beta/openai`).
    pub(crate) fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_headers(&self) -> HashMap<String, String> {
        HashMap::from([
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.api_key),
            ),
            ("Accept".to_string(), "application/json".to_string()),
        ])
    }

    async fn send_once(&self, messages: &[Message]) -> Result<HttpResponse, ChatError> {
        let body = build_openai_body(&self.model, messages)?;
        post_json_with_headers(
            self.transport.as_ref(),
            self.name(),
            self.endpoint(),
            self.build_headers(),
            &body,
        )
        .await
    }

    fn ensure_success(&self, response: HttpResponse) -> Result<OpenAiChatResponse, ChatError> {
        let status = response.status;
        let text = response.text();
        if !response.is_success() {
            return Err(parse_openai_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|err| {
            ChatError::provider(
                self.name(),
                status,
                format!("failed to parse OpenAI response: {err}"),
            )
        })
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError> {
        debug!(
            endpoint = %self.endpoint(),
            model = %self.model,
            history = messages.len(),
            "chat completion"
        );
        let response =
            with_transient_retry(self.max_attempts, move || self.send_once(messages)).await?;
        let status = response.status;
        let parsed = self.ensure_success(response)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                id = parsed.id.as_deref().unwrap_or_default(),
                model = parsed.model.as_deref().unwrap_or_default(),
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                finish_reason = parsed
                    .choices
                    .first()
                    .and_then(|choice| choice.finish_reason.as_deref())
                    .unwrap_or_default(),
                "completion usage"
            );
        }
        map_response(parsed, self.name(), status)
    }

    fn name(&self) -> &'static str {
        "openai_chat"
    }
}
