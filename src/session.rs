//! Stateful chat history bound to one provider.

use std::env;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ClientSettings, ModelConfig};
use crate::error::ChatError;
use crate::http::DynHttpTransport;
use crate::http::reqwest::default_dyn_transport;
use crate::provider::DynChatProvider;
use crate::provider::openai_chat::OpenAiChatProvider;
use crate::types::{ChatStats, Message};

/// Ordered message history for one chat, starting with the system prompt.
///
/// Each [`send`](Self::send) either appends a user/assistant pair or leaves the
/// history exactly as it was.
pub struct ConversationSession {
    config: ModelConfig,
    provider: DynChatProvider,
    messages: Vec<Message>,
}

impl ConversationSession {
    /// Starts a session against `config`, reading its API key from the environment
    /// and using the default reqwest transport with [`ClientSettings::default`].
    ///
    /// `CHATHUB_*` overrides are not consulted here; front-ends validate them once
    /// at start-up and pass the result to [`create_with_transport`](Self::create_with_transport).
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when the key variable is unset or blank.
    pub fn create(config: &ModelConfig, system_prompt: impl Into<String>) -> Result<Self, ChatError> {
        let api_key = config.resolve_api_key()?;
        let settings = ClientSettings::default();
        let transport = default_dyn_transport(&settings)?;
        Ok(Self::with_api_key(
            config,
            system_prompt,
            transport,
            &settings,
            api_key,
        ))
    }

    /// Like [`create`](Self::create) but with a caller-supplied transport and settings.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when the key variable is unset or blank.
    pub fn create_with_transport(
        config: &ModelConfig,
        system_prompt: impl Into<String>,
        transport: DynHttpTransport,
        settings: &ClientSettings,
    ) -> Result<Self, ChatError> {
        Self::create_with_key_lookup(config, system_prompt, transport, settings, |name| {
            env::var(name).ok()
        })
    }

    /// Resolves the API key through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when `lookup` yields nothing or a blank key.
    pub fn create_with_key_lookup<F>(
        config: &ModelConfig,
        system_prompt: impl Into<String>,
        transport: DynHttpTransport,
        settings: &ClientSettings,
        lookup: F,
    ) -> Result<Self, ChatError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let api_key = config.resolve_api_key_with(lookup)?;
        Ok(Self::with_api_key(
            config,
            system_prompt,
            transport,
            settings,
            api_key,
        ))
    }

    fn with_api_key(
        config: &ModelConfig,
        system_prompt: impl Into<String>,
        transport: DynHttpTransport,
        settings: &ClientSettings,
        api_key: String,
    ) -> Self {
        let provider = OpenAiChatProvider::from_model_config(config, transport, api_key)
            .with_max_attempts(settings.max_attempts);
        Self::from_provider(config, system_prompt, Arc::new(provider))
    }

    /// Builds a session around an existing provider; no key lookup happens.
    pub fn from_provider(
        config: &ModelConfig,
        system_prompt: impl Into<String>,
        provider: DynChatProvider,
    ) -> Self {
        let system_prompt = system_prompt.into();
        info!(
            provider = %config.display_name,
            model = %config.model_id,
            prompt = %system_prompt,
            "chat session started"
        );
        Self {
            config: config.clone(),
            provider,
            messages: vec![Message::system(system_prompt)],
        }
    }

    /// Sends one user turn with the full history and records the reply.
    ///
    /// # Errors
    ///
    /// - [`ChatError::Validation`] when `user_text` is blank; history is untouched.
    /// - [`ChatError::Provider`] when the call fails; the user turn is rolled back
    ///   so the same text can be retried.
    pub async fn send(&mut self, user_text: &str) -> Result<String, ChatError> {
        let user_text = user_text.trim();
        if user_text.is_empty() {
            return Err(ChatError::validation("Please enter a message."));
        }

        self.messages.push(Message::user(user_text));
        match self.provider.complete(&self.messages).await {
            Ok(reply) => {
                self.messages.push(Message::assistant(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                warn!(provider = %self.config.display_name, error = %err, "chat turn failed");
                self.messages.pop();
                Err(err)
            }
        }
    }

    /// Drops everything but the system prompt.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
        info!(provider = %self.config.display_name, "chat session cleared");
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn system_prompt(&self) -> &str {
        &self.messages[0].content
    }

    pub fn stats(&self) -> ChatStats {
        ChatStats::from_messages(&self.messages)
    }
}
