//! Form-handler state behind the browser front-end.
//!
//! Holds what a single page needs between submissions: the active session and
//! the model it was started with. Rendering is left to whatever serves the page;
//! every action answers with a [`FormOutcome`] carrying the text to show.

use tracing::warn;

use crate::config::{ClientSettings, KeyLookup, ModelRegistry, env_key_lookup};
use crate::error::ChatError;
use crate::http::DynHttpTransport;
use crate::persona::Persona;
use crate::session::ConversationSession;
use crate::types::{ChatStats, Message};

/// Result of one form action, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    /// Informational banner, e.g. which model is active.
    Status(String),
    /// Assistant reply to a submitted message.
    Reply(String),
    /// Input the page should ask the user to fix.
    Warning(String),
    /// Session creation or provider call failed.
    Error(String),
    /// Nothing to do, such as an empty submission.
    Ignored,
}

/// An entry of the model selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    pub key: String,
    pub label: String,
}

/// Per-page chat state.
pub struct WebChat<'a> {
    registry: &'a ModelRegistry,
    transport: DynHttpTransport,
    settings: ClientSettings,
    key_lookup: KeyLookup,
    session: Option<ConversationSession>,
}

impl<'a> WebChat<'a> {
    pub fn new(
        registry: &'a ModelRegistry,
        transport: DynHttpTransport,
        settings: ClientSettings,
    ) -> Self {
        Self {
            registry,
            transport,
            settings,
            key_lookup: env_key_lookup(),
            session: None,
        }
    }

    /// Replaces where API keys come from; the process environment by default.
    pub fn with_key_lookup(mut self, key_lookup: KeyLookup) -> Self {
        self.key_lookup = key_lookup;
        self
    }

    /// Options for the model selector, labelled `Name - model-id`.
    pub fn model_options(&self) -> Vec<ModelOption> {
        self.registry
            .list()
            .iter()
            .map(|(key, config)| ModelOption {
                key: key.clone(),
                label: config.label(),
            })
            .collect()
    }

    /// Starts a fresh chat, replacing any previous one.
    ///
    /// `persona_selector` is `snarky`, `polite` or `custom`; `custom_behaviour` is only read
    /// for `custom`. A failed start keeps the previous chat untouched.
    pub fn start_chat(
        &mut self,
        model_key: &str,
        persona_selector: &str,
        custom_behaviour: Option<&str>,
    ) -> FormOutcome {
        let persona = match Persona::from_selector(persona_selector, custom_behaviour) {
            Ok(persona) => persona,
            Err(ChatError::Validation { .. })
                if persona_selector.trim().eq_ignore_ascii_case("custom") =>
            {
                return FormOutcome::Warning("Please enter a custom behavior".to_string());
            }
            Err(err) => return FormOutcome::Warning(err.message().to_string()),
        };
        let config = match self.registry.get(model_key) {
            Ok(config) => config,
            Err(err) => return FormOutcome::Error(err.to_string()),
        };
        match ConversationSession::create_with_key_lookup(
            config,
            persona.system_prompt(),
            self.transport.clone(),
            &self.settings,
            |name| (self.key_lookup)(name),
        ) {
            Ok(session) => {
                self.session = Some(session);
                FormOutcome::Status(format!(
                    "Currently chatting with: {}",
                    config.display_name
                ))
            }
            Err(err) => {
                warn!(error = %err, "web chat could not start");
                FormOutcome::Error(format!("Error creating model manager: {}", err.message()))
            }
        }
    }

    /// Sends the chat input of the page.
    pub async fn submit(&mut self, input: &str) -> FormOutcome {
        let Some(session) = self.session.as_mut() else {
            return FormOutcome::Warning("Click \"Start Chat\" to begin".to_string());
        };
        if input.trim().is_empty() {
            return FormOutcome::Ignored;
        }
        match session.send(input).await {
            Ok(reply) => FormOutcome::Reply(reply),
            Err(err) => FormOutcome::Error(format!("Failed to get response: {}", err.message())),
        }
    }

    /// Empties the transcript while keeping the model and persona.
    pub fn clear(&mut self) -> FormOutcome {
        match self.session.as_mut() {
            Some(session) => {
                session.clear();
                FormOutcome::Status("Chat cleared".to_string())
            }
            None => FormOutcome::Ignored,
        }
    }

    pub fn is_started(&self) -> bool {
        self.session.is_some()
    }

    /// Message counts for the sidebar; `None` before a chat is started.
    pub fn stats(&self) -> Option<ChatStats> {
        self.session.as_ref().map(ConversationSession::stats)
    }

    /// Visible messages in order, without the system prompt.
    pub fn transcript(&self) -> &[Message] {
        self.session
            .as_ref()
            .and_then(|session| session.messages().get(1..))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::config::ModelConfig;
    use crate::http::testing::{ScriptedTransport, chat_reply, respond};
    use crate::types::Role;

    use super::*;

    const KEY_ENV: &str = "CHATHUB_WEB_UNIT_TEST_KEY";
    const MISSING_ENV: &str = "CHATHUB_WEB_UNIT_TEST_MISSING_KEY";

    fn registry() -> ModelRegistry {
        ModelRegistry::new(vec![
            (
                "1".to_string(),
                ModelConfig::new("Cerebras", KEY_ENV, "llama-test", "https://cerebras.example/v1"),
            ),
            (
                "2".to_string(),
                ModelConfig::new("Nebius", MISSING_ENV, "meta-test", "https://nebius.example/v1/"),
            ),
        ])
    }

    fn web(registry: &ModelRegistry, transport: Arc<ScriptedTransport>) -> WebChat<'_> {
        WebChat::new(registry, transport, ClientSettings::default()).with_key_lookup(Arc::new(
            |name: &str| (name == KEY_ENV).then(|| "csk-test".to_string()),
        ))
    }

    #[test]
    fn options_use_labels() {
        let registry = registry();
        let web = web(&registry, ScriptedTransport::new(Vec::new()));
        let options = web.model_options();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].key, "1");
        assert_eq!(options[0].label, "Cerebras - llama-test");
    }

    #[test]
    fn blank_custom_persona_is_a_warning() {
        let registry = registry();
        let mut web = web(&registry, ScriptedTransport::new(Vec::new()));
        assert_eq!(
            web.start_chat("1", "custom", Some("  ")),
            FormOutcome::Warning("Please enter a custom behavior".to_string())
        );
        assert!(!web.is_started());
    }

    #[test]
    fn missing_key_is_reported() {
        let registry = registry();
        let mut web = web(&registry, ScriptedTransport::new(Vec::new()));
        match web.start_chat("2", "polite", None) {
            FormOutcome::Error(text) => {
                assert!(text.starts_with("Error creating model manager: API key"), "{text}");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(web.stats().is_none());
    }

    #[tokio::test]
    async fn submit_before_start_is_rejected() {
        let registry = registry();
        let transport = ScriptedTransport::new(Vec::new());
        let mut web = web(&registry, transport.clone());
        assert!(matches!(web.submit("hi").await, FormOutcome::Warning(_)));
        assert_eq!(web.clear(), FormOutcome::Ignored);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn chat_flow_tracks_transcript_and_stats() {
        let registry = registry();
        let transport = ScriptedTransport::new(vec![
            chat_reply("Indeed."),
            respond(503, r#"{"error":{"message":"overloaded"}}"#),
        ]);
        let mut web = web(&registry, transport.clone());

        assert_eq!(
            web.start_chat("1", "custom", Some("analytical")),
            FormOutcome::Status("Currently chatting with: Cerebras".to_string())
        );
        assert_eq!(web.submit("   ").await, FormOutcome::Ignored);
        assert_eq!(
            web.submit("hello").await,
            FormOutcome::Reply("Indeed.".to_string())
        );
        assert_eq!(
            web.submit("again").await,
            FormOutcome::Error("Failed to get response: overloaded".to_string())
        );

        let roles: Vec<_> = web.transcript().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        let stats = web.stats().expect("stats");
        assert_eq!(stats.user_messages, 1);
        assert_eq!(stats.assistant_replies, 1);

        let body: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).expect("json");
        assert_eq!(body["messages"][0]["content"], "You are a very analytical assistant.");

        assert_eq!(web.clear(), FormOutcome::Status("Chat cleared".to_string()));
        assert!(web.transcript().is_empty());
    }
}
