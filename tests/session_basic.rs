use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chathub::http::{HttpRequest, HttpResponse, HttpTransport};
use chathub::image_query::{GOODBYE, ImageQueryHandler};
use chathub::{
    ChatError, ClientSettings, ConversationSession, ModelConfig, ModelRegistry, Persona, Role,
    TransportError,
};
use serde_json::{Value, json};

/// Replays canned responses and records every request.
struct QueueTransport {
    replies: Mutex<Vec<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl QueueTransport {
    fn new(mut replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        replies.reverse();
        Arc::new(Self {
            replies: Mutex::new(replies),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn seen(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for QueueTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .expect("transport called more often than scripted")
    }
}

fn reply(status: u16, body: Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        headers: HashMap::new(),
        body: body.to_string().into_bytes(),
    })
}

fn assistant(text: &str) -> Result<HttpResponse, TransportError> {
    reply(
        200,
        json!({
            "id": "chatcmpl-1",
            "model": "test",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        }),
    )
}

fn groq_like(key_env: &str) -> ModelConfig {
    ModelConfig::new(
        "Groq",
        key_env,
        "qwen-qwq-32b",
        "https://api.groq.com/openai/v1",
    )
}

fn session_with(
    key_env: &str,
    transport: Arc<QueueTransport>,
) -> Result<ConversationSession, ChatError> {
    ConversationSession::create_with_transport(
        &groq_like(key_env),
        Persona::Snarky.system_prompt(),
        transport,
        &ClientSettings::default(),
    )
}

#[test]
fn builtin_registry_lists_five_providers() {
    let registry = ModelRegistry::builtin();
    let names: Vec<_> = registry
        .list()
        .iter()
        .map(|(key, config)| format!("{key}:{}", config.display_name))
        .collect();
    assert_eq!(
        names,
        vec!["1:Gemini", "2:Sambanova", "3:Cerebras", "4:Nebius", "5:Groq"]
    );
    let envs: Vec<_> = registry
        .list()
        .iter()
        .map(|(_, config)| config.api_key_env.as_str())
        .collect();
    assert_eq!(
        envs,
        vec![
            "GOOGLE_API_KEY",
            "SAMBANOVA_API_KEY",
            "CEREBRAS_API_KEY",
            "NEBIUS_API_KEY",
            "GROQ_API_KEY"
        ]
    );
}

#[test]
fn unknown_selector_is_not_found() {
    match ModelRegistry::builtin().get("9") {
        Err(ChatError::NotFound { key }) => assert_eq!(key, "9"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn every_builtin_config_requires_a_non_blank_key() {
    for (_, config) in ModelRegistry::builtin().list() {
        assert!(matches!(
            config.resolve_api_key_with(|_| None),
            Err(ChatError::Configuration { .. })
        ));
        assert!(matches!(
            config.resolve_api_key_with(|_| Some("   ".to_string())),
            Err(ChatError::Configuration { .. })
        ));
        assert!(config.resolve_api_key_with(|_| Some("k".to_string())).is_ok());
    }
}

#[test]
fn missing_env_key_blocks_session_creation() {
    let transport = QueueTransport::new(Vec::new());
    let result = session_with("CHATHUB_IT_NEVER_SET_KEY", transport.clone());
    assert!(matches!(result, Err(ChatError::Configuration { .. })));
    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn conversation_round_trip_over_public_api() {
    let transport = QueueTransport::new(vec![
        assistant("Oh, it's you."),
        reply(429, json!({"error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}})),
        Err(TransportError::new("connection reset by peer")),
        assistant("Still here."),
    ]);
    let mut session = ConversationSession::create_with_key_lookup(
        &groq_like("CHATHUB_IT_SESSION_KEY"),
        Persona::Snarky.system_prompt(),
        transport.clone(),
        &ClientSettings::default(),
        |name| (name == "CHATHUB_IT_SESSION_KEY").then(|| " gsk-integration ".to_string()),
    )
    .expect("session");

    assert_eq!(session.send("hello").await.expect("first"), "Oh, it's you.");
    assert_eq!(session.messages().len(), 3);

    let err = session.send("again").await.expect_err("rate limited");
    assert!(matches!(err, ChatError::Provider { status: Some(429), .. }));
    assert!(err.message().contains("Rate limit reached"));
    assert_eq!(session.messages().len(), 3);

    assert!(matches!(
        session.send("  ").await,
        Err(ChatError::Validation { .. })
    ));

    assert_eq!(session.send("again").await.expect("retried"), "Still here.");
    let roles: Vec<_> = session.messages().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
    );

    let requests = transport.seen();
    assert_eq!(requests.len(), 4);
    let first = &requests[0];
    assert_eq!(first.url, "https://api.groq.com/openai/v1/chat/completions");
    assert_eq!(
        first.headers.get("Authorization"),
        Some(&"Bearer gsk-integration".to_string())
    );
    let body: Value = serde_json::from_slice(&first.body).expect("json body");
    assert_eq!(body["model"], "qwen-qwq-32b");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["content"], "hello");

    session.clear();
    assert_eq!(session.messages().len(), 1);
}

#[tokio::test]
async fn image_handler_quits_without_network() {
    let transport = QueueTransport::new(Vec::new());
    let handler = ImageQueryHandler::new(transport.clone(), Some("AIza-test".to_string()));
    for word in ["quit", "Q", "exit"] {
        assert_eq!(handler.answer("cat.png", word, None).await, GOODBYE);
    }
    assert!(transport.seen().is_empty());
}
