use std::env;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Request timeout applied when `CHATHUB_TIMEOUT_SECS` is not set.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
/// One initial attempt plus a single retry on transient transport failures.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

const TIMEOUT_ENV: &str = "CHATHUB_TIMEOUT_SECS";
const MAX_ATTEMPTS_ENV: &str = "CHATHUB_MAX_ATTEMPTS";

/// Source of API keys by variable name; front-ends default to [`env_key_lookup`].
pub type KeyLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads keys from the process environment.
pub fn env_key_lookup() -> KeyLookup {
    Arc::new(|name: &str| env::var(name).ok())
}

/// Static descriptor of one OpenAI-compatible provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider name shown in menus, e.g. `Groq`.
    pub display_name: String,
    /// Environment variable holding the bearer API key.
    pub api_key_env: String,
    /// Model identifier sent in the request body.
    pub model_id: String,
    /// Base URL that `chat/completions` is appended to.
    pub base_url: String,
}

impl ModelConfig {
    pub fn new(
        display_name: impl Into<String>,
        api_key_env: impl Into<String>,
        model_id: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            api_key_env: api_key_env.into(),
            model_id: model_id.into(),
            base_url: base_url.into(),
        }
    }

    /// Selector text such as `Groq - qwen-qwq-32b`.
    pub fn label(&self) -> String {
        format!("{} - {}", self.display_name, self.model_id)
    }

    /// Reads the API key from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when the variable is unset or blank.
    pub fn resolve_api_key(&self) -> Result<String, ChatError> {
        self.resolve_api_key_with(|name| env::var(name).ok())
    }

    /// Resolves the API key through an arbitrary lookup, trimming surrounding whitespace.
    ///
    /// # Examples
    ///
    /// ```
    /// use chathub::config::ModelRegistry;
    ///
    /// let groq = ModelRegistry::builtin().get("5").unwrap();
    /// let key = groq.resolve_api_key_with(|_| Some(" gsk-test ".to_string())).unwrap();
    /// assert_eq!(key, "gsk-test");
    /// assert!(groq.resolve_api_key_with(|_| None).is_err());
    /// ```
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, ChatError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(&self.api_key_env) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
            Some(_) => Err(ChatError::configuration(format!(
                "API key {} is blank",
                self.api_key_env
            ))),
            None => Err(ChatError::configuration(format!(
                "API key {} not found in environment variables",
                self.api_key_env
            ))),
        }
    }
}

static BUILTIN: LazyLock<ModelRegistry> = LazyLock::new(|| {
    ModelRegistry::new(vec![
        (
            "1".to_string(),
            ModelConfig::new(
                "Gemini",
                "GOOGLE_API_KEY",
                "gemini-2.0-flash",
                "https://generativelanguage.googleapis.com/v1beta/openai/",
            ),
        ),
        (
            "2".to_string(),
            ModelConfig::new(
                "Sambanova",
                "SAMBANOVA_API_KEY",
                "Llama-4-Maverick-17B-128E-Instruct",
                "https://api.sambanova.ai/v1",
            ),
        ),
        (
            "3".to_string(),
            ModelConfig::new(
                "Cerebras",
                "CEREBRAS_API_KEY",
                "llama-4-scout-17b-16e-instruct",
                "https://api.cerebras.ai/v1",
            ),
        ),
        (
            "4".to_string(),
            ModelConfig::new(
                "Nebius",
                "NEBIUS_API_KEY",
                "meta-llama/Meta-Llama-3.1-70B-Instruct",
                "https://api.studio.nebius.com/v1/",
            ),
        ),
        (
            "5".to_string(),
            ModelConfig::new(
                "Groq",
                "GROQ_API_KEY",
                "qwen-qwq-32b",
                "https://api.groq.com/openai/v1",
            ),
        ),
    ])
});

/// Ordered, immutable mapping from selector key to [`ModelConfig`].
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<(String, ModelConfig)>,
}

impl ModelRegistry {
    /// Builds a registry from caller-supplied entries, preserving their order.
    pub fn new(entries: Vec<(String, ModelConfig)>) -> Self {
        Self { entries }
    }

    /// The five providers shipped with the crate, initialised once per process.
    pub fn builtin() -> &'static ModelRegistry {
        &BUILTIN
    }

    pub fn list(&self) -> &[(String, ModelConfig)] {
        &self.entries
    }

    /// Looks up a config by selector key; surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::NotFound`] for keys not present in the registry.
    pub fn get(&self, key: &str) -> Result<&ModelConfig, ChatError> {
        let key = key.trim();
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, config)| config)
            .ok_or_else(|| ChatError::NotFound {
                key: key.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// HTTP behaviour shared by every provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSettings {
    /// Upper bound for a single request, connection included.
    pub timeout: Duration,
    /// Total attempts for transient failures; `1` disables the retry.
    pub max_attempts: u32,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl ClientSettings {
    /// Reads `CHATHUB_TIMEOUT_SECS` and `CHATHUB_MAX_ATTEMPTS`, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Configuration`] when a variable is set but not a positive integer.
    pub fn from_env() -> Result<Self, ChatError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ChatError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();
        if let Some(secs) = parse_positive(TIMEOUT_ENV, lookup(TIMEOUT_ENV))? {
            settings.timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_positive(MAX_ATTEMPTS_ENV, lookup(MAX_ATTEMPTS_ENV))? {
            settings.max_attempts = u32::try_from(attempts).map_err(|_| {
                ChatError::configuration(format!("{MAX_ATTEMPTS_ENV} is out of range"))
            })?;
        }
        Ok(settings)
    }
}

fn parse_positive(name: &str, raw: Option<String>) -> Result<Option<u64>, ChatError> {
    let Some(raw) = raw.filter(|value| !value.trim().is_empty()) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ChatError::configuration(format!(
            "{name} must be a positive integer, got {raw:?}"
        ))),
        Ok(value) => Ok(Some(value)),
    }
}
