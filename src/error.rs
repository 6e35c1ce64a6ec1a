use thiserror::Error;

/// Aggregates every failure mode exposed by the chat clients.
///
/// Front-ends match on the variant to decide whether to re-prompt, show an inline
/// error, or abandon session creation. The value is converted to user-facing text
/// only at that boundary.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Missing or invalid configuration, typically an unset API key variable.
    #[error("configuration error: {message}")]
    Configuration { message: String },
    /// Rejected user input such as an empty chat turn.
    #[error("invalid input: {message}")]
    Validation { message: String },
    /// Network failure, non-2xx status, or an unusable provider payload.
    #[error("provider {provider} error: {message}")]
    Provider {
        /// Name of the provider adapter, such as `openai_chat`.
        provider: &'static str,
        /// HTTP status when a response was received; `None` for transport failures.
        status: Option<u16>,
        /// Upstream error text, kept verbatim where possible.
        message: String,
    },
    /// A model selector key that is not present in the registry.
    #[error("unknown model selector: {key}")]
    NotFound { key: String },
}

impl ChatError {
    /// Creates a [`ChatError::Configuration`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use chathub::error::ChatError;
    ///
    /// let err = ChatError::configuration("GROQ_API_KEY is not set");
    /// assert!(matches!(err, ChatError::Configuration { .. }));
    /// ```
    pub fn configuration<T: Into<String>>(message: T) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a [`ChatError::Validation`] from a textual description.
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a [`ChatError::Provider`] for a response that carried an HTTP status.
    ///
    /// # Examples
    ///
    /// ```
    /// use chathub::error::ChatError;
    ///
    /// let err = ChatError::provider("openai_chat", 500, "upstream exploded");
    /// assert!(matches!(err, ChatError::Provider { status: Some(500), .. }));
    /// assert!(!err.is_transient());
    /// ```
    pub fn provider<T: Into<String>>(provider: &'static str, status: u16, message: T) -> Self {
        Self::Provider {
            provider,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Wraps a [`TransportError`] raised before any HTTP status was received.
    pub fn transport(provider: &'static str, err: TransportError) -> Self {
        Self::Provider {
            provider,
            status: None,
            message: err.message,
        }
    }

    /// Returns `true` for failures that happened before a response arrived.
    ///
    /// Only these are worth a second attempt; an HTTP error status is final.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Provider { status: None, .. })
    }

    /// Returns the upstream text without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration { message }
            | Self::Validation { message }
            | Self::Provider { message, .. } => message,
            Self::NotFound { key } => key,
        }
    }
}

/// Failure raised by an [`crate::http::HttpTransport`] before a response was read.
#[derive(Debug, Clone, Error)]
#[error("transport error: {message}")]
pub struct TransportError {
    /// Human-readable cause such as a DNS, TLS, or timeout failure.
    pub message: String,
}

impl TransportError {
    /// Creates a [`TransportError`] from a textual description.
    ///
    /// # Examples
    ///
    /// ```
    /// use chathub::error::TransportError;
    ///
    /// let err = TransportError::new("dns lookup failed");
    /// assert_eq!(err.to_string(), "transport error: dns lookup failed");
    /// ```
    pub fn new<T: Into<String>>(message: T) -> Self {
        Self {
            message: message.into(),
        }
    }
}
