use serde::Deserialize;
use serde_json::Value;

use crate::error::ChatError;

/// Turns a non-2xx response into a [`ChatError::Provider`] carrying the upstream text.
pub(crate) fn parse_openai_error(status: u16, body: &str) -> ChatError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<InnerError>,
    }
    #[derive(Deserialize)]
    struct InnerError {
        message: Option<String>,
        code: Option<Value>,
    }

    // Gemini's compatibility layer wraps the object in a one-element array. Derived
    // structs also deserialize from a sequence, so the array must be unwrapped first.
    let parsed = serde_json::from_str::<Value>(body)
        .ok()
        .map(|value| match value {
            Value::Array(items) => items.into_iter().next().unwrap_or(Value::Null),
            other => other,
        })
        .and_then(|value| serde_json::from_value::<ErrorBody>(value).ok());
    if let Some(ErrorBody { error: Some(error) }) = parsed {
        let mut message = error.message.unwrap_or_else(|| "unknown error".to_string());
        if let Some(code) = error.code.filter(|code| !code.is_null()) {
            message = format!("{message} ({code})");
        }
        return ChatError::provider("openai_chat", status, message);
    }
    ChatError::provider("openai_chat", status, format!("status {status}: {body}"))
}
