use serde::Deserialize;

use crate::error::ChatError;

/// Parses error responses returned by Google Gemini.
pub(crate) fn parse_gemini_error(status: u16, body: &str) -> ChatError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<InnerError>,
    }

    #[derive(Deserialize)]
    struct InnerError {
        message: Option<String>,
        status: Option<String>,
    }

    if let Ok(ErrorBody { error: Some(error) }) = serde_json::from_str::<ErrorBody>(body) {
        let mut message = error.message.unwrap_or_else(|| "unknown error".to_string());
        if let Some(status_text) = error.status.filter(|text| !text.is_empty()) {
            message = format!("{message} ({status_text})");
        }
        return ChatError::provider("google_gemini", status, message);
    }

    // Fallback: if the payload cannot be parsed, return the raw body.
    ChatError::provider("google_gemini", status, format!("status {status}: {body}"))
}
