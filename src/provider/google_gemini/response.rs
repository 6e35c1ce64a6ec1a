use crate::error::ChatError;

use super::types::GeminiGenerateContentResponse;

/// Concatenates the text parts of the first candidate.
pub(crate) fn map_response(
    resp: GeminiGenerateContentResponse,
    provider: &'static str,
    status: u16,
) -> Result<String, ChatError> {
    let block_reason = resp
        .prompt_feedback
        .as_ref()
        .and_then(|feedback| feedback.block_reason.clone());
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let message = match block_reason {
            Some(reason) => format!("prompt was blocked ({reason})"),
            None => "response contained no candidates".to_string(),
        };
        return Err(ChatError::provider(provider, status, message));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter(|part| !part.thought.unwrap_or(false))
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "UNKNOWN".to_string());
        return Err(ChatError::provider(
            provider,
            status,
            format!("response contained no text (finish reason {reason})"),
        ));
    }
    Ok(text)
}
