use crate::error::ChatError;

use super::types::{OpenAiChatResponse, OpenAiMessageContent};

/// Extracts `choices[0].message.content` as plain text.
pub(crate) fn map_response(
    resp: OpenAiChatResponse,
    provider: &'static str,
    status: u16,
) -> Result<String, ChatError> {
    let choice = resp.choices.into_iter().next().ok_or_else(|| {
        ChatError::provider(provider, status, "response contained no choices")
    })?;
    let content = choice
        .message
        .and_then(|message| message.content)
        .ok_or_else(|| ChatError::provider(provider, status, "response message has no content"))?;
    let text = match content {
        OpenAiMessageContent::Text(text) => text,
        OpenAiMessageContent::Parts(parts) => parts
            .into_iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join(""),
    };
    Ok(text)
}
