use crate::error::ChatError;
use crate::types::{Message, Role};

use super::types::OpenAiChatRequest;

/// Builds the request body, checking that history starts with a system prompt
/// and contains at least one user turn.
pub(crate) fn build_openai_body<'a>(
    model: &'a str,
    messages: &'a [Message],
) -> Result<OpenAiChatRequest<'a>, ChatError> {
    if model.trim().is_empty() {
        return Err(ChatError::validation("model is required for OpenAI Chat"));
    }
    if !messages.iter().any(|message| message.role == Role::User) {
        return Err(ChatError::validation(
            "conversation must contain at least one user message",
        ));
    }
    Ok(OpenAiChatRequest { model, messages })
}
