use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::types::Message;

pub mod google_gemini;
pub mod openai_chat;
pub mod retry;

/// Chat-completion backend used by [`crate::session::ConversationSession`].
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the full history and returns the assistant reply text.
    async fn complete(&self, messages: &[Message]) -> Result<String, ChatError>;

    /// Provider name used in errors and logs.
    fn name(&self) -> &'static str;
}

/// Thread-safe provider handle.
pub type DynChatProvider = Arc<dyn ChatProvider>;
