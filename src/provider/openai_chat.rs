//! OpenAI-compatible chat-completions adapter.
//!
//! Every built-in provider (including Gemini's compatibility layer) speaks this
//! schema, so one adapter parameterized by base URL and model covers them all.

mod error;
mod provider;
mod request;
mod response;
mod types;

pub use provider::OpenAiChatProvider;
