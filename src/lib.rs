//! Chat clients for OpenAI-compatible LLM providers plus Gemini image questions.
//!
//! A [`ModelRegistry`] names the supported providers, a [`ConversationSession`]
//! keeps the history of one chat, and the [`repl`], [`web`] and [`image_query`]
//! modules turn those into user-facing front-ends.

pub mod config;
pub mod error;
pub mod http;
pub mod image_query;
pub mod logging;
pub mod persona;
pub mod provider;
pub mod repl;
pub mod session;
pub mod types;
pub mod web;

pub use config::{ClientSettings, ModelConfig, ModelRegistry};
pub use error::{ChatError, TransportError};
pub use image_query::ImageQueryHandler;
pub use persona::Persona;
pub use provider::{ChatProvider, DynChatProvider};
pub use session::ConversationSession;
pub use types::*;
pub use web::{FormOutcome, WebChat};
