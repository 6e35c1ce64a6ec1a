//! Google Gemini native API: Files API upload and multimodal generateContent.
//!
//! Used by the image-query front-end, which needs file references that the
//! OpenAI-compatible layer does not expose.

mod error;
mod provider;
mod request;
mod response;
mod types;

pub use provider::{GoogleGeminiProvider, UploadedFile};
