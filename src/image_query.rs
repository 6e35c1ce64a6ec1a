//! Single-shot question answering about an image.

use std::path::Path;

use tracing::{info, warn};

use crate::error::ChatError;
use crate::http::DynHttpTransport;
use crate::provider::google_gemini::GoogleGeminiProvider;

/// Environment variable consulted when no key override is given.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";
/// Markdown reply to a quit keyword.
pub const GOODBYE: &str = "# GoodBye...";

const QUIT_KEYWORDS: [&str; 3] = ["quit", "q", "exit"];

/// Returns `true` for `quit`, `q` and `exit`, ignoring case and surrounding space.
pub fn is_quit_keyword(text: &str) -> bool {
    let text = text.trim();
    QUIT_KEYWORDS
        .iter()
        .any(|keyword| text.eq_ignore_ascii_case(keyword))
}

/// Uploads an image to Gemini and asks one question about it.
///
/// Stateless: every call is independent and renders its outcome as Markdown.
pub struct ImageQueryHandler {
    transport: DynHttpTransport,
    default_api_key: Option<String>,
    base_url: Option<String>,
    max_attempts: Option<u32>,
}

impl ImageQueryHandler {
    /// Creates a handler whose default key is read once from `GOOGLE_API_KEY`.
    pub fn from_env(transport: DynHttpTransport) -> Self {
        Self::new(transport, std::env::var(GOOGLE_API_KEY_ENV).ok())
    }

    pub fn new(transport: DynHttpTransport, default_api_key: Option<String>) -> Self {
        Self {
            transport,
            default_api_key,
            base_url: None,
            max_attempts: None,
        }
    }

    /// Points the handler at a different Generative Language endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Answers `question` about the image at `image_path`.
    ///
    /// Never fails: validation problems and provider errors come back as
    /// `**Error:** ...` text, and a quit keyword yields [`GOODBYE`] without any
    /// network traffic.
    pub async fn answer(
        &self,
        image_path: &str,
        question: &str,
        api_key_override: Option<&str>,
    ) -> String {
        if is_quit_keyword(question) {
            return GOODBYE.to_string();
        }
        match self.try_answer(image_path, question, api_key_override).await {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "image query failed");
                format!("**Error:** {}", err.message())
            }
        }
    }

    async fn try_answer(
        &self,
        image_path: &str,
        question: &str,
        api_key_override: Option<&str>,
    ) -> Result<String, ChatError> {
        let api_key = self
            .resolve_api_key(api_key_override)
            .ok_or_else(|| ChatError::configuration("Please provide a valid Google API key."))?;
        if image_path.trim().is_empty() {
            return Err(ChatError::validation("Please upload an image file."));
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::validation(
                "Please enter a question about the image.",
            ));
        }

        let path = Path::new(image_path.trim());
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            ChatError::validation(format!("failed to read {}: {err}", path.display()))
        })?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_type_for(path);

        let provider = self.provider(api_key);
        info!(file = %display_name, mime_type, bytes = bytes.len(), "uploading image");
        let file = provider.upload_file(bytes, mime_type, &display_name).await?;
        provider.generate_with_file(&file, question).await
    }

    /// Non-blank override wins, then the environment default.
    fn resolve_api_key(&self, api_key_override: Option<&str>) -> Option<String> {
        api_key_override
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| {
                self.default_api_key
                    .as_deref()
                    .map(str::trim)
                    .filter(|key| !key.is_empty())
                    .map(str::to_string)
            })
    }

    fn provider(&self, api_key: String) -> GoogleGeminiProvider {
        let mut provider = GoogleGeminiProvider::new(self.transport.clone(), api_key);
        if let Some(base_url) = &self.base_url {
            provider = provider.with_base_url(base_url.clone());
        }
        if let Some(max_attempts) = self.max_attempts {
            provider = provider.with_max_attempts(max_attempts);
        }
        provider
    }
}

/// Infers an image MIME type from the file extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use crate::http::HttpResponse;
    use crate::http::testing::{ScriptedTransport, ok, respond};

    use super::*;

    fn image_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("temp file");
        file.write_all(b"\x89PNG fake image").expect("write");
        file
    }

    #[test]
    fn quit_keywords_ignore_case() {
        for word in ["quit", "Q", "exit", " EXIT "] {
            assert!(is_quit_keyword(word), "{word} should quit");
        }
        assert!(!is_quit_keyword("question"));
        assert!(!is_quit_keyword(""));
    }

    #[test]
    fn mime_types_follow_extension() {
        assert_eq!(mime_type_for(Path::new("a/b/cat.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("cat.webp")), "image/webp");
        assert_eq!(mime_type_for(Path::new("cat")), "application/octet-stream");
    }

    #[tokio::test]
    async fn quit_returns_goodbye_without_network() {
        let transport = ScriptedTransport::new(Vec::new());
        let handler = ImageQueryHandler::new(transport.clone(), None);

        for word in ["quit", "Q", "exit"] {
            assert_eq!(handler.answer("", word, None).await, GOODBYE);
        }
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn validation_runs_in_order() {
        let transport = ScriptedTransport::new(Vec::new());
        let no_key = ImageQueryHandler::new(transport.clone(), Some("  ".to_string()));
        assert_eq!(
            no_key.answer("", "", None).await,
            "**Error:** Please provide a valid Google API key."
        );

        let handler = ImageQueryHandler::new(transport.clone(), Some("AIza".to_string()));
        assert_eq!(
            handler.answer("", "", None).await,
            "**Error:** Please upload an image file."
        );
        assert_eq!(
            handler.answer("cat.png", "   ", None).await,
            "**Error:** Please enter a question about the image."
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn override_key_is_used_when_present() {
        let image = image_file();
        let transport = ScriptedTransport::new(vec![
            Ok(HttpResponse {
                status: 200,
                headers: HashMap::from([(
                    "x-goog-upload-url".to_string(),
                    "https://upload.example/s".to_string(),
                )]),
                body: Vec::new(),
            }),
            ok(r#"{"file":{"name":"files/x","uri":"https://g/files/x","mimeType":"image/png"}}"#),
            ok(r#"{"candidates":[{"content":{"parts":[{"text":"Looks like a PNG."}]}}]}"#),
        ]);
        let handler = ImageQueryHandler::new(transport.clone(), None);

        let answer = handler
            .answer(
                image.path().to_str().expect("utf-8 path"),
                "What is it?",
                Some("override-key"),
            )
            .await;
        assert_eq!(answer, "Looks like a PNG.");

        let requests = transport.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|request| {
            request.headers.get("x-goog-api-key") == Some(&"override-key".to_string())
        }));
        assert_eq!(requests[1].body, b"\x89PNG fake image".to_vec());
    }

    #[tokio::test]
    async fn provider_error_is_rendered_inline() {
        let image = image_file();
        let transport = ScriptedTransport::new(vec![respond(
            403,
            r#"{"error":{"code":403,"message":"Permission denied","status":"PERMISSION_DENIED"}}"#,
        )]);
        let handler = ImageQueryHandler::new(transport, Some("AIza".to_string()));

        let answer = handler
            .answer(image.path().to_str().expect("utf-8 path"), "What?", None)
            .await;
        assert_eq!(answer, "**Error:** Permission denied (PERMISSION_DENIED)");
    }

    #[tokio::test]
    async fn unreadable_image_is_reported() {
        let transport = ScriptedTransport::new(Vec::new());
        let handler = ImageQueryHandler::new(transport.clone(), Some("AIza".to_string()));

        let answer = handler
            .answer("/definitely/not/here.png", "What?", None)
            .await;
        assert!(answer.starts_with("**Error:** failed to read"), "{answer}");
        assert!(transport.requests().is_empty());
    }
}
