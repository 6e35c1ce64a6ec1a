use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::DEFAULT_MAX_ATTEMPTS;
use crate::error::ChatError;
use crate::http::{DynHttpTransport, HttpRequest, HttpResponse, post_json_with_headers};
use crate::provider::retry::with_transient_retry;

use super::error::parse_gemini_error;
use super::request::build_file_question_body;
use super::response::map_response;
use super::types::{
    GeminiGenerateContentResponse, GeminiUploadMetadata, GeminiUploadResponse, GeminiUploadStart,
};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const PROVIDER: &str = "google_gemini";

/// File stored through the Gemini Files API and referenced by URI in prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Resource name such as `files/abc123`.
    pub name: String,
    pub uri: String,
    pub mime_type: String,
}

/// Google Gemini provider for file upload and GenerateContent.
pub struct GoogleGeminiProvider {
    pub(crate) transport: DynHttpTransport,
    pub(crate) base_url: String,
    pub(crate) api_key: String,
    pub(crate) model: String,
    pub(crate) max_attempts: u32,
}

impl GoogleGeminiProvider {
    /// Creates a provider that targets the default Generative Language endpoint
    /// with `gemini-2.0-flash`.
    pub fn new(transport: DynHttpTransport, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the base URL, making it easier to point at proxies.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the total attempts for transient transport failures.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub(crate) fn upload_endpoint(&self) -> String {
        format!("{}/upload/v1beta/files", self.base())
    }

    /// Builds the non-streaming endpoint URL for GenerateContent.
    pub(crate) fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/{}:generateContent",
            self.base(),
            normalize_model(&self.model)
        )
    }

    fn auth_headers(&self) -> HashMap<String, String> {
        HashMap::from([("x-goog-api-key".to_string(), self.api_key.clone())])
    }

    /// Uploads `bytes` with the resumable protocol: a `start` command that returns
    /// a session URL, then a single `upload, finalize` chunk.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Provider`] on transport failures, non-2xx responses, a
    /// missing session URL, or an unparseable file descriptor.
    pub async fn upload_file(
        &self,
        bytes: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedFile, ChatError> {
        let session_url = self.start_upload(bytes.len(), mime_type, display_name).await?;

        let mut headers = self.auth_headers();
        headers.insert("X-Goog-Upload-Offset".to_string(), "0".to_string());
        headers.insert(
            "X-Goog-Upload-Command".to_string(),
            "upload, finalize".to_string(),
        );
        let response = with_transient_retry(self.max_attempts, || {
            let request = HttpRequest::post_bytes(session_url.as_str(), mime_type, bytes.clone())
                .with_headers(headers.clone());
            async move {
                self.transport
                    .send(request)
                    .await
                    .map_err(|err| ChatError::transport(PROVIDER, err))
            }
        })
        .await?;

        let uploaded: GeminiUploadResponse = self.parse_success(response)?;
        info!(
            name = %uploaded.file.name,
            state = uploaded.file.state.as_deref().unwrap_or_default(),
            "uploaded file"
        );
        Ok(UploadedFile {
            name: uploaded.file.name,
            uri: uploaded.file.uri,
            mime_type: uploaded
                .file
                .mime_type
                .unwrap_or_else(|| mime_type.to_string()),
        })
    }

    async fn start_upload(
        &self,
        size: usize,
        mime_type: &str,
        display_name: &str,
    ) -> Result<String, ChatError> {
        let mut headers = self.auth_headers();
        headers.insert(
            "X-Goog-Upload-Protocol".to_string(),
            "resumable".to_string(),
        );
        headers.insert("X-Goog-Upload-Command".to_string(), "start".to_string());
        headers.insert(
            "X-Goog-Upload-Header-Content-Length".to_string(),
            size.to_string(),
        );
        headers.insert(
            "X-Goog-Upload-Header-Content-Type".to_string(),
            mime_type.to_string(),
        );
        let body = GeminiUploadStart {
            file: GeminiUploadMetadata { display_name },
        };

        debug!(size, mime_type, "starting resumable upload");
        let response = with_transient_retry(self.max_attempts, || {
            post_json_with_headers(
                self.transport.as_ref(),
                PROVIDER,
                self.upload_endpoint(),
                headers.clone(),
                &body,
            )
        })
        .await?;

        if !response.is_success() {
            return Err(parse_gemini_error(response.status, &response.text()));
        }
        response
            .header("x-goog-upload-url")
            .map(str::to_string)
            .ok_or_else(|| {
                ChatError::provider(
                    PROVIDER,
                    response.status,
                    "upload start response is missing x-goog-upload-url",
                )
            })
    }

    /// Asks a question about a previously uploaded file and returns the answer text.
    pub async fn generate_with_file(
        &self,
        file: &UploadedFile,
        question: &str,
    ) -> Result<String, ChatError> {
        let body = build_file_question_body(file, question)?;
        debug!(endpoint = %self.endpoint(), file = %file.name, "generate content");
        let response = with_transient_retry(self.max_attempts, || {
            post_json_with_headers(
                self.transport.as_ref(),
                PROVIDER,
                self.endpoint(),
                self.auth_headers(),
                &body,
            )
        })
        .await?;
        let status = response.status;
        let parsed: GeminiGenerateContentResponse = self.parse_success(response)?;
        if let Some(version) = &parsed.model_version {
            debug!(model_version = %version, "generate content completed");
        }
        map_response(parsed, PROVIDER, status)
    }

    fn parse_success<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ChatError> {
        let status = response.status;
        let text = response.text();
        if !response.is_success() {
            return Err(parse_gemini_error(status, &text));
        }
        serde_json::from_str(&text).map_err(|err| {
            ChatError::provider(
                PROVIDER,
                status,
                format!("failed to parse Gemini response: {err}"),
            )
        })
    }
}

fn normalize_model(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}
