use serde::{Deserialize, Serialize};

/// Body of the resumable upload `start` command.
#[derive(Debug, Serialize)]
pub(crate) struct GeminiUploadStart<'a> {
    pub(crate) file: GeminiUploadMetadata<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiUploadMetadata<'a> {
    pub(crate) display_name: &'a str,
}

/// Response of the `upload, finalize` command.
#[derive(Debug, Deserialize)]
pub(crate) struct GeminiUploadResponse {
    pub(crate) file: GeminiFile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiFile {
    pub(crate) name: String,
    pub(crate) uri: String,
    #[serde(default, rename = "mimeType")]
    pub(crate) mime_type: Option<String>,
    #[serde(default)]
    pub(crate) state: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiGenerateContentRequest<'a> {
    pub(crate) contents: Vec<GeminiRequestContent<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiRequestContent<'a> {
    pub(crate) role: &'static str,
    pub(crate) parts: Vec<GeminiRequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub(crate) enum GeminiRequestPart<'a> {
    File {
        #[serde(rename = "fileData")]
        file_data: GeminiFileData<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
pub(crate) struct GeminiFileData<'a> {
    #[serde(rename = "mimeType")]
    pub(crate) mime_type: &'a str,
    #[serde(rename = "fileUri")]
    pub(crate) file_uri: &'a str,
}

/// GenerateContentResponse, reduced to the fields the crate reads.
#[derive(Debug, Deserialize)]
pub(crate) struct GeminiGenerateContentResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<GeminiCandidate>,
    #[serde(default, rename = "promptFeedback")]
    pub(crate) prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default, rename = "modelVersion")]
    pub(crate) model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiCandidate {
    #[serde(default)]
    pub(crate) content: Option<GeminiContent>,
    #[serde(default, rename = "finishReason")]
    pub(crate) finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiContent {
    #[serde(default)]
    pub(crate) parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiResponsePart {
    #[serde(default)]
    pub(crate) text: Option<String>,
    /// Thought summaries are not part of the answer.
    #[serde(default)]
    pub(crate) thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeminiPromptFeedback {
    #[serde(default, rename = "blockReason")]
    pub(crate) block_reason: Option<String>,
}
