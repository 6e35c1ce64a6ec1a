use crate::error::ChatError;

use super::provider::UploadedFile;
use super::types::{
    GeminiFileData, GeminiGenerateContentRequest, GeminiRequestContent, GeminiRequestPart,
};

/// Builds a single user turn holding the file reference followed by the question.
pub(crate) fn build_file_question_body<'a>(
    file: &'a UploadedFile,
    question: &'a str,
) -> Result<GeminiGenerateContentRequest<'a>, ChatError> {
    if question.trim().is_empty() {
        return Err(ChatError::validation("question must not be empty"));
    }
    Ok(GeminiGenerateContentRequest {
        contents: vec![GeminiRequestContent {
            role: "user",
            parts: vec![
                GeminiRequestPart::File {
                    file_data: GeminiFileData {
                        mime_type: &file.mime_type,
                        file_uri: &file.uri,
                    },
                },
                GeminiRequestPart::Text { text: question },
            ],
        }],
    })
}
