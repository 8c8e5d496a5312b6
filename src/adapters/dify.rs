//! Dify chat client for caption generation and revision.
//!
//! The caption workflow lives in a Dify chat app: generation sends the
//! planning inputs with a trigger query, revision continues the same
//! conversation. Reference documents are uploaded first and passed both
//! inside `inputs` and as the top-level `files` array (the app reads
//! `sys.files`).

use std::path::Path;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ServiceError;

const SERVICE: &str = "dify";
/// Trigger message for the generation flow.
const GENERATE_QUERY: &str = "キャプション生成";

/// Dify chat API client
pub struct DifyClient {
    endpoint: String,
    api_key: String,
    /// End-user identity passed with every request, one per client.
    user: String,
    client: reqwest::Client,
}

/// Planning inputs the chat app expects.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptionInputs {
    pub planning_proposal: String,
    pub planning_intent: String,
    pub ref_url1: String,
    pub ref_url2: String,
    pub ref_url3: String,
}

/// A generated or revised caption plus the conversation handle for
/// follow-up revisions.
#[derive(Debug, Clone)]
pub struct GeneratedCaption {
    pub answer: String,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize)]
struct DifyFile {
    #[serde(rename = "type")]
    file_type: &'static str,
    transfer_method: &'static str,
    upload_file_id: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    inputs: ChatInputs<'a>,
    query: &'a str,
    response_mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<&'a str>,
    user: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<Vec<DifyFile>>,
}

#[derive(Debug, Serialize)]
struct ChatInputs<'a> {
    planning_proposal: &'a str,
    planning_intent: &'a str,
    ref_url1: &'a str,
    ref_url2: &'a str,
    ref_url3: &'a str,
    /// Always present, empty when no documents were uploaded.
    reference_documents: Vec<DifyFile>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: String,
    conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

impl DifyClient {
    pub fn new(endpoint: String, api_key: String) -> Self {
        Self {
            endpoint,
            api_key,
            user: format!("capcheck-{}", Uuid::new_v4()),
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), path)
    }

    /// Upload one reference document, returning its upload file id.
    async fn upload_file(&self, path: &Path) -> Result<DifyFile, ServiceError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ServiceError::File {
                path: path.display().to_string(),
                source,
            })?;

        let form = reqwest::multipart::Form::new()
            .text("user", self.user.clone())
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name.clone()),
            );

        let response = self
            .client
            .post(self.api_url("files/upload"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ServiceError::Network {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }

        let upload: UploadResponse =
            response
                .json()
                .await
                .map_err(|source| ServiceError::Network {
                    service: SERVICE,
                    source,
                })?;

        Ok(DifyFile {
            file_type: file_type_for(&file_name),
            transfer_method: "local_file",
            upload_file_id: upload.id,
        })
    }

    /// Generate a caption from planning inputs and optional reference
    /// documents.
    pub async fn generate(
        &self,
        inputs: &CaptionInputs,
        files: &[std::path::PathBuf],
    ) -> Result<GeneratedCaption, ServiceError> {
        let mut uploaded = Vec::with_capacity(files.len());
        for path in files {
            uploaded.push(self.upload_file(path).await?);
        }

        let request = ChatRequest {
            inputs: ChatInputs {
                planning_proposal: &inputs.planning_proposal,
                planning_intent: &inputs.planning_intent,
                ref_url1: &inputs.ref_url1,
                ref_url2: &inputs.ref_url2,
                ref_url3: &inputs.ref_url3,
                reference_documents: uploaded.clone(),
            },
            query: GENERATE_QUERY,
            response_mode: "blocking",
            conversation_id: None,
            user: &self.user,
            files: (!uploaded.is_empty()).then_some(uploaded),
        };

        self.send_chat(&request).await
    }

    /// Revise a previously generated caption with a free-form instruction.
    pub async fn revise(
        &self,
        query: &str,
        conversation_id: Option<&str>,
    ) -> Result<GeneratedCaption, ServiceError> {
        let inputs = CaptionInputs::default();
        let request = ChatRequest {
            inputs: ChatInputs {
                planning_proposal: &inputs.planning_proposal,
                planning_intent: &inputs.planning_intent,
                ref_url1: &inputs.ref_url1,
                ref_url2: &inputs.ref_url2,
                ref_url3: &inputs.ref_url3,
                reference_documents: Vec::new(),
            },
            query,
            response_mode: "blocking",
            conversation_id,
            user: &self.user,
            files: None,
        };

        self.send_chat(&request).await
    }

    async fn send_chat(&self, request: &ChatRequest<'_>) -> Result<GeneratedCaption, ServiceError> {
        let response = self
            .client
            .post(self.api_url("chat-messages"))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|source| ServiceError::Network {
                service: SERVICE,
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.status_error(status, response).await);
        }

        let body: ChatResponse =
            response
                .json()
                .await
                .map_err(|source| ServiceError::Network {
                    service: SERVICE,
                    source,
                })?;

        Ok(GeneratedCaption {
            answer: body.answer,
            conversation_id: body.conversation_id,
        })
    }

    async fn status_error(
        &self,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ServiceError {
        let body: ErrorResponse = response.json().await.unwrap_or_default();
        ServiceError::Status {
            service: SERVICE,
            status: status.as_u16(),
            message: body.message.unwrap_or_else(|| status.to_string()),
        }
    }
}

/// Dify file type from the uploaded file's extension.
fn file_type_for(file_name: &str) -> &'static str {
    let ext = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
    match ext.as_str() {
        "png" | "jpg" | "jpeg" | "gif" | "webp" => "image",
        _ => "document",
    }
}
