use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssistantsError;
use crate::transport::AssistantsClient;
use crate::types::{query_string, DeletionStatus, ListPage, ListParams, Metadata};

/// A message stored on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_details: Option<IncompleteDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_at: Option<i64>,
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncompleteDetails {
    pub reason: String,
}

/// One content part of a message. The `kind` tag selects which detail field
/// is populated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<MessageText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ImageUrl>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_file: Option<ImageFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageText {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageFile {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub file_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<AttachmentTool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentTool {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMessageRequest {
    pub role: String,
    /// Either a plain string or a structured content-part array; the shape is
    /// caller-defined and passed through opaque.
    pub content: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl CreateMessageRequest {
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Value::String(content.into()),
            attachments: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

/// Message listing adds a `run_id` filter to the shared cursor parameters.
#[derive(Debug, Clone, Default)]
pub struct MessageListParams {
    pub base: ListParams,
    pub run_id: Option<String>,
}

impl MessageListParams {
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }

    pub fn to_query(&self) -> String {
        let mut pairs = self.base.pairs();
        if let Some(run_id) = &self.run_id {
            pairs.push(("run_id".to_string(), run_id.clone()));
        }
        query_string(&pairs)
    }
}

impl AssistantsClient {
    pub async fn create_message(
        &self,
        thread_id: &str,
        req: &CreateMessageRequest,
    ) -> Result<ThreadMessage, AssistantsError> {
        self.post_json(&format!("/threads/{thread_id}/messages"), Some(req))
            .await
    }

    pub async fn list_messages(
        &self,
        thread_id: &str,
        params: &MessageListParams,
    ) -> Result<ListPage<ThreadMessage>, AssistantsError> {
        let query = params.to_query();
        self.get_json(&format!("/threads/{thread_id}/messages{query}"))
            .await
    }

    pub async fn get_message(
        &self,
        thread_id: &str,
        message_id: &str,
    ) -> Result<ThreadMessage, AssistantsError> {
        self.get_json(&format!("/threads/{thread_id}/messages/{message_id}"))
            .await
    }

    /// Replace a message's metadata.
    pub async fn modify_message(
        &self,
        thread_id: &str,
        message_id: &str,
        metadata: &Metadata,
    ) -> Result<ThreadMessage, AssistantsError> {
        let body = serde_json::json!({ "metadata": metadata });
        self.post_json(
            &format!("/threads/{thread_id}/messages/{message_id}"),
            Some(&body),
        )
        .await
    }

    pub async fn delete_message(
        &self,
        thread_id: &str,
        message_id: &str,
    ) -> Result<DeletionStatus, AssistantsError> {
        self.delete_json(&format!("/threads/{thread_id}/messages/{message_id}"))
            .await
    }
}
