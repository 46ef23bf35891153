use serde::{Deserialize, Serialize};

use crate::error::AssistantsError;
use crate::transport::AssistantsClient;
use crate::types::{DeletionStatus, Metadata, ToolResources};

/// A message container runs execute against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Seed message for thread creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageParam {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<String>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl MessageParam {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            attachments: Vec::new(),
            metadata: Metadata::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<MessageParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl AssistantsClient {
    pub async fn create_thread(
        &self,
        req: &CreateThreadRequest,
    ) -> Result<Thread, AssistantsError> {
        self.post_json("/threads", Some(req)).await
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Thread, AssistantsError> {
        self.get_json(&format!("/threads/{thread_id}")).await
    }

    /// Replace a thread's tool resources and metadata.
    ///
    /// Both keys are always sent: `tool_resources` is replaced wholesale
    /// (passing `None` clears it), never merged field-by-field.
    pub async fn modify_thread(
        &self,
        thread_id: &str,
        tool_resources: Option<&ToolResources>,
        metadata: &Metadata,
    ) -> Result<Thread, AssistantsError> {
        let body = serde_json::json!({
            "tool_resources": tool_resources,
            "metadata": metadata,
        });
        self.post_json(&format!("/threads/{thread_id}"), Some(&body))
            .await
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<DeletionStatus, AssistantsError> {
        self.delete_json(&format!("/threads/{thread_id}")).await
    }
}
