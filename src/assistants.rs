use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AssistantsError;
use crate::transport::AssistantsClient;
use crate::types::{DeletionStatus, ListPage, ListParams, Metadata, Tool, ToolResources};

/// A configured assistant: model, instructions, and tool inventory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Caller-defined shape, passed through opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAssistantRequest {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_resources: Option<ToolResources>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
}

impl CreateAssistantRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            name: None,
            description: None,
            instructions: None,
            tools: Vec::new(),
            tool_resources: None,
            metadata: Metadata::new(),
            temperature: None,
            top_p: None,
            response_format: None,
        }
    }
}

impl AssistantsClient {
    pub async fn create_assistant(
        &self,
        req: &CreateAssistantRequest,
    ) -> Result<Assistant, AssistantsError> {
        self.post_json("/assistants", Some(req)).await
    }

    pub async fn list_assistants(
        &self,
        params: &ListParams,
    ) -> Result<ListPage<Assistant>, AssistantsError> {
        let query = params.to_query();
        self.get_json(&format!("/assistants{query}")).await
    }

    pub async fn get_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantsError> {
        self.get_json(&format!("/assistants/{assistant_id}")).await
    }

    /// Replace an assistant's configuration. The body is applied as a full
    /// replacement of the fields it carries, not a field-level merge.
    pub async fn modify_assistant(
        &self,
        assistant_id: &str,
        req: &CreateAssistantRequest,
    ) -> Result<Assistant, AssistantsError> {
        self.post_json(&format!("/assistants/{assistant_id}"), Some(req))
            .await
    }

    pub async fn delete_assistant(
        &self,
        assistant_id: &str,
    ) -> Result<DeletionStatus, AssistantsError> {
        self.delete_json(&format!("/assistants/{assistant_id}"))
            .await
    }
}
