use serde::{Deserialize, Serialize};

use crate::error::AssistantsError;
use crate::transport::AssistantsClient;
use crate::types::{query_string, ApiErrorObject, ListPage, ListParams, Metadata, Usage};

/// Immutable audit record of one action taken during a run: either a message
/// creation or a tool-call batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStep {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub assistant_id: String,
    pub thread_id: String,
    pub run_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub step_details: StepDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ApiErrorObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepDetails {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_creation: Option<MessageCreation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<StepToolCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreation {
    pub message_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: StepFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFunction {
    pub name: String,
    pub arguments: String,
    #[serde(default)]
    pub output: Option<String>,
}

/// Step listing adds repeated `include[]` selectors to the shared cursor
/// parameters, e.g. `step_details.tool_calls[*].file_search.results[*].content`.
#[derive(Debug, Clone, Default)]
pub struct StepListParams {
    pub base: ListParams,
    pub include: Vec<String>,
}

impl StepListParams {
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include.push(include.into());
        self
    }

    pub fn to_query(&self) -> String {
        let mut pairs = self.base.pairs();
        for include in &self.include {
            pairs.push(("include[]".to_string(), include.clone()));
        }
        query_string(&pairs)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GetStepParams {
    pub include: Vec<String>,
}

impl GetStepParams {
    pub fn with_include(mut self, include: impl Into<String>) -> Self {
        self.include.push(include.into());
        self
    }

    pub fn to_query(&self) -> String {
        let pairs: Vec<(String, String)> = self
            .include
            .iter()
            .map(|include| ("include[]".to_string(), include.clone()))
            .collect();
        query_string(&pairs)
    }
}

impl AssistantsClient {
    pub async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
        params: &StepListParams,
    ) -> Result<ListPage<RunStep>, AssistantsError> {
        let query = params.to_query();
        self.get_json(&format!("/threads/{thread_id}/runs/{run_id}/steps{query}"))
            .await
    }

    pub async fn get_run_step(
        &self,
        thread_id: &str,
        run_id: &str,
        step_id: &str,
        params: &GetStepParams,
    ) -> Result<RunStep, AssistantsError> {
        let query = params.to_query();
        self.get_json(&format!(
            "/threads/{thread_id}/runs/{run_id}/steps/{step_id}{query}"
        ))
        .await
    }
}
