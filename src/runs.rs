use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::AssistantsError;
use crate::sse::EventStream;
use crate::transport::AssistantsClient;
use crate::types::{
    is_false, ApiErrorObject, ListPage, ListParams, Metadata, Tool, ToolResources,
    TruncationStrategy, Usage,
};

/// Run status enumeration as reported on the wire.
///
/// Unknown wire strings are retained in [`RunStatus::Unknown`] so a snapshot
/// still decodes; the lifecycle engine converts them into a hard
/// [`AssistantsError::UnexpectedStatus`] rather than silently continuing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Unknown(String),
}

impl RunStatus {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "completed" => Self::Completed,
            "expired" => Self::Expired,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::InProgress => "in_progress",
            Self::RequiresAction => "requires_action",
            Self::Cancelling => "cancelling",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
            Self::Completed => "completed",
            Self::Expired => "expired",
            Self::Unknown(value) => value,
        }
    }

    /// Terminal states: the server will not transition the run further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Failed | Self::Completed | Self::Expired
        )
    }

    /// Stopping points for settle-wait. `requires_action` is not terminal:
    /// control returns to the caller so it can run the submission loop.
    pub fn is_settled(&self) -> bool {
        self.is_terminal() || matches!(self, Self::RequiresAction)
    }
}

impl Serialize for RunStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::parse(&value).unwrap_or(Self::Unknown(value)))
    }
}

/// One execution attempt of an assistant against a thread's message history.
///
/// Owned by the caller and mutated only by replacing it wholesale with the
/// latest server snapshot, never patched field-by-field client-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub object: String,
    pub created_at: i64,
    pub thread_id: String,
    pub assistant_id: String,
    pub status: RunStatus,
    /// Present if and only if `status` is `requires_action`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<ApiErrorObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
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
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_strategy: Option<TruncationStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default)]
    pub parallel_tool_calls: bool,
}

/// Action the server is waiting on before the run can proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_tool_outputs: Option<SubmitToolOutputs>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitToolOutputs {
    pub tool_calls: Vec<ToolCall>,
}

/// A tool call awaiting caller-supplied output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionCall>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    /// Serialized arguments, exactly as produced by the model.
    pub arguments: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Caller-supplied answer to one outstanding tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRunRequest {
    pub assistant_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_instructions: Option<String>,
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
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation_strategy: Option<TruncationStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
}

impl CreateRunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: assistant_id.into(),
            model: None,
            instructions: None,
            additional_instructions: None,
            tools: Vec::new(),
            tool_resources: None,
            metadata: Metadata::new(),
            temperature: None,
            top_p: None,
            stream: false,
            max_prompt_tokens: None,
            max_completion_tokens: None,
            truncation_strategy: None,
            response_format: None,
            tool_choice: None,
            parallel_tool_calls: None,
        }
    }
}

/// Thread payload embedded in a create-thread-and-run request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreadParam {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ThreadMessageParam>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessageParam {
    pub role: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateThreadAndRunRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadParam>,
    #[serde(flatten)]
    pub run: CreateRunRequest,
}

impl CreateThreadAndRunRequest {
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            thread: None,
            run: CreateRunRequest::new(assistant_id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitToolOutputsRequest {
    pub tool_outputs: Vec<ToolOutput>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,
}

impl AssistantsClient {
    /// Create a new run on a thread.
    pub async fn create_run(
        &self,
        thread_id: &str,
        req: &CreateRunRequest,
    ) -> Result<Run, AssistantsError> {
        self.post_json(&format!("/threads/{thread_id}/runs"), Some(req))
            .await
    }

    /// Create a new run and stream its events.
    pub async fn create_run_stream(
        &self,
        thread_id: &str,
        req: &CreateRunRequest,
    ) -> Result<EventStream, AssistantsError> {
        let mut req = req.clone();
        req.stream = true;
        let response = self
            .open_stream(&format!("/threads/{thread_id}/runs"), &req)
            .await?;
        Ok(EventStream::spawn_reader(response))
    }

    /// Create a thread and a run on it in one request.
    pub async fn create_thread_and_run(
        &self,
        req: &CreateThreadAndRunRequest,
    ) -> Result<Run, AssistantsError> {
        self.post_json("/threads/runs", Some(req)).await
    }

    /// Create a thread and run in one request and stream the run's events.
    pub async fn create_thread_and_run_stream(
        &self,
        req: &CreateThreadAndRunRequest,
    ) -> Result<EventStream, AssistantsError> {
        let mut req = req.clone();
        req.run.stream = true;
        let response = self.open_stream("/threads/runs", &req).await?;
        Ok(EventStream::spawn_reader(response))
    }

    pub async fn list_runs(
        &self,
        thread_id: &str,
        params: &ListParams,
    ) -> Result<ListPage<Run>, AssistantsError> {
        let query = params.to_query();
        self.get_json(&format!("/threads/{thread_id}/runs{query}"))
            .await
    }

    pub async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantsError> {
        self.get_json(&format!("/threads/{thread_id}/runs/{run_id}"))
            .await
    }

    /// Replace a run's metadata.
    pub async fn modify_run(
        &self,
        thread_id: &str,
        run_id: &str,
        metadata: &Metadata,
    ) -> Result<Run, AssistantsError> {
        let body = serde_json::json!({ "metadata": metadata });
        self.post_json(&format!("/threads/{thread_id}/runs/{run_id}"), Some(&body))
            .await
    }

    /// Request cancellation. The run settles through `cancelling` to
    /// `cancelled` server-side; the returned snapshot may still be in flight.
    pub async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantsError> {
        self.post_json::<Run, ()>(&format!("/threads/{thread_id}/runs/{run_id}/cancel"), None)
            .await
    }

    /// Submit tool outputs synchronously, returning the updated snapshot.
    ///
    /// The protocol requires all outstanding tool calls for the run to be
    /// answered in the same submission; the set is forwarded as given.
    pub async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        req: &SubmitToolOutputsRequest,
    ) -> Result<Run, AssistantsError> {
        self.post_json(
            &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            Some(req),
        )
        .await
    }

    /// Submit tool outputs and stream the resumed run's events.
    pub async fn submit_tool_outputs_stream(
        &self,
        thread_id: &str,
        run_id: &str,
        req: &SubmitToolOutputsRequest,
    ) -> Result<EventStream, AssistantsError> {
        let mut req = req.clone();
        req.stream = true;
        let response = self
            .open_stream(
                &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
                &req,
            )
            .await?;
        Ok(EventStream::spawn_reader(response))
    }
}
