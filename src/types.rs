use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form key/value annotations attached to most resources.
pub type Metadata = serde_json::Map<String, Value>;

/// Cursor pagination parameters shared by every list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub limit: Option<u32>,
    /// `"asc"` or `"desc"`.
    pub order: Option<String>,
    pub after: Option<String>,
    pub before: Option<String>,
}

impl ListParams {
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    pub fn with_after(mut self, after: impl Into<String>) -> Self {
        self.after = Some(after.into());
        self
    }

    pub fn with_before(mut self, before: impl Into<String>) -> Self {
        self.before = Some(before.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(order) = &self.order {
            pairs.push(("order".to_string(), order.clone()));
        }
        if let Some(after) = &self.after {
            pairs.push(("after".to_string(), after.clone()));
        }
        if let Some(before) = &self.before {
            pairs.push(("before".to_string(), before.clone()));
        }
        pairs
    }

    /// Render as a query string, empty when no parameter is set.
    pub fn to_query(&self) -> String {
        query_string(&self.pairs())
    }
}

pub(crate) fn query_string(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let joined = pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    format!("?{joined}")
}

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// List envelope returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub object: String,
    pub data: Vec<T>,
    #[serde(default)]
    pub first_id: Option<String>,
    #[serde(default)]
    pub last_id: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Deletion acknowledgement envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionStatus {
    pub id: String,
    pub object: String,
    pub deleted: bool,
}

/// A tool an assistant may invoke during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<FunctionTool>,
}

impl Tool {
    pub fn function(function: FunctionTool) -> Self {
        Self {
            kind: "function".to_string(),
            function: Some(function),
        }
    }
}

/// Caller-defined function tool. `parameters` is an opaque JSON schema passed
/// through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionTool {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_interpreter: Option<CodeInterpreterResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_search: Option<FileSearchResources>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeInterpreterResources {
    pub file_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSearchResources {
    pub vector_store_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruncationStrategy {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_messages: Option<u32>,
}

/// Token usage reported on settled runs and run steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Error detail attached to failed runs and run steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}
