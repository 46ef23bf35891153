use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum AssistantsError {
    MissingApiKey,
    InvalidHeader(String),
    /// Connection or IO failure below the API surface.
    Request(reqwest::Error),
    /// Structured non-2xx response from the API, propagated verbatim.
    Api {
        status: StatusCode,
        message: String,
        error_type: Option<String>,
        code: Option<String>,
        param: Option<String>,
    },
    /// Malformed JSON in a snapshot or event payload.
    Decode(JsonError),
    /// Settle-wait exceeded its deadline before reaching a stopping point.
    Timeout,
    /// External cancellation signal observed.
    Cancelled,
    /// Run status outside the known enumeration. Treated as a hard error.
    UnexpectedStatus(String),
    /// Supplied tool outputs do not line up with the run's outstanding calls.
    MismatchedToolCalls {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    Stream(String),
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
    pub code: Option<String>,
    pub param: Option<String>,
}

impl fmt::Display for AssistantsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "api key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Api {
                status,
                message,
                error_type,
                code,
                ..
            } => {
                write!(f, "API error (HTTP {status}): {message}")?;
                if let Some(error_type) = error_type {
                    write!(f, " (type: {error_type})")?;
                }
                if let Some(code) = code {
                    write!(f, " (code: {code})")?;
                }
                Ok(())
            }
            Self::Decode(error) => write!(f, "failed to decode response: {error}"),
            Self::Timeout => write!(f, "timeout waiting for run to settle"),
            Self::Cancelled => write!(f, "operation was cancelled"),
            Self::UnexpectedStatus(status) => write!(f, "unexpected run status: {status}"),
            Self::MismatchedToolCalls {
                missing,
                unexpected,
            } => {
                write!(f, "tool outputs do not match outstanding tool calls")?;
                if !missing.is_empty() {
                    write!(f, " (missing: {})", missing.join(", "))?;
                }
                if !unexpected.is_empty() {
                    write!(f, " (unexpected: {})", unexpected.join(", "))?;
                }
                Ok(())
            }
            Self::Stream(message) => write!(f, "stream failed: {message}"),
        }
    }
}

impl std::error::Error for AssistantsError {}

impl From<reqwest::Error> for AssistantsError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for AssistantsError {
    fn from(error: JsonError) -> Self {
        Self::Decode(error)
    }
}

/// Map a non-success response body into a structured API error.
///
/// Bodies that do not carry the `{"error": {...}}` envelope fall back to the
/// raw body text, or the status line's canonical reason when the body is
/// empty. API errors are never swallowed or downgraded.
pub fn parse_api_error(status: StatusCode, body: &str) -> AssistantsError {
    if let Ok(ErrorPayload { value: Some(fields) }) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = fields.message.filter(|message| !message.is_empty()) {
            return AssistantsError::Api {
                status,
                message,
                error_type: fields.type_.filter(|value| !value.is_empty()),
                code: fields.code.filter(|value| !value.is_empty()),
                param: fields.param.filter(|value| !value.is_empty()),
            };
        }
    }

    let message = if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.to_string()
    };

    AssistantsError::Api {
        status,
        message,
        error_type: None,
        code: None,
        param: None,
    }
}
