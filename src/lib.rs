//! Transport and lifecycle primitives for the Assistants v2 API.
//!
//! This crate owns request/response building and parsing for the assistants,
//! threads, messages, runs, and run-steps endpoints. It intentionally contains
//! no retry/backoff policy and no auth beyond a static bearer token; those are
//! the surrounding application's responsibility.
//!
//! The interesting part is the run lifecycle: [`EventStream`] decodes the SSE
//! run-event wire into ordered [`RunEvent`]s, [`wait_for_settle`] polls a run
//! to a stopping point, and the tool-output helpers close the
//! `requires_action` gap.

pub mod assistants;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod messages;
pub mod run_steps;
pub mod runs;
pub mod sse;
pub mod threads;
pub mod transport;
pub mod types;

pub use assistants::{Assistant, CreateAssistantRequest};
pub use config::{AssistantsConfig, DEFAULT_BASE_URL};
pub use error::AssistantsError;
pub use lifecycle::{
    build_tool_outputs, required_tool_calls, submit_outputs, submit_outputs_stream,
    wait_for_settle, CancellationSignal, RunGateway, SettleOptions,
};
pub use messages::{CreateMessageRequest, MessageListParams, ThreadMessage};
pub use run_steps::{RunStep, StepListParams};
pub use runs::{
    CreateRunRequest, CreateThreadAndRunRequest, Run, RunStatus, SubmitToolOutputsRequest,
    ToolCall, ToolOutput,
};
pub use sse::{EventStream, RunEvent, SseDecoder};
pub use threads::{CreateThreadRequest, Thread};
pub use transport::AssistantsClient;
pub use types::{ListPage, ListParams, Metadata};
