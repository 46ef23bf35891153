use std::collections::{BTreeMap, BTreeSet};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::AssistantsError;
use crate::runs::{Run, RunStatus, SubmitToolOutputsRequest, ToolCall, ToolOutput};
use crate::sse::EventStream;
use crate::transport::AssistantsClient;

/// Optional cancellation signal shared across poll and submission loops.
pub type CancellationSignal = Arc<AtomicBool>;

const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Polling knobs for [`wait_for_settle`].
///
/// Defaults mirror a sixty-second budget polled once per second.
#[derive(Debug, Clone, Copy)]
pub struct SettleOptions {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for SettleOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(60),
        }
    }
}

impl SettleOptions {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// The run-gateway surface the lifecycle engine polls against.
///
/// [`AssistantsClient`] is the production implementation; tests substitute
/// scripted gateways.
pub trait RunGateway {
    fn fetch_run(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> impl Future<Output = Result<Run, AssistantsError>>;
}

impl RunGateway for AssistantsClient {
    async fn fetch_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantsError> {
        self.get_run(thread_id, run_id).await
    }
}

/// Poll a run until it reaches a stopping point and return the last snapshot.
///
/// Stopping points are the terminal statuses (`completed`, `failed`,
/// `cancelled`, `expired`) and `requires_action`, which is handed back to the
/// caller every cycle so it can run the submission loop; this function never
/// resolves it. `queued`, `in_progress`, and `cancelling` sleep one poll
/// interval and re-poll. A run that is already settled returns on the first
/// poll without sleeping.
///
/// Fails with [`AssistantsError::Timeout`] when no stopping point is reached
/// before the deadline, [`AssistantsError::UnexpectedStatus`] on a status
/// outside the known enumeration, [`AssistantsError::Cancelled`] when the
/// signal fires (observed within a bounded poll interval of any await), and
/// propagates any poll failure.
///
/// Drive each run id from at most one settle-wait or stream decode at a time;
/// concurrent flows over the same run are undefined.
pub async fn wait_for_settle<G: RunGateway>(
    gateway: &G,
    thread_id: &str,
    run_id: &str,
    options: SettleOptions,
    cancellation: Option<&CancellationSignal>,
) -> Result<Run, AssistantsError> {
    let deadline = Instant::now() + options.timeout;

    loop {
        if is_cancelled(cancellation) {
            return Err(AssistantsError::Cancelled);
        }

        let run = await_or_cancel(gateway.fetch_run(thread_id, run_id), cancellation).await??;

        if let RunStatus::Unknown(status) = &run.status {
            return Err(AssistantsError::UnexpectedStatus(status.clone()));
        }
        if run.status.is_settled() {
            return Ok(run);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(AssistantsError::Timeout);
        }
        // Cap the final sleep at the remaining budget so the last poll lands
        // on the deadline rather than past it.
        let pause = options.poll_interval.min(deadline - now);
        await_or_cancel(tokio::time::sleep(pause), cancellation).await?;
    }
}

/// Tool calls the server is waiting on, empty when the run requires none.
pub fn required_tool_calls(run: &Run) -> &[ToolCall] {
    run.required_action
        .as_ref()
        .and_then(|action| action.submit_tool_outputs.as_ref())
        .map(|submit| submit.tool_calls.as_slice())
        .unwrap_or(&[])
}

/// Pair the run's outstanding tool calls with caller-supplied outputs.
///
/// The result preserves the outstanding-call order. Partial submission stalls
/// the run server-side, so a mismatch in either direction (an outstanding
/// call without an output, or an output for an id that is not outstanding)
/// fails with [`AssistantsError::MismatchedToolCalls`] instead of silently
/// submitting a partial set.
pub fn build_tool_outputs(
    run: &Run,
    outputs: &BTreeMap<String, String>,
) -> Result<Vec<ToolOutput>, AssistantsError> {
    let calls = required_tool_calls(run);
    let outstanding: BTreeSet<&str> = calls.iter().map(|call| call.id.as_str()).collect();

    let missing: Vec<String> = calls
        .iter()
        .filter(|call| !outputs.contains_key(&call.id))
        .map(|call| call.id.clone())
        .collect();
    let unexpected: Vec<String> = outputs
        .keys()
        .filter(|id| !outstanding.contains(id.as_str()))
        .cloned()
        .collect();

    if !missing.is_empty() || !unexpected.is_empty() {
        return Err(AssistantsError::MismatchedToolCalls {
            missing,
            unexpected,
        });
    }

    Ok(calls
        .iter()
        .map(|call| ToolOutput {
            tool_call_id: call.id.clone(),
            output: outputs[&call.id].clone(),
        })
        .collect())
}

/// Validate and submit tool outputs synchronously, returning the updated
/// snapshot. Follow up with [`wait_for_settle`]; `requires_action` can recur.
pub async fn submit_outputs(
    client: &AssistantsClient,
    run: &Run,
    outputs: &BTreeMap<String, String>,
) -> Result<Run, AssistantsError> {
    let tool_outputs = build_tool_outputs(run, outputs)?;
    client
        .submit_tool_outputs(
            &run.thread_id,
            &run.id,
            &SubmitToolOutputsRequest {
                tool_outputs,
                stream: false,
            },
        )
        .await
}

/// Validate and submit tool outputs in streaming mode. The caller consumes
/// the returned event sequence to completion, then re-enters settle-wait or
/// another decode pass; `requires_action` can recur.
pub async fn submit_outputs_stream(
    client: &AssistantsClient,
    run: &Run,
    outputs: &BTreeMap<String, String>,
) -> Result<EventStream, AssistantsError> {
    let tool_outputs = build_tool_outputs(run, outputs)?;
    client
        .submit_tool_outputs_stream(
            &run.thread_id,
            &run.id,
            &SubmitToolOutputsRequest {
                tool_outputs,
                stream: true,
            },
        )
        .await
}

fn is_cancelled(cancellation: Option<&CancellationSignal>) -> bool {
    cancellation.is_some_and(|signal| signal.load(Ordering::Acquire))
}

async fn await_or_cancel<F>(
    future: F,
    cancellation: Option<&CancellationSignal>,
) -> Result<F::Output, AssistantsError>
where
    F: Future,
{
    if cancellation.is_none() {
        return Ok(future.await);
    }

    let mut future = Box::pin(future);

    loop {
        if is_cancelled(cancellation) {
            return Err(AssistantsError::Cancelled);
        }

        if let Ok(output) = tokio::time::timeout(CANCEL_POLL_INTERVAL, &mut future).await {
            if is_cancelled(cancellation) {
                return Err(AssistantsError::Cancelled);
            }
            return Ok(output);
        }
    }
}
