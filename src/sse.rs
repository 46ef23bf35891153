use futures_util::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::mpsc;

use crate::error::AssistantsError;

/// Event name of the synthetic terminal event emitted for the `[DONE]` frame.
pub const EVENT_DONE: &str = "done";
/// Event name of the synthetic in-band event carrying a stream read failure.
pub const EVENT_ERROR: &str = "error";

const DONE_SENTINEL: &str = "[DONE]";

/// Bounded hand-off capacity between the reader task and the consumer. The
/// reader blocks producing the next event until the consumer drains.
const CHANNEL_CAPACITY: usize = 16;

/// One decoded server-sent event: wire event name plus the raw data payload.
///
/// Ordering is significant and preserved exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    pub event: String,
    pub data: String,
}

impl RunEvent {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    pub(crate) fn done() -> Self {
        Self::new(EVENT_DONE, "")
    }

    pub(crate) fn read_error(message: &str) -> Self {
        Self::new(EVENT_ERROR, json!({ "error": message }).to_string())
    }

    pub fn is_done(&self) -> bool {
        self.event == EVENT_DONE
    }

    pub fn is_error(&self) -> bool {
        self.event == EVENT_ERROR
    }

    /// Decode the raw payload into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, AssistantsError> {
        serde_json::from_str(&self.data).map_err(AssistantsError::from)
    }
}

/// Incremental decoder for the SSE run-event wire format.
///
/// Line oriented: `event:` lines set the sticky current event name, `data:`
/// lines yield one event each, blank lines separate frames, and any other
/// line shape is ignored for forward compatibility. The literal `[DONE]`
/// payload yields exactly one terminal [`EVENT_DONE`] event, after which the
/// decoder is finished and further input is discarded.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    current_event: String,
    finished: bool,
}

impl SseDecoder {
    /// Feed arbitrary bytes into the decoder and drain complete events.
    ///
    /// Chunk boundaries carry no meaning: bytes are buffered raw and only
    /// complete lines are converted to text, so a multibyte character split
    /// across chunks is reassembled before conversion. Payload bytes after
    /// the `data: ` marker are preserved exactly; only the line terminator
    /// (`\n` or `\r\n`) is stripped.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<RunEvent> {
        if self.finished {
            return Vec::new();
        }
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(split) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let mut raw: Vec<u8> = self.buffer.drain(0..=split).collect();
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
            let line = String::from_utf8_lossy(&raw);

            if line.is_empty() {
                // Frame separator.
                continue;
            }
            if let Some(name) = line.strip_prefix("event: ") {
                self.current_event = name.to_string();
                continue;
            }
            if let Some(data) = line.strip_prefix("data: ") {
                if data == DONE_SENTINEL {
                    events.push(RunEvent::done());
                    self.finished = true;
                    self.buffer.clear();
                    break;
                }
                events.push(RunEvent::new(self.current_event.clone(), data));
            }
            // Other field lines (id:, retry:, comments) are ignored.
        }

        events
    }

    /// Whether the terminal `[DONE]` frame has been decoded.
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Decode a complete SSE payload in one shot.
    pub fn parse_frames(input: &str) -> Vec<RunEvent> {
        let mut decoder = Self::default();
        decoder.feed(input.as_bytes())
    }
}

/// Consumer handle over a live event stream.
///
/// A single reader task drives the HTTP body, decodes frames, and pushes
/// events through a bounded channel; dropping this handle stops the reader at
/// its next send. The sequence is single-pass and finite: it ends on the
/// `[DONE]` sentinel, end of stream, or a read error delivered in-band as one
/// final [`EVENT_ERROR`] event.
#[derive(Debug)]
pub struct EventStream {
    rx: mpsc::Receiver<RunEvent>,
}

impl EventStream {
    /// Receive the next event in wire order, or `None` once the stream ends.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Drain the stream to completion.
    pub async fn collect(mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.recv().await {
            events.push(event);
        }
        events
    }

    pub(crate) fn spawn_reader(response: reqwest::Response) -> Self {
        Self::from_bytes_stream(response.bytes_stream())
    }

    /// Spawn the reader task over any chunked byte source.
    ///
    /// The source (and with it the underlying connection) is dropped exactly
    /// once when the reader exits, on every exit path.
    pub fn from_bytes_stream<S, B, E>(stream: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + Unpin + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(read_loop(stream, tx));
        Self { rx }
    }
}

async fn read_loop<S, B, E>(mut stream: S, tx: mpsc::Sender<RunEvent>)
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
{
    let mut decoder = SseDecoder::default();

    loop {
        let chunk = match stream.next().await {
            Some(Ok(chunk)) => chunk,
            Some(Err(error)) => {
                let _ = tx.send(RunEvent::read_error(&error.to_string())).await;
                return;
            }
            // Clean end of stream with no pending terminal event.
            None => return,
        };

        for event in decoder.feed(chunk.as_ref()) {
            if tx.send(event).await.is_err() {
                // Consumer abandoned the channel.
                return;
            }
        }
        if decoder.finished() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{RunEvent, SseDecoder};

    #[test]
    fn decode_frames_incrementally_across_chunk_splits() {
        let mut decoder = SseDecoder::default();

        assert!(decoder
            .feed(b"event: thread.run.created\ndata: {\"id\":\"run_1\"")
            .is_empty());
        let events = decoder.feed(b",\"status\":\"queued\"}\n\n");
        assert_eq!(
            events,
            vec![RunEvent::new(
                "thread.run.created",
                "{\"id\":\"run_1\",\"status\":\"queued\"}"
            )]
        );
    }

    #[test]
    fn decoder_discards_input_after_done() {
        let mut decoder = SseDecoder::default();
        let events = decoder.feed(b"data: [DONE]\n\n");
        assert_eq!(events, vec![RunEvent::done()]);
        assert!(decoder.finished());
        assert!(decoder.feed(b"data: {\"late\":true}\n\n").is_empty());
    }

    #[test]
    fn read_error_payload_is_json_escaped() {
        let event = RunEvent::read_error("connection \"reset\"");
        assert!(event.is_error());
        let value: serde_json::Value = event.json().expect("error payload is valid JSON");
        assert_eq!(value["error"], "connection \"reset\"");
    }
}
