use assistants_api::sse::{RunEvent, SseDecoder};

#[test]
fn decoder_yields_named_event_then_done() {
    let payload =
        b"event: thread.run.completed\ndata: {\"id\":\"run_1\",\"status\":\"completed\"}\n\ndata: [DONE]\n\n";

    let mut decoder = SseDecoder::default();
    let events = decoder.feed(payload);

    assert_eq!(
        events,
        vec![
            RunEvent::new(
                "thread.run.completed",
                "{\"id\":\"run_1\",\"status\":\"completed\"}"
            ),
            RunEvent::new("done", ""),
        ]
    );
    assert!(decoder.finished());
}

#[test]
fn done_sentinel_terminates_exactly_once() {
    let payload = concat!(
        "data: {\"n\":1}\n\n",
        "data: [DONE]\n\n",
        "data: {\"n\":2}\n\n",
        "data: [DONE]\n\n",
    );

    let events = SseDecoder::parse_frames(payload);
    let done_count = events.iter().filter(|event| event.is_done()).count();
    assert_eq!(done_count, 1);
    assert!(events.last().expect("at least one event").is_done());
    assert_eq!(events.len(), 2);
}

#[test]
fn data_frames_inherit_nearest_preceding_event_name() {
    let payload = concat!(
        "event: thread.run.created\n",
        "data: {\"seq\":1}\n",
        "\n",
        "data: {\"seq\":2}\n",
        "\n",
        "event: thread.run.in_progress\n",
        "data: {\"seq\":3}\n",
        "\n",
        "data: {\"seq\":4}\n",
        "\n",
    );

    let events = SseDecoder::parse_frames(payload);
    let names: Vec<&str> = events.iter().map(|event| event.event.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "thread.run.created",
            "thread.run.created",
            "thread.run.in_progress",
            "thread.run.in_progress",
        ]
    );
}

#[test]
fn unknown_field_lines_are_ignored() {
    let payload = concat!(
        ": keep-alive\n",
        "id: 42\n",
        "retry: 1000\n",
        "event: thread.run.queued\n",
        "data: {\"id\":\"run_1\"}\n",
        "\n",
    );

    let events = SseDecoder::parse_frames(payload);
    assert_eq!(events, vec![RunEvent::new("thread.run.queued", "{\"id\":\"run_1\"}")]);
}

#[test]
fn multibyte_payloads_survive_chunk_splits() {
    let payload = "data: {\"delta\":\"café\"}\n\n".as_bytes();
    // Split inside the two-byte encoding of 'é'.
    let split = payload
        .iter()
        .position(|byte| *byte >= 0x80)
        .expect("multibyte payload")
        + 1;

    let mut decoder = SseDecoder::default();
    let mut events = decoder.feed(&payload[..split]);
    events.extend(decoder.feed(&payload[split..]));

    assert_eq!(events, vec![RunEvent::new("", "{\"delta\":\"café\"}")]);
}

#[test]
fn payload_whitespace_after_the_marker_is_preserved() {
    let events = SseDecoder::parse_frames("data:   two leading, two trailing  \n\n");
    assert_eq!(events, vec![RunEvent::new("", "  two leading, two trailing  ")]);
}

#[test]
fn crlf_line_endings_are_tolerated() {
    let payload = b"event: thread.run.completed\r\ndata: {\"id\":\"run_1\"}\r\n\r\ndata: [DONE]\r\n\r\n";

    let mut decoder = SseDecoder::default();
    let events = decoder.feed(payload);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].event, "thread.run.completed");
    assert_eq!(events[0].data, "{\"id\":\"run_1\"}");
    assert!(events[1].is_done());
}

#[test]
fn events_preserve_wire_order_across_arbitrary_chunking() {
    let payload: &[u8] = concat!(
        "event: thread.run.created\n",
        "data: {\"seq\":1}\n\n",
        "event: thread.run.step.created\n",
        "data: {\"seq\":2}\n\n",
        "data: {\"seq\":3}\n\n",
        "data: [DONE]\n\n",
    )
    .as_bytes();

    // Feed one byte at a time; the decoded sequence must be identical.
    let mut decoder = SseDecoder::default();
    let mut events = Vec::new();
    for byte in payload {
        events.extend(decoder.feed(std::slice::from_ref(byte)));
    }

    assert_eq!(
        events,
        vec![
            RunEvent::new("thread.run.created", "{\"seq\":1}"),
            RunEvent::new("thread.run.step.created", "{\"seq\":2}"),
            RunEvent::new("thread.run.step.created", "{\"seq\":3}"),
            RunEvent::new("done", ""),
        ]
    );
}

#[test]
fn event_json_decodes_typed_payloads() {
    let event = RunEvent::new("thread.run.completed", "{\"id\":\"run_1\",\"object\":\"thread.run\"}");
    let value: serde_json::Value = event.json().expect("payload decodes");
    assert_eq!(value["id"], "run_1");

    let broken = RunEvent::new("thread.run.completed", "{not-json");
    assert!(matches!(
        broken.json::<serde_json::Value>(),
        Err(assistants_api::AssistantsError::Decode(_))
    ));
}
