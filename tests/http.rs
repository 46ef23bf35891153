use assistants_api::{AssistantsClient, AssistantsConfig, AssistantsError};

fn client() -> AssistantsClient {
    let config = AssistantsConfig::new("sk-test").with_base_url("https://example.test/v1");
    AssistantsClient::new(config).expect("client")
}

#[test]
fn headers_carry_bearer_token_and_beta_opt_in() {
    let headers = client().build_headers(false).expect("headers");

    assert_eq!(
        headers.get("authorization").expect("authorization").to_str().unwrap(),
        "Bearer sk-test"
    );
    assert_eq!(
        headers.get("openai-beta").expect("beta").to_str().unwrap(),
        "assistants=v2"
    );
    assert_eq!(
        headers.get("content-type").expect("content type").to_str().unwrap(),
        "application/json"
    );
    assert!(headers.get("accept").is_none());
}

#[test]
fn streaming_headers_accept_event_stream() {
    let headers = client().build_headers(true).expect("headers");
    assert_eq!(
        headers.get("accept").expect("accept").to_str().unwrap(),
        "text/event-stream"
    );
}

#[test]
fn extra_headers_are_merged_lowercased() {
    let config = AssistantsConfig::new("sk-test")
        .insert_header("X-Request-Tag", "practical-test")
        .with_base_url("https://example.test/v1");
    let client = AssistantsClient::new(config).expect("client");

    let headers = client.build_headers(false).expect("headers");
    assert_eq!(
        headers.get("x-request-tag").expect("extra").to_str().unwrap(),
        "practical-test"
    );
}

#[test]
fn missing_api_key_is_rejected_before_any_request() {
    let client = AssistantsClient::new(AssistantsConfig::default()).expect("client");
    assert!(matches!(
        client.build_headers(false),
        Err(AssistantsError::MissingApiKey)
    ));
}

#[test]
fn endpoints_join_resource_paths_onto_the_base_url() {
    let client = client();
    assert_eq!(
        client.endpoint("/threads/thread_1/runs/run_1/submit_tool_outputs"),
        "https://example.test/v1/threads/thread_1/runs/run_1/submit_tool_outputs"
    );
    assert_eq!(
        client.endpoint("/threads/thread_1/runs/run_1/steps/step_1"),
        "https://example.test/v1/threads/thread_1/runs/run_1/steps/step_1"
    );
}
