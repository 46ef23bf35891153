use assistants_api::messages::MessageListParams;
use assistants_api::run_steps::{GetStepParams, StepListParams};
use assistants_api::ListParams;

#[test]
fn empty_params_render_no_query() {
    assert_eq!(ListParams::default().to_query(), "");
    assert_eq!(MessageListParams::default().to_query(), "");
    assert_eq!(StepListParams::default().to_query(), "");
    assert_eq!(GetStepParams::default().to_query(), "");
}

#[test]
fn list_params_render_in_stable_order() {
    let params = ListParams::default()
        .with_limit(10)
        .with_order("desc")
        .with_after("run_a")
        .with_before("run_b");

    assert_eq!(params.to_query(), "?limit=10&order=desc&after=run_a&before=run_b");
}

#[test]
fn message_params_append_run_id_filter() {
    let params = MessageListParams {
        base: ListParams::default().with_limit(5),
        run_id: None,
    }
    .with_run_id("run_1");

    assert_eq!(params.to_query(), "?limit=5&run_id=run_1");
}

#[test]
fn step_params_repeat_include_selectors() {
    let params = StepListParams {
        base: ListParams::default().with_order("asc"),
        include: Vec::new(),
    }
    .with_include("step_details.tool_calls[*].file_search.results[*].content");

    assert_eq!(
        params.to_query(),
        "?order=asc&include[]=step_details.tool_calls[*].file_search.results[*].content"
    );
}

#[test]
fn get_step_params_render_only_includes() {
    let params = GetStepParams::default()
        .with_include("a")
        .with_include("b");
    assert_eq!(params.to_query(), "?include[]=a&include[]=b");
}
