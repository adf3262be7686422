use std::{path::Path, sync::Arc};

use serde_json::json;
use yamlrest_engine::{
    CannedTransport, ContextEventKind, ExecutionContext, RecordingObserver, StepStatus, parse_script_file, run_script,
};
use yamlrest_types::ApiResponse;

fn fixture() -> yamlrest_engine::TestScript {
    parse_script_file(Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/bulk_then_search.yaml"))).expect("parse fixture")
}

#[test]
fn runs_fixture_against_canned_responses() {
    let transport = CannedTransport::default()
        .respond(ApiResponse::new(200, json!({"errors": false, "items": [{"index": {"_id": "1"}}, {"index": {"_id": "2"}}]})))
        .respond(ApiResponse::new(200, json!({"hits": {"total": 1, "hits": [{"_id": "1"}]}})))
        .respond_error("get", ApiResponse::new(404, json!({"found": false})));
    let recorder = transport.clone();
    let observer = Arc::new(RecordingObserver::new());
    let mut context = ExecutionContext::new(transport).with_observer(observer.clone());

    let reports = run_script(&mut context, &fixture()).expect("script runs");
    assert_eq!(reports.len(), 6);
    assert_eq!(reports[4].status, StepStatus::Caught);
    assert_eq!(reports[3].captured, Some(json!({"total": 1})));

    let requests = recorder.requests();
    let bulk = requests[0].entity.as_ref().expect("bulk payload");
    assert_eq!(bulk.body.lines().count(), 4);
    assert!(bulk.body.ends_with('\n'));
    assert_eq!(requests[0].params["refresh"], "true");
    assert_eq!(requests[0].params["error_trace"], "true");

    let search = requests[1].entity.as_ref().expect("search payload");
    assert_eq!(search.body, r#"{"query":{"ids":{"values":["1"]}}}"#);
    assert_eq!(requests[2].params["id"], "missing-1");

    assert!(context.stash().is_empty());
    assert!(context.last_response().is_none());
    assert_eq!(observer.kinds().last(), Some(&ContextEventKind::Cleared));
}

#[test]
fn failing_step_stops_the_run() {
    let transport = CannedTransport::default().fail("bulk", "connection reset");
    let recorder = transport.clone();
    let mut context = ExecutionContext::new(transport);

    let error = run_script(&mut context, &fixture()).unwrap_err();
    assert!(error.to_string().contains("step 0"));
    assert_eq!(recorder.requests().len(), 1);
    assert_eq!(context.stash().get("$body").unwrap(), serde_json::Value::Null);
}

#[test]
fn lists_fixture_steps_in_order() {
    let script = fixture();
    assert_eq!(script.name.as_deref(), Some("bulk then search"));
    let descriptions: Vec<String> = script.steps.iter().map(|step| step.describe()).collect();
    assert_eq!(
        descriptions,
        vec![
            "do bulk",
            "set items.0.index._id -> first_id",
            "do search",
            "set hits.total -> total",
            "do get",
            "clear",
        ]
    );
}
