//! Integration tests for lazy listing through `get_all`.

mod common;

use common::{describe_response, summary, ScriptedControlPlane};
use sagekit_abstraction::ControlPlaneError;
use sagekit_core::{ErrorKind, ResourceClient};
use sagekit_resources::{ListFilters, ResourceSummary, SortOrder, TrainingJob};
use serde_json::json;
use std::sync::Arc;

fn client(transport: &Arc<ScriptedControlPlane>) -> ResourceClient<TrainingJob> {
    ResourceClient::new(transport.clone())
}

#[test]
fn test_three_pages_yield_five_items_in_order() {
    let transport = Arc::new(ScriptedControlPlane::new());
    transport
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j1"), summary("j2")], "NextToken": "p2"}))
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j3"), summary("j4")], "NextToken": "p3"}))
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j5")]}));

    let names: Vec<String> = client(&transport)
        .get_all(&ListFilters::new())
        .map(|item| item.unwrap().name().to_string())
        .collect();

    assert_eq!(names, vec!["j1", "j2", "j3", "j4", "j5"]);
    assert_eq!(transport.count("ListTrainingJobs"), 3);

    let tokens: Vec<_> = transport
        .requests("ListTrainingJobs")
        .iter()
        .map(|r| r.get("NextToken").cloned())
        .collect();
    assert_eq!(tokens, vec![None, Some(json!("p2")), Some(json!("p3"))]);
}

#[test]
fn test_empty_collection_makes_one_call() {
    let transport = Arc::new(ScriptedControlPlane::new());
    transport.respond("ListTrainingJobs", json!({"TrainingJobSummaries": []}));

    let count = client(&transport).get_all(&ListFilters::new()).count();

    assert_eq!(count, 0);
    assert_eq!(transport.count("ListTrainingJobs"), 1);
}

#[test]
fn test_pages_are_fetched_on_demand() {
    let transport = Arc::new(ScriptedControlPlane::new());
    transport
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j1"), summary("j2")], "NextToken": "p2"}))
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j3")]}));

    let mut pager = client(&transport).get_all(&ListFilters::new());
    assert_eq!(transport.count("ListTrainingJobs"), 0);

    let first: Vec<_> = pager.by_ref().take(2).collect();
    assert_eq!(first.len(), 2);
    assert_eq!(pager.pages_fetched(), 1);
    assert_eq!(transport.count("ListTrainingJobs"), 1);

    assert_eq!(pager.next().unwrap().unwrap().name(), "j3");
    assert_eq!(transport.count("ListTrainingJobs"), 2);
}

#[test]
fn test_filters_and_default_page_size_are_sent() {
    let transport = Arc::new(ScriptedControlPlane::new());
    let mut filters = ListFilters::new().name_contains("xgb").status_equals("Completed");
    filters.sort_order = Some(SortOrder::Descending);

    let _ = client(&transport).with_page_size(25).get_all(&filters).count();

    let request = &transport.requests("ListTrainingJobs")[0];
    assert_eq!(request.get("NameContains"), Some(&json!("xgb")));
    assert_eq!(request.get("StatusEquals"), Some(&json!("Completed")));
    assert_eq!(request.get("SortOrder"), Some(&json!("Descending")));
    assert_eq!(request.get("MaxResults"), Some(&json!(25)));
}

#[test]
fn test_error_mid_listing_ends_iteration() {
    let transport = Arc::new(ScriptedControlPlane::new());
    transport
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j1")], "NextToken": "p2"}))
        .fail("ListTrainingJobs", ControlPlaneError::Transport("connection reset".to_string()));

    let items: Vec<_> = client(&transport).get_all(&ListFilters::new()).collect();

    assert_eq!(items.len(), 2);
    assert!(items[0].is_ok());
    assert_eq!(items[1].as_ref().unwrap_err().kind(), ErrorKind::Transport);
    assert_eq!(transport.count("ListTrainingJobs"), 2);
}

#[test]
fn test_summary_upgrades_to_full_handle() {
    let transport = Arc::new(ScriptedControlPlane::new());
    transport
        .respond("ListTrainingJobs", json!({"TrainingJobSummaries": [summary("j1")]}))
        .respond("DescribeTrainingJob", describe_response("j1", "Completed"));
    let client = client(&transport);

    let first = client.get_all(&ListFilters::new()).next().unwrap().unwrap();
    let handle = client.get(first.name()).unwrap();

    assert_eq!(handle.name(), "j1");
    assert!(handle.arn().is_some());
}
