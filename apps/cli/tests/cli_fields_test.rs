//! Integration tests for the `sagekit fields` command.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_fields_lists_attribute_table() {
    let mut cmd = Command::cargo_bin("sagekit").unwrap();
    cmd.arg("fields")
        .assert()
        .success()
        .stdout(predicate::str::contains("TrainingJob attributes"))
        .stdout(predicate::str::contains("TrainingJobName"))
        .stdout(predicate::str::contains("ResourceConfig"));
}

#[test]
fn test_fields_json_marks_updatable_attributes() {
    let output = Command::cargo_bin("sagekit").unwrap().arg("fields").arg("--json").output().unwrap();
    assert!(output.status.success());

    let fields: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
    let updatable: Vec<&str> = fields
        .iter()
        .filter(|f| f["updatable"] == serde_json::json!(true))
        .map(|f| f["wire_name"].as_str().unwrap())
        .collect();
    assert_eq!(updatable, vec!["ResourceConfig", "ProfilerConfig"]);

    let role = fields.iter().find(|f| f["name"] == serde_json::json!("role_arn")).unwrap();
    assert_eq!(role["required"], serde_json::json!(true));
    assert_eq!(role["type"], serde_json::json!("String"));
}
