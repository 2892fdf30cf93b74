//! Generated attribute table and snapshot for training jobs.

use super::spec::{
    AlgorithmSpecification, Channel, ModelArtifacts, OutputDataConfig, ProfilerConfig, ResourceConfig,
    StoppingCondition,
};
use super::status::{SecondaryStatus, TrainingJobStatus};
use crate::kind::{to_attribute, OperationNames, ResourceSchema, ResourceSnapshot};
use chrono::{DateTime, Utc};
use sagekit_abstraction::{Field, FieldDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

include!(concat!(env!("OUT_DIR"), "/training_job.rs"));

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_table_matches_schema() {
        assert_eq!(TRAINING_JOB_SCHEMA.identifier, "TrainingJobName");
        assert_eq!(TRAINING_JOB_SCHEMA.operations.describe, "DescribeTrainingJob");

        let updatable: Vec<&str> = TRAINING_JOB_SCHEMA.updatable_fields().map(|f| f.name).collect();
        assert_eq!(updatable, vec!["resource_config", "profiler_config"]);

        let name = TRAINING_JOB_SCHEMA.field("TrainingJobName").unwrap();
        assert!(name.required);
        assert!(!name.updatable);
    }

    #[test]
    fn test_snapshot_distinguishes_unset_from_null() {
        let snap: TrainingJobSnapshot = serde_json::from_value(json!({
            "TrainingJobName": "job-1",
            "TrainingJobStatus": "InProgress",
            "FailureReason": null,
            "CreationTime": "2026-10-16T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(snap.training_job_name.value().map(String::as_str), Some("job-1"));
        assert_eq!(snap.training_job_status, Field::Value(TrainingJobStatus::InProgress));
        assert!(snap.failure_reason.is_null());
        assert!(snap.model_artifacts.is_unset());
        assert!(snap.creation_time.is_value());
    }

    #[test]
    fn test_attribute_lookup_by_either_name() {
        let snap: TrainingJobSnapshot =
            serde_json::from_value(json!({"BillableTimeInSeconds": 12})).unwrap();

        let billable = Some(Field::Value(json!(12)));
        assert_eq!(snap.attribute("billable_time_in_seconds").unwrap(), billable);
        assert_eq!(snap.attribute("BillableTimeInSeconds").unwrap(), billable);
        assert_eq!(snap.attribute("role_arn").unwrap(), Some(Field::Unset));
        assert_eq!(snap.attribute("NoSuchField").unwrap(), None);
    }

    #[test]
    fn test_merge_keeps_fields_missing_from_newer() {
        let mut current: TrainingJobSnapshot =
            serde_json::from_value(json!({"TrainingJobName": "job-1", "TrainingJobArn": "arn:1"})).unwrap();
        let newer: TrainingJobSnapshot =
            serde_json::from_value(json!({"TrainingJobStatus": "Completed"})).unwrap();

        current.merge(newer);
        assert_eq!(current.training_job_arn, Field::Value("arn:1".to_string()));
        assert_eq!(current.training_job_status, Field::Value(TrainingJobStatus::Completed));
    }

    #[test]
    fn test_serialized_snapshot_omits_unset() {
        let snap: TrainingJobSnapshot = serde_json::from_value(json!({"TrainingJobName": "job-1"})).unwrap();
        assert_eq!(serde_json::to_value(&snap).unwrap(), json!({"TrainingJobName": "job-1"}));
    }
}
