//! Shared test utilities for sagekit-core integration tests.
//!
//! Provides a scripted transport that replays queued responses per operation
//! and records every call, plus builders for valid training-job requests.

#![allow(dead_code)]

use sagekit_abstraction::{ControlPlane, ControlPlaneError, ControlPlaneResult, Payload};
use sagekit_resources::training_job::{
    AlgorithmSpecification, Channel, OutputDataConfig, ResourceConfig, StoppingCondition,
};
use sagekit_resources::CreateTrainingJobRequest;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Transport that answers from per-operation queues.
///
/// An operation with an empty queue answers with an empty payload.
#[derive(Default)]
pub struct ScriptedControlPlane {
    responses: Mutex<HashMap<String, VecDeque<ControlPlaneResult<Payload>>>>,
    calls: Mutex<Vec<(String, Payload)>>,
}

impl ScriptedControlPlane {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response for `operation`.
    pub fn respond(&self, operation: &str, response: Value) -> &Self {
        let payload = response.as_object().cloned().expect("response must be a JSON object");
        self.push(operation, Ok(payload))
    }

    /// Queues a failure for `operation`.
    pub fn fail(&self, operation: &str, error: ControlPlaneError) -> &Self {
        self.push(operation, Err(error))
    }

    fn push(&self, operation: &str, result: ControlPlaneResult<Payload>) -> &Self {
        self.responses.lock().unwrap().entry(operation.to_string()).or_default().push_back(result);
        self
    }

    /// Number of times `operation` was executed.
    pub fn count(&self, operation: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|(op, _)| op == operation).count()
    }

    /// Payloads sent for `operation`, in call order.
    pub fn requests(&self, operation: &str) -> Vec<Payload> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| op == operation)
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ControlPlane for ScriptedControlPlane {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        self.calls.lock().unwrap().push((operation.to_string(), payload));
        self.responses
            .lock()
            .unwrap()
            .get_mut(operation)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| Ok(Payload::new()))
    }
}

/// A create request that passes local validation.
pub fn training_request(name: &str) -> CreateTrainingJobRequest {
    CreateTrainingJobRequest::new(
        name,
        AlgorithmSpecification::image("123456789012.dkr.ecr.us-east-1.amazonaws.com/xgboost:latest"),
        "arn:aws:iam::123456789012:role/SageMakerRole",
        OutputDataConfig { s3_output_path: "s3://bucket/output".to_string(), kms_key_id: None },
        ResourceConfig {
            instance_type: "ml.m5.xlarge".to_string(),
            instance_count: 1,
            volume_size_in_gb: 30,
            keep_alive_period_in_seconds: None,
        },
        StoppingCondition { max_runtime_in_seconds: 3600, max_wait_time_in_seconds: None },
    )
    .with_channel(Channel::s3_prefix("train", "s3://bucket/train/"))
}

/// A describe response for `name` in `status`.
pub fn describe_response(name: &str, status: &str) -> Value {
    json!({
        "TrainingJobName": name,
        "TrainingJobArn": format!("arn:aws:sagemaker:us-east-1:123456789012:training-job/{name}"),
        "TrainingJobStatus": status,
        "SecondaryStatus": if status == "InProgress" { "Training" } else { status },
        "RoleArn": "arn:aws:iam::123456789012:role/SageMakerRole",
        "CreationTime": "2024-05-01T12:00:00Z"
    })
}

/// A list-page item for `name`.
pub fn summary(name: &str) -> Value {
    json!({
        "TrainingJobName": name,
        "TrainingJobArn": format!("arn:aws:sagemaker:us-east-1:123456789012:training-job/{name}"),
        "CreationTime": "2024-05-01T12:00:00Z",
        "TrainingJobStatus": "Completed"
    })
}
