//! Local handle to a remotely-managed resource.

use crate::error::LifecycleResult;
use sagekit_abstraction::Field;
use sagekit_resources::{ResourceKind, ResourceSnapshot};

/// A named resource plus the attribute snapshot from its last retrieval.
///
/// The snapshot is only as fresh as the last `refresh`; nothing syncs it in
/// the background. Each handle owns its snapshot exclusively, and every
/// operation that rewrites it takes `&mut self`.
pub struct Resource<K: ResourceKind> {
    name: String,
    snapshot: K::Snapshot,
}

impl<K: ResourceKind> Resource<K> {
    pub(crate) fn new(name: String, snapshot: K::Snapshot) -> Self {
        Self { name, snapshot }
    }

    /// Unique name identifying the resource on the control plane.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snapshot(&self) -> &K::Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> K::Snapshot {
        self.snapshot
    }

    /// Looks up an attribute by snake_case or wire name.
    ///
    /// Returns `Ok(None)` for names outside the resource's field table.
    pub fn attribute(&self, key: &str) -> LifecycleResult<Option<Field<serde_json::Value>>> {
        Ok(self.snapshot.attribute(key)?)
    }

    pub fn arn(&self) -> Option<String> {
        match self.attribute(K::schema().arn) {
            Ok(Some(Field::Value(serde_json::Value::String(arn)))) => Some(arn),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&K::Status> {
        K::status(&self.snapshot)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        K::failure_reason(&self.snapshot)
    }

    pub(crate) fn replace_snapshot(&mut self, snapshot: K::Snapshot) {
        self.snapshot = snapshot;
    }

    pub(crate) fn merge_snapshot(&mut self, partial: K::Snapshot) {
        self.snapshot.merge(partial);
    }
}

impl<K: ResourceKind> Clone for Resource<K> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), snapshot: self.snapshot.clone() }
    }
}

impl<K: ResourceKind> std::fmt::Debug for Resource<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resource")
            .field("type", &K::schema().type_name)
            .field("name", &self.name)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sagekit_resources::{TrainingJob, TrainingJobSnapshot, TrainingJobStatus};
    use serde_json::json;

    fn handle(value: serde_json::Value) -> Resource<TrainingJob> {
        let snapshot: TrainingJobSnapshot = serde_json::from_value(value).unwrap();
        Resource::new("job-1".to_string(), snapshot)
    }

    #[test]
    fn test_accessors_read_snapshot() {
        let r = handle(json!({
            "TrainingJobName": "job-1",
            "TrainingJobArn": "arn:aws:sagemaker:us-east-1:1:training-job/job-1",
            "TrainingJobStatus": "Failed",
            "FailureReason": "ClientError: bad input"
        }));

        assert_eq!(r.name(), "job-1");
        assert_eq!(r.arn().as_deref(), Some("arn:aws:sagemaker:us-east-1:1:training-job/job-1"));
        assert_eq!(r.status(), Some(&TrainingJobStatus::Failed));
        assert_eq!(r.failure_reason(), Some("ClientError: bad input"));
    }

    #[test]
    fn test_fresh_handle_reports_unset_attributes() {
        let r = handle(json!({"TrainingJobName": "job-1"}));
        assert_eq!(r.status(), None);
        assert_eq!(r.arn(), None);
        assert_eq!(r.attribute("model_artifacts").unwrap(), Some(Field::Unset));
    }
}
