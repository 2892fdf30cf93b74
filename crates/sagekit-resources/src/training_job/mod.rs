//! The `TrainingJob` resource type.

pub mod snapshot;
pub mod spec;
pub mod status;
pub mod summary;

pub use snapshot::{TrainingJobSnapshot, TRAINING_JOB_FIELDS, TRAINING_JOB_SCHEMA};
pub use spec::{
    AlgorithmSpecification, Channel, CreateTrainingJobRequest, DataSource, MetricDefinition, ModelArtifacts,
    OutputDataConfig, ProfilerConfig, ResourceConfig, ResourceConfigForUpdate, S3DataDistribution, S3DataSource,
    S3DataType, StoppingCondition, Tag, TrainingInputMode, TrainingJobUpdate,
};
pub use status::{SecondaryStatus, TrainingJobStatus};
pub use summary::TrainingJobSummary;

use crate::error::ResourceResult;
use crate::kind::{ResourceKind, ResourceSchema};

/// Marker type binding training-job types to the lifecycle client.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrainingJob;

impl ResourceKind for TrainingJob {
    type Snapshot = TrainingJobSnapshot;
    type Summary = TrainingJobSummary;
    type Status = TrainingJobStatus;
    type CreateSpec = CreateTrainingJobRequest;

    fn schema() -> &'static ResourceSchema {
        &TRAINING_JOB_SCHEMA
    }

    fn create_name(spec: &CreateTrainingJobRequest) -> &str {
        &spec.training_job_name
    }

    fn validate_create(spec: &CreateTrainingJobRequest) -> ResourceResult<()> {
        spec.validate()
    }

    fn status(snapshot: &TrainingJobSnapshot) -> Option<&TrainingJobStatus> {
        snapshot.training_job_status.value()
    }

    fn failure_reason(snapshot: &TrainingJobSnapshot) -> Option<&str> {
        snapshot.failure_reason.value().map(String::as_str)
    }

    fn progress_detail(snapshot: &TrainingJobSnapshot) -> Option<String> {
        snapshot.secondary_status.value().map(ToString::to_string)
    }
}
