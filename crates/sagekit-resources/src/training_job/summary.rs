use super::status::TrainingJobStatus;
use crate::kind::ResourceSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of a `ListTrainingJobs` page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobSummary {
    pub training_job_name: String,
    pub training_job_arn: String,
    pub creation_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_time: Option<DateTime<Utc>>,
    pub training_job_status: TrainingJobStatus,
}

impl ResourceSummary for TrainingJobSummary {
    fn name(&self) -> &str {
        &self.training_job_name
    }
}
