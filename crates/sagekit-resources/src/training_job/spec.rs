use crate::error::{ResourceError, ResourceResult};
use crate::kind::AttributeUpdate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How training data reaches the algorithm container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingInputMode {
    File,
    Pipe,
    FastFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDefinition {
    pub name: String,
    pub regex: String,
}

/// Training image or registered algorithm, plus input mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlgorithmSpecification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algorithm_name: Option<String>,
    pub training_input_mode: TrainingInputMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_definitions: Vec<MetricDefinition>,
}

impl AlgorithmSpecification {
    #[must_use]
    pub fn image(training_image: impl Into<String>) -> Self {
        Self {
            training_image: Some(training_image.into()),
            algorithm_name: None,
            training_input_mode: TrainingInputMode::File,
            metric_definitions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum S3DataType {
    S3Prefix,
    ManifestFile,
    AugmentedManifestFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum S3DataDistribution {
    FullyReplicated,
    ShardedByS3Key,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct S3DataSource {
    pub s3_data_type: S3DataType,
    pub s3_uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_data_distribution_type: Option<S3DataDistribution>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataSource {
    pub s3_data_source: S3DataSource,
}

/// A named input channel (e.g. "train", "validation").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Channel {
    pub channel_name: String,
    pub data_source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode: Option<TrainingInputMode>,
}

impl Channel {
    /// Channel reading every object under an S3 prefix.
    #[must_use]
    pub fn s3_prefix(channel_name: impl Into<String>, s3_uri: impl Into<String>) -> Self {
        Self {
            channel_name: channel_name.into(),
            data_source: DataSource {
                s3_data_source: S3DataSource {
                    s3_data_type: S3DataType::S3Prefix,
                    s3_uri: s3_uri.into(),
                    s3_data_distribution_type: Some(S3DataDistribution::FullyReplicated),
                },
            },
            content_type: None,
            input_mode: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutputDataConfig {
    pub s3_output_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key_id: Option<String>,
}

/// Compute sizing for the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceConfig {
    pub instance_type: String,
    pub instance_count: u32,
    #[serde(rename = "VolumeSizeInGB")]
    pub volume_size_in_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_alive_period_in_seconds: Option<u32>,
}

/// The subset of `ResourceConfig` that may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceConfigForUpdate {
    pub keep_alive_period_in_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoppingCondition {
    pub max_runtime_in_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_time_in_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProfilerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_output_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiling_interval_in_milliseconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_profiler: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModelArtifacts {
    pub s3_model_artifacts: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Full creation specification for a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateTrainingJobRequest {
    pub training_job_name: String,
    pub algorithm_specification: AlgorithmSpecification,
    pub role_arn: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub input_data_config: Vec<Channel>,
    pub output_data_config: OutputDataConfig,
    pub resource_config: ResourceConfig,
    pub stopping_condition: StoppingCondition,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hyper_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub environment: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl CreateTrainingJobRequest {
    #[must_use]
    pub fn new(
        training_job_name: impl Into<String>,
        algorithm_specification: AlgorithmSpecification,
        role_arn: impl Into<String>,
        output_data_config: OutputDataConfig,
        resource_config: ResourceConfig,
        stopping_condition: StoppingCondition,
    ) -> Self {
        Self {
            training_job_name: training_job_name.into(),
            algorithm_specification,
            role_arn: role_arn.into(),
            input_data_config: Vec::new(),
            output_data_config,
            resource_config,
            stopping_condition,
            hyper_parameters: BTreeMap::new(),
            environment: BTreeMap::new(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.input_data_config.push(channel);
        self
    }

    #[must_use]
    pub fn with_hyper_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.hyper_parameters.insert(key.into(), value.into());
        self
    }

    /// Parses a request from its JSON wire form.
    ///
    /// Missing required keys surface as `InvalidSpec`, not as a JSON error.
    pub fn from_json(json: &str) -> ResourceResult<Self> {
        serde_json::from_str(json).map_err(|e| ResourceError::InvalidSpec(e.to_string()))
    }

    pub fn validate(&self) -> ResourceResult<()> {
        validate_job_name(&self.training_job_name)?;

        let algo = &self.algorithm_specification;
        let has_image = algo.training_image.as_deref().is_some_and(|s| !s.trim().is_empty());
        let has_algorithm = algo.algorithm_name.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !has_image && !has_algorithm {
            return Err(invalid("AlgorithmSpecification requires TrainingImage or AlgorithmName"));
        }

        if self.role_arn.trim().is_empty() {
            return Err(invalid("RoleArn is required"));
        }

        for (idx, channel) in self.input_data_config.iter().enumerate() {
            if channel.channel_name.trim().is_empty() {
                return Err(ResourceError::InvalidSpec(format!(
                    "InputDataConfig[{idx}].ChannelName is required"
                )));
            }
            if !channel.data_source.s3_data_source.s3_uri.starts_with("s3://") {
                return Err(ResourceError::InvalidSpec(format!(
                    "InputDataConfig[{idx}] S3Uri must start with s3://"
                )));
            }
        }
        let mut names: Vec<&str> = self.input_data_config.iter().map(|c| c.channel_name.as_str()).collect();
        names.sort_unstable();
        if names.windows(2).any(|w| w[0] == w[1]) {
            return Err(invalid("InputDataConfig channel names must be unique"));
        }

        if !self.output_data_config.s3_output_path.starts_with("s3://") {
            return Err(invalid("OutputDataConfig.S3OutputPath must start with s3://"));
        }

        let rc = &self.resource_config;
        if rc.instance_type.trim().is_empty() {
            return Err(invalid("ResourceConfig.InstanceType is required"));
        }
        if rc.instance_count == 0 {
            return Err(invalid("ResourceConfig.InstanceCount must be >= 1"));
        }
        if rc.volume_size_in_gb == 0 {
            return Err(invalid("ResourceConfig.VolumeSizeInGB must be >= 1"));
        }

        let sc = &self.stopping_condition;
        if sc.max_runtime_in_seconds == 0 {
            return Err(invalid("StoppingCondition.MaxRuntimeInSeconds must be >= 1"));
        }
        if let Some(wait) = sc.max_wait_time_in_seconds {
            if wait < sc.max_runtime_in_seconds {
                return Err(invalid(
                    "StoppingCondition.MaxWaitTimeInSeconds must be >= MaxRuntimeInSeconds",
                ));
            }
        }

        Ok(())
    }
}

fn invalid(msg: &str) -> ResourceError {
    ResourceError::InvalidSpec(msg.to_string())
}

/// Names are 1-63 alphanumerics or hyphens, starting and ending alphanumeric.
fn validate_job_name(name: &str) -> ResourceResult<()> {
    if name.is_empty() {
        return Err(invalid("TrainingJobName is required"));
    }
    if name.len() > 63 {
        return Err(ResourceError::InvalidSpec(format!(
            "TrainingJobName must be at most 63 characters: {name}"
        )));
    }
    let valid_chars = name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    let edges_ok = name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric());
    if !valid_chars || !edges_ok {
        return Err(ResourceError::InvalidSpec(format!(
            "TrainingJobName must be alphanumeric with inner hyphens: {name}"
        )));
    }
    Ok(())
}

/// Typed partial update covering the attributes training jobs allow to change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingJobUpdate {
    pub resource_config: Option<ResourceConfigForUpdate>,
    pub profiler_config: Option<ProfilerConfig>,
}

impl TryFrom<TrainingJobUpdate> for AttributeUpdate {
    type Error = ResourceError;

    fn try_from(value: TrainingJobUpdate) -> ResourceResult<Self> {
        let mut update = AttributeUpdate::new();
        if let Some(rc) = value.resource_config {
            update = update.set("resource_config", rc)?;
        }
        if let Some(pc) = value.profiler_config {
            update = update.set("profiler_config", pc)?;
        }
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str) -> CreateTrainingJobRequest {
        CreateTrainingJobRequest::new(
            name,
            AlgorithmSpecification::image("123.dkr.ecr.us-east-1.amazonaws.com/xgboost:1.7-1"),
            "arn:aws:iam::123456789012:role/SageMakerRole",
            OutputDataConfig { s3_output_path: "s3://bucket/output".to_string(), kms_key_id: None },
            ResourceConfig {
                instance_type: "ml.m5.xlarge".to_string(),
                instance_count: 1,
                volume_size_in_gb: 30,
                keep_alive_period_in_seconds: None,
            },
            StoppingCondition { max_runtime_in_seconds: 600, max_wait_time_in_seconds: None },
        )
        .with_channel(Channel::s3_prefix("train", "s3://bucket/train"))
        .with_hyper_parameter("num_round", "10")
    }

    #[test]
    fn test_valid_request_passes() {
        assert!(request("xgboost-iris-1").validate().is_ok());
    }

    #[test]
    fn test_job_name_rules() {
        assert!(request("").validate().is_err());
        assert!(request("-leading").validate().is_err());
        assert!(request("has_underscore").validate().is_err());
        assert!(request(&"a".repeat(64)).validate().is_err());
    }

    #[test]
    fn test_algorithm_requires_image_or_name() {
        let mut req = request("job");
        req.algorithm_specification.training_image = None;
        assert!(req.validate().is_err());
        req.algorithm_specification.algorithm_name = Some("my-algo".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_resource_and_stopping_bounds() {
        let mut req = request("job");
        req.resource_config.instance_count = 0;
        assert!(req.validate().is_err());

        let mut req = request("job");
        req.stopping_condition.max_wait_time_in_seconds = Some(10);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_duplicate_channels_rejected() {
        let req = request("job").with_channel(Channel::s3_prefix("train", "s3://bucket/again"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_wire_form_uses_sagemaker_keys() {
        let value = serde_json::to_value(request("job")).unwrap();
        assert_eq!(value["ResourceConfig"]["VolumeSizeInGB"], 30);
        assert_eq!(value["AlgorithmSpecification"]["TrainingInputMode"], "File");
        assert_eq!(
            value["InputDataConfig"][0]["DataSource"]["S3DataSource"]["S3Uri"],
            "s3://bucket/train"
        );
        assert!(value.get("Environment").is_none());
    }

    #[test]
    fn test_from_json_missing_section_is_invalid_spec() {
        let err = CreateTrainingJobRequest::from_json(r#"{"TrainingJobName": "job"}"#).unwrap_err();
        assert!(matches!(err, ResourceError::InvalidSpec(_)));
    }

    #[test]
    fn test_typed_update_converts_to_attribute_update() {
        let update = TrainingJobUpdate {
            resource_config: Some(ResourceConfigForUpdate { keep_alive_period_in_seconds: 300 }),
            profiler_config: None,
        };
        let attrs = AttributeUpdate::try_from(update).unwrap();
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["resource_config"]);
    }
}
