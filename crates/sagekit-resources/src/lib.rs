//! Sagekit Resources
//!
//! Resource-type definitions for the lifecycle client:
//! - Traits describing a managed resource type (`ResourceKind`)
//! - Static field tables and snapshots generated from `schema/*.toml`
//! - Training job creation specs, status enums, and validation
//! - List filters shared by paginated list operations

pub mod error;
pub mod filters;
pub mod kind;
pub mod training_job;

pub use error::{ResourceError, ResourceResult};
pub use filters::{ListFilters, SortBy, SortOrder};
pub use kind::{
    AttributeUpdate, LifecycleStatus, OperationNames, ResourceKind, ResourceSchema, ResourceSnapshot,
    ResourceSummary,
};
pub use training_job::{
    CreateTrainingJobRequest, SecondaryStatus, TrainingJob, TrainingJobSnapshot, TrainingJobStatus,
    TrainingJobSummary, TrainingJobUpdate, TRAINING_JOB_FIELDS, TRAINING_JOB_SCHEMA,
};
