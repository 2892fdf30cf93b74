//! In-memory control plane for training jobs.
//!
//! Behaves like the real service closely enough to drive the full lifecycle
//! locally: each describe advances a job one step along its script, list
//! calls page by `MaxResults`, and state-dependent calls fail with the same
//! error classes the service reports.

use chrono::{DateTime, Duration as TimeDelta, SecondsFormat, Utc};
use sagekit_abstraction::{ControlPlane, ControlPlaneError, ControlPlaneResult, Payload, NEXT_TOKEN_KEY};
use sagekit_resources::{LifecycleStatus, SecondaryStatus, TrainingJobStatus, TRAINING_JOB_SCHEMA};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

const ACCOUNT_ARN_PREFIX: &str = "arn:aws:sagemaker:us-east-1:000000000000:training-job/";
const DEFAULT_MAX_RESULTS: usize = 10;
const MAX_MAX_RESULTS: usize = 100;
const SECONDS_PER_STEP: i64 = 60;
const SUMMARY_KEYS: [&str; 6] = [
    "TrainingJobName",
    "TrainingJobArn",
    "CreationTime",
    "TrainingEndTime",
    "LastModifiedTime",
    "TrainingJobStatus",
];

/// One status transition applied on a describe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    /// Stays `InProgress` with the given secondary status.
    Progress(SecondaryStatus),
    /// Finishes successfully and publishes model artifacts.
    Complete,
    /// Fails with the given reason; an empty reason is reported as absent.
    Fail(String),
    /// Reaches `Stopped`.
    Stop,
}

impl ScriptStep {
    /// InProgress, InProgress, Completed.
    #[must_use]
    pub fn default_script() -> Vec<Self> {
        vec![
            Self::Progress(SecondaryStatus::Downloading),
            Self::Progress(SecondaryStatus::Training),
            Self::Complete,
        ]
    }

    /// Two progress steps followed by a failure.
    #[must_use]
    pub fn failing_script(reason: impl Into<String>) -> Vec<Self> {
        vec![
            Self::Progress(SecondaryStatus::Downloading),
            Self::Progress(SecondaryStatus::Training),
            Self::Fail(reason.into()),
        ]
    }
}

#[derive(Debug)]
struct JobRecord {
    fields: Payload,
    script: VecDeque<ScriptStep>,
    steps_applied: i64,
    created_at: DateTime<Utc>,
}

impl JobRecord {
    fn status(&self) -> TrainingJobStatus {
        match self.fields.get(TRAINING_JOB_SCHEMA.status) {
            Some(Value::String(s)) => TrainingJobStatus::from(s.clone()),
            _ => TrainingJobStatus::InProgress,
        }
    }

    fn name(&self) -> &str {
        self.fields.get(TRAINING_JOB_SCHEMA.identifier).and_then(Value::as_str).unwrap_or_default()
    }

    fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }

    fn set_status(&mut self, status: TrainingJobStatus, secondary: SecondaryStatus) {
        self.set("TrainingJobStatus", status.as_str());
        self.set("SecondaryStatus", secondary.as_str());
    }

    fn advance(&mut self, now: DateTime<Utc>) {
        if self.status().is_terminal() {
            return;
        }
        let Some(step) = self.script.pop_front() else {
            return;
        };
        self.steps_applied += 1;
        let at = timestamp(now);

        match step {
            ScriptStep::Progress(secondary) => {
                if secondary == SecondaryStatus::Training && !self.fields.contains_key("TrainingStartTime") {
                    self.set("TrainingStartTime", at.clone());
                }
                self.set_status(TrainingJobStatus::InProgress, secondary);
            }
            ScriptStep::Complete => {
                let output = self
                    .fields
                    .get("OutputDataConfig")
                    .and_then(|o| o.get("S3OutputPath"))
                    .and_then(Value::as_str)
                    .unwrap_or("s3://sagekit-sim")
                    .trim_end_matches('/')
                    .to_string();
                let artifacts = format!("{output}/{}/output/model.tar.gz", self.name());
                self.set_status(TrainingJobStatus::Completed, SecondaryStatus::Completed);
                self.set("ModelArtifacts", json!({ "S3ModelArtifacts": artifacts }));
                self.set("BillableTimeInSeconds", self.steps_applied * SECONDS_PER_STEP);
                self.set("TrainingEndTime", at.clone());
            }
            ScriptStep::Fail(reason) => {
                self.set_status(TrainingJobStatus::Failed, SecondaryStatus::Failed);
                if !reason.is_empty() {
                    self.set("FailureReason", reason);
                }
                self.set("TrainingEndTime", at.clone());
            }
            ScriptStep::Stop => {
                self.set_status(TrainingJobStatus::Stopped, SecondaryStatus::Stopped);
                self.set("TrainingEndTime", at.clone());
            }
        }
        self.set("LastModifiedTime", at);
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.fields
            .get("LastModifiedTime")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map_or(self.created_at, |at| at.with_timezone(&Utc))
    }

    fn summary(&self) -> Value {
        let mut summary = Payload::new();
        for key in SUMMARY_KEYS {
            if let Some(value) = self.fields.get(key) {
                summary.insert(key.to_string(), value.clone());
            }
        }
        Value::Object(summary)
    }
}

#[derive(Debug, Default)]
struct SimState {
    jobs: BTreeMap<String, JobRecord>,
    scripts: HashMap<String, Vec<ScriptStep>>,
    failures: HashMap<String, VecDeque<ControlPlaneError>>,
    calls: HashMap<String, u32>,
    sequence: i64,
}

/// Training-job control plane held entirely in memory.
#[derive(Debug)]
pub struct InMemoryControlPlane {
    state: Mutex<SimState>,
    epoch: DateTime<Utc>,
}

impl Default for InMemoryControlPlane {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryControlPlane {
    #[must_use]
    pub fn new() -> Self {
        Self { state: Mutex::new(SimState::default()), epoch: Utc::now() }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sets the status progression for `name`.
    ///
    /// Applies to an existing job immediately, or to the job once it is created.
    pub fn script_job(&self, name: &str, steps: Vec<ScriptStep>) {
        let mut state = self.lock();
        match state.jobs.get_mut(name) {
            Some(job) => job.script = steps.into(),
            None => {
                state.scripts.insert(name.to_string(), steps);
            }
        }
    }

    /// Makes the next call to `operation` fail with `error` without touching state.
    pub fn fail_next(&self, operation: &str, error: ControlPlaneError) {
        self.lock().failures.entry(operation.to_string()).or_default().push_back(error);
    }

    /// Number of times `operation` has been executed.
    pub fn calls(&self, operation: &str) -> u32 {
        self.lock().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn job_count(&self) -> usize {
        self.lock().jobs.len()
    }

    fn create(&self, state: &mut SimState, mut payload: Payload) -> ControlPlaneResult<Payload> {
        let name = required_name(&payload)?;
        if state.jobs.contains_key(&name) {
            return Err(ControlPlaneError::Validation(format!(
                "Training job names must be unique within an AWS account and region, and a training job with this name already exists ({ACCOUNT_ARN_PREFIX}{name})"
            )));
        }

        state.sequence += 1;
        let created_at = self.epoch + TimeDelta::seconds(state.sequence);
        let arn = format!("{ACCOUNT_ARN_PREFIX}{name}");

        payload.insert("TrainingJobArn".to_string(), arn.clone().into());
        payload.insert("CreationTime".to_string(), timestamp(created_at).into());
        payload.insert("LastModifiedTime".to_string(), timestamp(created_at).into());
        let script = state.scripts.remove(&name).unwrap_or_else(ScriptStep::default_script);
        let mut job = JobRecord { fields: payload, script: script.into(), steps_applied: 0, created_at };
        job.set_status(TrainingJobStatus::InProgress, SecondaryStatus::Starting);
        state.jobs.insert(name, job);

        Ok(object(json!({ "TrainingJobArn": arn })))
    }

    fn describe(&self, state: &mut SimState, payload: &Payload) -> ControlPlaneResult<Payload> {
        let name = required_name(payload)?;
        let job = state.jobs.get_mut(&name).ok_or_else(|| not_found(&name))?;
        let now = job.created_at + TimeDelta::seconds((job.steps_applied + 1) * SECONDS_PER_STEP);
        job.advance(now);
        Ok(job.fields.clone())
    }

    fn stop(&self, state: &mut SimState, payload: &Payload) -> ControlPlaneResult<Payload> {
        let name = required_name(payload)?;
        let job = state.jobs.get_mut(&name).ok_or_else(|| not_found(&name))?;
        let status = job.status();
        if status.is_terminal() {
            return Err(ControlPlaneError::Validation(format!(
                "The request was rejected because the training job is in status {status}."
            )));
        }
        job.set_status(TrainingJobStatus::Stopping, SecondaryStatus::Stopping);
        job.script = VecDeque::from([ScriptStep::Stop]);
        Ok(Payload::new())
    }

    fn delete(&self, state: &mut SimState, payload: &Payload) -> ControlPlaneResult<Payload> {
        let name = required_name(payload)?;
        let job = state.jobs.get(&name).ok_or_else(|| not_found(&name))?;
        let status = job.status();
        if !status.is_terminal() {
            return Err(ControlPlaneError::Conflict(format!(
                "Training job {name} is in status {status} and cannot be deleted until it stops"
            )));
        }
        state.jobs.remove(&name);
        Ok(Payload::new())
    }

    fn update(&self, state: &mut SimState, payload: Payload) -> ControlPlaneResult<Payload> {
        let name = required_name(&payload)?;
        let job = state.jobs.get_mut(&name).ok_or_else(|| not_found(&name))?;
        let status = job.status();
        if status.is_terminal() {
            return Err(ControlPlaneError::Conflict(format!(
                "Training job {name} is in status {status} and can no longer be updated"
            )));
        }

        let mut changes = Vec::new();
        for (key, value) in payload {
            if key == TRAINING_JOB_SCHEMA.identifier {
                continue;
            }
            match TRAINING_JOB_SCHEMA.field(&key) {
                Some(descriptor) if descriptor.updatable => changes.push((key, value)),
                _ => {
                    return Err(ControlPlaneError::Validation(format!("{key} cannot be updated")));
                }
            }
        }
        if changes.is_empty() {
            return Err(ControlPlaneError::Validation("Nothing to update".to_string()));
        }

        for (key, value) in changes {
            let merged = match (job.fields.remove(&key), value) {
                (Some(Value::Object(mut current)), Value::Object(patch)) => {
                    current.extend(patch);
                    Value::Object(current)
                }
                (_, value) => value,
            };
            job.fields.insert(key, merged);
        }
        let modified = job.created_at + TimeDelta::seconds((job.steps_applied + 1) * SECONDS_PER_STEP);
        job.set("LastModifiedTime", timestamp(modified));

        let arn = job.fields.get("TrainingJobArn").cloned().unwrap_or(Value::Null);
        Ok(object(json!({ "TrainingJobArn": arn })))
    }

    fn list(&self, state: &SimState, payload: &Payload) -> ControlPlaneResult<Payload> {
        let page_size = match payload.get("MaxResults") {
            None => DEFAULT_MAX_RESULTS,
            Some(value) => match value.as_u64() {
                Some(n) if (1..=MAX_MAX_RESULTS as u64).contains(&n) => n as usize,
                _ => {
                    return Err(ControlPlaneError::Validation(format!(
                        "MaxResults must be between 1 and {MAX_MAX_RESULTS}"
                    )));
                }
            },
        };
        let offset = match payload.get(NEXT_TOKEN_KEY) {
            None => 0,
            Some(token) => token
                .as_str()
                .and_then(|t| t.parse::<usize>().ok())
                .ok_or_else(|| ControlPlaneError::Validation(format!("Invalid pagination token: {token}")))?,
        };

        let name_contains = payload.get("NameContains").and_then(Value::as_str);
        let status_equals = payload.get("StatusEquals").and_then(Value::as_str);
        let created_after = time_filter(payload, "CreationTimeAfter")?;
        let created_before = time_filter(payload, "CreationTimeBefore")?;
        let modified_after = time_filter(payload, "LastModifiedTimeAfter")?;
        let modified_before = time_filter(payload, "LastModifiedTimeBefore")?;

        let mut matching: Vec<&JobRecord> = state
            .jobs
            .values()
            .filter(|job| name_contains.is_none_or(|fragment| job.name().contains(fragment)))
            .filter(|job| status_equals.is_none_or(|status| job.status().as_str() == status))
            .filter(|job| created_after.is_none_or(|after| job.created_at > after))
            .filter(|job| created_before.is_none_or(|before| job.created_at < before))
            .filter(|job| modified_after.is_none_or(|after| job.last_modified() > after))
            .filter(|job| modified_before.is_none_or(|before| job.last_modified() < before))
            .collect();

        match payload.get("SortBy").and_then(Value::as_str) {
            Some("Name") => matching.sort_by(|a, b| a.name().cmp(b.name())),
            Some("Status") => matching.sort_by(|a, b| a.status().as_str().cmp(b.status().as_str())),
            _ => matching.sort_by_key(|job| job.created_at),
        }
        if payload.get("SortOrder").and_then(Value::as_str) == Some("Descending") {
            matching.reverse();
        }

        let page: Vec<Value> = matching.iter().skip(offset).take(page_size).map(|job| job.summary()).collect();
        let mut response = Payload::new();
        response.insert(TRAINING_JOB_SCHEMA.list_key.to_string(), Value::Array(page));
        let next = offset.saturating_add(page_size);
        if next < matching.len() {
            response.insert(NEXT_TOKEN_KEY.to_string(), next.to_string().into());
        }
        Ok(response)
    }
}

impl ControlPlane for InMemoryControlPlane {
    fn execute(&self, operation: &str, payload: Payload) -> ControlPlaneResult<Payload> {
        let mut state = self.lock();
        *state.calls.entry(operation.to_string()).or_default() += 1;
        if let Some(error) = state.failures.get_mut(operation).and_then(VecDeque::pop_front) {
            debug!(operation = %operation, error = %error, "Injected failure");
            return Err(error);
        }

        let ops = &TRAINING_JOB_SCHEMA.operations;
        match operation {
            op if op == ops.create => self.create(&mut state, payload),
            op if op == ops.describe => self.describe(&mut state, &payload),
            op if op == ops.list => self.list(&state, &payload),
            op if op == ops.update => self.update(&mut state, payload),
            op if op == ops.stop => self.stop(&mut state, &payload),
            op if op == ops.delete => self.delete(&mut state, &payload),
            other => Err(ControlPlaneError::Validation(format!("Unknown operation {other}"))),
        }
    }
}

fn required_name(payload: &Payload) -> ControlPlaneResult<String> {
    match payload.get(TRAINING_JOB_SCHEMA.identifier).and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ControlPlaneError::Validation(format!("{} is required", TRAINING_JOB_SCHEMA.identifier))),
    }
}

fn not_found(name: &str) -> ControlPlaneError {
    ControlPlaneError::NotFound(format!("Requested resource not found: training job {name}"))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn time_filter(payload: &Payload, key: &str) -> ControlPlaneResult<Option<DateTime<Utc>>> {
    match payload.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|at| Some(at.with_timezone(&Utc)))
            .ok_or_else(|| ControlPlaneError::Validation(format!("{key} is not an RFC 3339 timestamp: {value}"))),
    }
}

fn object(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        _ => Payload::new(),
    }
}
