//! Spec validation command.
//!
//! Runs the same local checks `ResourceClient::create` performs, offline.

use anyhow::Context;
use colored::Colorize;
use sagekit_abstraction::to_payload;
use sagekit_resources::{CreateTrainingJobRequest, ResourceResult, TRAINING_JOB_SCHEMA};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

#[derive(Serialize)]
struct JsonOutput {
    spec: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    training_job_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the validate command.
///
/// Exits with an error if the spec cannot be parsed or fails validation.
pub fn execute(spec: &Path, json: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(spec)
        .with_context(|| format!("Failed to read spec file: {}", spec.display()))?;

    let result = check(&content);
    debug!(spec = %spec.display(), valid = result.is_ok(), "Checked training job spec");

    if json {
        let output = JsonOutput {
            spec: spec.display().to_string(),
            valid: result.is_ok(),
            training_job_name: result.as_ref().ok().cloned(),
            error: result.as_ref().err().map(ToString::to_string),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", "sagekit validate".bold().cyan());
        println!();
        match &result {
            Ok(name) => {
                println!("  {} {}", "✓".green().bold(), spec.display());
                println!("    TrainingJobName: {}", name.bold());
            }
            Err(err) => {
                println!("  {} {}", "✗".red().bold(), spec.display());
                println!("    {}", err.to_string().red());
            }
        }
    }

    result.map(|_| ()).with_context(|| format!("{} is not a valid training job spec", spec.display()))
}

/// Parses and validates, returning the job name on success.
fn check(content: &str) -> ResourceResult<String> {
    let request = CreateTrainingJobRequest::from_json(content)?;
    request.validate()?;
    let payload = to_payload(&request)
        .map_err(|e| sagekit_resources::ResourceError::InvalidSpec(e.to_string()))?;
    TRAINING_JOB_SCHEMA.check_required(&payload)?;
    Ok(request.training_job_name)
}
