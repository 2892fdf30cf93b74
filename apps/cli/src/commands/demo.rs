//! Simulated lifecycle walkthrough.
//!
//! Creates a batch of training jobs on the in-memory control plane, waits for
//! each to finish, lists them page by page and deletes them. Time is
//! simulated, so polling delays from the configuration cost nothing.

use anyhow::Context;
use colored::Colorize;
use sagekit_core::{
    delete_all, ClientConfig, InMemoryControlPlane, LifecycleError, ManualClock, ResourceClient, ScriptStep,
};
use sagekit_resources::training_job::{
    AlgorithmSpecification, Channel, OutputDataConfig, ResourceConfig, StoppingCondition,
};
use sagekit_resources::{CreateTrainingJobRequest, ListFilters, TrainingJob};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

const SIMULATED_FAILURE: &str = "AlgorithmError: simulated failure, exit code 1";

/// Execute the demo command.
pub fn execute(jobs: u32, fail: bool, config_path: Option<&Path>) -> anyhow::Result<()> {
    if jobs == 0 {
        anyhow::bail!("--jobs must be at least 1");
    }
    let config = ClientConfig::discover(config_path).context("Failed to load configuration")?;

    let sim = Arc::new(InMemoryControlPlane::new());
    let clock = Arc::new(ManualClock::new());
    let client = ResourceClient::<TrainingJob>::from_config_with_clock(sim.clone(), &config, clock.clone())
        .context("Failed to build client")?;

    let run_id = uuid::Uuid::new_v4().simple().to_string();
    let prefix = format!("demo-{}", &run_id[..8]);

    info!(run = %prefix, jobs, fail, "Starting simulated lifecycle run");

    println!("{}", "sagekit demo".bold().cyan());
    println!();
    println!("  Run: {}  jobs: {}  poll interval: {}s", prefix.bold(), jobs, config.wait.poll_interval_secs);
    println!();

    let mut handles = Vec::new();
    for i in 1..=jobs {
        let name = format!("{prefix}-{i}");
        if fail && i == jobs {
            sim.script_job(&name, ScriptStep::failing_script(SIMULATED_FAILURE));
        }
        let handle = client.create(&request(&name)).with_context(|| format!("Failed to create {name}"))?;
        println!("  {} {}", "created".green(), handle.arn().unwrap_or_else(|| name.clone()));
        handles.push(handle);
    }
    println!();

    let mut failures = 0;
    for handle in &mut handles {
        match client.wait_default(handle) {
            Ok(outcome) => println!(
                "  {} {} {} after {} polls ({:?} simulated)",
                "✓".green().bold(),
                handle.name(),
                outcome.status.to_string().green(),
                outcome.polls,
                outcome.elapsed
            ),
            Err(LifecycleError::ResourceFailed { name, status, reason }) => {
                failures += 1;
                println!("  {} {} {}: {}", "✗".red().bold(), name, status.red(), reason);
            }
            Err(err) => return Err(err).with_context(|| format!("Failed waiting for {}", handle.name())),
        }
    }
    println!();

    let filters = ListFilters::new().name_contains(prefix.clone());
    let mut pager = client.get_all(&filters);
    println!("{}", "  Listing".bold());
    for summary in pager.by_ref() {
        let summary = summary.context("Failed to list training jobs")?;
        println!(
            "    {:<24} {:<10} created {}",
            summary.training_job_name,
            summary.training_job_status,
            summary.creation_time.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("    ({} list calls)", pager.pages_fetched());
    println!();

    let report = delete_all(&client, handles);
    println!("  Deleted {} of {} jobs", report.deleted.len(), report.total());
    for (handle, err) in &report.failed {
        println!("    {} {}: {}", "✗".red(), handle.name(), err);
    }

    println!();
    if failures == 0 && report.is_complete_success() {
        println!("{}", "✓ Demo finished".green().bold());
    } else {
        println!("{}", format!("Demo finished with {} failed job(s)", failures).yellow().bold());
    }
    Ok(())
}

fn request(name: &str) -> CreateTrainingJobRequest {
    CreateTrainingJobRequest::new(
        name,
        AlgorithmSpecification::image("683313688378.dkr.ecr.us-east-1.amazonaws.com/sagemaker-xgboost:1.7-1"),
        "arn:aws:iam::000000000000:role/SageKitDemoRole",
        OutputDataConfig { s3_output_path: "s3://sagekit-demo/output".to_string(), kms_key_id: None },
        ResourceConfig {
            instance_type: "ml.m5.xlarge".to_string(),
            instance_count: 1,
            volume_size_in_gb: 30,
            keep_alive_period_in_seconds: None,
        },
        StoppingCondition { max_runtime_in_seconds: 3600, max_wait_time_in_seconds: None },
    )
    .with_channel(Channel::s3_prefix("train", "s3://sagekit-demo/train/"))
    .with_hyper_parameter("num_round", "50")
    .with_hyper_parameter("objective", "binary:logistic")
}
