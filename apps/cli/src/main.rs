//! Sagekit CLI - command-line front end for the sagekit lifecycle client.
//!
//! Provides a `sagekit` command that validates training-job specs offline,
//! prints the generated attribute table, and walks the full lifecycle
//! against the in-memory control plane.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Sagekit - lifecycle client for remotely-managed ML resources
#[derive(Parser, Debug)]
#[command(name = "sagekit", author, version, about = "Sagekit - resource lifecycle client")]
struct Args {
    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a training-job creation spec
    ///
    /// Parses the JSON request and runs every local check the client
    /// performs before a create call. Nothing is sent anywhere.
    Validate {
        /// Path to the JSON spec
        spec: PathBuf,

        /// Output results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the training-job attribute table
    Fields {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run create, wait, list and delete against the simulated control plane
    Demo {
        /// Number of jobs to create
        #[arg(long, default_value_t = 3)]
        jobs: u32,

        /// Script the last job to fail
        #[arg(long)]
        fail: bool,

        /// Client configuration file (defaults to ~/.sagekit/config.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Manage the client configuration file
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    match args.command {
        Command::Validate { spec, json } => commands::validate::execute(&spec, json),
        Command::Fields { json } => commands::fields::execute(json),
        Command::Demo { jobs, fail, config } => commands::demo::execute(jobs, fail, config.as_deref()),
        Command::Config(cmd) => commands::config::execute(cmd),
    }
}
