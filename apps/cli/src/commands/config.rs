//! Configuration file commands.

use anyhow::Context;
use clap::Subcommand;
use colored::Colorize;
use sagekit_core::ClientConfig;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a configuration file with default values
    Init {
        /// Target path (defaults to ~/.sagekit/config.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show {
        /// Configuration file (defaults to ~/.sagekit/config.toml if present)
        path: Option<PathBuf>,
    },
}

/// Execute a config subcommand.
pub fn execute(command: ConfigCommand) -> anyhow::Result<()> {
    match command {
        ConfigCommand::Init { path, force } => init(path, force),
        ConfigCommand::Show { path } => show(path),
    }
}

fn init(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(ClientConfig::default_path);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }

    ClientConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {}", "✓ Wrote default configuration to".green().bold(), path.display());
    Ok(())
}

fn show(path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ClientConfig::discover(path.as_deref()).context("Failed to load configuration")?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}
