// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # MindEase CLI
//!
//! The `mindease` binary hosts the emotion engine behind its HTTP API and
//! offers operator tooling around it.
//!
//! ## Commands
//!
//! - `mindease serve` - Run the HTTP daemon
//! - `mindease demo` - Seed the simulation corpus and run the demonstration queries
//! - `mindease anchors` - List the emotion anchors
//! - `mindease config show|validate|generate` - Configuration management
//! - `mindease hash-id <raw>` - Derive the caller-side user hash

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use mindease_engine::domain::{EngineConfigManifest, LoggingConfig};

mod commands;

use commands::ConfigCommand;

/// MindEase - semantic emotional analysis for anonymous peer support
#[derive(Parser)]
#[command(name = "mindease")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "MINDEASE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Defaults to the configured level.
    #[arg(long, global = true, env = "MINDEASE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API daemon
    #[command(name = "serve")]
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Seed the simulation corpus into a fresh in-memory engine and query it
    #[command(name = "demo")]
    Demo {
        /// Similarity threshold for the top-anger query
        #[arg(long, default_value_t = 0.7)]
        anger_threshold: f64,

        /// Crisis threshold for the intervention check
        #[arg(long, default_value_t = 0.85)]
        crisis_threshold: f64,
    },

    /// List the emotion anchors and their reference phrases
    #[command(name = "anchors")]
    Anchors,

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Derive the caller-side hash of a raw user id
    #[command(name = "hash-id")]
    HashId {
        /// Raw user identifier
        raw: String,

        /// Also print the stored (ingestion-salted) form under the current config
        #[arg(long)]
        stored: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { command } => {
            init_logging(cli.log_level.as_deref(), &LoggingConfig::default())?;
            commands::config::handle_command(command, cli.config).await
        }
        Commands::Serve { host, port } => {
            let manifest = load_manifest(cli.config, cli.log_level.as_deref())?;
            commands::serve::run(manifest, host, port).await
        }
        Commands::Demo {
            anger_threshold,
            crisis_threshold,
        } => {
            let manifest = load_manifest(cli.config, cli.log_level.as_deref())?;
            commands::demo::run(&manifest, anger_threshold, crisis_threshold).await
        }
        Commands::Anchors => {
            let manifest = load_manifest(cli.config, cli.log_level.as_deref())?;
            commands::anchors::run(&manifest).await
        }
        Commands::HashId { raw, stored } => {
            let manifest = load_manifest(cli.config, cli.log_level.as_deref())?;
            commands::hash_id::run(&manifest, &raw, stored)
        }
    }
}

/// Load the manifest and install logging from its observability section.
///
/// Config subcommands skip this so they can report a broken file themselves.
fn load_manifest(path: Option<PathBuf>, log_level: Option<&str>) -> Result<EngineConfigManifest> {
    let manifest =
        EngineConfigManifest::load_or_default(path).context("Failed to load configuration")?;
    init_logging(log_level, &manifest.spec.observability.logging)?;
    Ok(manifest)
}

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--log-level`, which wins over the configured level.
fn init_logging(level_override: Option<&str>, config: &LoggingConfig) -> Result<()> {
    let level = level_override.unwrap_or(&config.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if config.format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["mindease", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_demo_defaults() {
        let cli = Cli::try_parse_from(["mindease", "demo"]).unwrap();
        match cli.command {
            Commands::Demo {
                anger_threshold,
                crisis_threshold,
            } => {
                assert_eq!(anger_threshold, 0.7);
                assert_eq!(crisis_threshold, 0.85);
            }
            _ => panic!("expected demo"),
        }
    }

    #[test]
    fn test_parse_global_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["mindease", "hash-id", "alice", "--config", "/tmp/m.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/m.yaml")));
        assert!(matches!(cli.command, Commands::HashId { stored: false, .. }));
    }

    #[test]
    fn test_subcommand_is_required() {
        assert!(Cli::try_parse_from(["mindease"]).is_err());
    }
}
