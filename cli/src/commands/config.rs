// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use mindease_engine::domain::{EmbeddingProviderKind, EngineConfigManifest};

const TEMPLATE: &str = include_str!("../../templates/mindease-config.yaml");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./mindease-config.yaml")]
        output: PathBuf,

        /// Write the bare defaults instead of the commented template
        #[arg(long)]
        minimal: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(config_override, paths),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate {
            output,
            minimal,
            force,
        } => generate(&output, minimal, force),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool) -> Result<()> {
    let config = EngineConfigManifest::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &config_override {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. MINDEASE_CONFIG_PATH: {}",
            std::env::var("MINDEASE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./mindease-config.yaml");
        println!("  4. ~/.mindease/config.yaml");
        println!("  5. /etc/mindease/config.yaml");
        println!();
    }

    let spec = &config.spec;
    println!("{}", "Current configuration:".bold());
    println!();

    println!("{} {}", "Deployment:".bold(), config.metadata.name);
    println!();

    println!("{}", "Embedding:".bold());
    match spec.embedding.provider {
        EmbeddingProviderKind::Hashing => println!("  Provider: hashing"),
        EmbeddingProviderKind::Ollama => {
            println!("  Provider: ollama");
            println!("    Endpoint: {}", spec.embedding.endpoint);
            println!("    Model: {}", spec.embedding.model);
        }
    }
    match spec.embedding.dimension {
        Some(dimension) => println!("  Dimension: {}", dimension),
        None => println!("  Dimension: {}", "(from provider)".dimmed()),
    }
    println!("  Timeout: {:?}", spec.embedding.timeout);
    println!();

    println!("{}", "Storage:".bold());
    println!("  Backend: {:?}", spec.storage.backend);
    println!("  Path: {}", spec.storage.path.display());
    println!();

    println!("{}", "Thresholds:".bold());
    println!("  Crisis: {}", spec.thresholds.crisis);
    println!("  Search default: {}", spec.thresholds.search_default);
    println!("  Search top-k: {}", spec.thresholds.search_top_k);
    println!(
        "  Alerts: urgent {} / warning {} / monitor {}",
        spec.alerting.urgent, spec.alerting.warning, spec.alerting.monitor
    );
    println!();

    println!("{}", "Identity:".bold());
    println!("  Salt version: {}", spec.identity.salt_version);
    println!("  Salt: {}", "<redacted>".dimmed());
    println!();

    println!("{}", "Network:".bold());
    println!("  Listen: {}:{}", spec.network.bind_address, spec.network.port);
    if spec.observability.metrics.enabled {
        println!("  Metrics: :{}", spec.observability.metrics.port);
    }
    println!();

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    // load_or_default validates after env overrides and secret resolution.
    EngineConfigManifest::load_or_default(config_path)
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: &Path, minimal: bool, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            output.display()
        );
    }

    if minimal {
        EngineConfigManifest::default()
            .to_yaml_file(output)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    } else {
        std::fs::write(output, TEMPLATE)
            .with_context(|| format!("Failed to write config to {:?}", output))?;
    }

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_is_a_valid_manifest() {
        let manifest = EngineConfigManifest::from_yaml_str(TEMPLATE).unwrap();
        manifest.validate().unwrap();
        assert_eq!(manifest.spec.embedding.dimension, Some(256));
        assert_eq!(manifest.spec.network.port, 5000);
    }

    #[test]
    fn test_generate_minimal_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("mindease-config.yaml");

        generate(&output, true, false).unwrap();
        let manifest = EngineConfigManifest::from_yaml_file(&output).unwrap();
        manifest.validate().unwrap();
    }

    #[test]
    fn test_generate_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("mindease-config.yaml");
        std::fs::write(&output, "keep me").unwrap();

        assert!(generate(&output, false, false).is_err());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

        generate(&output, false, true).unwrap();
        assert!(std::fs::read_to_string(&output).unwrap().contains("kind: EngineConfig"));
    }

    #[test]
    fn test_validate_rejects_low_crisis_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("bad.yaml");
        std::fs::write(
            &output,
            "apiVersion: mindease.io/v1\nkind: EngineConfig\nmetadata:\n  name: bad\nspec:\n  thresholds:\n    crisis: 0.5\n",
        )
        .unwrap();

        assert!(validate(Some(output)).is_err());
    }
}
