// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use mindease_engine::domain::{EmbeddingProviderKind, EngineConfigManifest, EntryRepository};
use mindease_engine::infrastructure::{EventBus, InMemoryEntryRepository};
use mindease_engine::EmotionEngine;

use super::build_engine;

pub async fn run(manifest: &EngineConfigManifest) -> Result<()> {
    // Anchors never touch stored entries; avoid locking a sled store a daemon may hold.
    let repository: Arc<dyn EntryRepository> = Arc::new(InMemoryEntryRepository::new());
    let engine = build_engine(&manifest.spec, Some(repository), EventBus::default()).await?;

    let provider = match manifest.spec.embedding.provider {
        EmbeddingProviderKind::Hashing => "hashing".to_string(),
        EmbeddingProviderKind::Ollama => format!("ollama/{}", manifest.spec.embedding.model),
    };
    println!(
        "{} ({}-dimensional, {})",
        "Emotion anchors".bold(),
        engine.dimension(),
        provider
    );
    println!();

    for summary in engine.anchors() {
        let padded = format!("{:12}", summary.name.as_str());
        let name = if summary.name.is_elevated() {
            padded.red().bold()
        } else {
            padded.bold()
        };
        println!("  {} {}", name, summary.reference_text.dimmed());
    }

    println!();
    println!("{}", "Elevated anchors (red) weigh more in cohort alerts.".dimmed());

    engine.shutdown().await?;
    Ok(())
}
