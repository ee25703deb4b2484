// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the MindEase CLI

pub mod anchors;
pub mod config;
pub mod demo;
pub mod hash_id;
pub mod serve;

pub use self::config::ConfigCommand;

use std::sync::Arc;

use anyhow::{Context, Result};
use mindease_engine::application::{create_embedding_provider, create_entry_repository};
use mindease_engine::domain::{EngineSpec, EntryRepository};
use mindease_engine::infrastructure::EventBus;
use mindease_engine::StandardEmotionEngine;

/// Build a ready engine from the configured provider.
///
/// `repository` replaces the configured storage backend when given.
pub(crate) async fn build_engine(
    spec: &EngineSpec,
    repository: Option<Arc<dyn EntryRepository>>,
    event_bus: EventBus,
) -> Result<StandardEmotionEngine> {
    let provider =
        create_embedding_provider(&spec.embedding).context("Failed to create embedding provider")?;
    let repository = match repository {
        Some(repository) => repository,
        None => create_entry_repository(&spec.storage).context("Failed to open entry store")?,
    };

    StandardEmotionEngine::initialize(spec, provider, repository, event_bus)
        .await
        .context("Failed to initialize emotion engine")
}
