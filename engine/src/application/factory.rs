// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Component Factory - Application Layer
//!
//! Creates the concrete entry store and embedding provider selected in
//! [`EngineSpec`](crate::domain::EngineSpec). The domain layer only knows the traits; this module is the
//! one place that maps configuration onto infrastructure types.

use std::sync::Arc;

use crate::domain::config::{EmbeddingConfig, EmbeddingProviderKind, StorageBackendKind, StorageConfig};
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::error::EngineError;
use crate::domain::repository::EntryRepository;
use crate::infrastructure::{
    HashingEmbeddingProvider, InMemoryEntryRepository, OllamaEmbeddingProvider, SledEntryRepository,
};

/// Creates an EntryRepository implementation based on the configured backend
pub fn create_entry_repository(config: &StorageConfig) -> Result<Arc<dyn EntryRepository>, EngineError> {
    match config.backend {
        StorageBackendKind::InMemory => Ok(Arc::new(InMemoryEntryRepository::new())),
        StorageBackendKind::Sled => Ok(Arc::new(SledEntryRepository::open(&config.path)?)),
    }
}

/// Creates an EmbeddingProvider implementation based on the configured provider
pub fn create_embedding_provider(
    config: &EmbeddingConfig,
) -> Result<Arc<dyn EmbeddingProvider>, EngineError> {
    match config.provider {
        EmbeddingProviderKind::Hashing => {
            let dimension = config.dimension.ok_or_else(|| {
                EngineError::InvalidInput("embedding.dimension is required for the hashing provider".to_string())
            })?;
            Ok(Arc::new(HashingEmbeddingProvider::new(dimension)))
        }
        EmbeddingProviderKind::Ollama => Ok(Arc::new(OllamaEmbeddingProvider::new(
            config.endpoint.clone(),
            config.model.clone(),
            config.timeout,
        )?)),
    }
}
