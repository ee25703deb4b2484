// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Ingestion: validate, embed once, anonymize, truncate, append.
//!
//! Ingestion is atomic per entry. The provider is called exactly once; if it
//! fails, times out or returns a vector of the wrong dimension, nothing is
//! stored and the call fails with `EmbeddingUnavailable`. The full text is
//! only held for the duration of the call.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::domain::embedding::EmbeddingProvider;
use crate::domain::entry::{EmotionalEntry, IngestRequest};
use crate::domain::error::EngineError;
use crate::domain::identity::IdentityHasher;
use crate::domain::repository::EntryRepository;

pub struct IngestionService {
    provider: Arc<dyn EmbeddingProvider>,
    repository: Arc<dyn EntryRepository>,
    hasher: IdentityHasher,
    preview_max_chars: usize,
    dimension: usize,
    timeout: Duration,
}

impl IngestionService {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        repository: Arc<dyn EntryRepository>,
        hasher: IdentityHasher,
        preview_max_chars: usize,
        dimension: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            repository,
            hasher,
            preview_max_chars,
            dimension,
            timeout,
        }
    }

    pub fn hasher(&self) -> &IdentityHasher {
        &self.hasher
    }

    pub async fn ingest(&self, request: IngestRequest) -> Result<EmotionalEntry, EngineError> {
        request.validate()?;

        let embedding = tokio::time::timeout(self.timeout, self.provider.embed(&request.text))
            .await
            .map_err(|_| {
                EngineError::EmbeddingUnavailable(format!(
                    "{} provider timed out after {:?}",
                    self.provider.name(),
                    self.timeout
                ))
            })??;

        if embedding.dimension() != self.dimension {
            return Err(EngineError::EmbeddingUnavailable(format!(
                "{} provider returned dimension {}, expected {}",
                self.provider.name(),
                embedding.dimension(),
                self.dimension
            )));
        }

        let entry = EmotionalEntry::new(
            request.cohort_id,
            self.hasher.rehash(request.user_id_hash.trim()),
            &request.text,
            self.preview_max_chars,
            embedding,
            request.metadata,
        );

        self.repository.append(entry.clone()).await?;
        debug!(entry_id = %entry.id, cohort_id = %entry.cohort_id, "Entry stored");
        Ok(entry)
    }
}
