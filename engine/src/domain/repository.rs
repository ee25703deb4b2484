// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Repository interface for emotional entries
//! Append-only storage with a single identity-erasure mutation

use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::domain::entry::EmotionalEntry;
use crate::domain::identity::HashedUserId;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Storage backend error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Inconsistent store: {0}")]
    Inconsistent(String),
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}

/// Store of [`EmotionalEntry`] records.
///
/// Implementations must return entries in insertion order, and `append` must
/// be atomic: a reader sees an entry fully or not at all. Persistent backends
/// make `append` and `erase_identity` durable before returning.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    async fn append(&self, entry: EmotionalEntry) -> Result<(), RepositoryError>;

    /// All entries in insertion order, optionally restricted to one cohort
    async fn all_entries(&self, cohort_id: Option<&str>) -> Result<Vec<EmotionalEntry>, RepositoryError>;

    async fn count(&self) -> Result<usize, RepositoryError>;

    /// Drop the identity linkage of every entry stored under `user_id_hash`.
    /// Entries stay in place so cohort aggregates do not change.
    /// Returns the number of entries affected.
    async fn erase_identity(&self, user_id_hash: &HashedUserId) -> Result<usize, RepositoryError>;

    /// Distinct vector dimensions present in the store
    async fn stored_dimensions(&self) -> Result<BTreeSet<usize>, RepositoryError> {
        Ok(self
            .all_entries(None)
            .await?
            .iter()
            .map(|entry| entry.embedding.dimension())
            .collect())
    }

    /// Persist buffered writes
    async fn flush(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
