// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Emotional entries and the ingestion request that creates them.
//!
//! An entry is created only through ingestion and never mutated afterwards,
//! with one exception: identity erasure drops the `user_id_hash` linkage.
//! The store never holds more than `preview_max_chars` characters of the
//! user's text.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::embedding::Embedding;
use crate::domain::error::EngineError;
use crate::domain::identity::HashedUserId;
use crate::domain::repository::RepositoryError;

/// Hard ceiling on the stored preview length, in characters.
pub const MAX_PREVIEW_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Mood picked in the UI, e.g. "Anxious".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood_label: Option<String>,

    /// Conversation mode, e.g. "text" or "voice".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

/// One stored, embedded, anonymized disclosure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionalEntry {
    pub id: EntryId,
    pub cohort_id: String,
    /// `None` once the identity has been erased.
    pub user_id_hash: Option<HashedUserId>,
    pub text_preview: String,
    pub embedding: Embedding,
    #[serde(default)]
    pub metadata: EntryMetadata,
    pub created_at: DateTime<Utc>,
}

impl EmotionalEntry {
    pub fn new(
        cohort_id: String,
        user_id_hash: HashedUserId,
        text: &str,
        preview_max_chars: usize,
        embedding: Embedding,
        metadata: EntryMetadata,
    ) -> Self {
        Self {
            id: EntryId::new(),
            cohort_id,
            user_id_hash: Some(user_id_hash),
            text_preview: truncate_preview(text, preview_max_chars),
            embedding,
            metadata,
            created_at: Utc::now(),
        }
    }

    pub fn is_erased(&self) -> bool {
        self.user_id_hash.is_none()
    }

    /// Cosine similarity of the stored vector to `query`.
    ///
    /// A stored vector whose dimension differs from the query means the store
    /// was written under another embedding setup; that is reported as a
    /// repository inconsistency rather than scored.
    pub fn similarity_to(&self, query: &Embedding) -> Result<f64, EngineError> {
        query.cosine_similarity(&self.embedding).map_err(|e| {
            EngineError::Repository(RepositoryError::Inconsistent(format!("entry {}: {}", self.id, e)))
        })
    }
}

/// Keep at most `max_chars` characters (never more than [`MAX_PREVIEW_CHARS`]).
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars.min(MAX_PREVIEW_CHARS)).collect()
}

/// Input of the `ingest` operation.
///
/// `user_id_hash` is the caller-stage hash; the engine hashes it again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub cohort_id: String,
    pub user_id_hash: String,
    pub text: String,
    #[serde(default)]
    pub metadata: EntryMetadata,
}

impl IngestRequest {
    pub fn new(
        cohort_id: impl Into<String>,
        user_id_hash: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            cohort_id: cohort_id.into(),
            user_id_hash: user_id_hash.into(),
            text: text.into(),
            metadata: EntryMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: EntryMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.cohort_id.trim().is_empty() {
            return Err(EngineError::InvalidInput("cohort_id cannot be empty".to_string()));
        }
        if self.user_id_hash.trim().is_empty() {
            return Err(EngineError::InvalidInput("user_id_hash cannot be empty".to_string()));
        }
        if self.text.trim().is_empty() {
            return Err(EngineError::InvalidInput("text cannot be empty".to_string()));
        }
        Ok(())
    }
}
