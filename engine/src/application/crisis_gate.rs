// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Crisis Gate
//!
//! The only code path that may emit a [`HashedUserId`](crate::domain::HashedUserId)
//! next to a similarity score. Every entry, across all cohorts, is scored
//! against the `crisis` anchor; an entry produces a [`CrisisFlag`] only when
//! `score >= threshold`.
//!
//! The threshold must never be lower than the highest search or alerting
//! threshold in use (`floor`). Violations fail with
//! [`EngineError::InvalidCrisisThreshold`] before any entry is read.
//!
//! Entries whose identity was erased carry no hash and are skipped.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::domain::anchor::{AnchorSet, EmotionName};
use crate::domain::error::EngineError;
use crate::domain::report::CrisisFlag;
use crate::domain::repository::EntryRepository;

pub struct CrisisGate {
    repository: Arc<dyn EntryRepository>,
    anchors: Arc<AnchorSet>,
    floor: f64,
}

impl CrisisGate {
    pub fn new(repository: Arc<dyn EntryRepository>, anchors: Arc<AnchorSet>, floor: f64) -> Self {
        Self {
            repository,
            anchors,
            floor,
        }
    }

    /// Lowest threshold this gate accepts.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    pub fn validate_threshold(&self, threshold: f64) -> Result<(), EngineError> {
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(EngineError::invalid_crisis_threshold(threshold, "must be in (0, 1]"));
        }
        if threshold < self.floor {
            return Err(EngineError::invalid_crisis_threshold(
                threshold,
                format!("lower than the highest search/alert threshold ({})", self.floor),
            ));
        }
        Ok(())
    }

    /// Flags ordered by similarity, highest first; ties keep insertion order.
    pub async fn check(&self, threshold: f64) -> Result<Vec<CrisisFlag>, EngineError> {
        self.validate_threshold(threshold)?;

        let crisis = self.anchors.get(EmotionName::Crisis);
        let entries = self.repository.all_entries(None).await?;
        let triggered_at = Utc::now();

        let mut flags = Vec::new();
        for entry in entries {
            let similarity = entry.similarity_to(&crisis.embedding)?;
            if similarity < threshold {
                continue;
            }
            let Some(user_id_hash) = entry.user_id_hash else {
                continue;
            };
            flags.push(CrisisFlag {
                user_id_hash,
                cohort_id: entry.cohort_id,
                crisis_similarity: similarity,
                triggered_at,
            });
        }

        flags.sort_by(|a, b| b.crisis_similarity.total_cmp(&a.crisis_similarity));

        if !flags.is_empty() {
            warn!(flagged = flags.len(), threshold, "Crisis gate de-masked entries");
        }
        Ok(flags)
    }
}
