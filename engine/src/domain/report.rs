// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Derived, never-persisted output shapes.
//!
//! Each type here is a restricted projection: only [`CrisisFlag`] carries a
//! [`HashedUserId`], and no type carries raw or preview text.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::anchor::EmotionName;
use crate::domain::identity::HashedUserId;

/// Monotonic bucketing of a single similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// `< 0.5` LOW, `[0.5, 0.7)` MODERATE, `[0.7, 0.9)` HIGH, `>= 0.9` CRITICAL.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            RiskLevel::Critical
        } else if score >= 0.7 {
            RiskLevel::High
        } else if score >= 0.5 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

/// Cohort-level alert produced by an [`AlertPolicy`](crate::domain::AlertPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    Stable,
    Monitor,
    Warning,
    Urgent,
}

/// Mean similarity of a cohort's entries to each anchor, in `[-1, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmotionProfile(BTreeMap<EmotionName, f64>);

impl EmotionProfile {
    pub fn new(scores: BTreeMap<EmotionName, f64>) -> Self {
        Self(scores)
    }

    pub fn get(&self, name: EmotionName) -> Option<f64> {
        self.0.get(&name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EmotionName, f64)> + '_ {
        self.0.iter().map(|(name, score)| (*name, *score))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All scores, highest first; equal scores ordered by anchor priority.
    pub fn ranked(&self) -> Vec<(EmotionName, f64)> {
        let mut ranked: Vec<_> = self.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| a.0.priority_rank().cmp(&b.0.priority_rank()))
        });
        ranked
    }

    /// The `n` highest-scoring anchors.
    pub fn top(&self, n: usize) -> Vec<(EmotionName, f64)> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }

    /// Anchor with the maximum score; ties go to the higher-priority anchor.
    pub fn dominant(&self) -> Option<EmotionName> {
        self.ranked().first().map(|(name, _)| *name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortHealthReport {
    pub cohort_id: String,
    pub total_entries: usize,
    pub dominant_emotion: EmotionName,
    pub alert_level: AlertLevel,
    pub emotion_profile: EmotionProfile,
    pub generated_at: DateTime<Utc>,
}

/// Result row of emotion/phrase search. Never includes identity or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionMatch {
    pub cohort_id: String,
    pub similarity_score: f64,
    pub risk_level: RiskLevel,
}

impl EmotionMatch {
    pub fn new(cohort_id: String, similarity_score: f64) -> Self {
        Self {
            cohort_id,
            similarity_score,
            risk_level: RiskLevel::from_score(similarity_score),
        }
    }
}

/// De-masked crisis signal. Only the crisis gate constructs these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisFlag {
    pub user_id_hash: HashedUserId,
    pub cohort_id: String,
    pub crisis_similarity: f64,
    pub triggered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_entries: usize,
    pub anchor_count: usize,
    pub dimension: usize,
    pub distance_metric: String,
}
