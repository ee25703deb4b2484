// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Domain events for the emotion engine
//!
//! Published to the [`EventBus`](crate::infrastructure::EventBus) for
//! observability. Events describe what happened to cohorts and entries; they
//! never carry user text, previews or hashed identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::anchor::EmotionName;
use crate::domain::entry::EntryId;
use crate::domain::report::AlertLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    /// An entry was embedded and stored
    EntryIngested {
        entry_id: EntryId,
        cohort_id: String,
        timestamp: DateTime<Utc>,
    },

    /// An ingestion attempt failed; nothing was stored
    IngestionFailed {
        cohort_id: String,
        error_code: String,
        timestamp: DateTime<Utc>,
    },

    /// A cohort health report was generated
    CohortAnalyzed {
        cohort_id: String,
        total_entries: usize,
        dominant_emotion: EmotionName,
        alert_level: AlertLevel,
        timestamp: DateTime<Utc>,
    },

    /// The crisis gate ran; only the number of flags is reported
    CrisisCheckCompleted {
        threshold: f64,
        flagged: usize,
        timestamp: DateTime<Utc>,
    },

    /// Identity linkage was removed from stored entries
    IdentityErased {
        entries_affected: usize,
        timestamp: DateTime<Utc>,
    },

    EngineShutdown {
        total_entries: usize,
        timestamp: DateTime<Utc>,
    },
}

impl EngineEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            EngineEvent::EntryIngested { timestamp, .. }
            | EngineEvent::IngestionFailed { timestamp, .. }
            | EngineEvent::CohortAnalyzed { timestamp, .. }
            | EngineEvent::CrisisCheckCompleted { timestamp, .. }
            | EngineEvent::IdentityErased { timestamp, .. }
            | EngineEvent::EngineShutdown { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::EntryIngested { .. } => "entry_ingested",
            EngineEvent::IngestionFailed { .. } => "ingestion_failed",
            EngineEvent::CohortAnalyzed { .. } => "cohort_analyzed",
            EngineEvent::CrisisCheckCompleted { .. } => "crisis_check_completed",
            EngineEvent::IdentityErased { .. } => "identity_erased",
            EngineEvent::EngineShutdown { .. } => "engine_shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = EngineEvent::CohortAnalyzed {
            cohort_id: "Engineering_2024".to_string(),
            total_entries: 3,
            dominant_emotion: EmotionName::Burnout,
            alert_level: AlertLevel::Warning,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "cohort_analyzed");
        assert_eq!(json["dominant_emotion"], "burnout");
        assert_eq!(json["alert_level"], "WARNING");
        assert_eq!(event.event_type(), "cohort_analyzed");
    }
}
