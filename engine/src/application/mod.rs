// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Application layer: services composed into the [`EmotionEngine`] facade.

pub mod cohort_health;
pub mod crisis_gate;
pub mod engine;
pub mod factory;
pub mod ingestion;
pub mod search;

pub use cohort_health::{emotion_profile, CohortHealthAnalyzer};
pub use crisis_gate::CrisisGate;
pub use engine::{spawn_ingest, EmotionEngine, StandardEmotionEngine, DISTANCE_METRIC};
pub use factory::{create_embedding_provider, create_entry_repository};
pub use ingestion::IngestionService;
pub use search::{rank, SimilaritySearch};
