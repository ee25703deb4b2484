// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # `mindease-engine`: Semantic Emotional Analysis Engine
//!
//! Stores embeddings of anonymized emotional disclosures, compares them against
//! seven fixed emotion anchors, aggregates the results per cohort and gates the
//! single path on which a hashed identity may leave the aggregate boundary.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | anchors, entries, identity hashing, reports, config, errors, repository trait |
//! | [`application`] | Application | similarity search, cohort analyzer, crisis gate, ingestion, engine facade |
//! | [`infrastructure`] | Infrastructure | in-memory and sled stores, embedding providers, event bus |
//! | [`presentation`] | Presentation | axum HTTP boundary |
//!
//! ## Privacy Boundary
//!
//! Every read path returns cohort-level projections only. [`CrisisFlag`] is the
//! one output type that carries a [`HashedUserId`], and it is produced solely
//! by [`application::CrisisGate`].

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::{EmotionEngine, StandardEmotionEngine};
