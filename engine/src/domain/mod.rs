// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: value types, policies and contracts of the emotion engine.
//!
//! Nothing in here performs I/O. Repository and embedding-provider traits are
//! declared here and implemented in [`crate::infrastructure`].

pub mod alert_policy;
pub mod anchor;
pub mod config;
pub mod embedding;
pub mod entry;
pub mod error;
pub mod events;
pub mod identity;
pub mod report;
pub mod repository;

pub use alert_policy::*;
pub use anchor::*;
pub use config::*;
pub use embedding::*;
pub use entry::*;
pub use error::*;
pub use events::*;
pub use identity::*;
pub use report::*;
pub use repository::*;
