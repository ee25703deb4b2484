// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Engine error taxonomy.
//!
//! | Category | Variants | Behaviour |
//! |----------|----------|-----------|
//! | input | `InvalidInput`, `UnknownAnchor`, `InvalidCrisisThreshold` | rejected synchronously, nothing applied |
//! | dependency | `EmbeddingUnavailable` | the triggering call fails as a whole, no retry |
//! | state | `EmptyCohort` | deterministic query-time condition, not a fault |
//! | internal | `Repository`, `NotReady` | storage failure or use after shutdown |
//!
//! No variant is fatal at process level: a failed call never affects later
//! calls or stored data.

use serde::Serialize;

use crate::domain::embedding::EmbeddingError;
use crate::domain::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    #[error("Unknown emotion anchor: '{0}'")]
    UnknownAnchor(String),

    #[error("Cohort has no entries: '{0}'")]
    EmptyCohort(String),

    #[error("Invalid crisis threshold {threshold}: {reason}")]
    InvalidCrisisThreshold { threshold: f64, reason: String },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Engine has been shut down")]
    NotReady,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Input,
    Dependency,
    State,
    Internal,
}

impl EngineError {
    /// Stable machine-readable code for boundary responses.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidInput(_) => "INVALID_INPUT",
            EngineError::EmbeddingUnavailable(_) => "EMBEDDING_UNAVAILABLE",
            EngineError::UnknownAnchor(_) => "UNKNOWN_ANCHOR",
            EngineError::EmptyCohort(_) => "EMPTY_COHORT",
            EngineError::InvalidCrisisThreshold { .. } => "INVALID_CRISIS_THRESHOLD",
            EngineError::Repository(_) => "REPOSITORY_FAILURE",
            EngineError::NotReady => "NOT_READY",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::InvalidInput(_)
            | EngineError::UnknownAnchor(_)
            | EngineError::InvalidCrisisThreshold { .. } => ErrorCategory::Input,
            EngineError::EmbeddingUnavailable(_) => ErrorCategory::Dependency,
            EngineError::EmptyCohort(_) => ErrorCategory::State,
            EngineError::Repository(_) | EngineError::NotReady => ErrorCategory::Internal,
        }
    }

    pub(crate) fn invalid_crisis_threshold(threshold: f64, reason: impl Into<String>) -> Self {
        EngineError::InvalidCrisisThreshold {
            threshold,
            reason: reason.into(),
        }
    }
}

impl From<EmbeddingError> for EngineError {
    fn from(err: EmbeddingError) -> Self {
        EngineError::EmbeddingUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_categories() {
        let err = EngineError::EmptyCohort("Arts_2024".to_string());
        assert_eq!(err.code(), "EMPTY_COHORT");
        assert_eq!(err.category(), ErrorCategory::State);

        let err = EngineError::invalid_crisis_threshold(0.5, "below alerting threshold");
        assert_eq!(err.code(), "INVALID_CRISIS_THRESHOLD");
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_provider_errors_become_embedding_unavailable() {
        let err: EngineError = EmbeddingError::Network("connection refused".to_string()).into();
        assert!(matches!(err, EngineError::EmbeddingUnavailable(_)));
        assert_eq!(err.category(), ErrorCategory::Dependency);
    }
}
