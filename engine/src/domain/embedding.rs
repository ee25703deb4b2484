// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Embedding value type and the embedding-provider port.
//!
//! The provider is an external collaborator (Anti-Corruption Layer): the engine
//! only ever asks it to turn a string into a fixed-length vector. Concrete
//! adapters live in `crate::infrastructure`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A non-empty, finite embedding vector.
///
/// Dimensionality is not fixed by the type itself; the engine pins a single
/// dimension `D` when the anchor set is built and rejects every vector that
/// does not match it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.is_empty() {
            return Err(EmbeddingError::InvalidVector("embedding is empty".to_string()));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidVector(
                "embedding contains non-finite values".to_string(),
            ));
        }
        Ok(Self(values))
    }

    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    /// Cosine similarity against another embedding of the same dimension.
    pub fn cosine_similarity(&self, other: &Embedding) -> Result<f64, EmbeddingError> {
        cosine_similarity(&self.0, &other.0)
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(embedding: Embedding) -> Self {
        embedding.0
    }
}

/// `dot(a, b) / (|a| * |b|)`, accumulated in f64.
///
/// Returns 0.0 when either vector has zero norm. The norm product is taken
/// under a single square root so that a vector compared with itself yields
/// exactly 1.0. Vectors of different length are refused.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (x, y)| {
            let (x, y) = (f64::from(*x), f64::from(*y));
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a * norm_b).sqrt()).clamp(-1.0, 1.0))
}

/// Port to the external embedding model.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Convert free text into a vector. Called exactly once per ingestion.
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError>;

    /// Short provider name for logs and stats (e.g. "ollama", "hashing").
    fn name(&self) -> &str;
}

/// Errors raised by embedding adapters.
///
/// The engine folds every one of these into
/// [`EngineError::EmbeddingUnavailable`](crate::domain::EngineError).
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Invalid embedding vector: {0}")]
    InvalidVector(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_similarity_is_exactly_one() {
        let v = Embedding::new(vec![0.3, -1.7, 2.2, 0.01, 9.5]).unwrap();
        assert_eq!(v.cosine_similarity(&v).unwrap(), 1.0);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]).unwrap(), -1.0);
    }

    #[test]
    fn test_zero_norm_yields_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0, 0.0], &[1.0, 2.0, 3.0]).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 2.0, 3.0], &[0.0, 0.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_unequal_lengths_are_refused() {
        // A shared prefix must not be scored as if the vectors matched.
        let result = cosine_similarity(&[1.0, 0.0, 0.0, 0.0], &[1.0, 0.0]);
        assert!(matches!(
            result,
            Err(EmbeddingError::DimensionMismatch { expected: 4, actual: 2 })
        ));

        let a = Embedding::new(vec![0.2; 256]).unwrap();
        let b = Embedding::new(vec![0.2; 128]).unwrap();
        assert!(a.cosine_similarity(&b).is_err());
    }

    #[test]
    fn test_rejects_empty_and_non_finite() {
        assert!(Embedding::new(vec![]).is_err());
        assert!(Embedding::new(vec![1.0, f32::NAN]).is_err());
        assert!(Embedding::new(vec![f32::INFINITY]).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Embedding = serde_json::from_str("[0.5, 0.5]").unwrap();
        assert_eq!(ok.dimension(), 2);
        assert!(serde_json::from_str::<Embedding>("[]").is_err());
    }
}
