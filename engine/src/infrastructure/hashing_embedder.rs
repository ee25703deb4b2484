// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Offline embedding provider based on feature hashing
//!
//! Each lowercase word and each character trigram of the input is hashed
//! with SHA-256 into one of `dimension` buckets with a digest-derived sign,
//! and the result is L2-normalized. The mapping is fixed across builds and
//! platforms, so vectors persisted by one binary stay comparable in the next. Texts that share vocabulary land close together, which is
//! enough for demos, tests and air-gapped development. It carries no real
//! semantics; production deployments use a model-backed provider.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::domain::embedding::{Embedding, EmbeddingError, EmbeddingProvider};

pub struct HashingEmbeddingProvider {
    dimension: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Bucket from the first eight digest bytes, sign from the top bit of the ninth
    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let index = (u64::from_be_bytes(prefix) % self.dimension as u64) as usize;
        let sign = if digest[8] & 0x80 == 0 { 1.0 } else { -1.0 };
        (index, sign)
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0.0f32; self.dimension];
        let normalized = text.to_lowercase();

        for word in normalized
            .split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|w| !w.is_empty())
        {
            let (index, sign) = self.bucket(word);
            values[index] += 2.0 * sign;

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for window in padded.windows(3) {
                let trigram: String = window.iter().collect();
                let (index, sign) = self.bucket(&trigram);
                values[index] += sign;
            }
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            values.iter_mut().for_each(|v| *v /= norm);
        }
        values
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        Embedding::new(self.vectorize(text))
    }

    fn name(&self) -> &str {
        "hashing"
    }
}
