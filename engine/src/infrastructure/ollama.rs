// Copyright (c) 2026 MindEase Contributors
// SPDX-License-Identifier: AGPL-3.0

// Ollama Embedding Provider Adapter
//
// Anti-Corruption Layer for locally hosted embedding models.
// Uses the `/api/embeddings` endpoint: {model, prompt} -> {embedding}.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::embedding::{Embedding, EmbeddingError, EmbeddingProvider};

pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbeddingProvider {
    pub fn new(endpoint: String, model: String, timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check that the Ollama server is reachable by listing models
    pub async fn health_check(&self) -> Result<(), EmbeddingError> {
        let url = format!("{}/api/tags", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(EmbeddingError::Network(format!("HTTP {}", response.status())))
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Embedding, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let url = format!("{}/api/embeddings", self.endpoint.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            return Err(if status == 404 {
                EmbeddingError::ModelNotFound(self.model.clone())
            } else {
                EmbeddingError::Provider(format!("HTTP {}: {}", status, error_text))
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Provider(format!("Failed to parse response: {}", e)))?;

        Embedding::new(body.embedding)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
