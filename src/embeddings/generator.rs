//! Embedding generation service with batch processing

use std::sync::Arc;

use super::client::EmbeddingClient;
use super::normalize_for_embedding;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::errors::Result;

/// Service for generating embeddings
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
}

impl EmbeddingService {
    /// Create a new embedding service from the application config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(&EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(config)?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let normalized = normalize_for_embedding(text)?;
        self.client.embed(&normalized).await
    }

    /// Embed multiple texts, splitting into provider-sized batches
    pub async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut normalized = Vec::with_capacity(texts.len());
        for text in texts {
            normalized.push(normalize_for_embedding(text)?);
        }

        let mut embeddings = Vec::with_capacity(normalized.len());
        for chunk in normalized.chunks(MAX_BATCH_SIZE) {
            let chunk_embeddings = self
                .client
                .embed_batch(chunk.iter().map(String::as_str).collect())
                .await?;
            embeddings.extend(chunk_embeddings);
        }

        Ok(embeddings)
    }
}
