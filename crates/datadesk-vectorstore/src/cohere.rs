//! Cohere embedding client.

use crate::error::{map_send_error, VectorStoreError, VectorStoreResult};
use crate::types::{EmbedRequest, EmbedResponse, SEARCH_DOCUMENT};
use datadesk_config::CohereConfig;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Client for Cohere's embed API.
#[derive(Clone)]
pub struct CohereEmbedder {
    client: Client,
    host: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl std::fmt::Debug for CohereEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereEmbedder")
            .field("host", &self.host)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl CohereEmbedder {
    /// Create a new client from configuration.
    pub fn from_config(config: &CohereConfig) -> VectorStoreResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VectorStoreError::InvalidConfig(
                "cohere.api_key is not set (or export COHERE_API_KEY)".to_string(),
            ));
        }
        if config.embedding_model.trim().is_empty() {
            return Err(VectorStoreError::InvalidConfig(
                "cohere.embedding_model is empty".to_string(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VectorStoreError::Http)?;

        Ok(Self {
            client,
            host: config.host.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Embed texts as documents to be searched later, one vector per text.
    pub async fn embed_documents(&self, texts: &[String]) -> VectorStoreResult<Vec<Vec<f32>>> {
        let url = format!("{}/v1/embed", self.host);
        debug!("Embedding {} texts with model {}", texts.len(), self.model);

        let request = EmbedRequest {
            texts: texts.to_vec(),
            model: self.model.clone(),
            input_type: SEARCH_DOCUMENT.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.host, self.timeout.as_secs()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let embed_response: EmbedResponse = response.json().await?;
        if embed_response.embeddings.len() != texts.len()
            || embed_response.embeddings.iter().any(Vec::is_empty)
        {
            return Err(VectorStoreError::EmptyEmbedding);
        }

        info!(
            "Generated {} embeddings with {} dimensions",
            embed_response.embeddings.len(),
            embed_response.embeddings.first().map_or(0, Vec::len)
        );

        Ok(embed_response.embeddings)
    }

    /// Embed a single document text.
    pub async fn embed_document(&self, text: &str) -> VectorStoreResult<Vec<f32>> {
        let mut embeddings = self.embed_documents(&[text.to_string()]).await?;
        embeddings.pop().ok_or(VectorStoreError::EmptyEmbedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: &str) -> CohereConfig {
        CohereConfig {
            api_key: api_key.to_string(),
            ..CohereConfig::default()
        }
    }

    #[test]
    fn test_client_creation() {
        let embedder = CohereEmbedder::from_config(&config("key")).unwrap();
        assert_eq!(embedder.model(), "embed-english-v3.0");
        assert!(!format!("{:?}", embedder).contains("api_key"));
    }

    #[test]
    fn test_missing_api_key() {
        assert!(matches!(
            CohereEmbedder::from_config(&config("  ")),
            Err(VectorStoreError::InvalidConfig(_))
        ));
    }
}
