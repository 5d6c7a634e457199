//! Hosted Pinecone index.

use crate::cohere::CohereEmbedder;
use crate::documents::IndexedDocument;
use crate::error::{map_send_error, VectorStoreError, VectorStoreResult};
use crate::types::{IndexDescription, UpsertRequest, UpsertResponse, UpsertVector};
use datadesk_config::PineconeConfig;
use datadesk_core::new_id;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, info, warn};

const API_VERSION: &str = "2024-07";

/// Client for one Pinecone index, bound to its data-plane host.
#[derive(Debug, Clone)]
pub struct HostedIndex {
    client: Client,
    api_key: String,
    index: String,
    host: String,
    timeout: Duration,
    embedder: CohereEmbedder,
}

impl HostedIndex {
    /// Resolve the configured index to its data-plane host.
    pub async fn connect(config: &PineconeConfig, embedder: CohereEmbedder) -> VectorStoreResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(VectorStoreError::InvalidConfig(
                "pinecone.api_key is not set (or export PINECONE_API_KEY)".to_string(),
            ));
        }
        if config.index.trim().is_empty() {
            return Err(VectorStoreError::InvalidConfig(
                "pinecone.index is empty".to_string(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(VectorStoreError::Http)?;

        let controller = config.controller_host.trim_end_matches('/');
        let url = format!("{}/indexes/{}", controller, config.index);
        debug!("Describing Pinecone index {} at {}", config.index, url);

        let response = with_headers(client.get(&url), &config.api_key)
            .send()
            .await
            .map_err(|e| map_send_error(e, controller, timeout.as_secs()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(VectorStoreError::IndexNotFound {
                name: config.index.clone(),
            });
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(VectorStoreError::ApiError {
                status: status.as_u16(),
                message: text,
            });
        }

        let description: IndexDescription = response.json().await?;
        let host = normalize_host(&description.host);
        info!(
            "Connected to Pinecone index {} ({} dimensions, {} metric) at {}",
            description.name,
            description.dimension.unwrap_or_default(),
            description.metric.as_deref().unwrap_or("unknown"),
            host
        );

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            index: config.index.clone(),
            host,
            timeout,
            embedder,
        })
    }

    /// Data-plane host of the index.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    /// Embed and upsert one document, returning its vector id.
    pub async fn add_document(&self, doc: &IndexedDocument) -> VectorStoreResult<String> {
        let values = self.embedder.embed_document(&doc.text).await?;
        let id = new_id();

        let request = UpsertRequest {
            vectors: vec![UpsertVector {
                id: id.clone(),
                values,
                metadata: doc.metadata_with_text(),
            }],
        };

        let url = format!("{}/vectors/upsert", self.host);
        let response = with_headers(self.client.post(&url), &self.api_key)
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

        let upserted: UpsertResponse = response.json().await?;
        if upserted.upserted_count != 1 {
            warn!(
                "Pinecone reported {} upserted vectors for {}",
                upserted.upserted_count, id
            );
        }

        info!(
            "Upserted {} ({} {}) into Pinecone index {}",
            id, doc.source_type, doc.source_id, self.index
        );
        Ok(id)
    }
}

fn with_headers(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request
        .header("Api-Key", api_key)
        .header("X-Pinecone-API-Version", API_VERSION)
}

/// Control-plane hosts come back without a scheme.
fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}
