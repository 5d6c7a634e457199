//! Types for the Cohere and Pinecone REST APIs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `input_type` used for every text this crate embeds.
pub const SEARCH_DOCUMENT: &str = "search_document";

/// Request body for Cohere's /v1/embed endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    pub texts: Vec<String>,
    pub model: String,
    pub input_type: String,
}

/// Response from Cohere's /v1/embed endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Index description from Pinecone's control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    pub host: String,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub metric: Option<String>,
}

/// One vector in an upsert request.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertVector {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// Request body for Pinecone's /vectors/upsert endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UpsertRequest {
    pub vectors: Vec<UpsertVector>,
}

/// Response from Pinecone's /vectors/upsert endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertResponse {
    #[serde(default)]
    pub upserted_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_embed_request_shape() {
        let request = EmbedRequest {
            texts: vec!["X\nY".to_string()],
            model: "embed-english-v3.0".to_string(),
            input_type: SEARCH_DOCUMENT.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"texts": ["X\nY"], "model": "embed-english-v3.0", "input_type": "search_document"})
        );
    }

    #[test]
    fn test_upsert_response_camel_case() {
        let response: UpsertResponse = serde_json::from_str(r#"{"upsertedCount": 1}"#).unwrap();
        assert_eq!(response.upserted_count, 1);
    }

    #[test]
    fn test_response_extras_are_optional() {
        let response: EmbedResponse =
            serde_json::from_str(r#"{"id": "e-1", "embeddings": [[0.5]], "meta": {}}"#).unwrap();
        assert_eq!(response.embeddings, vec![vec![0.5]]);

        let description: IndexDescription =
            serde_json::from_str(r#"{"name": "datadesk", "host": "datadesk-abc.svc.pinecone.io"}"#)
                .unwrap();
        assert_eq!(description.dimension, None);
        assert_eq!(description.metric, None);
    }
}
