//! Datadesk Vectorstore - Forwarding of described records to a vector index.
//!
//! Texts are embedded with Cohere and upserted either into a hosted Pinecone
//! index or into a local SQLite-backed index. The backend is chosen once,
//! from configuration, when the [`VectorStore`] is built.

mod cohere;
mod documents;
mod error;
mod local;
mod pinecone;
mod store;
mod types;

pub use cohere::CohereEmbedder;
pub use documents::{
    fields_document, index_dataframe_tree, index_fields, index_record, index_unstructured,
    record_document, unstructured_document, IndexedDocument,
};
pub use error::{VectorStoreError, VectorStoreResult};
pub use local::{LocalIndex, StoredVector};
pub use pinecone::HostedIndex;
pub use store::{VectorStore, VectorStoreSettings};
pub use types::*;
