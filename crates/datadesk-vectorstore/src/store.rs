//! Backend selection.

use crate::cohere::CohereEmbedder;
use crate::documents::IndexedDocument;
use crate::error::VectorStoreResult;
use crate::local::LocalIndex;
use crate::pinecone::HostedIndex;
use datadesk_config::{CohereConfig, Config, PineconeConfig};
use std::path::PathBuf;
use tracing::debug;

/// Everything needed to build a [`VectorStore`].
#[derive(Debug, Clone)]
pub struct VectorStoreSettings {
    pub use_local: bool,
    /// Already expanded directory of the local index.
    pub local_dir: PathBuf,
    pub pinecone: PineconeConfig,
    pub cohere: CohereConfig,
}

impl VectorStoreSettings {
    pub fn from_config(config: &Config, local_dir: PathBuf) -> Self {
        Self {
            use_local: config.vectorstore.use_local,
            local_dir,
            pinecone: config.pinecone.clone(),
            cohere: config.cohere.clone(),
        }
    }
}

/// The configured vector index.
#[derive(Debug)]
pub enum VectorStore {
    Local(LocalIndex),
    Hosted(HostedIndex),
}

impl VectorStore {
    /// Build the backend named by the settings.
    pub async fn from_config(settings: &VectorStoreSettings) -> VectorStoreResult<Self> {
        let embedder = CohereEmbedder::from_config(&settings.cohere)?;

        if settings.use_local {
            debug!("Using local vector index in {:?}", settings.local_dir);
            Ok(VectorStore::Local(LocalIndex::open(&settings.local_dir, embedder)?))
        } else {
            debug!("Using Pinecone index {}", settings.pinecone.index);
            Ok(VectorStore::Hosted(
                HostedIndex::connect(&settings.pinecone, embedder).await?,
            ))
        }
    }

    /// Embed and upsert one document, returning the id the backend assigned.
    pub async fn add_document(&self, doc: &IndexedDocument) -> VectorStoreResult<String> {
        match self {
            VectorStore::Local(index) => index.add_document(doc).await,
            VectorStore::Hosted(index) => index.add_document(doc).await,
        }
    }

    /// Short description for display.
    pub fn describe(&self) -> String {
        match self {
            VectorStore::Local(index) => format!("local index at {}", index.path().display()),
            VectorStore::Hosted(index) => {
                format!("Pinecone index {} ({})", index.index_name(), index.host())
            }
        }
    }
}
