//! CLI command implementations.

pub mod config;
pub mod index;
pub mod ingest;
pub mod init;
pub mod list;
pub mod show;
pub mod spec;

use anyhow::{Context, Result};
use datadesk_config::{AppPaths, Config};
use datadesk_db::Database;
use datadesk_vectorstore::{VectorStore, VectorStoreSettings};
use std::path::PathBuf;
use tokio::runtime::Runtime;

/// API keys supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub cohere: Option<String>,
    pub pinecone: Option<String>,
}

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Get a database connection, ensuring datadesk is initialized.
pub fn get_database() -> Result<Database> {
    let paths = get_paths()?;
    let config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    let database_file = database_path(&config, &paths)?;

    if !paths.has_config() || !database_file.exists() {
        anyhow::bail!("Datadesk is not initialized. Run 'datadesk init' first.");
    }

    Database::open(&database_file).context("Failed to open database")
}

/// Database file under the configured data directory, expanded.
pub fn database_path(config: &Config, paths: &AppPaths) -> Result<PathBuf> {
    expand_path(&config.database_file(paths).to_string_lossy())
}

/// Load the config file and apply key overrides.
pub fn load_config(paths: &AppPaths, keys: &ApiKeys) -> Result<Config> {
    let mut config = Config::load_from(&paths.config_file).context("Failed to load config")?;
    apply_keys(&mut config, keys);
    Ok(config)
}

fn apply_keys(config: &mut Config, keys: &ApiKeys) {
    if let Some(ref key) = keys.cohere {
        config.cohere.api_key = key.clone();
    }
    if let Some(ref key) = keys.pinecone {
        config.pinecone.api_key = key.clone();
    }
}

/// Expand `~` and environment variables in a configured path.
pub fn expand_path(path: &str) -> Result<PathBuf> {
    let expanded =
        shellexpand::full(path).with_context(|| format!("Failed to expand path: {}", path))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Backend settings with the local index directory expanded.
pub fn vector_settings(config: &Config, paths: &AppPaths) -> Result<VectorStoreSettings> {
    let local_dir = config.local_index_dir(paths);
    let local_dir = expand_path(&local_dir.to_string_lossy())?;
    Ok(VectorStoreSettings::from_config(config, local_dir))
}

/// Build the configured vector store.
pub fn open_vector_store(rt: &Runtime, keys: &ApiKeys) -> Result<VectorStore> {
    let paths = get_paths()?;
    let config = load_config(&paths, keys)?;
    let settings = vector_settings(&config, &paths)?;

    rt.block_on(VectorStore::from_config(&settings))
        .context("Failed to open the vector index")
}

/// First eight characters of an ID.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate text for single-line display.
pub fn truncate(text: &str, max: usize) -> String {
    let flat = text.replace('\n', " ");
    if flat.chars().count() > max {
        format!("{}...", flat.chars().take(max.saturating_sub(3)).collect::<String>())
    } else {
        flat
    }
}
