//! Configuration structures and loading.

use crate::error::{ConfigError, ConfigResult};
use crate::paths::{AppPaths, DATABASE_FILE_NAME};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub vectorstore: VectorStoreConfig,

    #[serde(default)]
    pub pinecone: PineconeConfig,

    #[serde(default)]
    pub cohere: CohereConfig,
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> ConfigResult<Self> {
        let paths = AppPaths::new().ok_or(ConfigError::NoConfigDir)?;
        Self::load_from(&paths.config_file)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Create a default config file with comments.
    pub fn create_default_file(path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::default_config_string())?;
        Ok(())
    }

    /// Generate a default config file with helpful comments.
    pub fn default_config_string() -> String {
        r#"# Datadesk Configuration

[general]
# Data directory for the database and the local vector index
# data_dir = "~/.local/share/datadesk"

[vectorstore]
# Keep vectors in a local on-disk index instead of Pinecone
use_local = false

# Directory of the local index (defaults to <data_dir>/vectorstore)
# local_dir = "~/.local/share/datadesk/vectorstore"

[pinecone]
# May also be supplied with PINECONE_API_KEY
api_key = ""
index = "datadesk"
controller_host = "https://api.pinecone.io"
timeout_seconds = 30

[cohere]
# May also be supplied with COHERE_API_KEY
api_key = ""
embedding_model = "embed-english-v3.0"
host = "https://api.cohere.ai"
timeout_seconds = 60
"#
        .to_string()
    }

    /// Set a value by dotted key, e.g. `vectorstore.use_local`.
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            "general.data_dir" => self.general.data_dir = Some(value.to_string()),
            "vectorstore.use_local" => self.vectorstore.use_local = parse_bool(key, value)?,
            "vectorstore.local_dir" => self.vectorstore.local_dir = Some(value.to_string()),
            "pinecone.api_key" => self.pinecone.api_key = value.to_string(),
            "pinecone.index" => self.pinecone.index = value.to_string(),
            "pinecone.controller_host" => self.pinecone.controller_host = value.to_string(),
            "pinecone.timeout_seconds" => {
                self.pinecone.timeout_seconds = parse_u64(key, value)?
            }
            "cohere.api_key" => self.cohere.api_key = value.to_string(),
            "cohere.embedding_model" => self.cohere.embedding_model = value.to_string(),
            "cohere.host" => self.cohere.host = value.to_string(),
            "cohere.timeout_seconds" => self.cohere.timeout_seconds = parse_u64(key, value)?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "Unknown configuration key: {}",
                    key
                )))
            }
        }
        Ok(())
    }

    /// Directory of the local vector index, before `~` expansion.
    pub fn local_index_dir(&self, paths: &AppPaths) -> PathBuf {
        match self.vectorstore.local_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => self.data_dir(paths).join("vectorstore"),
        }
    }

    /// SQLite database location, before `~` expansion.
    pub fn database_file(&self, paths: &AppPaths) -> PathBuf {
        self.data_dir(paths).join(DATABASE_FILE_NAME)
    }

    /// Data directory, honoring `general.data_dir`.
    pub fn data_dir(&self, paths: &AppPaths) -> PathBuf {
        match self.general.data_dir {
            Some(ref dir) => PathBuf::from(dir),
            None => paths.data_dir.clone(),
        }
    }
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid(format!(
            "{} expects a boolean, got '{}'",
            key, value
        ))),
    }
}

fn parse_u64(key: &str, value: &str) -> ConfigResult<u64> {
    value.parse().map_err(|_| {
        ConfigError::Invalid(format!("{} expects a number, got '{}'", key, value))
    })
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub data_dir: Option<String>,
}

/// Vector index backend selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub use_local: bool,
    pub local_dir: Option<String>,
}

/// Hosted Pinecone index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub api_key: String,
    pub index: String,
    pub controller_host: String,
    pub timeout_seconds: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index: "datadesk".to_string(),
            controller_host: "https://api.pinecone.io".to_string(),
            timeout_seconds: 30,
        }
    }
}

/// Cohere embedding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CohereConfig {
    pub api_key: String,
    pub embedding_model: String,
    pub host: String,
    pub timeout_seconds: u64,
}

impl Default for CohereConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            embedding_model: "embed-english-v3.0".to_string(),
            host: "https://api.cohere.ai".to_string(),
            timeout_seconds: 60,
        }
    }
}
