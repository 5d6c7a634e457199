//! Datadesk Config - Configuration management for Datadesk.

mod config;
mod error;
mod paths;

pub use config::*;
pub use error::{ConfigError, ConfigResult};
pub use paths::{AppPaths, DATABASE_FILE_NAME};
