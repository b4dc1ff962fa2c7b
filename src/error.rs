//! @ai:module:intent Define error types for the benchmark harness
//! @ai:module:layer domain
//! @ai:module:public_api HarnessError, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for planning, configuration and I/O failures
#[derive(Error, Debug)]
pub enum HarnessError {
    /// A key or skip rule that does not split into exactly 3 components
    #[error("Malformed key '{key}': expected 3 ':'-separated components, found {components}")]
    MalformedKey { key: String, components: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config file must have a .toml extension: {}", .0.display())]
    UnsupportedConfigPath(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
