use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file does not exist
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    /// I/O error while reading a configuration file
    #[error("failed to read '{path}': {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File extension does not map to a supported format
    #[error("unsupported configuration format for '{0}'")]
    UnsupportedFormat(PathBuf),

    /// Document could not be parsed
    #[error("failed to parse {format} configuration: {message}")]
    Parse {
        /// Format name (json, yaml, toml)
        format: &'static str,
        /// Parser error message
        message: String,
    },

    /// Document parsed but is not a key/value mapping at the top level
    #[error("configuration root must be a mapping, found {0}")]
    InvalidRoot(&'static str),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
