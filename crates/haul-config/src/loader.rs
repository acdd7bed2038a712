//! Configuration file loading
//!
//! Files are parsed into a JSON value and flattened into the store:
//! top-level scalars and arrays go to [`GLOBAL_SECTION`], nested mappings
//! become dotted section names.
//!
//! ```text
//! {"skip": false, "output": {"progress": "{current}/{total}"}}
//!
//!   (__global__, skip)     = false
//!   (output,     progress) = "{current}/{total}"
//! ```

use crate::{ConfigError, ConfigResult, ConfigStore, GLOBAL_SECTION, SECTION_SEPARATOR};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON (`.json`, also used for unknown extensions)
    Json,
    /// YAML (`.yaml`, `.yml`)
    #[cfg(feature = "yaml")]
    Yaml,
    /// TOML (`.toml`)
    #[cfg(feature = "toml")]
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("json") | None => Ok(Self::Json),
            #[cfg(feature = "yaml")]
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            #[cfg(feature = "toml")]
            Some("toml") => Ok(Self::Toml),
            Some(_) => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Format name for messages
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "json",
            #[cfg(feature = "yaml")]
            Self::Yaml => "yaml",
            #[cfg(feature = "toml")]
            Self::Toml => "toml",
        }
    }

    /// Parse text in this format into a JSON value
    pub fn parse(self, text: &str) -> ConfigResult<Value> {
        let parsed: Result<Value, String> = match self {
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "yaml")]
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
            #[cfg(feature = "toml")]
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
        };

        parsed.map_err(|message| ConfigError::Parse {
            format: self.name(),
            message,
        })
    }
}

impl ConfigStore {
    /// Load a configuration file, failing if it is missing or malformed
    ///
    /// Returns the number of values written.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> ConfigResult<usize> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;

        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let count = self.load_str(&text, format)?;
        debug!("Loaded {} values from {}", count, path.display());
        Ok(count)
    }

    /// Load configuration text in the given format
    pub fn load_str(&mut self, text: &str, format: ConfigFormat) -> ConfigResult<usize> {
        let document = format.parse(text)?;
        self.merge_document(document)
    }

    /// Flatten a parsed document into the store
    pub fn merge_document(&mut self, document: Value) -> ConfigResult<usize> {
        match document {
            Value::Object(map) => Ok(self.merge_map(None, map)),
            // An empty YAML file parses to null
            Value::Null => Ok(0),
            other => Err(ConfigError::InvalidRoot(value_kind(&other))),
        }
    }

    fn merge_map(&mut self, section: Option<&str>, map: Map<String, Value>) -> usize {
        let mut count = 0;
        for (key, value) in map {
            match value {
                Value::Object(inner) if !inner.is_empty() => {
                    let nested = match section {
                        Some(parent) => format!("{parent}{SECTION_SEPARATOR}{key}"),
                        None => key,
                    };
                    count += self.merge_map(Some(&nested), inner);
                }
                value => {
                    self.set(section.unwrap_or(GLOBAL_SECTION), key, value);
                    count += 1;
                }
            }
        }
        count
    }

    /// Load every default configuration file that exists
    ///
    /// Missing files are skipped silently; unreadable or malformed ones are
    /// logged and skipped. Returns the files that were loaded.
    pub fn load_defaults(&mut self) -> Vec<PathBuf> {
        let mut loaded = Vec::new();
        for path in default_config_paths() {
            if !path.exists() {
                continue;
            }
            match self.load_file(&path) {
                Ok(_) => loaded.push(path),
                Err(e) => warn!("Skipping configuration file: {}", e),
            }
        }
        loaded
    }
}

/// Default configuration file locations, in load order
///
/// `<config dir>/haul/config.{json,yaml,toml}`, limited to the formats
/// compiled in.
pub fn default_config_paths() -> Vec<PathBuf> {
    let Some(base) = dirs::config_dir() else {
        return Vec::new();
    };
    let dir = base.join("haul");

    let mut names = vec!["config.json"];
    if cfg!(feature = "yaml") {
        names.push("config.yaml");
    }
    if cfg!(feature = "toml") {
        names.push("config.toml");
    }

    names.into_iter().map(|name| dir.join(name)).collect()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
