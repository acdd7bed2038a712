//! Build the run configuration from files and command-line options

use crate::cli::Cli;
use anyhow::{Context, Result};
use haul_config::{ConfigStore, GLOBAL_SECTION};
use serde_json::{json, Value};
use tracing::debug;

/// `-f /O` keeps the name the file has on the server
const ORIGINAL_FILENAME: &str = "/O";

/// Load configuration files, then apply command-line overrides
///
/// Default files are optional and skipped on error; files named with `-c`
/// must load. Options given on the command line win over both.
pub fn load(cli: &Cli) -> Result<ConfigStore> {
    let mut config = ConfigStore::new();

    if cli.ignore_config {
        debug!("Ignoring default configuration files");
    } else {
        for path in config.load_defaults() {
            debug!("Loaded configuration from {}", path.display());
        }
    }

    for path in &cli.config_files {
        config
            .load_file(path)
            .with_context(|| format!("failed to load configuration file {}", path.display()))?;
        debug!("Loaded configuration from {}", path.display());
    }

    apply_overrides(cli, &mut config);
    Ok(config)
}

/// Write command-line options into `config`
pub fn apply_overrides(cli: &Cli, config: &mut ConfigStore) {
    if let Some(dir) = &cli.destination {
        config.set(
            GLOBAL_SECTION,
            "base-directory",
            Value::String(dir.to_string_lossy().into_owned()),
        );
    }

    if let Some(filename) = &cli.filename {
        let template = if filename == ORIGINAL_FILENAME {
            "{filename}.{extension}"
        } else {
            filename.as_str()
        };
        config.set(GLOBAL_SECTION, "filename", json!(template));
    }

    if let Some(n) = cli.abort {
        config.set(GLOBAL_SECTION, "skip", json!(format!("abort:{n}")));
    }
    if let Some(n) = cli.terminate {
        config.set(GLOBAL_SECTION, "skip", json!(format!("terminate:{n}")));
    }

    for option in &cli.options {
        config.set(&option.section, &option.key, option.value.clone());
    }
}
