use clap::{ArgAction, Parser, ValueEnum};
use haul_config::GLOBAL_SECTION;
use haul_parser::InputSource;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages (default)
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// A `-o section.key=value` option
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigOption {
    /// Dotted section, [`GLOBAL_SECTION`] when the key has no dot
    pub section: String,
    /// Option name
    pub key: String,
    /// JSON value, or the raw text when it is not valid JSON
    pub value: Value,
}

/// Parse `section.key=value`
///
/// The key path splits on its last `.`. Values that are not JSON are kept as
/// strings, so `-o filename=x.jpg` needs no quoting.
pub fn parse_option(raw: &str) -> Result<ConfigOption, String> {
    let Some((path, value)) = raw.split_once('=') else {
        return Err(format!("expected OPT=VALUE, got '{raw}'"));
    };

    let path = path.trim();
    if path.is_empty() {
        return Err("option name must not be empty".to_string());
    }

    let (section, key) = match path.rsplit_once('.') {
        Some((section, key)) => (section.to_string(), key.to_string()),
        None => (GLOBAL_SECTION.to_string(), path.to_string()),
    };
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    Ok(ConfigOption {
        section,
        key,
        value,
    })
}

#[derive(Parser, Debug)]
#[command(name = "haul")]
#[command(about = "haul - download batches of URLs with per-target configuration")]
#[command(version)]
pub struct Cli {
    /// URLs to process
    #[arg(value_name = "URL", required_unless_present = "input_files")]
    pub urls: Vec<String>,

    /// Read URLs and directives from FILE ('-' for stdin); can be repeated
    #[arg(short = 'i', long = "input-file", value_name = "FILE")]
    pub input_files: Vec<InputSource>,

    /// Set a configuration option (section.key=value); can be repeated
    #[arg(short = 'o', long = "option", value_name = "OPT=VALUE", value_parser = parse_option)]
    pub options: Vec<ConfigOption>,

    /// Target base directory for downloads
    #[arg(short = 'd', long = "destination", value_name = "PATH")]
    pub destination: Option<PathBuf>,

    /// Filename template for downloads ('/O' keeps the original name)
    #[arg(short = 'f', long = "filename", value_name = "FORMAT")]
    pub filename: Option<String>,

    /// Abort a target after N consecutive files were skipped
    #[arg(long, value_name = "N", conflicts_with = "terminate")]
    pub abort: Option<u32>,

    /// Stop a target and its children after N consecutive files were skipped
    #[arg(long, value_name = "N")]
    pub terminate: Option<u32>,

    /// Print URLs instead of downloading; repeat to follow nested targets deeper
    #[arg(short = 'g', long = "get-urls", action = ArgAction::Count)]
    pub get_urls: u8,

    /// Additional configuration file (JSON, YAML or TOML); can be repeated
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_files: Vec<PathBuf>,

    /// Do not load the default configuration files
    #[arg(long = "ignore-config")]
    pub ignore_config: bool,

    /// Append targets no handler accepts to FILE
    #[arg(long = "write-unsupported", value_name = "FILE")]
    pub write_unsupported: Option<PathBuf>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors (shortcut for --log-level=error)
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Effective log level
    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level {
            Some(level) => level.into(),
            None if self.verbose => LevelFilter::DEBUG,
            None if self.quiet => LevelFilter::ERROR,
            None => LevelFilter::INFO,
        }
    }
}
