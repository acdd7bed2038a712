use std::path::PathBuf;
use thiserror::Error;

/// A malformed directive line
///
/// Never fatal: the parser logs it, keeps it in
/// [`DirectiveParser::warnings`](crate::DirectiveParser::warnings) and moves on
/// to the next line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWarning {
    /// Directive without an `=`
    #[error("line {line}: invalid <key>=<value> pair: {text}")]
    InvalidPair {
        /// 1-based line number
        line: usize,
        /// Directive text after the `-`/`-G` prefix
        text: String,
    },

    /// Directive value that is not valid JSON
    #[error("line {line}: unable to parse '{value}': {message}")]
    InvalidValue {
        /// 1-based line number
        line: usize,
        /// Raw value text
        value: String,
        /// JSON parser message
        message: String,
    },
}

impl ParseWarning {
    /// Line the warning refers to
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidPair { line, .. } | Self::InvalidValue { line, .. } => *line,
        }
    }
}

/// An input source that could not be used
#[derive(Debug, Error)]
pub enum SourceError {
    /// File could not be opened
    #[error("cannot open '{path}': {source}")]
    Open {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Reading stopped part-way through the source
    #[error("error reading {origin}: {source}")]
    Read {
        /// Human-readable name of the source
        origin: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for input source operations
pub type SourceResult<T> = Result<T, SourceError>;
