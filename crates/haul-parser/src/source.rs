//! Input sources: files and stdin

use crate::{DirectiveParser, InputItem, SourceError, SourceResult};
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// Where an input file comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input (`-` on the command line)
    Stdin,
    /// A file on disk
    File(PathBuf),
}

impl InputSource {
    /// Parse every item in this source, appending to `items`
    ///
    /// Items read before a failure stay in `items`.
    pub fn read_into(&self, items: &mut Vec<InputItem>) -> SourceResult<usize> {
        match self {
            Self::Stdin => {
                let stdin = io::stdin();
                parse_reader(stdin.lock(), &self.to_string(), items)
            }
            Self::File(path) => {
                let file = File::open(path).map_err(|source| SourceError::Open {
                    path: path.clone(),
                    source,
                })?;
                parse_reader(BufReader::new(file), &self.to_string(), items)
            }
        }
    }
}

impl FromStr for InputSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "-" => Self::Stdin,
            path => Self::File(PathBuf::from(path)),
        })
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("stdin"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a reader line by line, appending items to `items`
///
/// Stops at the first read error (including invalid UTF-8). Everything parsed
/// up to that point is kept and the error is returned.
pub fn parse_reader<R: BufRead>(
    reader: R,
    origin: &str,
    items: &mut Vec<InputItem>,
) -> SourceResult<usize> {
    let mut read_error = None;
    let lines = reader.lines().map_while(|line| match line {
        Ok(line) => Some(line),
        Err(e) => {
            read_error = Some(e);
            None
        }
    });

    let before = items.len();
    let mut parser = DirectiveParser::new(lines).with_origin(origin);
    items.extend(parser.by_ref());
    let warnings = parser.warnings().len();
    drop(parser);

    let added = items.len() - before;
    debug!("{}: {} targets, {} warnings", origin, added, warnings);

    match read_error {
        Some(source) => Err(SourceError::Read {
            origin: origin.to_string(),
            source,
        }),
        None => Ok(added),
    }
}

/// Read every source in order, skipping the ones that fail
///
/// Unusable sources are logged as warnings; the rest are still processed.
pub fn read_sources<'a>(sources: impl IntoIterator<Item = &'a InputSource>) -> Vec<InputItem> {
    let mut items = Vec::new();
    for source in sources {
        if let Err(e) = source.read_into(&mut items) {
            warn!("input file: {}", e);
        }
    }
    items
}
