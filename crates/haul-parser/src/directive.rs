//! Configuration directives embedded in input files

use crate::ParseWarning;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Section used when a directive key has no `section:` prefix
pub const GLOBAL_SECTION: &str = "__global__";

/// How long a directive stays in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// `-G key=value`: permanent from the next target onwards
    Global,
    /// `-key=value`: the next target only
    Local,
}

/// A parsed `[-G|-][section:]key=<json>` line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Global or local
    pub scope: Scope,
    /// Target section, [`GLOBAL_SECTION`] when none was given
    pub section: String,
    /// Option name
    pub key: String,
    /// Decoded JSON value
    pub value: Value,
}

impl Directive {
    /// Build a directive directly
    pub fn new(
        scope: Scope,
        section: impl Into<String>,
        key: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            scope,
            section: section.into(),
            key: key.into(),
            value,
        }
    }

    /// Parse a full directive line (`-G a:b=1`, `-skip=true`)
    ///
    /// `line` must already be trimmed and start with `-`; `line_no` is only
    /// used for warnings.
    pub fn parse(line: &str, line_no: usize) -> Result<Self, ParseWarning> {
        let (scope, body) = match line.strip_prefix("-G") {
            Some(rest) => (Scope::Global, rest),
            None => (Scope::Local, line.strip_prefix('-').unwrap_or(line)),
        };
        Self::parse_body(scope, body, line_no)
    }

    /// Parse the part after the `-`/`-G` prefix
    pub fn parse_body(scope: Scope, body: &str, line_no: usize) -> Result<Self, ParseWarning> {
        let Some((raw_key, raw_value)) = body.split_once('=') else {
            return Err(ParseWarning::InvalidPair {
                line: line_no,
                text: body.to_string(),
            });
        };

        let raw_value = raw_value.trim();
        let value: Value =
            serde_json::from_str(raw_value).map_err(|e| ParseWarning::InvalidValue {
                line: line_no,
                value: raw_value.to_string(),
                message: e.to_string(),
            })?;

        let (section, key) = match raw_key.trim().rsplit_once(':') {
            Some((section, key)) => (section, key),
            None => (GLOBAL_SECTION, raw_key.trim()),
        };

        Ok(Self::new(scope, section, key, value))
    }

    /// Split into `(section, key, value)`, the shape configuration stores take
    pub fn into_parts(self) -> (String, String, Value) {
        (self.section, self.key, self.value)
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scope {
            Scope::Global => "-G ",
            Scope::Local => "-",
        };
        if self.section == GLOBAL_SECTION {
            write!(f, "{}{}={}", prefix, self.key, self.value)
        } else {
            write!(f, "{}{}:{}={}", prefix, self.section, self.key, self.value)
        }
    }
}
