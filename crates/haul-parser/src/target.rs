//! Targets produced by the parser

use crate::Directive;
use std::fmt;

/// A target that had directives declared ahead of it
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedTarget {
    /// Target text, usually a URL
    pub value: String,
    /// `-G` directives, in input order
    pub global_directives: Vec<Directive>,
    /// `-` directives, in input order
    pub local_directives: Vec<Directive>,
}

/// One item of parsed input
///
/// `Plain` is the common case and carries no directives. It must be treated
/// exactly like an `Enriched` target with two empty lists; use
/// [`InputItem::into_parts`] to handle both uniformly.
#[derive(Debug, Clone, PartialEq)]
pub enum InputItem {
    /// Bare target
    Plain(String),
    /// Target with pending directives
    Enriched(EnrichedTarget),
}

impl InputItem {
    /// The target text
    pub fn value(&self) -> &str {
        match self {
            Self::Plain(value) => value,
            Self::Enriched(target) => &target.value,
        }
    }

    /// Whether directives were attached
    pub fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched(_))
    }

    /// Split into `(value, global_directives, local_directives)`
    pub fn into_parts(self) -> (String, Vec<Directive>, Vec<Directive>) {
        match self {
            Self::Plain(value) => (value, Vec::new(), Vec::new()),
            Self::Enriched(EnrichedTarget {
                value,
                global_directives,
                local_directives,
            }) => (value, global_directives, local_directives),
        }
    }
}

impl From<String> for InputItem {
    fn from(value: String) -> Self {
        Self::Plain(value)
    }
}

impl From<&str> for InputItem {
    fn from(value: &str) -> Self {
        Self::Plain(value.to_string())
    }
}

impl From<EnrichedTarget> for InputItem {
    fn from(target: EnrichedTarget) -> Self {
        Self::Enriched(target)
    }
}

impl fmt::Display for InputItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}
