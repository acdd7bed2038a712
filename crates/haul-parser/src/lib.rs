//! Haul Input Parser
//!
//! Turns line-oriented input files into a sequence of targets. Besides plain
//! targets (usually URLs) an input file may carry configuration directives
//! that apply to the target that follows them:
//!
//! ```text
//! # settings for every following target
//! -G base-directory = "/tmp/"
//! -G skip = false
//!
//! # settings for the next target only
//! -filename = "spaces_are_optional.jpg"
//! -skip     = true
//!
//! https://example.org/
//!
//! # back to the global settings
//! https://example.com/index.htm
//! ```
//!
//! Values are JSON. Keys may name a section with `section:key`; keys without
//! one belong to the top-level `__global__` section.
//!
//! This crate only parses. Applying the directives is up to the consumer
//! (see `haul-pipeline`).

pub mod directive;
pub mod error;
pub mod parser;
pub mod source;
pub mod target;

pub use directive::{Directive, Scope, GLOBAL_SECTION};
pub use error::{ParseWarning, SourceError, SourceResult};
pub use parser::DirectiveParser;
pub use source::{parse_reader, read_sources, InputSource};
pub use target::{EnrichedTarget, InputItem};
