//! # Haul Configuration Library
//!
//! A layered `(section, key) -> value` store shared by every stage of a haul
//! run. Values are plain JSON values so that input-file directives, CLI
//! options and configuration files all land in the same shape.
//!
//! ## Features
//!
//! - Permanent writes with [`ConfigStore::set`]
//! - Scoped overrides with [`ConfigStore::apply`], undone when the returned
//!   [`OverlayGuard`] is dropped
//! - Hierarchical lookups through dotted sections ([`ConfigStore::interpolate`])
//! - Multi-format file loading (JSON, YAML, TOML)
//!
//! ## Quick Start
//!
//! ```rust
//! use haul_config::{ConfigStore, GLOBAL_SECTION};
//! use serde_json::json;
//!
//! let mut store = ConfigStore::new();
//! store.set(GLOBAL_SECTION, "skip", json!(false));
//!
//! {
//!     let overlay = store.apply([(GLOBAL_SECTION, "skip", json!(true))]);
//!     assert_eq!(overlay.get(GLOBAL_SECTION, "skip"), Some(&json!(true)));
//! }
//!
//! assert_eq!(store.get(GLOBAL_SECTION, "skip"), Some(&json!(false)));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod loader;
mod overlay;
mod store;

pub use error::*;
pub use loader::*;
pub use overlay::*;
pub use store::*;
