//! Batch Dispatch Layer
//!
//! This crate runs a parsed batch of targets, one after another, through a
//! pluggable job.
//!
//! ## Architecture
//!
//! ```text
//! InputItem stream (haul-parser)
//!   └─> Progress       (optional "[n/total] target" lines on stderr)
//!        └─> Dispatcher
//!             ├─> ConfigStore::set     (-G directives, permanent)
//!             ├─> ConfigStore::apply   (- directives, undone after the target)
//!             ├─> JobFactory::create   (target + visible config -> Job)
//!             └─> Job::run             (-> JobOutcome, folded into ExitStatus)
//! ```
//!
//! ## Failure isolation
//!
//! - `Completed(bits)`: bits are OR-ed into the batch status
//! - `Aborted`: the target is skipped quietly
//! - `NotFound`: logged, adds [`ExitStatus::NO_HANDLER`], the batch continues
//! - `Fatal(error)`: the batch stops and the error is returned
//!
//! ## Usage
//!
//! ```rust,ignore
//! use haul_pipeline::Dispatcher;
//!
//! let mut dispatcher = Dispatcher::new(factory);
//! let status = dispatcher.dispatch(items, &mut config).await?;
//! std::process::exit(status.code());
//! ```

pub mod dispatcher;
pub mod job;
pub mod progress;
pub mod status;

pub use dispatcher::*;
pub use job::*;
pub use progress::*;
pub use status::*;
