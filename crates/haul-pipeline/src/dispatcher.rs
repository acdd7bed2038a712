//! Sequential batch dispatcher
//!
//! Targets are processed strictly one at a time, in input order. For each
//! target:
//!
//! 1. `-G` directives are written to the store permanently
//! 2. `-` directives are applied as an overlay
//! 3. a job is created and run under that overlay
//! 4. the overlay is undone, whatever the outcome
//!
//! The overlay relies on this ordering: it restores by push order, so two
//! targets must never be in flight at once.

use crate::{ExitStatus, JobFactory, JobOutcome};
use haul_config::ConfigStore;
use haul_parser::{Directive, InputItem};
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Errors that stop a batch
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A job failed in a way that is not tied to its target
    #[error("fatal error while processing '{target}': {error:#}")]
    Fatal {
        /// Target being processed
        target: String,
        /// What went wrong
        error: anyhow::Error,
    },
}

/// Runs targets through jobs and folds their statuses
pub struct Dispatcher {
    factory: Arc<dyn JobFactory>,
    unsupported: Option<Box<dyn Write + Send>>,
}

impl Dispatcher {
    /// Create a dispatcher building jobs with `factory`
    pub fn new(factory: Arc<dyn JobFactory>) -> Self {
        Self {
            factory,
            unsupported: None,
        }
    }

    /// Record targets without a handler, one per line
    pub fn with_unsupported_log(mut self, sink: impl Write + Send + 'static) -> Self {
        self.unsupported = Some(Box::new(sink));
        self
    }

    /// Run every item and return the OR of all statuses
    ///
    /// Stops at the first fatal error. Per-target overrides are always undone
    /// before this returns, including on error.
    pub async fn dispatch<T>(
        &mut self,
        items: T,
        config: &mut ConfigStore,
    ) -> Result<ExitStatus, DispatchError>
    where
        T: IntoIterator<Item = InputItem>,
    {
        let mut status = ExitStatus::SUCCESS;
        let mut processed = 0usize;

        for item in items {
            status |= self.dispatch_one(item, config).await?;
            processed += 1;
        }

        debug!(
            "Processed {} targets with {}, status {}",
            processed,
            self.factory.name(),
            status.bits()
        );
        Ok(status)
    }

    /// Run a single item
    pub async fn dispatch_one(
        &mut self,
        item: InputItem,
        config: &mut ConfigStore,
    ) -> Result<ExitStatus, DispatchError> {
        debug!("Starting {} for '{}'", self.factory.name(), item.value());

        let (target, outcome) = match item {
            InputItem::Plain(target) => {
                let outcome = self.run_job(&target, config).await;
                (target, outcome)
            }
            InputItem::Enriched(enriched) => {
                for directive in enriched.global_directives {
                    let (section, key, value) = directive.into_parts();
                    config.set(section, key, value);
                }

                let overlay = config.apply(
                    enriched
                        .local_directives
                        .into_iter()
                        .map(Directive::into_parts),
                );
                let outcome = self.run_job(&enriched.value, &overlay).await;
                drop(overlay);

                (enriched.value, outcome)
            }
        };

        self.settle(target, outcome)
    }

    async fn run_job(&self, target: &str, config: &ConfigStore) -> JobOutcome {
        match self.factory.create(target, config) {
            Ok(mut job) => job.run().await,
            Err(e) => e.into(),
        }
    }

    fn settle(&mut self, target: String, outcome: JobOutcome) -> Result<ExitStatus, DispatchError> {
        match outcome {
            JobOutcome::Completed(status) => Ok(status),
            JobOutcome::Aborted => {
                debug!("Aborted '{}'", target);
                Ok(ExitStatus::SUCCESS)
            }
            JobOutcome::NotFound => {
                error!("No suitable handler found for '{}'", target);
                self.record_unsupported(&target);
                Ok(ExitStatus::NO_HANDLER)
            }
            JobOutcome::Fatal(error) => Err(DispatchError::Fatal { target, error }),
        }
    }

    fn record_unsupported(&mut self, target: &str) {
        let Some(sink) = self.unsupported.as_mut() else {
            return;
        };
        if let Err(e) = writeln!(sink, "{}", target).and_then(|_| sink.flush()) {
            warn!("Failed to record unsupported target '{}': {}", target, e);
        }
    }
}
