//! The job contract
//!
//! A job does the actual work for one target (resolving it, downloading,
//! listing URLs, ...). The dispatcher only knows this interface.

use crate::ExitStatus;
use async_trait::async_trait;
use haul_config::ConfigStore;
use thiserror::Error;

/// Result of running one target
#[derive(Debug)]
pub enum JobOutcome {
    /// Finished; the bits describe any non-fatal problems
    Completed(ExitStatus),
    /// Target was cut short on purpose; contributes nothing to the status
    Aborted,
    /// Nothing knows how to handle this target
    NotFound,
    /// Unrecoverable error; stops the whole batch
    Fatal(anyhow::Error),
}

impl JobOutcome {
    /// Completed with no failure bits
    pub fn success() -> Self {
        Self::Completed(ExitStatus::SUCCESS)
    }
}

impl From<JobError> for JobOutcome {
    fn from(error: JobError) -> Self {
        match error {
            JobError::Aborted => Self::Aborted,
            JobError::NotFound => Self::NotFound,
            JobError::Fatal(e) => Self::Fatal(e),
        }
    }
}

impl From<Result<ExitStatus, JobError>> for JobOutcome {
    fn from(result: Result<ExitStatus, JobError>) -> Self {
        match result {
            Ok(status) => Self::Completed(status),
            Err(e) => e.into(),
        }
    }
}

/// Ways a job can fail to produce a status
///
/// Convenient for `?` inside job implementations; converts into
/// [`JobOutcome`].
#[derive(Debug, Error)]
pub enum JobError {
    /// Stop processing this target
    #[error("target aborted")]
    Aborted,

    /// No handler for this target
    #[error("no suitable handler found")]
    NotFound,

    /// Anything else
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

/// Work for a single target
#[async_trait]
pub trait Job: Send {
    /// Run to completion
    async fn run(&mut self) -> JobOutcome;
}

/// Creates a job for each target
///
/// `config` is the configuration visible to this target, local overrides
/// included. Jobs should read what they need while being created; the
/// overrides are gone once the target is finished.
pub trait JobFactory: Send + Sync {
    /// Name used in log messages
    fn name(&self) -> &str {
        "job"
    }

    /// Build the job for `target`
    ///
    /// Returning [`JobError::NotFound`] here is the usual way to reject a
    /// target nothing can handle.
    fn create(&self, target: &str, config: &ConfigStore) -> Result<Box<dyn Job>, JobError>;
}

impl<F> JobFactory for F
where
    F: Fn(&str, &ConfigStore) -> Result<Box<dyn Job>, JobError> + Send + Sync,
{
    fn create(&self, target: &str, config: &ConfigStore) -> Result<Box<dyn Job>, JobError> {
        self(target, config)
    }
}
