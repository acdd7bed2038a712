//! Jobs run by the `haul` binary

pub mod download;
pub mod urls;

pub use download::{DownloadJob, DownloadSettings, SkipMode};
pub use urls::ListUrlsJob;

use crate::handlers::HandlerRegistry;
use haul_config::ConfigStore;
use haul_pipeline::{Job, JobError, JobFactory};
use reqwest::Client;
use std::io;
use std::sync::Arc;

/// Which job every target of a run gets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    /// Fetch files to disk
    Download,
    /// Print file URLs, following nested targets up to `max_depth` levels
    ListUrls { max_depth: usize },
}

impl JobKind {
    /// `-g` given `count` times selects URL listing
    pub fn from_get_urls(count: u8) -> Self {
        match count {
            0 => Self::Download,
            n => Self::ListUrls {
                max_depth: usize::from(n),
            },
        }
    }
}

/// Builds one job kind for every target
pub struct HaulJobFactory {
    kind: JobKind,
    registry: Arc<HandlerRegistry>,
    client: Client,
}

impl HaulJobFactory {
    pub fn new(kind: JobKind, registry: HandlerRegistry, client: Client) -> Self {
        Self {
            kind,
            registry: Arc::new(registry),
            client,
        }
    }
}

impl JobFactory for HaulJobFactory {
    fn name(&self) -> &str {
        match self.kind {
            JobKind::Download => "DownloadJob",
            JobKind::ListUrls { .. } => "ListUrlsJob",
        }
    }

    fn create(&self, target: &str, config: &ConfigStore) -> Result<Box<dyn Job>, JobError> {
        let (url, handler) = self.registry.find_for(target).ok_or(JobError::NotFound)?;

        Ok(match self.kind {
            JobKind::Download => {
                let settings = DownloadSettings::from_config(config, handler.name());
                Box::new(DownloadJob::new(
                    url,
                    handler,
                    self.registry.clone(),
                    self.client.clone(),
                    settings,
                ))
            }
            JobKind::ListUrls { max_depth } => Box::new(ListUrlsJob::new(
                url,
                handler,
                self.registry.clone(),
                self.client.clone(),
                max_depth,
                io::stdout(),
            )),
        })
    }
}
