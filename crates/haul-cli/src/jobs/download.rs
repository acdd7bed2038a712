//! Download files to disk

use crate::handlers::{extension, Handler, HandlerError, HandlerRegistry, Resolved};
use async_trait::async_trait;
use haul_config::ConfigStore;
use haul_pipeline::{ExitStatus, Job, JobError, JobOutcome};
use reqwest::{Client, Url};
use serde_json::Value;
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What to do when the destination file already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipMode {
    /// Download again and overwrite
    Disabled,
    /// Leave the file alone
    Existing,
    /// Leave the file alone; after this many consecutive skips, abort the target
    Abort(u32),
}

impl SkipMode {
    /// Interpret a `skip` option
    ///
    /// `true` (the default) skips, `false` overwrites, and `"abort:N"` or
    /// `"terminate:N"` abort after N consecutive skips.
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Bool(true)) => Self::Existing,
            Some(Value::Bool(false)) => Self::Disabled,
            Some(Value::String(mode)) => {
                let (name, count) = mode.split_once(':').unwrap_or((mode.as_str(), "1"));
                match name {
                    "abort" | "terminate" => Self::Abort(count.trim().parse().unwrap_or(1).max(1)),
                    _ => Self::Existing,
                }
            }
            Some(other) => {
                warn!("Invalid 'skip' value {}, skipping existing files", other);
                Self::Existing
            }
        }
    }
}

/// Options a download job reads when it is created
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub base_directory: PathBuf,
    pub filename: Option<String>,
    pub skip: SkipMode,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            base_directory: PathBuf::from("."),
            filename: None,
            skip: SkipMode::Existing,
        }
    }
}

impl DownloadSettings {
    /// Read settings visible to `extractor.<handler>`
    pub fn from_config(config: &ConfigStore, handler: &str) -> Self {
        let section = format!("extractor.{handler}");
        let mut settings = Self::default();

        match config.interpolate(&section, "base-directory") {
            Some(Value::String(dir)) => settings.base_directory = PathBuf::from(dir),
            Some(other) => warn!("Invalid 'base-directory' value {}", other),
            None => {}
        }
        match config.interpolate(&section, "filename") {
            Some(Value::String(template)) => settings.filename = Some(template.clone()),
            Some(Value::Null) | None => {}
            Some(other) => warn!("Invalid 'filename' value {}", other),
        }
        settings.skip = SkipMode::from_value(config.interpolate(&section, "skip"));

        settings
    }

    /// Where the file at `url` is stored
    pub fn destination(&self, url: &Url) -> PathBuf {
        let segment = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|s| !s.is_empty())
            .unwrap_or("index");

        let name = match &self.filename {
            None => segment.to_string(),
            Some(template) => {
                let ext = extension(url).unwrap_or_default();
                let stem = segment.rsplit_once('.').map_or(segment, |(stem, _)| stem);
                template
                    .replace("{filename}", stem)
                    .replace("{extension}", &ext)
            }
        };

        self.base_directory.join(name)
    }
}

/// Resolve a target and store every file it yields
///
/// Nested targets are followed to any depth; each URL is visited once.
/// Failures are logged and recorded as status bits, then the job moves on.
pub struct DownloadJob {
    url: Url,
    handler: Arc<dyn Handler>,
    registry: Arc<HandlerRegistry>,
    client: Client,
    settings: DownloadSettings,
    consecutive_skips: u32,
}

impl DownloadJob {
    pub fn new(
        url: Url,
        handler: Arc<dyn Handler>,
        registry: Arc<HandlerRegistry>,
        client: Client,
        settings: DownloadSettings,
    ) -> Self {
        Self {
            url,
            handler,
            registry,
            client,
            settings,
            consecutive_skips: 0,
        }
    }

    async fn process(&mut self) -> Result<ExitStatus, JobError> {
        let mut status = ExitStatus::SUCCESS;
        let mut seen = HashSet::from([self.url.clone()]);
        let mut queue = VecDeque::from([(self.url.clone(), self.handler.clone())]);

        while let Some((url, handler)) = queue.pop_front() {
            let resolved = match handler.resolve(&self.client, &url).await {
                Ok(resolved) => resolved,
                Err(e) => {
                    error!("{}: {}", url, e);
                    status |= e.exit_status();
                    continue;
                }
            };

            for entry in resolved {
                match entry {
                    Resolved::File(file) => status |= self.download(&file).await?,
                    Resolved::Queue(child) => {
                        if !seen.insert(child.clone()) {
                            debug!("Already visited {}", child);
                            continue;
                        }
                        match self.registry.find(&child) {
                            Some(child_handler) => queue.push_back((child, child_handler)),
                            None => {
                                error!("No suitable handler found for '{}'", child);
                                status |= ExitStatus::NO_HANDLER;
                            }
                        }
                    }
                }
            }
        }

        Ok(status)
    }

    async fn download(&mut self, url: &Url) -> Result<ExitStatus, JobError> {
        let path = self.settings.destination(url);

        let exists = tokio::fs::try_exists(&path).await.unwrap_or(false);
        if exists && self.settings.skip != SkipMode::Disabled {
            info!("Skipping {} (exists)", path.display());
            self.consecutive_skips += 1;
            if let SkipMode::Abort(limit) = self.settings.skip {
                if self.consecutive_skips >= limit {
                    info!("Aborting {} after {} skipped files", self.url, self.consecutive_skips);
                    return Err(JobError::Aborted);
                }
            }
            return Ok(ExitStatus::SUCCESS);
        }
        self.consecutive_skips = 0;

        let bytes = match self.fetch(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("{}", e);
                return Ok(e.exit_status());
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!("Failed to create {}: {}", parent.display(), e);
                return Ok(ExitStatus::GENERAL);
            }
        }
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            error!("Failed to write {}: {}", path.display(), e);
            return Ok(ExitStatus::GENERAL);
        }

        info!("{}", path.display());
        Ok(ExitStatus::SUCCESS)
    }

    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, HandlerError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Status {
                status,
                url: url.clone(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl Job for DownloadJob {
    async fn run(&mut self) -> JobOutcome {
        self.process().await.into()
    }
}
