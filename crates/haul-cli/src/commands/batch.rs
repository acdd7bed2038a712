//! Process every target given on the command line or in input files

use crate::cli::Cli;
use crate::config;
use crate::handlers::HandlerRegistry;
use crate::jobs::{HaulJobFactory, JobKind};
use anyhow::{Context, Result};
use haul_parser::{read_sources, InputItem};
use haul_pipeline::{progress_template, DispatchError, Dispatcher, ExitStatus, Progress};
use reqwest::Client;
use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

/// Run the batch and return the combined status of all targets
///
/// `log_level` is the level logging actually runs at; progress lines are
/// only written when it shows more than errors. Errors are fatal: bad
/// configuration files, an unwritable unsupported log, or a job that could
/// not continue.
pub async fn execute(cli: Cli, log_level: LevelFilter) -> Result<ExitStatus> {
    let mut config = config::load(&cli)?;

    let mut items: Vec<InputItem> = cli.urls.iter().map(|url| InputItem::from(url.as_str())).collect();
    items.extend(read_sources(&cli.input_files));
    debug!("Collected {} targets", items.len());

    let client = Client::builder()
        .user_agent(concat!("haul/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let factory = HaulJobFactory::new(
        JobKind::from_get_urls(cli.get_urls),
        HandlerRegistry::with_defaults(),
        client,
    );
    let mut dispatcher = Dispatcher::new(Arc::new(factory));

    if let Some(path) = &cli.write_unsupported {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        dispatcher = dispatcher.with_unsupported_log(file);
    }

    // Progress lines only help with several targets and visible logging
    let template = progress_template(&config)
        .filter(|_| items.len() > 1 && log_level > LevelFilter::ERROR);

    let status = match template {
        Some(template) => {
            dispatcher
                .dispatch(Progress::stderr(items, template), &mut config)
                .await?
        }
        None => dispatcher.dispatch(items, &mut config).await?,
    };

    Ok(status)
}

/// Whether `error` comes from stdout being closed by the reader
///
/// Looks through the error chain, including the job error inside a
/// [`DispatchError`].
pub fn is_broken_pipe(error: &anyhow::Error) -> bool {
    let job_error = error
        .downcast_ref::<DispatchError>()
        .map(|DispatchError::Fatal { error, .. }| error);

    error
        .chain()
        .chain(job_error.into_iter().flat_map(|e| e.chain()))
        .filter_map(|cause| cause.downcast_ref::<io::Error>())
        .any(|e| e.kind() == io::ErrorKind::BrokenPipe)
}
