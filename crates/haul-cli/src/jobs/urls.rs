//! Print URLs instead of downloading (`-g`)

use crate::handlers::{Handler, HandlerRegistry, Resolved};
use anyhow::Context;
use async_trait::async_trait;
use haul_pipeline::{ExitStatus, Job, JobError, JobOutcome};
use reqwest::{Client, Url};
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Arc;
use tracing::error;

/// Write one line per file URL
///
/// Nested targets are followed while fewer than `max_depth` levels deep;
/// beyond that they are printed as they are. A failing output stream is
/// fatal, since nothing else can be reported.
pub struct ListUrlsJob<W> {
    url: Url,
    handler: Arc<dyn Handler>,
    registry: Arc<HandlerRegistry>,
    client: Client,
    max_depth: usize,
    out: W,
}

impl<W: Write + Send> ListUrlsJob<W> {
    pub fn new(
        url: Url,
        handler: Arc<dyn Handler>,
        registry: Arc<HandlerRegistry>,
        client: Client,
        max_depth: usize,
        out: W,
    ) -> Self {
        Self {
            url,
            handler,
            registry,
            client,
            max_depth,
            out,
        }
    }

    /// Recover the output stream
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, url: &Url) -> Result<(), JobError> {
        writeln!(self.out, "{}", url).context("failed to write URL")?;
        Ok(())
    }

    async fn process(&mut self) -> Result<ExitStatus, JobError> {
        let mut status = ExitStatus::SUCCESS;
        let mut queue = VecDeque::from([(self.url.clone(), self.handler.clone(), 1usize)]);

        while let Some((url, handler, depth)) = queue.pop_front() {
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
                    Resolved::File(file) => self.emit(&file)?,
                    Resolved::Queue(child) if depth < self.max_depth => {
                        match self.registry.find(&child) {
                            Some(next) => queue.push_back((child, next, depth + 1)),
                            None => {
                                error!("No suitable handler found for '{}'", child);
                                status |= ExitStatus::NO_HANDLER;
                            }
                        }
                    }
                    Resolved::Queue(child) => self.emit(&child)?,
                }
            }
        }

        self.out.flush().context("failed to flush output")?;
        Ok(status)
    }
}

#[async_trait]
impl<W: Write + Send> Job for ListUrlsJob<W> {
    async fn run(&mut self) -> JobOutcome {
        self.process().await.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::batch::is_broken_pipe;
    use crate::handlers::{DirectHandler, PlaylistHandler};
    use std::io;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn playlist_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/outer.m3u"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a.jpg\ninner.m3u\n"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/inner.m3u"))
            .respond_with(ResponseTemplate::new(200).set_body_string("b.jpg\n"))
            .mount(&server)
            .await;
        server
    }

    async fn list(server: &MockServer, max_depth: usize) -> (JobOutcome, String) {
        let url = Url::parse(&format!("{}/outer.m3u", server.uri())).unwrap();
        let mut job = ListUrlsJob::new(
            url,
            Arc::new(PlaylistHandler),
            Arc::new(HandlerRegistry::with_defaults()),
            Client::new(),
            max_depth,
            Vec::new(),
        );
        let outcome = job.run().await;
        (outcome, String::from_utf8(job.into_inner()).unwrap())
    }

    #[tokio::test]
    async fn depth_one_prints_nested_targets_as_is() {
        let server = playlist_server().await;
        let (outcome, out) = list(&server, 1).await;

        assert!(matches!(outcome, JobOutcome::Completed(s) if s.is_success()));
        let base = server.uri();
        assert_eq!(out, format!("{base}/a.jpg\n{base}/inner.m3u\n"));
    }

    #[tokio::test]
    async fn deeper_listing_follows_nested_targets() {
        let server = playlist_server().await;
        let (_, out) = list(&server, 2).await;

        let base = server.uri();
        assert_eq!(out, format!("{base}/a.jpg\n{base}/b.jpg\n"));
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn closed_output_is_fatal_and_recognizable() {
        let mut job = ListUrlsJob::new(
            Url::parse("https://example.org/a.jpg").unwrap(),
            Arc::new(DirectHandler),
            Arc::new(HandlerRegistry::with_defaults()),
            Client::new(),
            1,
            ClosedPipe,
        );

        match job.run().await {
            JobOutcome::Fatal(e) => assert!(is_broken_pipe(&e)),
            other => panic!("expected a fatal outcome, got {:?}", other),
        }
    }
}
