//! URL handlers
//!
//! A handler claims the URLs it understands and resolves each into files to
//! fetch or further targets to queue. The registry picks the first handler
//! that claims a URL.

use async_trait::async_trait;
use haul_pipeline::ExitStatus;
use reqwest::{Client, StatusCode, Url};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// One entry produced by resolving a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file to fetch
    File(Url),
    /// A nested target to be handled in turn
    Queue(Url),
}

impl Resolved {
    /// The URL either way
    pub fn url(&self) -> &Url {
        match self {
            Self::File(url) | Self::Queue(url) => url,
        }
    }
}

/// Resolution failures
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Transport-level failure
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: StatusCode, url: Url },
}

impl HandlerError {
    /// Exit status bits this failure contributes
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
                ExitStatus::NOT_FOUND
            }
            Self::Request(e) if e.status() == Some(StatusCode::NOT_FOUND) => ExitStatus::NOT_FOUND,
            _ => ExitStatus::HTTP,
        }
    }
}

/// Knows how to turn some kind of URL into downloadable files
#[async_trait]
pub trait Handler: Send + Sync {
    /// Short name; configuration for this handler lives in `extractor.<name>`
    fn name(&self) -> &'static str;

    /// Whether this handler claims `url`
    fn matches(&self, url: &Url) -> bool;

    /// Resolve `url` into files and nested targets
    async fn resolve(&self, client: &Client, url: &Url) -> Result<Vec<Resolved>, HandlerError>;
}

/// Ordered set of handlers
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: Vec<Arc<dyn Handler>>,
}

impl HandlerRegistry {
    /// Registry with no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in handlers, playlists first
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PlaylistHandler));
        registry.register(Arc::new(DirectHandler));
        registry
    }

    /// Append a handler; earlier registrations take precedence
    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.push(handler);
    }

    /// First handler claiming `url`
    pub fn find(&self, url: &Url) -> Option<Arc<dyn Handler>> {
        self.handlers.iter().find(|h| h.matches(url)).cloned()
    }

    /// Parse `target` and find its handler
    ///
    /// Targets that are not valid URLs have no handler.
    pub fn find_for(&self, target: &str) -> Option<(Url, Arc<dyn Handler>)> {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(e) => {
                debug!("'{}' is not a URL: {}", target, e);
                return None;
            }
        };
        let handler = self.find(&url)?;
        Some((url, handler))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Extension of the last path segment, lowercased
pub(crate) fn extension(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.next_back()?;
    let (stem, ext) = segment.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `.m3u` / `.m3u8` playlists
///
/// Every non-empty line that is not a `#` comment is a nested target,
/// resolved relative to the playlist URL.
pub struct PlaylistHandler;

impl PlaylistHandler {
    fn entries(base: &Url, body: &str) -> Vec<Resolved> {
        body.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| match base.join(line) {
                Ok(url) => Some(Resolved::Queue(url)),
                Err(e) => {
                    warn!("Ignoring playlist entry '{}': {}", line, e);
                    None
                }
            })
            .collect()
    }
}

#[async_trait]
impl Handler for PlaylistHandler {
    fn name(&self) -> &'static str {
        "playlist"
    }

    fn matches(&self, url: &Url) -> bool {
        is_http(url) && matches!(extension(url).as_deref(), Some("m3u" | "m3u8"))
    }

    async fn resolve(&self, client: &Client, url: &Url) -> Result<Vec<Resolved>, HandlerError> {
        let response = client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(HandlerError::Status {
                status,
                url: url.clone(),
            });
        }

        let body = response.text().await?;
        let entries = Self::entries(url, &body);
        debug!("Playlist {} lists {} entries", url, entries.len());
        Ok(entries)
    }
}

/// Plain links to a single file
pub struct DirectHandler;

#[async_trait]
impl Handler for DirectHandler {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn matches(&self, url: &Url) -> bool {
        is_http(url) && extension(url).is_some()
    }

    async fn resolve(&self, _client: &Client, url: &Url) -> Result<Vec<Resolved>, HandlerError> {
        Ok(vec![Resolved::File(url.clone())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn registry_prefers_earlier_handlers() {
        let registry = HandlerRegistry::with_defaults();

        let found = registry.find(&url("https://example.org/list.m3u8")).unwrap();
        assert_eq!(found.name(), "playlist");

        let found = registry.find(&url("https://example.org/img/cat.JPG")).unwrap();
        assert_eq!(found.name(), "direct");
    }

    #[test]
    fn unclaimed_targets_have_no_handler() {
        let registry = HandlerRegistry::with_defaults();

        assert!(registry.find_for("not a url").is_none());
        assert!(registry.find_for("ftp://example.org/a.jpg").is_none());
        assert!(registry.find_for("https://example.org/albums/").is_none());
        assert!(registry.find_for("https://example.org/.hidden").is_none());
        assert!(HandlerRegistry::new().find_for("https://example.org/a.jpg").is_none());
    }

    #[test]
    fn playlist_entries_resolve_relative_to_playlist() {
        let base = url("https://cdn.example.org/lists/set.m3u");
        let body = "#EXTM3U\n\n one.png \n../two.gif\nhttps://other.example.org/three.jpg\n";

        let entries = PlaylistHandler::entries(&base, body);
        let urls: Vec<_> = entries.iter().map(|e| e.url().as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://cdn.example.org/lists/one.png",
                "https://cdn.example.org/two.gif",
                "https://other.example.org/three.jpg",
            ]
        );
        assert!(entries.iter().all(|e| matches!(e, Resolved::Queue(_))));
    }

    #[tokio::test]
    async fn playlist_is_fetched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/set.m3u"))
            .respond_with(ResponseTemplate::new(200).set_body_string("a.jpg\n#skip\nb.jpg\n"))
            .mount(&server)
            .await;

        let playlist = url(&format!("{}/set.m3u", server.uri()));
        let entries = PlaylistHandler
            .resolve(&Client::new(), &playlist)
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].url().path(), "/b.jpg");
    }

    #[tokio::test]
    async fn missing_playlist_maps_to_not_found_bit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let playlist = url(&format!("{}/gone.m3u", server.uri()));
        let err = PlaylistHandler
            .resolve(&Client::new(), &playlist)
            .await
            .unwrap_err();
        assert_eq!(err.exit_status(), ExitStatus::NOT_FOUND);
    }
}
