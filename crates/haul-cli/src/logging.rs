//! Tracing subscriber setup

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, logging to stderr
///
/// `RUST_LOG` takes precedence over `level` when it is set. Returns the most
/// verbose level the installed filter lets through. Calling this twice is
/// harmless; the first subscriber stays.
pub fn init(level: LevelFilter) -> LevelFilter {
    let filter = build_filter(std::env::var("RUST_LOG").ok().as_deref(), level);
    let effective = filter.max_level_hint().unwrap_or(level);

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    effective
}

/// Filter from `directives` (`RUST_LOG` syntax), or `level` when they are
/// absent or invalid
pub fn build_filter(directives: Option<&str>, level: LevelFilter) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}
