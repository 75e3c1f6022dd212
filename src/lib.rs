//! Look up archived copies of web pages.
//!
//! Queries the Wayback Machine, archive.today, Ghostarchive, Memento Time
//! Travel and Google's cache directly, and finds IPFS and Telegra.ph
//! copies through GitHub issue search with a Meilisearch fallback.

pub mod playback;

pub use playback::{
    Address, Destination, Endpoints, LinkSearch, Playback, PlaybackConfig, PlaybackError,
    Provider, Resolver, ResultSet, Scope,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global log subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` turns on debug output for
/// this crate and everything else stays at `warn`.
pub fn init_logging(debug: bool) {
    let fallback = if debug { "warn,playback=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
