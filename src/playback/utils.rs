// Helper functions for provider implementations

use std::time::Duration;

use regex::Regex;
use reqwest::redirect::Policy;
use url::Url;

use super::config::PlaybackConfig;
use super::errors::PlaybackError;
use super::models::Scope;

/// Desktop browser user agent; Google only serves cache pages to browsers
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/85.0.4183.83 Safari/537.36";

lazy_static::lazy_static! {
    static ref IPFS_RE: Regex =
        Regex::new(r"(?i)https?://ipfs\.io/ipfs/(?:\w{59}|\w{46})\b").unwrap();
    // Repeated titles get a numeric suffix after the date: `Title-01-01-2`
    static ref TELEGRAPH_RE: Regex =
        Regex::new(r"(?i)https?://telegra\.ph/\S+?-\d{2}-\d{2}(?:-\d+)?").unwrap();
}

fn pattern(scope: Scope) -> &'static Regex {
    match scope {
        Scope::ContentGateway => &*IPFS_RE,
        Scope::PublishingMirror => &*TELEGRAPH_RE,
    }
}

/// First link of the given scope in `text`, in canonical form
pub fn match_link(scope: Scope, text: &str) -> Option<String> {
    pattern(scope)
        .find_iter(text)
        .find_map(|m| Url::parse(m.as_str()).ok())
        .map(String::from)
}

/// Host, port, path and query of `url`; scheme, credentials and
/// fragment are left out
pub fn strip_scheme(url: &Url) -> String {
    let mut key = url.host_str().unwrap_or_default().to_string();
    if let Some(port) = url.port() {
        key.push(':');
        key.push_str(&port.to_string());
    }
    key.push_str(url.path());
    if let Some(query) = url.query() {
        key.push('?');
        key.push_str(query);
    }

    if let Some(host) = key.strip_suffix('/').filter(|s| !s.contains('/')) {
        return host.to_string();
    }
    key
}

/// Bare key for full-text search: scheme and `www.`/`wap.`/`m.` removed
pub fn strip_for_search(url: &Url) -> String {
    let mut key = strip_scheme(url);
    for prefix in ["www.", "wap.", "m."] {
        if let Some(rest) = key.strip_prefix(prefix) {
            key = rest.to_string();
        }
    }
    key
}

/// Shared HTTP client builder honouring the configured timeout and proxy
pub fn client_builder(config: &PlaybackConfig) -> Result<reqwest::ClientBuilder, PlaybackError> {
    let mut builder = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

    if let Some(proxy_url) = config.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| PlaybackError::Config(format!("invalid proxy {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder)
}

pub fn build_client(config: &PlaybackConfig) -> Result<reqwest::Client, PlaybackError> {
    client_builder(config)?
        .build()
        .map_err(|e| PlaybackError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Client that reports redirects instead of following them
pub fn build_no_redirect_client(
    config: &PlaybackConfig,
    user_agent: &str,
) -> Result<reqwest::Client, PlaybackError> {
    client_builder(config)?
        .redirect(Policy::none())
        .user_agent(user_agent)
        .build()
        .map_err(|e| PlaybackError::Config(format!("failed to build HTTP client: {}", e)))
}

/// Join `path` onto a configured base endpoint
pub fn endpoint(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
