// Common data models for playback

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use url::Url;

use super::errors::PlaybackError;

/// A validated web address.
///
/// Equality and hashing use the caller's original string, so the
/// address is reported back under exactly the key it was given.
#[derive(Debug, Clone)]
pub struct Address {
    raw: String,
    url: Url,
}

impl Address {
    /// Validate `input` as a web address.
    ///
    /// Accepts absolute `http`/`https` URLs with a host, and scheme-less
    /// references such as `example.com/page` whose first segment is a
    /// dotted host name. Anything containing whitespace is rejected.
    pub fn parse(input: &str) -> Result<Self, PlaybackError> {
        if input.is_empty() || input.chars().any(char::is_whitespace) {
            return Err(PlaybackError::InvalidUrl(input.to_string()));
        }

        // `example.com:8080/x` parses with `example.com` as its scheme
        let url = match Url::parse(input) {
            Ok(url) if !url.scheme().contains('.') => url,
            Ok(_) | Err(url::ParseError::RelativeUrlWithoutBase) => Self::parse_schemeless(input)?,
            Err(e) => return Err(PlaybackError::InvalidUrl(format!("{}: {}", input, e))),
        };

        let usable = matches!(url.scheme(), "http" | "https")
            && url.host_str().map_or(false, |h| !h.is_empty());
        if !usable {
            return Err(PlaybackError::InvalidUrl(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            url,
        })
    }

    fn parse_schemeless(input: &str) -> Result<Url, PlaybackError> {
        let authority = input.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority.split(':').next().unwrap_or_default();
        if !host.contains('.') || host.starts_with('.') || host.ends_with('.') {
            return Err(PlaybackError::InvalidUrl(input.to_string()));
        }
        Ok(Url::parse(&format!("http://{}", input))?)
    }

    pub fn is_valid(input: &str) -> bool {
        Self::parse(input).is_ok()
    }

    /// The string the caller supplied
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Address {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Which kind of archived link a search provider should extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// IPFS gateway links
    ContentGateway,
    /// Telegra.ph pages
    PublishingMirror,
}

impl Scope {
    /// Index attribute holding links of this kind
    pub fn field(&self) -> &'static str {
        match self {
            Self::ContentGateway => "ip",
            Self::PublishingMirror => "ph",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContentGateway => write!(f, "ipfs"),
            Self::PublishingMirror => write!(f, "telegraph"),
        }
    }
}

/// Archive backends a caller can resolve against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Internet Archive Wayback Machine
    SnapshotArchive,
    /// archive.today
    TodaySnapshot,
    /// Ghostarchive
    GhostSnapshot,
    /// IPFS links from the issue tracker or search index
    ContentGateway,
    /// Telegra.ph links from the issue tracker or search index
    PublishingMirror,
    /// Memento Time Travel aggregator
    TimeIndex,
    /// Google web cache
    CacheLookup,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::SnapshotArchive,
        Provider::TodaySnapshot,
        Provider::GhostSnapshot,
        Provider::ContentGateway,
        Provider::PublishingMirror,
        Provider::TimeIndex,
        Provider::CacheLookup,
    ];

    /// Providers queried when the caller does not choose
    pub const DEFAULT: [Provider; 6] = [
        Provider::SnapshotArchive,
        Provider::TodaySnapshot,
        Provider::GhostSnapshot,
        Provider::ContentGateway,
        Provider::PublishingMirror,
        Provider::TimeIndex,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::SnapshotArchive => "Internet Archive",
            Self::TodaySnapshot => "archive.today",
            Self::GhostSnapshot => "Ghostarchive",
            Self::ContentGateway => "IPFS",
            Self::PublishingMirror => "Telegraph",
            Self::TimeIndex => "Time Travel",
            Self::CacheLookup => "Google Cache",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Self::SnapshotArchive => "ia",
            Self::TodaySnapshot => "is",
            Self::GhostSnapshot => "ga",
            Self::ContentGateway => "ip",
            Self::PublishingMirror => "ph",
            Self::TimeIndex => "tt",
            Self::CacheLookup => "gc",
        }
    }

    /// Search scope for providers backed by the fallback chain
    pub fn scope(&self) -> Option<Scope> {
        match self {
            Self::ContentGateway => Some(Scope::ContentGateway),
            Self::PublishingMirror => Some(Scope::PublishingMirror),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.short_name() == lower || p.label().to_lowercase() == lower)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|p| p.short_name()).collect();
                format!("unknown provider '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

/// Outcome of one lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Archived URL
    Found(String),
    /// Service reachable, nothing archived
    NotFound,
    /// Rendered error text
    Failed(String),
}

impl Destination {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Display text: the URL, or the message a caller should see
    pub fn render(&self) -> String {
        match self {
            Self::Found(url) => url.clone(),
            Self::NotFound => PlaybackError::NotFound.to_string(),
            Self::Failed(msg) => msg.clone(),
        }
    }
}

impl From<Result<String, PlaybackError>> for Destination {
    fn from(result: Result<String, PlaybackError>) -> Self {
        match result {
            Ok(dst) if dst.is_empty() => Self::NotFound,
            Ok(dst) => Self::Found(dst),
            Err(PlaybackError::NotFound) => Self::NotFound,
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Per-address outcomes of a batch lookup
pub type ResultSet = HashMap<Address, Destination>;
