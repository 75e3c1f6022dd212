// Configuration for playback providers
//
// Read once at start-up (usually from the environment) and passed by
// reference into every provider constructor.

use std::env;

use super::errors::PlaybackError;

pub const DEFAULT_MEILI_INDEX: &str = "capsules";

/// Base URLs of the remote services
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub github_api: String,
    pub google_cache: String,
    pub wayback: String,
    pub archive_today: String,
    pub ghostarchive: String,
    pub timetravel: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            github_api: "https://api.github.com".to_string(),
            google_cache: "https://webcache.googleusercontent.com".to_string(),
            wayback: "https://archive.org".to_string(),
            archive_today: "https://archive.ph".to_string(),
            ghostarchive: "https://ghostarchive.org".to_string(),
            timetravel: "https://timetravel.mementoweb.org".to_string(),
        }
    }
}

impl Endpoints {
    /// Point every service at one base URL (mock servers in tests)
    pub fn all(base: &str) -> Self {
        Self {
            github_api: base.to_string(),
            google_cache: base.to_string(),
            wayback: base.to_string(),
            archive_today: base.to_string(),
            ghostarchive: base.to_string(),
            timetravel: base.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// `owner/name` filter for issue search
    pub github_repo: Option<String>,
    /// Personal access token for issue search
    pub github_token: Option<String>,
    /// Meilisearch base URL; the index provider is disabled without it
    pub meili_endpoint: Option<String>,
    pub meili_index: String,
    pub meili_api_key: Option<String>,
    /// Enable debug logging
    pub debug: bool,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
    /// Upper bound on in-flight lookups in a batch
    pub max_concurrency: usize,
    /// HTTP/SOCKS5 proxy URL
    pub proxy: Option<String>,
    pub endpoints: Endpoints,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            github_repo: None,
            github_token: None,
            meili_endpoint: None,
            meili_index: DEFAULT_MEILI_INDEX.to_string(),
            meili_api_key: None,
            debug: false,
            timeout_seconds: 60,
            max_concurrency: 16,
            proxy: None,
            endpoints: Endpoints::default(),
        }
    }
}

impl PlaybackConfig {
    /// Build from `PLAYBACK_*` and `DEBUG` environment variables
    pub fn from_env() -> Result<Self, PlaybackError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PlaybackError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let timeout_seconds = match get("PLAYBACK_TIMEOUT") {
            Some(v) => parse_positive("PLAYBACK_TIMEOUT", &v)? as u64,
            None => defaults.timeout_seconds,
        };
        let max_concurrency = match get("PLAYBACK_CONCURRENCY") {
            Some(v) => parse_positive("PLAYBACK_CONCURRENCY", &v)?,
            None => defaults.max_concurrency,
        };

        Ok(Self {
            github_repo: get("PLAYBACK_GITHUB_REPO"),
            github_token: get("PLAYBACK_GITHUB_PAT"),
            meili_endpoint: get("PLAYBACK_MEILI_ENDPOINT"),
            meili_index: get("PLAYBACK_MEILI_INDEXING").unwrap_or(defaults.meili_index),
            meili_api_key: get("PLAYBACK_MEILI_APIKEY"),
            debug: get("DEBUG").map_or(false, |v| is_truthy(&v)),
            timeout_seconds,
            max_concurrency,
            proxy: get("PLAYBACK_PROXY"),
            endpoints: defaults.endpoints,
        })
    }

    pub fn with_github_repo(mut self, repo: Option<String>) -> Self {
        self.github_repo = repo;
        self
    }

    pub fn with_github_token(mut self, token: Option<String>) -> Self {
        self.github_token = token;
        self
    }

    pub fn with_meili(mut self, endpoint: Option<String>, api_key: Option<String>) -> Self {
        self.meili_endpoint = endpoint;
        self.meili_api_key = api_key;
        self
    }

    pub fn with_meili_index(mut self, index: impl Into<String>) -> Self {
        self.meili_index = index.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_max_concurrency(mut self, limit: usize) -> Self {
        self.max_concurrency = limit.max(1);
        self
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "on")
}

fn parse_positive(key: &str, value: &str) -> Result<usize, PlaybackError> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PlaybackError::Config(format!(
            "{} must be a positive integer, got '{}'",
            key, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = PlaybackConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.meili_index, "capsules");
        assert!(config.meili_endpoint.is_none());
        assert!(config.github_token.is_none());
        assert!(!config.debug);
        assert_eq!(config.max_concurrency, 16);
    }

    #[test]
    fn test_reads_variables() {
        let config = PlaybackConfig::from_lookup(lookup(&[
            ("PLAYBACK_GITHUB_REPO", "wabarc/archives"),
            ("PLAYBACK_GITHUB_PAT", "ghp_x"),
            ("PLAYBACK_MEILI_ENDPOINT", "http://localhost:7700"),
            ("PLAYBACK_MEILI_INDEXING", "links"),
            ("PLAYBACK_MEILI_APIKEY", "secret"),
            ("DEBUG", "on"),
            ("PLAYBACK_CONCURRENCY", "4"),
        ]))
        .unwrap();
        assert_eq!(config.github_repo.as_deref(), Some("wabarc/archives"));
        assert_eq!(config.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.meili_endpoint.as_deref(), Some("http://localhost:7700"));
        assert_eq!(config.meili_index, "links");
        assert_eq!(config.meili_api_key.as_deref(), Some("secret"));
        assert!(config.debug);
        assert_eq!(config.max_concurrency, 4);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = PlaybackConfig::from_lookup(lookup(&[
            ("PLAYBACK_MEILI_ENDPOINT", ""),
            ("PLAYBACK_MEILI_INDEXING", "  "),
        ]))
        .unwrap();
        assert!(config.meili_endpoint.is_none());
        assert_eq!(config.meili_index, "capsules");
    }

    #[test]
    fn test_debug_values() {
        for (value, expected) in [("true", true), ("1", true), ("ON", true), ("no", false), ("0", false)] {
            let config = PlaybackConfig::from_lookup(lookup(&[("DEBUG", value)])).unwrap();
            assert_eq!(config.debug, expected, "DEBUG={}", value);
        }
    }

    #[test]
    fn test_invalid_concurrency() {
        let err = PlaybackConfig::from_lookup(lookup(&[("PLAYBACK_CONCURRENCY", "0")])).unwrap_err();
        assert!(matches!(err, PlaybackError::Config(_)));
    }
}
