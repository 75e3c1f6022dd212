// Search and cache providers

pub mod github;
pub mod google;
pub mod meilisearch;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::errors::PlaybackError;
use super::models::{Address, Scope};
use super::traits::{LinkSearch, Playback};

pub use github::GitHubSearch;
pub use google::GoogleCache;
pub use meilisearch::MeiliSearch;

/// Ordered search tiers for one scope.
///
/// A tier is consulted only when every earlier tier answered not-found.
/// The last tier consulted decides the outcome.
pub struct FallbackChain {
    name: &'static str,
    scope: Scope,
    tiers: Vec<Arc<dyn LinkSearch>>,
}

impl FallbackChain {
    pub fn new(name: &'static str, scope: Scope) -> Self {
        Self {
            name,
            scope,
            tiers: Vec::new(),
        }
    }

    pub fn with_tier(mut self, tier: Arc<dyn LinkSearch>) -> Self {
        self.tiers.push(tier);
        self
    }
}

#[async_trait]
impl Playback for FallbackChain {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        for tier in &self.tiers {
            debug!(chain = self.name, tier = tier.name(), url = %address, "trying tier");

            match tier.search(address, self.scope).await {
                Ok(dst) => {
                    debug!(chain = self.name, tier = tier.name(), "tier found {}", dst);
                    return Ok(dst);
                }
                Err(PlaybackError::NotFound) => {
                    debug!(chain = self.name, tier = tier.name(), "tier found nothing");
                }
                Err(e) => {
                    warn!(chain = self.name, tier = tier.name(), url = %address, error = %e, "tier failed");
                    return Err(e);
                }
            }
        }

        Err(PlaybackError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned tier that counts its calls
    struct Stub {
        answer: Result<String, PlaybackError>,
        calls: AtomicUsize,
    }

    impl Stub {
        fn new(answer: Result<String, PlaybackError>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LinkSearch for Stub {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn search(&self, _address: &Address, _scope: Scope) -> Result<String, PlaybackError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    fn chain(first: Arc<Stub>, second: Arc<Stub>) -> FallbackChain {
        FallbackChain::new("test", Scope::PublishingMirror)
            .with_tier(first)
            .with_tier(second)
    }

    fn address() -> Address {
        Address::parse("https://example.com").unwrap()
    }

    #[tokio::test]
    async fn test_first_tier_hit_skips_second() {
        let first = Stub::new(Ok("https://telegra.ph/A-01-01".into()));
        let second = Stub::new(Ok("https://telegra.ph/B-01-01".into()));
        let got = chain(first.clone(), second.clone()).playback(&address()).await;
        assert_eq!(got.unwrap(), "https://telegra.ph/A-01-01");
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_not_found_falls_through() {
        let first = Stub::new(Err(PlaybackError::NotFound));
        let second = Stub::new(Ok("https://telegra.ph/B-01-01".into()));
        let got = chain(first, second.clone()).playback(&address()).await;
        assert_eq!(got.unwrap(), "https://telegra.ph/B-01-01");
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_does_not_fall_through() {
        let first = Stub::new(Err(PlaybackError::Network("connection refused".into())));
        let second = Stub::new(Ok("https://telegra.ph/B-01-01".into()));
        let got = chain(first, second.clone()).playback(&address()).await;
        assert_eq!(got, Err(PlaybackError::Network("connection refused".into())));
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_second_tier_error_wins_after_not_found() {
        let first = Stub::new(Err(PlaybackError::NotFound));
        let second = Stub::new(Err(PlaybackError::Disabled("meilisearch")));
        let got = chain(first, second).playback(&address()).await;
        assert_eq!(got, Err(PlaybackError::Disabled("meilisearch")));
    }

    #[tokio::test]
    async fn test_all_not_found() {
        let got = chain(Stub::new(Err(PlaybackError::NotFound)), Stub::new(Err(PlaybackError::NotFound)))
            .playback(&address())
            .await;
        assert_eq!(got, Err(PlaybackError::NotFound));
    }
}
