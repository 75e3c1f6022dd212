// Resolver: dispatches lookups to providers, singly or in batches

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

use super::archivers::{ArchiveToday, Ghostarchive, TimeTravel, Wayback};
use super::config::PlaybackConfig;
use super::errors::PlaybackError;
use super::models::{Address, Destination, Provider, ResultSet, Scope};
use super::providers::{FallbackChain, GitHubSearch, GoogleCache, MeiliSearch};
use super::traits::{LinkSearch, Playback};

pub struct Resolver {
    backends: HashMap<Provider, Arc<dyn Playback>>,
    max_concurrency: usize,
}

impl Resolver {
    /// Build every provider from `config`
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        let github: Arc<dyn LinkSearch> = Arc::new(GitHubSearch::new(config)?);
        let meili: Arc<dyn LinkSearch> = Arc::new(MeiliSearch::new(config)?);

        let ipfs = FallbackChain::new("ipfs", Scope::ContentGateway)
            .with_tier(Arc::clone(&github))
            .with_tier(Arc::clone(&meili));
        let telegraph = FallbackChain::new("telegraph", Scope::PublishingMirror)
            .with_tier(github)
            .with_tier(meili);

        Ok(Self::empty(config.max_concurrency)
            .with_backend(Provider::SnapshotArchive, Arc::new(Wayback::new(config)?))
            .with_backend(Provider::TodaySnapshot, Arc::new(ArchiveToday::new(config)?))
            .with_backend(Provider::GhostSnapshot, Arc::new(Ghostarchive::new(config)?))
            .with_backend(Provider::ContentGateway, Arc::new(ipfs))
            .with_backend(Provider::PublishingMirror, Arc::new(telegraph))
            .with_backend(Provider::TimeIndex, Arc::new(TimeTravel::new(config)?))
            .with_backend(Provider::CacheLookup, Arc::new(GoogleCache::new(config)?)))
    }

    /// Resolver with no providers registered
    pub fn empty(max_concurrency: usize) -> Self {
        Self {
            backends: HashMap::new(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Register or replace the backend serving `provider`
    pub fn with_backend(mut self, provider: Provider, backend: Arc<dyn Playback>) -> Self {
        self.backends.insert(provider, backend);
        self
    }

    fn backend(&self, provider: Provider) -> Result<Arc<dyn Playback>, PlaybackError> {
        self.backends
            .get(&provider)
            .cloned()
            .ok_or_else(|| PlaybackError::Config(format!("no backend registered for {}", provider)))
    }

    /// Look up one address with one provider
    pub async fn resolve(&self, provider: Provider, address: &Address) -> Destination {
        let backend = match self.backend(provider) {
            Ok(backend) => backend,
            Err(e) => return Destination::Failed(e.to_string()),
        };

        let result = backend.playback(address).await;
        if let Err(ref e) = result {
            if e.is_not_found() {
                debug!(provider = %provider, url = %address, "nothing archived");
            } else {
                error!(provider = %provider, url = %address, error = %e, "playback failed");
            }
        }
        Destination::from(result)
    }

    /// Single-address lookup rendered for display: the archived URL or
    /// the error message
    pub async fn playback(&self, provider: Provider, address: &Address) -> String {
        self.resolve(provider, address).await.render()
    }

    /// Look up many addresses with one provider.
    ///
    /// Invalid inputs are dropped and duplicates collapse to one entry.
    /// Per-address failures are kept in the result set; the call itself
    /// fails only when no input is a valid address.
    pub async fn resolve_batch<S: AsRef<str>>(
        &self,
        provider: Provider,
        inputs: &[S],
    ) -> Result<ResultSet, PlaybackError> {
        let addresses = collect(inputs);
        if addresses.is_empty() {
            return Err(PlaybackError::NotFound);
        }

        let backend = self.backend(provider)?;
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks = JoinSet::new();

        for address in addresses.iter().cloned() {
            let backend = Arc::clone(&backend);
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let result = backend.playback(&address).await;
                if let Err(ref e) = result {
                    if !e.is_not_found() {
                        error!(provider = %provider, url = %address, error = %e, "playback failed");
                    }
                }
                (address, Destination::from(result))
            });
        }

        let mut results = ResultSet::new();
        let mut lost = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((address, dst)) => {
                    results.insert(address, dst);
                }
                Err(e) => {
                    error!(provider = %provider, error = %e, "lookup task failed");
                    lost = Some(PlaybackError::Task(e.to_string()));
                }
            }
        }

        // A task that panicked or was cancelled never reported its address
        if let Some(err) = lost {
            for address in addresses {
                results
                    .entry(address)
                    .or_insert_with(|| Destination::Failed(err.to_string()));
            }
        }

        Ok(results)
    }

    /// Batch lookup against each provider in turn
    pub async fn resolve_all<S: AsRef<str>>(
        &self,
        providers: &[Provider],
        inputs: &[S],
    ) -> Vec<(Provider, Result<ResultSet, PlaybackError>)> {
        let mut out = Vec::with_capacity(providers.len());
        for &provider in providers {
            out.push((provider, self.resolve_batch(provider, inputs).await));
        }
        out
    }
}

/// Validate and de-duplicate inputs, keeping first-seen order
pub fn collect<S: AsRef<str>>(inputs: &[S]) -> Vec<Address> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for input in inputs {
        let raw = input.as_ref();
        match Address::parse(raw) {
            Ok(address) => {
                if seen.insert(address.clone()) {
                    out.push(address);
                }
            }
            Err(_) => info!(input = raw, "skipping invalid url"),
        }
    }
    out
}
