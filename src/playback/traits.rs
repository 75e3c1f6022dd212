// Provider trait definitions

use async_trait::async_trait;

use super::errors::PlaybackError;
use super::models::{Address, Scope};

/// A service that can look up an archived copy of an address.
///
/// `Err(PlaybackError::NotFound)` means the service answered and has no
/// capture; every other error is a failure of the lookup itself.
#[async_trait]
pub trait Playback: Send + Sync {
    /// Name of the service (for logging)
    fn name(&self) -> &'static str;

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError>;
}

/// A search backend that extracts links of a requested kind
#[async_trait]
pub trait LinkSearch: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, address: &Address, scope: Scope) -> Result<String, PlaybackError>;
}
