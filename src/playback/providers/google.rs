use async_trait::async_trait;
use tracing::{debug, error};

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::Address;
use crate::playback::traits::Playback;
use crate::playback::utils;

/// Google web cache lookup.
///
/// Redirects are not followed: any non-2xx answer, redirects included,
/// is reported as an error carrying the status line.
pub struct GoogleCache {
    client: reqwest::Client,
    endpoint: String,
}

impl GoogleCache {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        let client = utils::build_no_redirect_client(config, utils::BROWSER_USER_AGENT)?;
        Ok(Self {
            client,
            endpoint: utils::endpoint(&config.endpoints.google_cache, "search"),
        })
    }
}

#[async_trait]
impl Playback for GoogleCache {
    fn name(&self) -> &'static str {
        "google-cache"
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        let q = format!("cache:{}", address.url());
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("q", q.as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(url = %address, error = %e, "google cache request failed");
                PlaybackError::from(e)
            })?;

        let status = resp.status();
        if !status.is_success() {
            debug!(url = %address, %status, "google cache status code");
            return Err(PlaybackError::Status(status));
        }

        Ok(resp.url().to_string())
    }
}
