use async_trait::async_trait;
use serde::Deserialize;
use tracing::error;

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::Address;
use crate::playback::traits::Playback;
use crate::playback::utils;

#[derive(Debug, Deserialize)]
struct Availability {
    #[serde(default)]
    archived_snapshots: Snapshots,
}

#[derive(Debug, Default, Deserialize)]
struct Snapshots {
    closest: Option<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct Snapshot {
    #[serde(default)]
    available: bool,
    #[serde(default)]
    url: String,
}

/// Internet Archive Wayback Machine, via the availability API
pub struct Wayback {
    client: reqwest::Client,
    endpoint: String,
}

impl Wayback {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self {
            client: utils::build_client(config)?,
            endpoint: utils::endpoint(&config.endpoints.wayback, "wayback/available"),
        })
    }
}

#[async_trait]
impl Playback for Wayback {
    fn name(&self) -> &'static str {
        "wayback"
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[("url", address.url().as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(url = %address, error = %e, "wayback request failed");
                PlaybackError::from(e)
            })?;

        if !resp.status().is_success() {
            return Err(PlaybackError::Status(resp.status()));
        }

        let data: Availability = serde_json::from_str(&resp.text().await?)?;
        match data.archived_snapshots.closest {
            Some(snapshot) if snapshot.available && !snapshot.url.is_empty() => Ok(snapshot.url),
            _ => Err(PlaybackError::NotFound),
        }
    }
}
