use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, error};

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::Address;
use crate::playback::traits::Playback;
use crate::playback::utils;

lazy_static::lazy_static! {
    // Timemap entries look like `<uri>; rel="last memento"; datetime="..."`
    static ref MEMENTO_RE: Regex =
        Regex::new(r#"<([^>]+)>;\s*rel="(?:first )?(?:last )?memento""#).unwrap();
}

/// archive.today, via its Memento timemap
pub struct ArchiveToday {
    client: reqwest::Client,
    endpoint: String,
}

impl ArchiveToday {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self {
            client: utils::build_client(config)?,
            endpoint: utils::endpoint(&config.endpoints.archive_today, "timemap"),
        })
    }
}

/// Newest memento listed in a link-format timemap
fn latest_memento(timemap: &str) -> Option<String> {
    MEMENTO_RE
        .captures_iter(timemap)
        .filter_map(|c| c.get(1))
        .last()
        .map(|m| m.as_str().to_string())
}

#[async_trait]
impl Playback for ArchiveToday {
    fn name(&self) -> &'static str {
        "archive.today"
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        let uri = format!("{}/{}", self.endpoint, address.url());
        let resp = self.client.get(&uri).send().await.map_err(|e| {
            error!(url = %address, error = %e, "archive.today request failed");
            PlaybackError::from(e)
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlaybackError::NotFound);
        }
        if !status.is_success() {
            debug!(url = %address, %status, "archive.today status code");
            return Err(PlaybackError::Status(status));
        }

        latest_memento(&resp.text().await?).ok_or(PlaybackError::NotFound)
    }
}
