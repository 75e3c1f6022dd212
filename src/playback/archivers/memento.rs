use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::error;

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::Address;
use crate::playback::traits::Playback;
use crate::playback::utils;

#[derive(Debug, Deserialize)]
struct TimeTravelResponse {
    mementos: Option<Mementos>,
}

#[derive(Debug, Deserialize)]
struct Mementos {
    closest: Option<Memento>,
    last: Option<Memento>,
}

#[derive(Debug, Deserialize)]
struct Memento {
    #[serde(default)]
    uri: Vec<String>,
}

impl Memento {
    fn first_uri(&self) -> Option<&str> {
        self.uri.iter().map(String::as_str).find(|u| !u.is_empty())
    }
}

/// Memento Time Travel aggregator
pub struct TimeTravel {
    client: reqwest::Client,
    endpoint: String,
}

impl TimeTravel {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self {
            client: utils::build_client(config)?,
            endpoint: utils::endpoint(&config.endpoints.timetravel, "api/json"),
        })
    }
}

fn timestamp(at: OffsetDateTime) -> Result<String, PlaybackError> {
    at.format(format_description!("[year][month][day][hour][minute][second]"))
        .map_err(|e| PlaybackError::Config(format!("timestamp: {}", e)))
}

#[async_trait]
impl Playback for TimeTravel {
    fn name(&self) -> &'static str {
        "timetravel"
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        let uri = format!(
            "{}/{}/{}",
            self.endpoint,
            timestamp(OffsetDateTime::now_utc())?,
            address.url()
        );
        let resp = self.client.get(&uri).send().await.map_err(|e| {
            error!(url = %address, error = %e, "time travel request failed");
            PlaybackError::from(e)
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PlaybackError::NotFound);
        }
        if !status.is_success() {
            return Err(PlaybackError::Status(status));
        }

        let data: TimeTravelResponse = serde_json::from_str(&resp.text().await?)?;
        let mementos = data.mementos.ok_or(PlaybackError::NotFound)?;
        mementos
            .closest
            .as_ref()
            .and_then(Memento::first_uri)
            .or_else(|| mementos.last.as_ref().and_then(Memento::first_uri))
            .map(str::to_string)
            .ok_or(PlaybackError::NotFound)
    }
}
