use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::{Address, Scope};
use crate::playback::traits::LinkSearch;
use crate::playback::utils;

/// Search qualifier the archiving bot puts in every issue it opens
const QUALIFIER: &str = "archived";

/// Finds links that an archiving bot posted in GitHub issues
pub struct GitHubSearch {
    client: reqwest::Client,
    endpoint: String,
    repo: Option<String>,
    token: Option<String>,
}

impl GitHubSearch {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self::with_client(utils::build_client(config)?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &PlaybackConfig) -> Self {
        Self {
            client,
            endpoint: utils::endpoint(&config.endpoints.github_api, "search/issues"),
            repo: config.github_repo.clone(),
            token: config.github_token.clone(),
        }
    }

    fn query(&self, key: &str) -> String {
        let mut q = format!("{} {}", key, QUALIFIER);
        if let Some(ref repo) = self.repo {
            q.push_str(" repo:");
            q.push_str(repo);
        }
        q
    }

    async fn request(&self, key: &str) -> Result<String, PlaybackError> {
        let q = self.query(key);
        let mut req = self
            .client
            .get(&self.endpoint)
            .query(&[("per_page", "1"), ("sort", "created"), ("order", "desc"), ("q", q.as_str())])
            .header("Accept", "application/vnd.github.v3+json");
        if let Some(ref token) = self.token {
            req = req.header("Authorization", format!("token {}", token));
        }

        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            warn!(%status, "issue search returned non-success status");
            return Err(PlaybackError::Status(status));
        }

        Ok(resp.text().await?)
    }
}

/// Body of the newest issue, if the payload has one
fn parse_issue(data: &str) -> Option<String> {
    let json: Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            debug!(error = %e, "issue search payload is not JSON");
            return None;
        }
    };

    let Some(items) = json["items"].as_array() else {
        debug!("issue search payload has no items array");
        return None;
    };
    let Some(item) = items.first() else {
        debug!("issue search found no items");
        return None;
    };

    match item["body"].as_str() {
        Some(body) => Some(body.to_string()),
        None => {
            debug!("first issue has no body");
            None
        }
    }
}

#[async_trait]
impl LinkSearch for GitHubSearch {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn search(&self, address: &Address, scope: Scope) -> Result<String, PlaybackError> {
        let key = utils::strip_for_search(address.url());
        let data = self.request(&key).await.map_err(|e| {
            error!(url = %address, error = %e, "issue search request failed");
            e
        })?;

        parse_issue(&data)
            .and_then(|body| utils::match_link(scope, &body))
            .ok_or(PlaybackError::NotFound)
    }
}
