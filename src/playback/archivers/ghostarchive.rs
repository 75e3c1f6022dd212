use async_trait::async_trait;
use regex::Regex;
use tracing::error;

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::Address;
use crate::playback::traits::Playback;
use crate::playback::utils;

lazy_static::lazy_static! {
    static ref ARCHIVE_LINK_RE: Regex = Regex::new(r#"href="(/archive/[A-Za-z0-9]+)""#).unwrap();
}

/// Ghostarchive, via its search page
pub struct Ghostarchive {
    client: reqwest::Client,
    base: String,
}

impl Ghostarchive {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self {
            client: utils::build_client(config)?,
            base: config.endpoints.ghostarchive.trim_end_matches('/').to_string(),
        })
    }

    /// First capture linked from a search results page
    fn first_capture(&self, html: &str) -> Option<String> {
        ARCHIVE_LINK_RE
            .captures(html)
            .and_then(|c| c.get(1))
            .map(|m| format!("{}{}", self.base, m.as_str()))
    }
}

#[async_trait]
impl Playback for Ghostarchive {
    fn name(&self) -> &'static str {
        "ghostarchive"
    }

    async fn playback(&self, address: &Address) -> Result<String, PlaybackError> {
        let resp = self
            .client
            .get(format!("{}/search", self.base))
            .query(&[("term", address.url().as_str())])
            .send()
            .await
            .map_err(|e| {
                error!(url = %address, error = %e, "ghostarchive request failed");
                PlaybackError::from(e)
            })?;

        if !resp.status().is_success() {
            return Err(PlaybackError::Status(resp.status()));
        }

        let html = resp.text().await?;
        self.first_capture(&html).ok_or(PlaybackError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::playback::config::Endpoints;

    const RESULTS: &str = r#"<html><body><table>
<tr><td><a href="/archive/k3Zp9">example.com</a></td><td>01 Jan 2023</td></tr>
<tr><td><a href="/archive/Aa111">example.com</a></td><td>01 Jan 2022</td></tr>
</table></body></html>"#;

    fn archiver(server: &MockServer) -> Ghostarchive {
        let cfg = PlaybackConfig::default().with_endpoints(Endpoints::all(&server.uri()));
        Ghostarchive::new(&cfg).unwrap()
    }

    #[tokio::test]
    async fn test_first_search_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("term", "https://example.com/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS))
            .mount(&server)
            .await;

        let addr = Address::parse("https://example.com").unwrap();
        let got = archiver(&server).playback(&addr).await.unwrap();
        assert_eq!(got, format!("{}/archive/k3Zp9", server.uri()));
    }

    #[tokio::test]
    async fn test_no_results_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>No archives</html>"))
            .mount(&server)
            .await;

        let addr = Address::parse("https://example.com").unwrap();
        let err = archiver(&server).playback(&addr).await.unwrap_err();
        assert_eq!(err, PlaybackError::NotFound);
    }
}
