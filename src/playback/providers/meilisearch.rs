use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::playback::config::PlaybackConfig;
use crate::playback::errors::PlaybackError;
use crate::playback::models::{Address, Scope};
use crate::playback::traits::LinkSearch;
use crate::playback::utils;

// https://docs.meilisearch.com/reference/api/search.html
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams<'a> {
    q: String,
    limit: u32,
    sort: [&'a str; 1],
    matches: bool,
    attributes_to_retrieve: [&'a str; 2],
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    ip: Option<String>,
    ph: Option<String>,
}

impl Hit {
    fn field(&self, scope: Scope) -> &str {
        let value = match scope {
            Scope::ContentGateway => &self.ip,
            Scope::PublishingMirror => &self.ph,
        };
        value.as_deref().unwrap_or_default()
    }
}

/// Looks links up in a Meilisearch index of archived captures
pub struct MeiliSearch {
    client: reqwest::Client,
    /// `None` when no endpoint is configured
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl MeiliSearch {
    pub fn new(config: &PlaybackConfig) -> Result<Self, PlaybackError> {
        Ok(Self::with_client(utils::build_client(config)?, config))
    }

    pub fn with_client(client: reqwest::Client, config: &PlaybackConfig) -> Self {
        let endpoint = config.meili_endpoint.as_deref().map(|base| {
            utils::endpoint(base, &format!("indexes/{}/search", config.meili_index))
        });
        Self {
            client,
            endpoint,
            api_key: config.meili_api_key.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn request(&self, key: &str) -> Result<SearchResponse, PlaybackError> {
        let endpoint = self
            .endpoint
            .as_deref()
            .ok_or(PlaybackError::Disabled("meilisearch"))?;

        let params = SearchParams {
            q: format!("\"{}\"", key),
            limit: 1,
            sort: ["id:desc"],
            matches: true,
            attributes_to_retrieve: [Scope::ContentGateway.field(), Scope::PublishingMirror.field()],
        };

        let mut req = self.client.post(endpoint).json(&params);
        if let Some(ref api_key) = self.api_key {
            req = req.bearer_auth(api_key);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(PlaybackError::Status(resp.status()));
        }

        let body = resp.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl LinkSearch for MeiliSearch {
    fn name(&self) -> &'static str {
        "meilisearch"
    }

    async fn search(&self, address: &Address, scope: Scope) -> Result<String, PlaybackError> {
        let key = utils::strip_scheme(address.url());
        let data = self.request(&key).await.map_err(|e| {
            error!(url = %address, error = %e, "index search failed");
            e
        })?;

        let dst = data
            .hits
            .first()
            .map(|hit| hit.field(scope))
            .unwrap_or_default();
        if dst.is_empty() {
            return Err(PlaybackError::NotFound);
        }

        Ok(dst.to_string())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub(crate) const MEILI_RESP: &str = r#"{
    "hits": [
        {
            "ip": "https://ipfs.io/ipfs/bafybeibndw52abcyf5i672uw123fh2l6ifhwjacjs56fhjk4udeflejrqi",
            "ph": "https://telegra.ph/Example-01-01",
            "_matchesInfo": {
                "ip": [{"start": 0, "length": 5}],
                "ph": [{"start": 0, "length": 5}]
            }
        }
    ],
    "nbHits": 2,
    "exhaustiveNbHits": false,
    "query": "\"example.com\"",
    "limit": 1,
    "offset": 0,
    "processingTimeMs": 14
}"#;

    fn config(server: &MockServer) -> PlaybackConfig {
        PlaybackConfig::default().with_meili(Some(server.uri()), None)
    }

    fn address() -> Address {
        Address::parse("https://example.com").unwrap()
    }

    #[tokio::test]
    async fn test_search_request_shape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/capsules/search"))
            .and(header("authorization", "Bearer secret"))
            .and(body_json(json!({
                "q": "\"example.com\"",
                "limit": 1,
                "sort": ["id:desc"],
                "matches": true,
                "attributesToRetrieve": ["ip", "ph"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEILI_RESP))
            .expect(1)
            .mount(&server)
            .await;

        let cfg = PlaybackConfig::default().with_meili(Some(server.uri()), Some("secret".into()));
        let meili = MeiliSearch::new(&cfg).unwrap();
        let got = meili.search(&address(), Scope::PublishingMirror).await.unwrap();
        assert_eq!(got, "https://telegra.ph/Example-01-01");
    }

    #[tokio::test]
    async fn test_scope_selects_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEILI_RESP))
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server)).unwrap();
        let got = meili.search(&address(), Scope::ContentGateway).await.unwrap();
        assert!(got.starts_with("https://ipfs.io/ipfs/"), "got {}", got);
    }

    #[tokio::test]
    async fn test_custom_index_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/indexes/links/search"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MEILI_RESP))
            .expect(1)
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server).with_meili_index("links")).unwrap();
        assert!(meili.search(&address(), Scope::ContentGateway).await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_hits_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"hits":[]}"#))
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server)).unwrap();
        let err = meili.search(&address(), Scope::ContentGateway).await.unwrap_err();
        assert_eq!(err, PlaybackError::NotFound);
    }

    #[tokio::test]
    async fn test_empty_field_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"hits":[{"ip":"https://ipfs.io/ipfs/x"}]}"#),
            )
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server)).unwrap();
        let err = meili.search(&address(), Scope::PublishingMirror).await.unwrap_err();
        assert_eq!(err, PlaybackError::NotFound);
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server)).unwrap();
        let err = meili.search(&address(), Scope::ContentGateway).await.unwrap_err();
        assert_eq!(err, PlaybackError::Status(StatusCode::UNAUTHORIZED));
        assert_eq!(err.to_string(), "401 Unauthorized");
    }

    #[tokio::test]
    async fn test_malformed_json_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let meili = MeiliSearch::new(&config(&server)).unwrap();
        let err = meili.search(&address(), Scope::ContentGateway).await.unwrap_err();
        assert!(matches!(err, PlaybackError::Parse(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_disabled_without_endpoint() {
        let meili = MeiliSearch::new(&PlaybackConfig::default()).unwrap();
        assert!(!meili.is_enabled());
        let err = meili.search(&address(), Scope::ContentGateway).await.unwrap_err();
        assert_eq!(err, PlaybackError::Disabled("meilisearch"));
    }
}
