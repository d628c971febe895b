//! iTunes Search API client.
//!
//! Every call goes through [`retry_with_backoff`]. A search whose original
//! term exhausts its retries falls back to a list of generic terms, one
//! attempt each.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::retry::{RetryPolicy, Retryable, retry_with_backoff};
use crate::models::podcast::{Podcast, parse_envelope};

const SEARCH_MEDIA: &str = "podcast";
const SEARCH_LIMIT: u32 = 50;

/// Generic terms used when the user's term cannot be served.
pub const DEFAULT_FALLBACK_TERMS: [&str; 10] = [
    "podcast",
    "technology podcast",
    "business podcast",
    "news podcast",
    "entertainment podcast",
    "education podcast",
    "science podcast",
    "health podcast",
    "sports podcast",
    "music podcast",
];

/// Immutable settings for [`ItunesClient`].
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub search_url: String,
    pub lookup_url: String,
    pub timeout: Duration,
    pub country: String,
    pub lang: String,
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub fallback_terms: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url: "https://itunes.apple.com/search".to_string(),
            lookup_url: "https://itunes.apple.com/lookup".to_string(),
            timeout: Duration::from_secs(10),
            country: "US".to_string(),
            lang: "en_us".to_string(),
            user_agent: "Podseek/1.0".to_string(),
            retry: RetryPolicy::default(),
            fallback_terms: DEFAULT_FALLBACK_TERMS
                .iter()
                .map(|t| (*t).to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    Connect,
    /// The request could not even be built (bad URL and the like).
    Build,
    Other,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("iTunes API transport error: {message}")]
    Transport {
        kind: TransportKind,
        message: String,
    },

    #[error("iTunes API error: {status} {reason}")]
    Status { status: u16, reason: String },

    #[error("iTunes API response failed validation: {0}")]
    InvalidResponse(String),

    #[error("iTunes API reported no results for '{term}'")]
    NoResults { term: String },
}

impl CatalogError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn outcome_label(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport_error",
            Self::Status { .. } => "status_error",
            Self::InvalidResponse(_) => "invalid_response",
            Self::NoResults { .. } => "no_results",
        }
    }
}

impl Retryable for CatalogError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { kind, .. } => *kind != TransportKind::Build,
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS.as_u16() || (500..600).contains(status)
            }
            Self::InvalidResponse(_) | Self::NoResults { .. } => false,
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            TransportKind::Timeout
        } else if err.is_connect() {
            TransportKind::Connect
        } else if err.is_builder() {
            TransportKind::Build
        } else {
            TransportKind::Other
        };

        Self::Transport {
            kind,
            message: err.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct ItunesClient {
    client: Client,
    config: Arc<CatalogConfig>,
}

impl ItunesClient {
    pub fn new(config: CatalogConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build iTunes HTTP client: {e}"))?;

        Ok(Self::with_shared_client(client, config))
    }

    /// Reuses an existing client; its timeout and user agent win over `config`.
    #[must_use]
    pub fn with_shared_client(client: Client, config: CatalogConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Searches podcasts for `term`, retrying transient failures.
    ///
    /// Zero matches yield `Ok(vec![])`. When every attempt fails with a
    /// retryable error the fallback terms are tried before giving up with the
    /// last error of the original term.
    #[instrument(skip(self), fields(term = %term))]
    pub async fn search(&self, term: &str) -> Result<Vec<Podcast>, CatalogError> {
        let result = retry_with_backoff(&self.config.retry, "itunes.search", |attempt| {
            debug!(attempt, "Querying iTunes search");
            self.search_once(term)
        })
        .await;

        match result {
            Ok(podcasts) => Ok(podcasts),
            Err(CatalogError::NoResults { .. }) => {
                info!("No podcasts found");
                Ok(Vec::new())
            }
            Err(e) if e.is_retryable() => self.search_fallback(e).await,
            Err(e) => Err(e),
        }
    }

    async fn search_fallback(&self, last_error: CatalogError) -> Result<Vec<Podcast>, CatalogError> {
        warn!(error = %last_error, "Search failed, trying fallback terms");

        for term in &self.config.fallback_terms {
            match self.search_once(term).await {
                Ok(podcasts) if !podcasts.is_empty() => {
                    info!(
                        fallback_term = %term,
                        count = podcasts.len(),
                        "Fallback term returned results"
                    );
                    metrics::counter!("catalog_fallback_total", "outcome" => "hit").increment(1);
                    return Ok(podcasts);
                }
                Ok(_) => debug!(fallback_term = %term, "Fallback term returned nothing"),
                Err(e) => debug!(fallback_term = %term, error = %e, "Fallback term failed"),
            }
        }

        metrics::counter!("catalog_fallback_total", "outcome" => "exhausted").increment(1);
        Err(last_error)
    }

    /// One search request, no retry.
    pub async fn search_once(&self, term: &str) -> Result<Vec<Podcast>, CatalogError> {
        let limit = SEARCH_LIMIT.to_string();
        let params = [
            ("media", SEARCH_MEDIA),
            ("term", term),
            ("limit", limit.as_str()),
            ("country", self.config.country.as_str()),
            ("lang", self.config.lang.as_str()),
        ];

        self.fetch(&self.config.search_url, &params, term).await
    }

    /// Looks a podcast up by collection id. `Ok(None)` when the catalog has no match.
    #[instrument(skip(self))]
    pub async fn lookup(&self, collection_id: i64) -> Result<Option<Podcast>, CatalogError> {
        let id = collection_id.to_string();
        let params = [
            ("id", id.as_str()),
            ("entity", SEARCH_MEDIA),
            ("country", self.config.country.as_str()),
        ];

        let result = retry_with_backoff(&self.config.retry, "itunes.lookup", |_| {
            self.fetch(&self.config.lookup_url, &params, &id)
        })
        .await;

        match result {
            Ok(podcasts) => Ok(podcasts
                .into_iter()
                .find(|p| p.collection_id == collection_id)),
            Err(CatalogError::NoResults { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch(
        &self,
        url: &str,
        params: &[(&str, &str)],
        term: &str,
    ) -> Result<Vec<Podcast>, CatalogError> {
        let result = self.fetch_inner(url, params, term).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome_label(),
        };
        metrics::counter!("catalog_requests_total", "outcome" => outcome).increment(1);

        result
    }

    async fn fetch_inner(
        &self,
        url: &str,
        params: &[(&str, &str)],
        term: &str,
    ) -> Result<Vec<Podcast>, CatalogError> {
        let response = self.client.get(url).query(params).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                status = status.as_u16(),
                reason = status.canonical_reason().unwrap_or(""),
                "iTunes API error"
            );
            return Err(CatalogError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let body: serde_json::Value = serde_json::from_slice(&bytes)
            .map_err(|e| CatalogError::InvalidResponse(format!("body is not JSON: {e}")))?;

        let envelope =
            parse_envelope(&body).map_err(|e| CatalogError::InvalidResponse(e.to_string()))?;

        let podcasts = envelope.normalize();
        if envelope.result_count == 0 || podcasts.is_empty() {
            return Err(CatalogError::NoResults {
                term: term.to_string(),
            });
        }

        let dropped = envelope.results.len() - podcasts.len();
        if dropped > 0 {
            debug!(dropped, "Dropped catalog items without identity fields");
        }

        Ok(podcasts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_config(server: &MockServer) -> CatalogConfig {
        CatalogConfig {
            search_url: server.url("/search"),
            lookup_url: server.url("/lookup"),
            timeout: Duration::from_secs(2),
            retry: RetryPolicy {
                max_attempts: 5,
                initial_delay: Duration::from_millis(1),
                multiplier: 2.0,
            },
            ..CatalogConfig::default()
        }
    }

    fn podcast_json(id: i64, name: &str) -> serde_json::Value {
        json!({
            "collectionId": id,
            "trackId": id,
            "artistName": "Artist",
            "collectionName": name,
            "trackName": name,
            "feedUrl": format!("https://feeds.example.com/{id}.xml"),
            "genreIds": ["1310", "26"],
            "genres": ["Music", "Podcasts"]
        })
    }

    fn results_body(items: Vec<serde_json::Value>) -> serde_json::Value {
        json!({ "resultCount": items.len(), "results": items })
    }

    #[tokio::test]
    async fn search_sends_fixed_parameters() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/search")
                .query_param("media", "podcast")
                .query_param("term", "rust")
                .query_param("limit", "50")
                .query_param("country", "US")
                .query_param("lang", "en_us");
            then.status(200)
                .json_body(results_body(vec![podcast_json(1, "One"), podcast_json(2, "Two")]));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let podcasts = client.search("rust").await.unwrap();

        assert_eq!(podcasts.len(), 2);
        assert_eq!(podcasts[1].collection_name, "Two");
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn zero_results_is_empty_success_without_fallback() {
        let server = MockServer::start_async().await;
        let original = server.mock(|when, then| {
            when.path("/search").query_param("term", "asdkjlasjdkl");
            then.status(200).json_body(json!({"resultCount": 0, "results": []}));
        });
        let fallback = server.mock(|when, then| {
            when.path("/search").query_param("term", "podcast");
            then.status(200).json_body(results_body(vec![podcast_json(9, "Nine")]));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let podcasts = client.search("asdkjlasjdkl").await.unwrap();

        assert!(podcasts.is_empty());
        original.assert_hits(1);
        fallback.assert_hits(0);
    }

    #[tokio::test]
    async fn server_errors_are_retried_up_to_budget() {
        for status in [500, 502, 503, 429] {
            let server = MockServer::start_async().await;
            let failing = server.mock(|when, then| {
                when.path("/search").query_param("term", "flaky");
                then.status(status);
            });

            let client = ItunesClient::new(test_config(&server)).unwrap();
            let err = client.search("flaky").await.unwrap_err();

            assert_eq!(err.status(), Some(status));
            failing.assert_hits(5);
        }
    }

    #[tokio::test]
    async fn client_errors_fail_fast_without_fallback() {
        for status in [400, 404] {
            let server = MockServer::start_async().await;
            let failing = server.mock(|when, then| {
                when.path("/search").query_param("term", "bad");
                then.status(status);
            });
            let fallback = server.mock(|when, then| {
                when.path("/search").query_param("term", "podcast");
                then.status(200).json_body(results_body(vec![podcast_json(9, "Nine")]));
            });

            let client = ItunesClient::new(test_config(&server)).unwrap();
            let err = client.search("bad").await.unwrap_err();

            assert!(matches!(err, CatalogError::Status { status: s, .. } if s == status));
            failing.assert_hits(1);
            fallback.assert_hits(0);
        }
    }

    #[tokio::test]
    async fn invalid_payload_fails_fast_without_fallback() {
        let server = MockServer::start_async().await;
        let broken = server.mock(|when, then| {
            when.path("/search").query_param("term", "broken");
            then.status(200).json_body(json!({"resultCount": 3}));
        });
        let fallback = server.mock(|when, then| {
            when.path("/search").query_param("term", "podcast");
            then.status(200).json_body(results_body(vec![podcast_json(9, "Nine")]));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let err = client.search("broken").await.unwrap_err();

        assert!(matches!(err, CatalogError::InvalidResponse(_)));
        broken.assert_hits(1);
        fallback.assert_hits(0);
    }

    #[tokio::test]
    async fn non_json_body_is_invalid_response() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/search");
            then.status(200).body("<html>maintenance</html>");
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let err = client.search("anything").await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn exhausted_retries_walk_fallback_terms_in_order() {
        let server = MockServer::start_async().await;
        let original = server.mock(|when, then| {
            when.path("/search").query_param("term", "down");
            then.status(503);
        });
        let first = server.mock(|when, then| {
            when.path("/search").query_param("term", "podcast");
            then.status(200).json_body(json!({"resultCount": 0, "results": []}));
        });
        let second = server.mock(|when, then| {
            when.path("/search").query_param("term", "technology podcast");
            then.status(500);
        });
        let third = server.mock(|when, then| {
            when.path("/search").query_param("term", "business podcast");
            then.status(200).json_body(results_body(vec![podcast_json(3, "Business")]));
        });
        let fourth = server.mock(|when, then| {
            when.path("/search").query_param("term", "news podcast");
            then.status(200).json_body(results_body(vec![podcast_json(4, "News")]));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let podcasts = client.search("down").await.unwrap();

        assert_eq!(podcasts.len(), 1);
        assert_eq!(podcasts[0].collection_name, "Business");
        original.assert_hits(5);
        first.assert_hits(1);
        second.assert_hits(1);
        third.assert_hits(1);
        fourth.assert_hits(0);
    }

    #[tokio::test]
    async fn exhausted_fallback_returns_original_error() {
        let server = MockServer::start_async().await;
        let original = server.mock(|when, then| {
            when.path("/search").query_param("term", "down");
            then.status(503);
        });
        // Fallback terms hit nothing and get the mock server's 404.

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let err = client.search("down").await.unwrap_err();

        assert_eq!(err.status(), Some(503));
        original.assert_hits(5);
    }

    #[tokio::test]
    async fn timeouts_are_retried() {
        let server = MockServer::start_async().await;
        let slow = server.mock(|when, then| {
            when.path("/search").query_param("term", "slow");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(results_body(vec![podcast_json(1, "Late")]));
        });

        let mut config = test_config(&server);
        config.timeout = Duration::from_millis(100);
        config.retry.max_attempts = 2;
        config.fallback_terms = Vec::new();

        let client = ItunesClient::new(config).unwrap();
        let err = client.search("slow").await.unwrap_err();

        assert!(matches!(
            err,
            CatalogError::Transport {
                kind: TransportKind::Timeout,
                ..
            }
        ));
        slow.assert_hits(2);
    }

    #[tokio::test]
    async fn connection_refused_is_retryable() {
        let config = CatalogConfig {
            search_url: "http://127.0.0.1:9/search".to_string(),
            retry: RetryPolicy {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
                multiplier: 2.0,
            },
            fallback_terms: Vec::new(),
            ..CatalogConfig::default()
        };

        let client = ItunesClient::new(config).unwrap();
        let err = client.search("offline").await.unwrap_err();

        assert!(matches!(err, CatalogError::Transport { .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn lookup_finds_matching_collection() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.path("/lookup")
                .query_param("id", "77")
                .query_param("entity", "podcast");
            then.status(200).json_body(results_body(vec![podcast_json(77, "Found")]));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        let podcast = client.lookup(77).await.unwrap().unwrap();

        assert_eq!(podcast.collection_id, 77);
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn lookup_without_match_is_none() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/lookup");
            then.status(200).json_body(json!({"resultCount": 0, "results": []}));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        assert!(client.lookup(5).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_mismatched_id_is_none() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.path("/lookup").query_param("id", "77");
            then.status(200).json_body(json!({
                "resultCount": 1,
                "results": [{ "collectionId": 5, "artistName": "Host", "collectionName": "Other" }]
            }));
        });

        let client = ItunesClient::new(test_config(&server)).unwrap();
        assert!(client.lookup(77).await.unwrap().is_none());
    }

    #[test]
    fn retry_classification() {
        let status = |status: u16| CatalogError::Status {
            status,
            reason: String::new(),
        };
        assert!(status(500).is_retryable());
        assert!(status(503).is_retryable());
        assert!(status(429).is_retryable());
        assert!(!status(400).is_retryable());
        assert!(!status(404).is_retryable());
        assert!(!CatalogError::InvalidResponse("x".into()).is_retryable());
        assert!(
            !CatalogError::NoResults {
                term: "x".into()
            }
            .is_retryable()
        );
        assert!(
            CatalogError::Transport {
                kind: TransportKind::Timeout,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !CatalogError::Transport {
                kind: TransportKind::Build,
                message: String::new()
            }
            .is_retryable()
        );
    }
}
