//! NewsAPI `top-headlines` client.
//!
//! One call to [`HeadlineSource::fetch`] is one HTTP GET.  The body is
//! decoded by [`NewsApiClient::parse_response`], a pure function so the
//! decoding rules can be tested without a server.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use super::article::{ErrorEnvelope, HeadlinesResponse};
use super::{Article, HeadlineSource};
use crate::config::{ApiKey, Config};
use crate::error::{FetchError, FetchOutcome};

const HEADLINES_PATH: &str = "v2/top-headlines";

/// Client for the NewsAPI top-headlines endpoint.
pub struct NewsApiClient {
    http: reqwest::Client,
    /// Scheme and host, e.g. `https://newsapi.org`, optionally with a path
    /// prefix such as `http://proxy/newsapi`.
    base_url: String,
    /// ISO 3166-1 alpha-2 code, e.g. `us`.
    country: String,
    api_key: ApiKey,
}

impl NewsApiClient {
    /// Build a client from resolved configuration.
    ///
    /// No client-wide timeouts are set: the per-call timeout passed to
    /// `fetch` bounds the whole request, connect through body.
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("headlines-tui/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            country: config.country.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// The full request URL, including the key.  Never log the result.
    pub fn endpoint(&self) -> Result<Url, FetchError> {
        let mut base = Url::parse(&self.base_url)?;
        // Without a trailing slash `join` would replace the last segment.
        if !base.cannot_be_a_base() && !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let mut url = base.join(HEADLINES_PATH)?;
        url.query_pairs_mut()
            .append_pair("country", &self.country)
            .append_pair("apiKey", self.api_key.expose());
        Ok(url)
    }

    /// Decode a response body into articles, preserving server order.
    ///
    /// A NewsAPI error envelope becomes [`FetchError::Upstream`]; anything
    /// else that isn't a headlines payload is [`FetchError::Decode`].
    /// `status: "ok"` with an empty `articles` array is a success.
    pub fn parse_response(body: &[u8]) -> FetchOutcome {
        match serde_json::from_slice::<HeadlinesResponse>(body) {
            Ok(response) => {
                debug!(
                    status = %response.status,
                    total_results = response.total_results,
                    returned = response.articles.len(),
                    "decoded headlines response"
                );
                Ok(response.articles.into_iter().map(Article::from).collect())
            }
            Err(decode_err) => match serde_json::from_slice::<ErrorEnvelope>(body) {
                Ok(envelope) if envelope.status == "error" => Err(FetchError::Upstream {
                    code: envelope.code.unwrap_or_else(|| "unknown".into()),
                    message: envelope.message.unwrap_or_default(),
                }),
                _ => Err(FetchError::Decode(decode_err)),
            },
        }
    }
}

#[async_trait]
impl HeadlineSource for NewsApiClient {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, timeout: Duration) -> FetchOutcome {
        let url = self.endpoint()?;
        debug!(host = url.host_str().unwrap_or_default(), ?timeout, "requesting top headlines");

        // Strip the URL from transport errors: it carries the API key and the
        // message ends up in the popup and the log.
        let response = self
            .http
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if body.is_empty() {
            warn!(%status, "headlines response had no body");
            return Err(FetchError::EmptyBody);
        }

        Self::parse_response(&body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
