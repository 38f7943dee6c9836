//! The public-facing query client.
//!
//! Composes the normalizer, cache, scheduler lane, and retry policy into
//! the two operations the research pipeline consumes: a direct-answer
//! lookup and a ranked web search. Callers hand over plain text and get
//! structured results back; scheduling, caching, and retry are invisible
//! until they run out of road, at which point a single wrapped error
//! surfaces.

use crate::cache::{cache_key, ResponseCache};
use crate::error::{Result, SearchError};
use crate::normalize::normalize_query;
use crate::pacing::Cooldown;
use crate::parser::parse_search_results;
use crate::retry::RetryPolicy;
use crate::scheduler::RequestScheduler;
use prospect_core::{InstantAnswer, SearchConfig, SearchHit};
use reqwest::header::ACCEPT_LANGUAGE;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Browser-like user agent; the surface serves scrapers a degraded page
/// without one.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 \
     (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

/// JSON instant-answer endpoint.
const INSTANT_ANSWER_ENDPOINT: &str = "https://api.duckduckgo.com/";

/// HTML web-results endpoint.
const HTML_SEARCH_ENDPOINT: &str = "https://duckduckgo.com/html/";

/// Per-attempt transport timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Resilient client for the DuckDuckGo search surface.
///
/// Construct one per process and share it: the request lane, rate window,
/// cooldown, and cache it owns are deliberately process-wide, because the
/// rate limit belongs to the remote surface rather than to any caller.
pub struct SearchClient {
    http: reqwest::Client,
    cache: ResponseCache,
    scheduler: RequestScheduler,
    retry: RetryPolicy,
    instant_endpoint: Url,
    html_endpoint: Url,
}

impl SearchClient {
    /// Create a client with the given configuration. Must be called from
    /// within a Tokio runtime; the lane worker and cache writer are
    /// spawned here.
    ///
    /// # Errors
    /// Returns [`SearchError::Init`] if the HTTP transport cannot be built.
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| SearchError::Init { source })?;

        let cooldown = Arc::new(Cooldown::default());
        let scheduler = RequestScheduler::spawn(config, cooldown.clone());
        let retry = RetryPolicy::new(
            config.max_retries,
            config.retry_base,
            config.jitter_max,
            config.cooldown_period,
            cooldown,
        );
        let cache = ResponseCache::new(config.cache_path.clone(), config.cache_ttl);

        Ok(Self {
            http,
            cache,
            scheduler,
            retry,
            instant_endpoint: Url::parse(INSTANT_ANSWER_ENDPOINT).expect("static endpoint url"),
            html_endpoint: Url::parse(HTML_SEARCH_ENDPOINT).expect("static endpoint url"),
        })
    }

    /// Replace the remote endpoints. Intended for tests and proxies.
    #[must_use]
    pub fn with_endpoints(mut self, instant: Url, html: Url) -> Self {
        self.instant_endpoint = instant;
        self.html_endpoint = html;
        self
    }

    /// Direct structured-answer lookup for `query`.
    ///
    /// Not cached: direct answers are cheap and freshness-sensitive. A body
    /// that fails to decode is treated as an empty answer, not an error.
    pub async fn instant_answer(&self, query: &str) -> Result<InstantAnswer> {
        let normalized = normalize_query(query);
        let mut url = self.instant_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &normalized)
            .append_pair("format", "json")
            .append_pair("no_redirect", "1")
            .append_pair("no_html", "1");

        let body = self.fetch("instant answer", url, false).await?;
        match serde_json::from_str(&body) {
            Ok(answer) => Ok(answer),
            Err(err) => {
                tracing::warn!(%err, "instant answer body did not decode, treating as empty");
                Ok(InstantAnswer::default())
            }
        }
    }

    /// Ranked web search for `query`, capped at `limit` results.
    ///
    /// Served from the cache when a fresh entry exists for the normalized
    /// query and limit; otherwise fetched, parsed, cached, and returned.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let normalized = normalize_query(query);
        let key = cache_key("search", &normalized, limit);

        if let Some(value) = self.cache.lookup(&key).await {
            match serde_json::from_value::<Vec<SearchHit>>(value) {
                Ok(hits) => {
                    tracing::debug!(query = %normalized, limit, "search served from cache");
                    return Ok(hits);
                }
                Err(err) => {
                    tracing::warn!(%err, "undecodable cache entry, refetching");
                }
            }
        }

        let mut url = self.html_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", &normalized)
            .append_pair("ia", "web");

        let body = self.fetch("web search", url, true).await?;
        let hits = parse_search_results(&body, limit);

        if let Ok(value) = serde_json::to_value(&hits) {
            self.cache.store(&key, value).await;
        }
        Ok(hits)
    }

    /// Block until pending cache writes have reached disk. Call before
    /// process exit to avoid losing the tail of a run.
    pub async fn flush_cache(&self) {
        self.cache.flush().await;
    }

    /// One scheduled, retried GET returning the response body.
    async fn fetch(
        &self,
        operation: &'static str,
        url: Url,
        accept_language: bool,
    ) -> Result<String> {
        self.retry
            .run(operation, || {
                let http = self.http.clone();
                let url = url.clone();
                let request = async move {
                    let mut request = http.get(url);
                    if accept_language {
                        request = request.header(ACCEPT_LANGUAGE, "en-US,en;q=0.9");
                    }
                    let response = request
                        .send()
                        .await
                        .map_err(|source| SearchError::Transport { operation, source })?;

                    let status = response.status();
                    if !status.is_success() {
                        return Err(SearchError::Status {
                            operation,
                            status: status.as_u16(),
                        });
                    }
                    response
                        .text()
                        .await
                        .map_err(|source| SearchError::Transport { operation, source })
                };
                async move { self.scheduler.run(request).await? }
            })
            .await
    }
}
