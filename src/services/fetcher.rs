//! Cache-aside HTTP fetcher
//!
//! Raw upstream bodies are cached, never decoded values: every call re-runs
//! the request's decoder. A body is only stored after it decodes cleanly, so
//! a malformed response never poisons the cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::services::cache::ExpiringCache;
use crate::types::{CoinbaniError, Result};

/// Browser-like agent; some upstreams reject unknown clients
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_IDLE_PER_HOST: usize = 10;

/// Status and body of an upstream response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport used by the fetcher
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

/// reqwest-backed transport with bounded timeouts and pool size
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .build()
            .map_err(|e| CoinbaniError::Config(format!("building HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<HttpResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CoinbaniError::upstream(url, e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| CoinbaniError::upstream(url, format!("reading body: {}", e)))?;

        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// Decoder turning a raw body into a provider payload
pub type Decoder<T> = fn(&[u8]) -> Result<T>;

/// One cache-aside lookup, built per call by a provider
pub struct FetchRequest<'a, T> {
    pub url: &'a str,
    pub cache_key: &'a str,
    pub ttl: Duration,
    pub decode: Decoder<T>,
}

/// Cache-aside GET over an [`HttpClient`]
pub struct CachingFetcher {
    http: Arc<dyn HttpClient>,
    cache: Arc<ExpiringCache<Arc<[u8]>>>,
}

impl CachingFetcher {
    pub fn new(http: Arc<dyn HttpClient>, cache: Arc<ExpiringCache<Arc<[u8]>>>) -> Self {
        Self { http, cache }
    }

    /// Decode the cached body for `cache_key`, or fetch, validate and cache it.
    ///
    /// Algorithm:
    /// 1. Cache hit: decode and return without touching the network
    /// 2. Miss: GET the url; transport errors and non-200 become `Upstream`
    /// 3. Decode the body; failures become `Decode` and nothing is stored
    /// 4. Store the raw body with the request TTL
    pub async fn get<T>(&self, request: &FetchRequest<'_, T>) -> Result<T> {
        if let Some(body) = self.cache.get(request.cache_key) {
            debug!(cache_key = request.cache_key, "cache hit");
            return (request.decode)(&body[..]);
        }

        debug!(cache_key = request.cache_key, url = request.url, "cache miss, fetching upstream");
        let response = self.http.get(request.url).await.inspect_err(|e| {
            warn!(url = request.url, error = %e, "upstream request failed");
        })?;

        if response.status != 200 {
            warn!(url = request.url, status = response.status, "unexpected upstream status");
            return Err(CoinbaniError::upstream(
                request.url,
                format!("unexpected status {}", response.status),
            ));
        }

        let decoded = (request.decode)(&response.body[..])?;
        self.cache
            .set(request.cache_key, Arc::from(response.body), request.ttl);

        Ok(decoded)
    }

    /// Drop the cached body for `cache_key`
    pub fn invalidate(&self, cache_key: &str) {
        self.cache.delete(cache_key);
    }
}
