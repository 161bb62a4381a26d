use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;

use super::cache::{cache_key, CacheRead, CacheTier, CacheTiers, RequestCache};
use super::error::ApiError;
use super::transport::{status_error, ApiRequest, Transport};

/// Per-call knobs for [`ApiClient::cached_read`].
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Override the tier's default TTL.
    pub ttl: Option<Duration>,
    /// Bypass both the cache and in-flight dedup; overwrite the entry on
    /// success.
    pub force_refresh: bool,
    /// Explicit cache key instead of the derived one.
    pub cache_key: Option<String>,
    /// When false the call is a plain passthrough request.
    pub enable_cache: bool,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self {
            enable_cache: true,
            ..Default::default()
        }
    }

    pub fn force_refresh() -> Self {
        Self {
            force_refresh: true,
            ..Self::new()
        }
    }

    pub fn uncached() -> Self {
        Self {
            enable_cache: false,
            ..Default::default()
        }
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// Client for the Aurelane backend.
///
/// Read endpoints go through [`Self::cached_read`]; mutations go through
/// [`Self::request`] and invalidate the cache prefixes they affect.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    cache: RequestCache,
    tiers: CacheTiers,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, tiers: CacheTiers) -> Self {
        Self {
            transport,
            cache: RequestCache::new(),
            tiers,
        }
    }

    /// Issue a GET with caching, in-flight deduplication and supersession.
    ///
    /// See the cache layer docs for the exact lookup/begin sequence. With
    /// `enable_cache` off this degrades to a plain request.
    pub async fn cached_read(
        &self,
        path: &str,
        query: Vec<(String, String)>,
        tier: CacheTier,
        options: ReadOptions,
    ) -> Result<Value, ApiError> {
        let request = ApiRequest::get(path).with_query(query);

        if !options.enable_cache {
            return execute_json(Arc::clone(&self.transport), request).await;
        }

        let key = options
            .cache_key
            .unwrap_or_else(|| cache_key("GET", &request.path, &request.query));

        let ttl = options.ttl.unwrap_or_else(|| self.tiers.ttl(tier));
        let fetch = execute_json(Arc::clone(&self.transport), request).boxed();

        if options.force_refresh {
            return self.cache.begin(&key, ttl, fetch).await;
        }
        match self.cache.read(&key, ttl, fetch) {
            CacheRead::Hit(hit) => {
                tracing::trace!("cache hit: {}", key);
                Ok(hit)
            }
            CacheRead::Fetch(fetch) => fetch.await,
        }
    }

    /// Uncached request, used for every mutation.
    pub async fn request(&self, request: ApiRequest) -> Result<Value, ApiError> {
        execute_json(Arc::clone(&self.transport), request).await
    }

    /// Uncached request returning the raw body (invoices).
    pub async fn request_bytes(&self, request: ApiRequest) -> Result<Vec<u8>, ApiError> {
        let response = self.transport.execute(request).await?;
        if !response.is_success() {
            let body = response.json().unwrap_or(Value::Null);
            return Err(status_error(response.status, &body));
        }
        Ok(response.body)
    }

    /// Drop every cache entry under the given key prefixes.
    pub fn invalidate(&self, prefixes: &[&str]) {
        self.cache.invalidate(prefixes);
    }

    /// [`Self::invalidate`] for prefix lists built at runtime.
    pub(crate) fn invalidate_owned(&self, prefixes: &[String]) {
        let borrowed: Vec<&str> = prefixes.iter().map(String::as_str).collect();
        self.invalidate(&borrowed);
    }

    #[cfg(test)]
    pub(crate) fn cache(&self) -> &RequestCache {
        &self.cache
    }
}

async fn execute_json(
    transport: Arc<dyn Transport>,
    request: ApiRequest,
) -> Result<Value, ApiError> {
    let response = transport.execute(request).await?;
    if response.is_success() {
        response.json()
    } else {
        // Error bodies may not be JSON at all; the status still decides.
        let body = response.json().unwrap_or(Value::Null);
        Err(status_error(response.status, &body))
    }
}
