use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::{AbortHandle, Abortable, BoxFuture, Shared};
use futures::FutureExt;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;

/// A fetch shared between every caller waiting on the same cache key.
pub(crate) type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Default freshness windows, ordered by resource volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    /// Paginated / filterable collections. Shortest TTL.
    List,
    /// Single-entity lookups.
    Detail,
    /// Near-static taxonomy data (categories, zodiac mappings). Longest TTL.
    Taxonomy,
}

#[derive(Debug, Clone, Copy)]
pub struct CacheTiers {
    pub list: Duration,
    pub detail: Duration,
    pub taxonomy: Duration,
}

impl CacheTiers {
    pub fn ttl(&self, tier: CacheTier) -> Duration {
        match tier {
            CacheTier::List => self.list,
            CacheTier::Detail => self.detail,
            CacheTier::Taxonomy => self.taxonomy,
        }
    }
}

impl Default for CacheTiers {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(120),
            detail: Duration::from_secs(600),
            taxonomy: Duration::from_secs(1800),
        }
    }
}

struct CacheEntry {
    payload: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

struct InFlight {
    /// Tags this particular fetch so a superseded fetch cannot evict its
    /// replacement during its own cleanup.
    id: Uuid,
    fetch: SharedFetch,
    abort: AbortHandle,
}

struct Inner {
    entries: Mutex<HashMap<String, CacheEntry>>,
    in_flight: Mutex<HashMap<String, InFlight>>,
}

/// Outcome of the combined read path.
pub(crate) enum CacheRead {
    /// Fresh cached payload.
    Hit(Value),
    /// A fetch to await: either a joined in-flight request or the one just
    /// registered for this caller.
    Fetch(SharedFetch),
}

/// TTL cache with in-flight request deduplication and supersession.
///
/// Explicitly instantiated (one per `ApiClient`) so tests can construct
/// isolated instances. Lock scopes are kept synchronous; no lock is held
/// across an await point.
#[derive(Clone)]
pub struct RequestCache {
    inner: Arc<Inner>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Return the cached payload for `key` if it is still fresh.
    ///
    /// Stale entries are purged here, lazily; there is no background sweep.
    pub fn lookup(&self, key: &str) -> Option<Value> {
        let mut entries = self.inner.entries.lock().unwrap();
        match entries.get(key) {
            Some(entry) if entry.is_fresh() => Some(entry.payload.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// The pending fetch for `key`, if one is outstanding.
    pub(crate) fn pending(&self, key: &str) -> Option<SharedFetch> {
        let in_flight = self.inner.in_flight.lock().unwrap();
        in_flight.get(key).map(|f| f.fetch.clone())
    }

    /// Combined read path: cached value, else join the in-flight fetch, else
    /// register `fetch` as the new in-flight request.
    ///
    /// The in-flight check and registration happen under one lock, so two
    /// simultaneous first readers on a multi-threaded runtime cannot both
    /// start a request for the same key. An unused `fetch` is dropped
    /// unpolled and never touches the network.
    pub(crate) fn read(
        &self,
        key: &str,
        ttl: Duration,
        fetch: BoxFuture<'static, Result<Value, ApiError>>,
    ) -> CacheRead {
        if let Some(hit) = self.lookup(key) {
            return CacheRead::Hit(hit);
        }

        let mut in_flight = self.inner.in_flight.lock().unwrap();
        if let Some(existing) = in_flight.get(key) {
            tracing::trace!("joining in-flight request: {}", key);
            return CacheRead::Fetch(existing.fetch.clone());
        }
        let (entry, shared) = self.prepare(key, ttl, fetch);
        in_flight.insert(key.to_string(), entry);
        CacheRead::Fetch(shared)
    }

    /// Register a new fetch for `key`, superseding any fetch already in
    /// flight under the same key.
    ///
    /// The superseded fetch is aborted first, so every caller sharing it
    /// observes [`ApiError::Cancelled`] rather than a fabricated success.
    pub(crate) fn begin(
        &self,
        key: &str,
        ttl: Duration,
        fetch: BoxFuture<'static, Result<Value, ApiError>>,
    ) -> SharedFetch {
        let (entry, shared) = self.prepare(key, ttl, fetch);

        let mut in_flight = self.inner.in_flight.lock().unwrap();
        if let Some(previous) = in_flight.remove(key) {
            tracing::debug!("superseding in-flight request for key {}", key);
            previous.abort.abort();
        }
        in_flight.insert(key.to_string(), entry);

        shared
    }

    /// Build the shared, abortable fetch and its registration entry. On
    /// success the result is cached with `ttl`; failures (including
    /// cancellation) are never cached. The in-flight registration is removed
    /// when the fetch settles either way, guarded by the id so a superseded
    /// fetch cannot evict its replacement.
    fn prepare(
        &self,
        key: &str,
        ttl: Duration,
        fetch: BoxFuture<'static, Result<Value, ApiError>>,
    ) -> (InFlight, SharedFetch) {
        let id = Uuid::new_v4();
        let (abort, registration) = AbortHandle::new_pair();
        let inner = Arc::clone(&self.inner);
        let owned_key = key.to_string();

        let shared = async move {
            let result = match Abortable::new(fetch, registration).await {
                Ok(result) => result,
                Err(futures::future::Aborted) => Err(ApiError::Cancelled),
            };

            if let Ok(ref payload) = result {
                let mut entries = inner.entries.lock().unwrap();
                entries.insert(
                    owned_key.clone(),
                    CacheEntry {
                        payload: payload.clone(),
                        stored_at: Instant::now(),
                        ttl,
                    },
                );
            }

            let mut in_flight = inner.in_flight.lock().unwrap();
            if in_flight.get(&owned_key).is_some_and(|f| f.id == id) {
                in_flight.remove(&owned_key);
            }

            result
        }
        .boxed()
        .shared();

        (
            InFlight {
                id,
                fetch: shared.clone(),
                abort,
            },
            shared,
        )
    }

    /// Remove every cached entry whose key starts with any of `prefixes`.
    pub fn invalidate(&self, prefixes: &[&str]) {
        let mut entries = self.inner.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|key, _| !prefixes.iter().any(|p| key.starts_with(p)));
        let removed = before - entries.len();
        if removed > 0 {
            tracing::debug!("invalidated {} cache entries for {:?}", removed, prefixes);
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, key: &str) -> bool {
        self.inner
            .entries
            .lock()
            .unwrap()
            .get(key)
            .is_some_and(|e| e.is_fresh())
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic cache key: method, path, then query pairs sorted and
/// percent-encoded so parameter order never changes the key.
pub(crate) fn cache_key(method: &str, path: &str, query: &[(String, String)]) -> String {
    let mut pairs: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    pairs.sort();
    format!("{}:{}?{}", method, path, pairs.join("&"))
}
