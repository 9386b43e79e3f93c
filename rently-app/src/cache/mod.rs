//! Query cache with stale-while-revalidate freshness
//!
//! Avoids redundant network calls: identical concurrent reads share one
//! in-flight request, stale entries are served immediately while a background
//! refresh runs, and mutations invalidate the reads that depend on them.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, RwLock};
use tracing::{debug, warn};

use rently_core::{CacheConfig, ErrorContext, RentlyError, RentlyResult};

#[cfg(test)]
mod tests;

/// Ordered tuple of primitives identifying one cached read
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Prefix match: invalidating `["properties"]` hits `["properties", "user"]`
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(":"))
    }
}

/// Per-query freshness and retry policy
#[derive(Debug, Clone)]
pub struct QueryOptions {
    /// How long a result counts as fresh
    pub stale_after: Duration,
    /// Unused entries are dropped after this long
    pub expires_after: Duration,
    /// Retry count for failed fetches (recoverable errors only)
    pub retries: u32,
    /// A disabled query never executes
    pub enabled: bool,
}

impl QueryOptions {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            stale_after: Duration::from_secs(config.default_stale_seconds),
            expires_after: Duration::from_secs(config.gc_seconds),
            retries: config.read_retries,
            enabled: true,
        }
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// Outcome of a cached read
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// The query is disabled (e.g. a detail read missing its id); it will not
    /// execute until re-enabled
    NotReady,
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            QueryState::Ready(value) => Some(value),
            QueryState::NotReady => None,
        }
    }

    pub fn is_not_ready(&self) -> bool {
        matches!(self, QueryState::NotReady)
    }
}

/// What a mutation does to the cache once it resolves
#[derive(Debug, Clone)]
pub struct MutationSpec {
    /// Retry count for the write (recoverable errors only)
    pub retries: u32,
    /// Key prefixes marked stale on success
    pub invalidate: Vec<QueryKey>,
    /// Key seeded with the mutation result on success (write-through)
    pub seed: Option<QueryKey>,
}

impl MutationSpec {
    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            retries: config.write_retries,
            invalidate: Vec::new(),
            seed: None,
        }
    }

    pub fn invalidates(mut self, key: QueryKey) -> Self {
        self.invalidate.push(key);
        self
    }

    pub fn seeds(mut self, key: QueryKey) -> Self {
        self.seed = Some(key);
        self
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: Option<Value>,
    error: Option<String>,
    fetched_at: DateTime<Utc>,
    stale_after: chrono::Duration,
    expires_after: chrono::Duration,
    invalidated: bool,
    last_access: DateTime<Utc>,
}

impl CacheEntry {
    fn empty(now: DateTime<Utc>, options: &QueryOptions) -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: now,
            stale_after: chrono::Duration::seconds(options.stale_after.as_secs() as i64),
            expires_after: chrono::Duration::seconds(options.expires_after.as_secs() as i64),
            invalidated: false,
            last_access: now,
        }
    }

    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.data.is_some()
            && !self.invalidated
            && now.signed_duration_since(self.fetched_at) < self.stale_after
    }

    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_access) > self.expires_after
    }
}

enum Hit {
    Fresh(Value),
    Stale(Value),
    Miss,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Live entries, including errored ones
    pub entries: usize,
    /// Fetcher invocations since creation (retries included)
    pub network_fetches: u64,
}

/// Keyed request cache shared by every screen
#[derive(Clone)]
pub struct QueryCache {
    config: CacheConfig,
    entries: Arc<RwLock<HashMap<QueryKey, CacheEntry>>>,
    inflight: Arc<RwLock<HashMap<QueryKey, watch::Receiver<bool>>>>,
    fetches: Arc<AtomicU64>,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
            inflight: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Default read options from the cache configuration
    pub fn default_options(&self) -> QueryOptions {
        QueryOptions::from_config(&self.config)
    }

    /// Read through the cache
    ///
    /// Fresh data is returned without touching the network; stale data is
    /// returned immediately while a background refresh runs; a miss fetches
    /// in the foreground. Concurrent reads of the same key share a single
    /// fetch.
    pub async fn query<T, F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> RentlyResult<QueryState<T>>
    where
        T: DeserializeOwned,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RentlyResult<Value>> + Send + 'static,
    {
        if !options.enabled {
            return Ok(QueryState::NotReady);
        }

        let now = Utc::now();
        let hit = {
            let mut entries = self.entries.write().await;
            if let Some(entry) = entries.get(&key) {
                if entry.is_expired(now) {
                    debug!("Dropping expired cache entry {}", key);
                    entries.remove(&key);
                }
            }
            match entries.get_mut(&key) {
                Some(entry) => {
                    entry.last_access = now;
                    match &entry.data {
                        Some(data) if entry.is_fresh(now) => Hit::Fresh(data.clone()),
                        Some(data) => Hit::Stale(data.clone()),
                        None => Hit::Miss,
                    }
                }
                None => Hit::Miss,
            }
        };

        match hit {
            Hit::Fresh(data) => {
                debug!("Cache hit for {}", key);
                Ok(QueryState::Ready(serde_json::from_value(data)?))
            }
            Hit::Stale(data) => {
                debug!("Serving stale data for {}, refreshing in background", key);
                self.spawn_refresh(key, options, fetch);
                Ok(QueryState::Ready(serde_json::from_value(data)?))
            }
            Hit::Miss => {
                let value = self.fetch_shared(key, options, fetch).await?;
                Ok(QueryState::Ready(serde_json::from_value(value)?))
            }
        }
    }

    /// Run a mutation, then apply its cache effects
    ///
    /// Invalidation happens after the mutation's response resolves; when two
    /// mutations race on overlapping keys, the last response to resolve wins.
    pub async fn mutate<T, F, Fut>(&self, spec: MutationSpec, op: F) -> RentlyResult<T>
    where
        T: Serialize,
        F: Fn() -> Fut,
        Fut: Future<Output = RentlyResult<T>>,
    {
        let mut attempt: u32 = 0;
        let result = loop {
            match op().await {
                Ok(value) => break value,
                Err(err) if attempt < spec.retries && err.is_recoverable() => {
                    attempt += 1;
                    let delay = err.retry_delay_ms().unwrap_or(250 * attempt as u64);
                    debug!("Mutation failed ({}), retry {} in {}ms", err, attempt, delay);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(err) => return Err(err),
            }
        };

        for key in &spec.invalidate {
            self.invalidate(key).await;
        }

        if let Some(key) = &spec.seed {
            match serde_json::to_value(&result) {
                Ok(value) => self.set_query_data(key.clone(), value).await,
                Err(e) => warn!("Could not seed cache for {}: {}", key, e),
            }
        }

        Ok(result)
    }

    /// Mark every entry under the prefix stale
    ///
    /// Stale entries keep serving their old data until the next read's
    /// background refresh replaces it.
    pub async fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.write().await;
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                debug!("Invalidating {}", key);
                entry.invalidated = true;
            }
        }
    }

    /// Drop every entry under the prefix
    pub async fn remove(&self, prefix: &QueryKey) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Seed a key directly, bypassing the fetcher (write-through)
    pub async fn set_query_data(&self, key: QueryKey, value: Value) {
        let now = Utc::now();
        let options = self.default_options();
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key)
            .or_insert_with(|| CacheEntry::empty(now, &options));
        entry.data = Some(value);
        entry.error = None;
        entry.fetched_at = now;
        entry.invalidated = false;
        entry.last_access = now;
    }

    /// Network came back: treat everything as stale so active reads refetch
    pub async fn on_reconnect(&self) {
        if !self.config.refetch_on_reconnect {
            return;
        }
        debug!("Reconnected, marking all cached queries stale");
        let mut entries = self.entries.write().await;
        for entry in entries.values_mut() {
            entry.invalidated = true;
        }
    }

    /// Drop entries unused past their retention window
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.read().await.len(),
            network_fetches: self.fetches.load(Ordering::Relaxed),
        }
    }

    fn spawn_refresh<F, Fut>(&self, key: QueryKey, options: QueryOptions, fetch: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RentlyResult<Value>> + Send + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.fetch_shared(key.clone(), options, fetch).await {
                debug!("Background refresh failed for {}: {}", key, e);
            }
        });
    }

    /// Fetch with single-flight de-duplication
    ///
    /// The first caller for a key becomes the leader and runs the fetch;
    /// everyone else waits on the leader's completion signal and reads the
    /// recorded outcome.
    async fn fetch_shared<F, Fut>(
        &self,
        key: QueryKey,
        options: QueryOptions,
        fetch: F,
    ) -> RentlyResult<Value>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = RentlyResult<Value>> + Send,
    {
        enum Role {
            Leader(watch::Sender<bool>),
            Follower(watch::Receiver<bool>),
        }

        let role = {
            let mut inflight = self.inflight.write().await;
            match inflight.get(&key) {
                Some(rx) => Role::Follower(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(false);
                    inflight.insert(key.clone(), rx);
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Follower(mut rx) => {
                debug!("Joining in-flight fetch for {}", key);
                loop {
                    if *rx.borrow() {
                        break;
                    }
                    if rx.changed().await.is_err() {
                        break;
                    }
                }
                self.recorded_outcome(&key).await
            }
            Role::Leader(tx) => {
                let result = self.run_fetch(&key, &options, &fetch).await;
                self.record_result(&key, &options, &result).await;

                {
                    let mut inflight = self.inflight.write().await;
                    inflight.remove(&key);
                }
                let _ = tx.send(true);

                result
            }
        }
    }

    /// Read the outcome the leader recorded for a shared fetch
    async fn recorded_outcome(&self, key: &QueryKey) -> RentlyResult<Value> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) => {
                if let Some(message) = &entry.error {
                    return Err(RentlyError::Cache {
                        message: message.clone(),
                        context: ErrorContext::new("query_cache")
                            .with_operation("shared_fetch")
                            .with_metadata("key", &key.to_string()),
                    });
                }
                match &entry.data {
                    Some(data) => Ok(data.clone()),
                    None => Err(RentlyError::Cache {
                        message: format!("Shared fetch for {} completed without a result", key),
                        context: ErrorContext::new("query_cache").with_operation("shared_fetch"),
                    }),
                }
            }
            None => Err(RentlyError::Cache {
                message: format!("Shared fetch for {} completed without a result", key),
                context: ErrorContext::new("query_cache").with_operation("shared_fetch"),
            }),
        }
    }

    async fn run_fetch<F, Fut>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        fetch: &F,
    ) -> RentlyResult<Value>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = RentlyResult<Value>>,
    {
        let mut attempt: u32 = 0;
        loop {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            match fetch().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < options.retries && err.is_recoverable() => {
                    attempt += 1;
                    let delay = err.retry_delay_ms().unwrap_or(250 * attempt as u64);
                    debug!(
                        "Fetch for {} failed ({}), retry {} in {}ms",
                        key, err, attempt, delay
                    );
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn record_result(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
        result: &RentlyResult<Value>,
    ) {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(key.clone())
            .or_insert_with(|| CacheEntry::empty(now, options));

        entry.stale_after = chrono::Duration::seconds(options.stale_after.as_secs() as i64);
        entry.expires_after = chrono::Duration::seconds(options.expires_after.as_secs() as i64);
        entry.last_access = now;

        match result {
            Ok(value) => {
                entry.data = Some(value.clone());
                entry.error = None;
                entry.fetched_at = now;
                entry.invalidated = false;
            }
            Err(err) => {
                // Old data survives a failed refresh; only the error is noted
                entry.error = Some(err.to_string());
            }
        }
    }
}

/// Encode a fetched value for storage in the cache
pub fn encode<T: Serialize>(value: T) -> RentlyResult<Value> {
    serde_json::to_value(value).map_err(RentlyError::from)
}
