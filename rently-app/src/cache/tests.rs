//! Tests for the query cache

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};

use rently_core::{CacheConfig, ErrorContext, RentlyError};

use super::{encode, MutationSpec, QueryCache, QueryKey, QueryState};

type FetchFuture =
    std::pin::Pin<Box<dyn std::future::Future<Output = rently_core::RentlyResult<Value>> + Send>>;

fn test_config() -> CacheConfig {
    CacheConfig {
        default_stale_seconds: 300,
        screen_stale_seconds: 120,
        gc_seconds: 600,
        read_retries: 3,
        write_retries: 1,
        refetch_on_reconnect: true,
        refetch_on_focus: false,
    }
}

fn counting_fetcher(
    counter: Arc<AtomicU64>,
    source: Arc<Mutex<Value>>,
) -> impl Fn() -> FetchFuture + Send + Sync + 'static {
    move || {
        let counter = counter.clone();
        let source = source.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(25)).await;
            Ok(source.lock().unwrap().clone())
        })
    }
}

#[test]
fn test_query_key_prefix_matching() {
    let list = QueryKey::new(["properties", "user"]);
    let prefix = QueryKey::new(["properties"]);
    let other = QueryKey::new(["rentals"]);

    assert!(list.starts_with(&prefix));
    assert!(list.starts_with(&list));
    assert!(!list.starts_with(&other));
    assert!(!prefix.starts_with(&list));
    assert_eq!(list.to_string(), "properties:user");
}

#[tokio::test]
async fn test_concurrent_reads_share_one_fetch() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!(["a", "b"])));

    let key = QueryKey::new(["properties", "user"]);
    let options = cache.default_options();

    let first = cache.query::<Vec<String>, _, _>(
        key.clone(),
        options.clone(),
        counting_fetcher(counter.clone(), source.clone()),
    );
    let second = cache.query::<Vec<String>, _, _>(
        key.clone(),
        options,
        counting_fetcher(counter.clone(), source.clone()),
    );

    let (first, second) = tokio::join!(first, second);
    assert_eq!(first.unwrap().ready().unwrap(), vec!["a", "b"]);
    assert_eq!(second.unwrap().ready().unwrap(), vec!["a", "b"]);

    // Exactly one network call despite two concurrent readers
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fresh_window_serves_cached_data_without_fetch() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!([{"id": "p1"}])));

    let key = QueryKey::new(["properties", "user"]);
    let options = cache
        .default_options()
        .with_stale_after(Duration::from_secs(120));

    for _ in 0..2 {
        let state: QueryState<Value> = cache
            .query(
                key.clone(),
                options.clone(),
                counting_fetcher(counter.clone(), source.clone()),
            )
            .await
            .unwrap();
        assert_eq!(state.ready().unwrap(), json!([{"id": "p1"}]));
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stale_entry_served_while_refreshing_in_background() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!("v1")));

    let key = QueryKey::new(["dashboard", "stats"]);
    let options = cache.default_options().with_stale_after(Duration::ZERO);

    let first: QueryState<Value> = cache
        .query(
            key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), source.clone()),
        )
        .await
        .unwrap();
    assert_eq!(first.ready().unwrap(), json!("v1"));

    *source.lock().unwrap() = json!("v2");

    // Stale data comes back immediately; the refresh runs in the background
    let second: QueryState<Value> = cache
        .query(
            key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), source.clone()),
        )
        .await
        .unwrap();
    assert_eq!(second.ready().unwrap(), json!("v1"));

    tokio::time::sleep(Duration::from_millis(100)).await;

    let third: QueryState<Value> = cache
        .query(
            key.clone(),
            options,
            counting_fetcher(counter.clone(), source.clone()),
        )
        .await
        .unwrap();
    assert_eq!(third.ready().unwrap(), json!("v2"));
}

#[tokio::test]
async fn test_disabled_query_reports_not_ready_and_never_fetches() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!([])));

    let key = QueryKey::new(["rentals", "property", ""]);
    let options = cache.default_options().enabled(false);

    let state: QueryState<Value> = cache
        .query(key, options, counting_fetcher(counter.clone(), source))
        .await
        .unwrap();

    assert!(state.is_not_ready());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mutation_invalidates_dependent_prefixes() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let rentals = Arc::new(Mutex::new(json!([{"id": "r1"}])));
    let properties = Arc::new(Mutex::new(json!([{"id": "p1"}])));

    let rentals_key = QueryKey::new(["rentals"]);
    let properties_key = QueryKey::new(["properties", "user"]);
    let options = cache
        .default_options()
        .with_stale_after(Duration::from_secs(120));

    // Warm both caches
    let _: QueryState<Value> = cache
        .query(
            rentals_key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), rentals.clone()),
        )
        .await
        .unwrap();
    let _: QueryState<Value> = cache
        .query(
            properties_key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), properties.clone()),
        )
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    // Creating a rental invalidates both the rentals list and the
    // properties list, since occupancy changed
    let spec = MutationSpec::from_config(cache.config())
        .invalidates(QueryKey::new(["rentals"]))
        .invalidates(QueryKey::new(["properties"]));
    let created: Value = cache
        .mutate(spec, || async { Ok(json!({"id": "r2"})) })
        .await
        .unwrap();
    assert_eq!(created["id"], "r2");

    // Both reads now serve stale data and refetch in the background
    let _: QueryState<Value> = cache
        .query(
            rentals_key,
            options.clone(),
            counting_fetcher(counter.clone(), rentals.clone()),
        )
        .await
        .unwrap();
    let _: QueryState<Value> = cache
        .query(
            properties_key,
            options,
            counting_fetcher(counter.clone(), properties.clone()),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_mutation_seeds_cache_with_result() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!({"id": "p1", "name": "old"})));

    let key = QueryKey::new(["properties", "p1"]);
    let spec = MutationSpec::from_config(cache.config()).seeds(key.clone());

    let _: Value = cache
        .mutate(spec, || async { Ok(json!({"id": "p1", "name": "Casa Azul"})) })
        .await
        .unwrap();

    // The seeded entry is fresh; no fetch happens
    let state: QueryState<Value> = cache
        .query(
            key,
            cache.default_options(),
            counting_fetcher(counter.clone(), source),
        )
        .await
        .unwrap();
    assert_eq!(state.ready().unwrap()["name"], "Casa Azul");
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unauthorized_fetch_is_never_retried() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));

    let key = QueryKey::new(["tenants"]);
    let options = cache.default_options().with_retries(3);

    let attempts = counter.clone();
    let result: rently_core::RentlyResult<QueryState<Value>> = cache
        .query(key, options, move || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(RentlyError::Unauthorized {
                    message: "Token is invalid or expired".to_string(),
                    context: ErrorContext::new("test"),
                })
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_recoverable_fetch_errors_are_retried() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));

    let key = QueryKey::new(["properties", "user"]);
    let options = cache.default_options().with_retries(3);

    let attempts = counter.clone();
    let state: QueryState<Value> = cache
        .query(key, options, move || {
            let attempts = attempts.clone();
            async move {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(RentlyError::Http {
                        status: 500,
                        message: "Internal Server Error".to_string(),
                        context: ErrorContext::new("test"),
                    })
                } else {
                    Ok(json!(["ok"]))
                }
            }
        })
        .await
        .unwrap();

    assert_eq!(state.ready().unwrap(), json!(["ok"]));
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_remove_forces_a_full_refetch() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!([1, 2, 3])));

    let key = QueryKey::new(["rentals"]);
    let options = cache.default_options();

    let _: QueryState<Value> = cache
        .query(
            key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), source.clone()),
        )
        .await
        .unwrap();
    cache.remove(&QueryKey::new(["rentals"])).await;

    let _: QueryState<Value> = cache
        .query(key, options, counting_fetcher(counter.clone(), source))
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_reconnect_marks_everything_stale() {
    let cache = QueryCache::new(test_config());
    let counter = Arc::new(AtomicU64::new(0));
    let source = Arc::new(Mutex::new(json!("data")));

    let key = QueryKey::new(["dashboard", "stats"]);
    let options = cache.default_options();

    let _: QueryState<Value> = cache
        .query(
            key.clone(),
            options.clone(),
            counting_fetcher(counter.clone(), source.clone()),
        )
        .await
        .unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    cache.on_reconnect().await;

    // Next read serves the old value but triggers a refresh
    let state: QueryState<Value> = cache
        .query(key, options, counting_fetcher(counter.clone(), source))
        .await
        .unwrap();
    assert_eq!(state.ready().unwrap(), json!("data"));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sweep_drops_entries_past_retention() {
    let cache = QueryCache::new(test_config());

    cache
        .set_query_data(QueryKey::new(["rentals"]), json!([]))
        .await;
    assert_eq!(cache.stats().await.entries, 1);

    // Nothing is past the ten-minute retention window yet
    assert_eq!(cache.sweep().await, 0);
    assert_eq!(cache.stats().await.entries, 1);
}

#[test]
fn test_encode_wraps_serialization() {
    let value = encode(vec!["a", "b"]).unwrap();
    assert_eq!(value, json!(["a", "b"]));
}
