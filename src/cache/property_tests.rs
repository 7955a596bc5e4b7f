//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache's observable guarantees over arbitrary
//! keys, payloads and clock offsets. Async calls are driven with
//! `tokio_test::block_on`.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Value};

use crate::cache::{Backend, Clock, ManualClock, ProductCache, CACHE_TTL_MS};
use crate::consent::ConsentState;
use crate::storage::{MemoryConnector, MemoryFlatStore, UnavailableConnector};

// == Test Configuration ==
const T0: u64 = 1_700_000_000_000;

fn cache_with_clock(structured: bool) -> (ProductCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(T0));
    let flat = Arc::new(MemoryFlatStore::new());
    let cache = if structured {
        ProductCache::new(flat, Arc::new(MemoryConnector::new()))
    } else {
        ProductCache::new(flat, Arc::new(UnavailableConnector))
    };
    (cache.with_clock(clock.clone()), clock)
}

// == Strategies ==
/// Cache keys as the storefront builds them: category names and query-ish strings
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:/?=&-]{1,64}"
}

/// Product list payloads
fn payload_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec(
        (any::<u32>(), "[a-zA-Z ]{0,24}", 0u32..100_000),
        0..8,
    )
    .prop_map(|items| {
        Value::Array(
            items
                .into_iter()
                .map(|(id, name, cents)| json!({"id": id, "name": name, "price": cents as f64 / 100.0}))
                .collect(),
        )
    })
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, data: Value },
    Delete { key: String },
    Advance { ms: u64 },
}

fn op_strategy() -> impl Strategy<Value = CacheOp> {
    let key = prop::sample::select(vec!["shirts", "sarees", "kids", "sale"]).prop_map(String::from);
    prop_oneof![
        (key.clone(), payload_strategy()).prop_map(|(key, data)| CacheOp::Set { key, data }),
        key.prop_map(|key| CacheOp::Delete { key }),
        (0..CACHE_TTL_MS / 2).prop_map(|ms| CacheOp::Advance { ms }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Storing then immediately reading returns the stored payload, on either backend.
    #[test]
    fn prop_roundtrip(key in key_strategy(), data in payload_strategy(), structured in any::<bool>()) {
        let (cache, _) = cache_with_clock(structured);
        let read = tokio_test::block_on(async {
            cache.set_cache_permission(ConsentState::Accepted).await;
            let backend = cache.set_cached_products(&key, data.clone()).await;
            let expected = if structured { Backend::Structured } else { Backend::Flat };
            assert_eq!(backend, Some(expected));
            cache.get_cached_products(&key).await
        });
        prop_assert_eq!(read, Some(data));
    }

    // Without an accepted decision nothing is stored and nothing is returned.
    #[test]
    fn prop_no_consent_no_cache(
        key in key_strategy(),
        data in payload_strategy(),
        decision in prop::option::of(Just(ConsentState::Rejected)),
    ) {
        let (cache, _) = cache_with_clock(true);
        let (stored, read) = tokio_test::block_on(async {
            if let Some(state) = decision {
                cache.set_cache_permission(state).await;
            }
            let stored = cache.set_cached_products(&key, data).await;
            (stored, cache.get_cached_products(&key).await)
        });
        prop_assert_eq!(stored, None);
        prop_assert_eq!(read, None);
    }

    // A read at offset d after the write hits iff d < TTL.
    #[test]
    fn prop_ttl_window(key in key_strategy(), data in payload_strategy(), offset in 0..CACHE_TTL_MS * 2) {
        let (cache, clock) = cache_with_clock(true);
        let read = tokio_test::block_on(async {
            cache.set_cache_permission(ConsentState::Accepted).await;
            cache.set_cached_products(&key, data.clone()).await;
            clock.advance(offset);
            cache.get_cached_products(&key).await
        });

        if offset < CACHE_TTL_MS {
            prop_assert_eq!(read, Some(data));
        } else {
            prop_assert_eq!(read, None);
            prop_assert_eq!(cache.stats().expired, 1);
        }
    }

    // Rejecting consent hides and purges everything previously cached.
    #[test]
    fn prop_reject_purges(entries in prop::collection::vec((key_strategy(), payload_strategy()), 1..10)) {
        let (cache, _) = cache_with_clock(true);
        let reads = tokio_test::block_on(async {
            cache.set_cache_permission(ConsentState::Accepted).await;
            for (key, data) in &entries {
                cache.set_cached_products(key, data.clone()).await;
            }
            cache.set_cache_permission(ConsentState::Rejected).await;
            cache.set_cache_permission(ConsentState::Accepted).await;

            let mut reads = Vec::new();
            for (key, _) in &entries {
                reads.push(cache.get_cached_products(key).await);
            }
            reads
        });
        prop_assert!(reads.iter().all(Option::is_none));
    }

    // Over any sequence of writes, deletes and clock moves, a read agrees
    // with a simple model: last write wins, delete removes, TTL expires.
    #[test]
    fn prop_matches_model(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (cache, clock) = cache_with_clock(true);
        let mut model: std::collections::HashMap<String, (Value, u64)> = Default::default();

        tokio_test::block_on(cache.set_cache_permission(ConsentState::Accepted));

        for op in ops {
            match op {
                CacheOp::Set { key, data } => {
                    tokio_test::block_on(cache.set_cached_products(&key, data.clone()));
                    model.insert(key, (data, clock.now_ms()));
                }
                CacheOp::Delete { key } => {
                    tokio_test::block_on(cache.delete_cached_products(&key));
                    model.remove(&key);
                }
                CacheOp::Advance { ms } => clock.advance(ms),
            }
        }

        for key in ["shirts", "sarees", "kids", "sale"] {
            let expected = model
                .get(key)
                .filter(|(_, written)| clock.now_ms() - written < CACHE_TTL_MS)
                .map(|(data, _)| data.clone());
            let actual = tokio_test::block_on(cache.get_cached_products(key));
            prop_assert_eq!(actual, expected, "key {}", key);
        }
    }
}
