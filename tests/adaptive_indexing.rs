//! Usage-driven indexing through the engine
//!
//! Indexes only narrow candidates; every test also checks that results
//! are unchanged once an index exists.

mod common;

use common::{engine, engine_with, filter_args, ids, run_filter, sort_args};
use nodequery::node::StoreSignal;
use nodequery::EngineConfig;
use serde_json::json;

// =============================================================================
// THRESHOLD
// =============================================================================

/// Exactly one build, on the fifth use; the sixth reuses it.
#[tokio::test]
async fn test_index_built_once_at_threshold() {
    let engine = engine();
    let filter = json!({ "hair": { "lt": 2 } });

    for use_count in 1..=4u64 {
        let result = run_filter(&engine, filter.clone()).await;
        assert_eq!(ids(&result), vec!["0", "2"]);
        assert_eq!(engine.indexer().usage("Test", "hair"), use_count);
        assert_eq!(engine.metrics().indexes_built(), 0);
    }

    let result = run_filter(&engine, filter.clone()).await;
    assert_eq!(ids(&result), vec!["0", "2"]);
    assert_eq!(engine.metrics().indexes_built(), 1);

    let result = run_filter(&engine, filter).await;
    assert_eq!(ids(&result), vec!["0", "2"]);
    assert_eq!(engine.indexer().usage("Test", "hair"), 6);
    assert_eq!(engine.metrics().indexes_built(), 1);
}

/// Every operator still answers correctly over an indexed path.
#[tokio::test]
async fn test_indexed_results_match_unindexed() {
    let config = EngineConfig {
        index_threshold: 1,
        ..EngineConfig::default()
    };
    let indexed = engine_with(config);
    let plain = engine();

    let filters = [
        json!({ "hair": { "eq": 0 } }),
        json!({ "hair": { "ne": 2 } }),
        json!({ "hair": { "gte": 1 } }),
        json!({ "anArray": { "in": [5] } }),
        json!({ "anArray": { "nin": [5] } }),
        json!({ "string": { "in": ["b", "c"] } }),
        json!({ "boolean": { "nin": [true, null] } }),
        json!({ "date": { "ne": null } }),
        json!({ "frontmatter": { "blue": { "gt": 100 } } }),
        json!({ "name": { "regex": "/mad/i" } }),
    ];

    for filter in filters {
        let expected = run_filter(&plain, filter.clone()).await;
        let actual = run_filter(&indexed, filter.clone()).await;
        assert_eq!(ids(&actual), ids(&expected), "filter {}", filter);
    }
    assert!(indexed.metrics().indexes_built() > 0);
}

#[tokio::test]
async fn test_usage_counted_per_path() {
    let engine = engine();
    run_filter(&engine, json!({ "hair": { "gt": 0 }, "frontmatter": { "blue": { "eq": 100 } } })).await;
    run_filter(&engine, json!({ "hair": { "gt": 0 } })).await;

    assert_eq!(engine.indexer().usage("Test", "hair"), 2);
    assert_eq!(engine.indexer().usage("Test", "frontmatter.blue"), 1);
    assert_eq!(engine.indexer().usage("Test", "frontmatter"), 0);
}

// =============================================================================
// SORT FIELDS
// =============================================================================

#[tokio::test]
async fn test_sort_fields_indexed_immediately() {
    let engine = engine();
    let out = engine
        .query("Test", &sort_args(json!({ "fields": ["float"] })), false)
        .await
        .unwrap();

    assert_eq!(out.ids(), vec!["0", "1", "2"]);
    assert_eq!(engine.metrics().indexes_built(), 1);
    assert_eq!(engine.indexer().usage("Test", "float"), 0);
}

// =============================================================================
// FAILURES AND RESETS
// =============================================================================

/// A failed build is counted and the query proceeds unindexed.
#[tokio::test]
async fn test_index_build_failure_is_not_fatal() {
    let config = EngineConfig {
        index_threshold: 1,
        max_index_entries: 2,
        ..EngineConfig::default()
    };
    let engine = engine_with(config);

    let out = engine
        .query("Test", &filter_args(json!({ "anArray": { "in": [5] } })), false)
        .await
        .unwrap();
    assert_eq!(out.ids(), vec!["1"]);

    let snapshot = engine.metrics().snapshot();
    assert_eq!(snapshot.indexes_built, 0);
    assert_eq!(snapshot.index_build_failures, 1);
}

#[tokio::test]
async fn test_cache_cleared_resets_counters() {
    let engine = engine();
    let filter = json!({ "hair": { "eq": 1 } });
    for _ in 0..5 {
        run_filter(&engine, filter.clone()).await;
    }
    assert_eq!(engine.metrics().indexes_built(), 1);

    engine.handle_signal(&StoreSignal::CacheCleared);
    assert_eq!(engine.indexer().usage("Test", "hair"), 0);

    for _ in 0..4 {
        run_filter(&engine, filter.clone()).await;
    }
    assert_eq!(engine.metrics().indexes_built(), 1);

    let result = run_filter(&engine, filter).await;
    assert_eq!(ids(&result), vec!["0"]);
    assert_eq!(engine.metrics().indexes_built(), 2);
}
