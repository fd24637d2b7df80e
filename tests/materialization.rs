//! Resolver-backed fields through the engine
//!
//! Test Categories:
//! 1. Only required resolved fields are computed
//! 2. Concurrent queries share in-flight resolutions
//! 3. Version-based invalidation
//! 4. Whole-query caching per build phase

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nodequery::compiler::{FilterExpr, QueryArgs, SortSpec};
use nodequery::node::{MemoryNodeStore, Node, NodeStore, StoreSignal};
use nodequery::schema::{resolver_fn, LinkResolver, ObjectTypeDef, ResolveParams, ResolverError, SchemaBuilder};
use nodequery::{EngineConfig, QueryEngine};
use serde_json::{json, Value};

struct Fixture {
    engine: QueryEngine,
    store: Arc<MemoryNodeStore>,
    word_calls: Arc<AtomicUsize>,
}

fn post(id: &str, title: &str, author: &str, digest: &str) -> Node {
    Node::from_json(json!({
        "id": id,
        "title": title,
        "author": author,
        "internal": { "type": "Post", "contentDigest": digest }
    }))
    .unwrap()
}

fn author(id: &str, slug: &str, name: &str) -> Node {
    Node::from_json(json!({
        "id": id,
        "slug": slug,
        "name": name,
        "internal": { "type": "Author", "contentDigest": "1" }
    }))
    .unwrap()
}

fn fixture(config: EngineConfig) -> Fixture {
    let word_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&word_calls);

    let registry = SchemaBuilder::new()
        .object_type(
            ObjectTypeDef::new("Author")
                .node()
                .field("slug", "String")
                .field("name", "String"),
        )
        .object_type(
            ObjectTypeDef::new("Post")
                .node()
                .field("title", "String")
                .resolved_field("author", "Author", Arc::new(LinkResolver::by_field("slug", "Author")))
                .resolved_field(
                    "wordCount",
                    "Int",
                    resolver_fn(move |p: ResolveParams| {
                        let calls = Arc::clone(&calls);
                        async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(10)).await;
                            let title = p.source.get("title").and_then(Value::as_str).unwrap_or_default();
                            Ok::<_, ResolverError>(json!(title.split_whitespace().count()))
                        }
                    }),
                ),
        )
        .build()
        .unwrap();

    let store = Arc::new(MemoryNodeStore::with_nodes([
        author("a1", "ann", "Ann"),
        author("a2", "bob", "Bob"),
        post("p1", "hello world", "ann", "1"),
        post("p2", "one two three", "bob", "1"),
        post("p3", "solo", "ann", "1"),
    ]));

    Fixture {
        engine: QueryEngine::new(Arc::new(registry), store.clone(), config),
        store,
        word_calls,
    }
}

fn filter(value: Value) -> QueryArgs {
    QueryArgs::new().with_filter(FilterExpr::from_json(&value).unwrap())
}

// =============================================================================
// REQUIRED FIELDS
// =============================================================================

#[tokio::test]
async fn test_filter_on_linked_field() {
    let f = fixture(EngineConfig::default());
    let out = f
        .engine
        .query("Post", &filter(json!({ "author": { "name": { "eq": "Ann" } } })), false)
        .await
        .unwrap();

    assert_eq!(out.ids(), vec!["p1", "p3"]);
    assert_eq!(out.nodes()[0].get("author").and_then(|a| a.get("id")), Some(&json!("a1")));
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 0);
}

/// Stored nodes keep their raw values.
#[tokio::test]
async fn test_store_is_not_mutated() {
    let f = fixture(EngineConfig::default());
    f.engine
        .query("Post", &filter(json!({ "wordCount": { "gte": 2 } })), false)
        .await
        .unwrap();

    let stored = f.store.node("p1").unwrap();
    assert_eq!(stored.get("author"), Some(&json!("ann")));
    assert_eq!(stored.get("wordCount"), None);
}

#[tokio::test]
async fn test_sort_on_resolved_field() {
    let f = fixture(EngineConfig::default());
    let args = QueryArgs::new().with_sort(SortSpec::new().desc("wordCount"));
    let out = f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(out.ids(), vec!["p2", "p1", "p3"]);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_raw_nodes_returned_without_resolvers() {
    let f = fixture(EngineConfig::default());
    let expr = FilterExpr::from_json(&json!({ "title": { "eq": "solo" } })).unwrap();
    let nodes = f.engine.nodes_for_query("Post", Some(&expr), None, &[]).await.unwrap();

    let stored = f.store.nodes_by_type("Post");
    assert_eq!(nodes.len(), stored.len());
    assert!(nodes.iter().zip(&stored).all(|(a, b)| Arc::ptr_eq(a, b)));
}

// =============================================================================
// CONCURRENCY
// =============================================================================

/// Two concurrent queries needing the same field resolve each node once.
#[tokio::test]
async fn test_concurrent_queries_coalesce() {
    let f = fixture(EngineConfig::default());
    let first = filter(json!({ "wordCount": { "eq": 2 } }));
    let second = filter(json!({ "wordCount": { "gt": 0 } }));

    let (a, b) = tokio::join!(
        f.engine.query("Post", &first, false),
        f.engine.query("Post", &second, false)
    );

    assert_eq!(a.unwrap().ids(), vec!["p1"]);
    assert_eq!(b.unwrap().ids(), vec!["p1", "p2", "p3"]);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_sequential_queries_reuse_node_cache() {
    let f = fixture(EngineConfig::default());
    let args = filter(json!({ "wordCount": { "lt": 2 } }));

    f.engine.query("Post", &args, false).await.unwrap();
    let out = f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(out.ids(), vec!["p3"]);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 3);
}

// =============================================================================
// INVALIDATION
// =============================================================================

#[tokio::test]
async fn test_changed_node_is_resolved_again() {
    let f = fixture(EngineConfig::default());
    let args = filter(json!({ "wordCount": { "eq": 1 } }));
    assert_eq!(f.engine.query("Post", &args, false).await.unwrap().ids(), vec!["p3"]);

    let signal = f.store.upsert(post("p1", "hello", "ann", "2"));
    assert_eq!(
        signal,
        StoreSignal::NodeChanged {
            id: "p1".into(),
            content_digest: "2".into()
        }
    );
    f.engine.handle_signal(&signal);

    let out = f.engine.query("Post", &args, false).await.unwrap();
    assert_eq!(out.ids(), vec!["p1", "p3"]);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_cache_cleared_drops_resolutions() {
    let f = fixture(EngineConfig::default());
    let args = filter(json!({ "wordCount": { "gt": 0 } }));
    f.engine.query("Post", &args, false).await.unwrap();
    assert_eq!(f.engine.cache().node_entries(), 3);

    f.engine.handle_signal(&StoreSignal::CacheCleared);
    assert_eq!(f.engine.cache().node_entries(), 0);

    f.engine.query("Post", &args, false).await.unwrap();
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 6);
}

// =============================================================================
// QUERY CACHE
// =============================================================================

#[tokio::test]
async fn test_query_cache_inactive_during_bootstrap() {
    let f = fixture(EngineConfig::default());
    let args = filter(json!({ "wordCount": { "gt": 0 } }));
    f.engine.query("Post", &args, false).await.unwrap();
    f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(f.engine.cache().query_entries(), 0);
    assert_eq!(f.engine.metrics().snapshot().query_cache_hits, 0);
}

#[tokio::test]
async fn test_query_cache_in_steady_state() {
    let f = fixture(EngineConfig::default());
    f.engine.handle_signal(&StoreSignal::BootstrapFinished);

    let args = filter(json!({ "wordCount": { "gt": 0 } }));
    f.engine.query("Post", &args, false).await.unwrap();
    f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(f.engine.cache().query_entries(), 1);
    assert_eq!(f.engine.metrics().snapshot().query_cache_hits, 1);
}

#[tokio::test]
async fn test_query_cache_in_production() {
    let config = EngineConfig {
        production: true,
        ..EngineConfig::default()
    };
    let f = fixture(config);

    let args = filter(json!({ "wordCount": { "gt": 0 } }));
    f.engine.query("Post", &args, false).await.unwrap();
    f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(f.engine.cache().query_entries(), 1);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_disabled_node_cache_resolves_every_time() {
    let config = EngineConfig {
        node_cache_enabled: false,
        ..EngineConfig::default()
    };
    let f = fixture(config);

    let args = filter(json!({ "wordCount": { "gt": 0 } }));
    f.engine.query("Post", &args, false).await.unwrap();
    f.engine.query("Post", &args, false).await.unwrap();

    assert_eq!(f.engine.cache().node_entries(), 0);
    assert_eq!(f.word_calls.load(Ordering::SeqCst), 6);
}
