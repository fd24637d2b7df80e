//! Query engine facade
//!
//! Ties the subsystems together for one type registry and one node store:
//! compile, materialize what the query needs, index adaptively, execute.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, info};

use super::config::EngineConfig;
use crate::compiler::{FilterCompiler, FilterExpr, Projection, QueryArgs, RequiredFields, SortSpec};
use crate::error::EngineResult;
use crate::executor::{distinct, group, Group, QueryExecutor, QueryOutput};
use crate::filter::{FilterShape, FilterShapeDeriver};
use crate::index::{AdaptiveIndexer, NodeCollection};
use crate::materialize::{Materializer, ResolutionCache};
use crate::node::{Node, NodeStore, StoreSignal};
use crate::observability::EngineMetrics;
use crate::schema::{ResolveContext, TypeRegistry};

/// Collections are kept per node list variant: the raw store nodes, or
/// the snapshots materialized for one required-field set.
type CollectionKey = (String, Option<RequiredFields>);

/// Nodes a query runs over
struct PreparedNodes {
    nodes: Vec<Arc<Node>>,
    /// Field set the nodes were materialized for; `None` for raw store nodes
    resolved: Option<RequiredFields>,
}

/// Query engine over one registry and one node store
pub struct QueryEngine {
    store: Arc<dyn NodeStore>,
    config: EngineConfig,
    deriver: FilterShapeDeriver,
    compiler: FilterCompiler,
    indexer: AdaptiveIndexer,
    materializer: Materializer,
    collections: Mutex<HashMap<CollectionKey, NodeCollection>>,
    context: Arc<ResolveContext>,
    metrics: Arc<EngineMetrics>,
}

impl QueryEngine {
    /// Creates an engine with isolated caches and counters
    pub fn new(registry: Arc<dyn TypeRegistry>, store: Arc<dyn NodeStore>, config: EngineConfig) -> Self {
        let metrics = Arc::new(EngineMetrics::new());
        let cache = ResolutionCache::new(config.production)
            .with_node_cache(config.node_cache_enabled)
            .with_query_cache(config.query_cache_enabled);

        Self {
            deriver: FilterShapeDeriver::new(Arc::clone(&registry)),
            compiler: FilterCompiler::new(Arc::clone(&registry)),
            indexer: AdaptiveIndexer::new(config.index_threshold, Arc::clone(&metrics)),
            materializer: Materializer::new(registry, Arc::new(cache), Arc::clone(&metrics)),
            collections: Mutex::new(HashMap::new()),
            context: Arc::new(ResolveContext::new(Arc::clone(&store))),
            store,
            config,
            metrics,
        }
    }

    /// Replaces the context handed to resolvers
    pub fn with_context(mut self, context: ResolveContext) -> Self {
        self.context = Arc::new(context);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<EngineMetrics> {
        &self.metrics
    }

    pub fn indexer(&self) -> &AdaptiveIndexer {
        &self.indexer
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        self.materializer.cache()
    }

    /// Derived filter input shape of a type
    pub fn filter_shape(&self, type_name: &str) -> EngineResult<Arc<FilterShape>> {
        Ok(self.deriver.derive(type_name)?)
    }

    /// Runs a query: all matches in order, or the first match
    pub async fn query(&self, type_name: &str, args: &QueryArgs, first_only: bool) -> EngineResult<QueryOutput> {
        self.run(type_name, args, &[], first_only).await
    }

    /// Unique values at `path` over the query's matches
    pub async fn distinct(&self, type_name: &str, args: &QueryArgs, path: &str) -> EngineResult<Vec<Value>> {
        let projection = [Projection::Distinct(path.to_string())];
        let output = self.run(type_name, args, &projection, false).await?;
        Ok(distinct(output.nodes(), path))
    }

    /// Query matches grouped by the value at `path`
    pub async fn group(&self, type_name: &str, args: &QueryArgs, path: &str) -> EngineResult<Vec<Group>> {
        let projection = [Projection::Group(path.to_string())];
        let output = self.run(type_name, args, &projection, false).await?;
        Ok(group(output.nodes(), path))
    }

    async fn run(
        &self,
        type_name: &str,
        args: &QueryArgs,
        projections: &[Projection],
        first_only: bool,
    ) -> EngineResult<QueryOutput> {
        let result = self.execute(type_name, args, projections, first_only).await;
        match &result {
            Ok(_) => self.metrics.increment_queries_executed(),
            Err(e) => {
                self.metrics.increment_queries_rejected();
                debug!(type_name, code = e.code(), "query failed");
            }
        }
        result
    }

    async fn execute(
        &self,
        type_name: &str,
        args: &QueryArgs,
        projections: &[Projection],
        first_only: bool,
    ) -> EngineResult<QueryOutput> {
        let empty = FilterExpr::new();
        let predicate = self
            .compiler
            .compile(args.filter.as_ref().unwrap_or(&empty), type_name)?;
        if let Some(sort) = &args.sort {
            self.compiler.check_sort(sort, type_name)?;
        }
        for projection in projections {
            self.compiler.resolve_path(type_name, projection.path())?;
        }

        let prepared = self
            .prepare_nodes(type_name, args.filter.as_ref(), args.sort.as_ref(), projections)
            .await?;

        let output = {
            let mut collections = self.collections.lock();
            let collection = collections
                .entry((type_name.to_string(), prepared.resolved))
                .or_insert_with(|| NodeCollection::new(type_name, self.config.max_index_entries));
            if collection.sync(prepared.nodes) {
                self.metrics.increment_collections_synced();
            }

            self.indexer.record_usage(collection, &predicate);
            if let Some(sort) = &args.sort {
                self.indexer.index_sort_fields(collection, sort);
            }

            QueryExecutor::new(&*collection)
                .execute(&predicate, args.sort.as_ref(), first_only)?
                .output
        };

        Ok(output.paginate(args.skip, args.limit))
    }

    /// Nodes of a type carrying every field the filter, sort and
    /// projections need.
    ///
    /// Raw store nodes are returned when none of those fields has a
    /// resolver.
    pub async fn nodes_for_query(
        &self,
        type_name: &str,
        filter: Option<&FilterExpr>,
        sort: Option<&SortSpec>,
        projections: &[Projection],
    ) -> EngineResult<Vec<Arc<Node>>> {
        if let Some(filter) = filter {
            self.compiler.compile(filter, type_name)?;
        }
        Ok(self.prepare_nodes(type_name, filter, sort, projections).await?.nodes)
    }

    async fn prepare_nodes(
        &self,
        type_name: &str,
        filter: Option<&FilterExpr>,
        sort: Option<&SortSpec>,
        projections: &[Projection],
    ) -> EngineResult<PreparedNodes> {
        let nodes = self.store.nodes_by_type(type_name);
        let required = RequiredFields::for_query(filter, sort, projections);

        if required.is_empty() || !self.materializer.needs_resolution(type_name, &required)? {
            return Ok(PreparedNodes { nodes, resolved: None });
        }

        let nodes = self
            .materializer
            .materialize(type_name, &nodes, &required, Arc::clone(&self.context))
            .await?;
        Ok(PreparedNodes {
            nodes,
            resolved: Some(required),
        })
    }

    /// Applies a node store signal
    pub fn handle_signal(&self, signal: &StoreSignal) {
        match signal {
            StoreSignal::CacheCleared => self.invalidate_all(),
            StoreSignal::BootstrapFinished => self.on_bootstrap_finished(),
            StoreSignal::NodeChanged { id, content_digest } => {
                self.invalidate_by_version(id, content_digest)
            }
        }
    }

    /// Resets usage counters, indexes and both resolution caches
    pub fn invalidate_all(&self) {
        self.indexer.reset();
        self.collections.lock().clear();
        self.materializer.cache().invalidate_all();
        self.metrics.increment_invalidations();
        info!("engine state invalidated");
    }

    /// Drops cached resolutions of `id` at other versions
    pub fn invalidate_by_version(&self, id: &str, version: &str) {
        self.materializer.cache().invalidate_by_version(id, version);
        self.metrics.increment_invalidations();
    }

    /// Enters steady state; whole-query caching becomes available
    pub fn on_bootstrap_finished(&self) {
        self.materializer.cache().finish_bootstrap();
        info!("bootstrap finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materialize::BuildPhase;
    use crate::node::MemoryNodeStore;
    use crate::schema::{resolver_fn, ObjectTypeDef, ResolveParams, ResolverError, SchemaBuilder};
    use serde_json::json;

    fn engine() -> (QueryEngine, Arc<MemoryNodeStore>) {
        let registry = SchemaBuilder::new()
            .object_type(
                ObjectTypeDef::new("Post")
                    .node()
                    .field("title", "String")
                    .field("views", "Int")
                    .resolved_field(
                        "shout",
                        "String",
                        resolver_fn(|p: ResolveParams| async move {
                            let title = p.source.get("title").and_then(Value::as_str).unwrap_or_default();
                            Ok::<_, ResolverError>(json!(title.to_uppercase()))
                        }),
                    ),
            )
            .build()
            .unwrap();
        let raw = |id: &str, title: &str, views: i64| {
            Node::from_json(json!({
                "id": id, "title": title, "views": views,
                "internal": { "type": "Post", "contentDigest": "1" }
            }))
            .unwrap()
        };
        let store = Arc::new(MemoryNodeStore::with_nodes([
            raw("a", "alpha", 3),
            raw("b", "beta", 1),
            raw("c", "gamma", 2),
        ]));
        let engine = QueryEngine::new(Arc::new(registry), store.clone(), EngineConfig::default());
        (engine, store)
    }

    fn args(filter: Value) -> QueryArgs {
        QueryArgs::new().with_filter(FilterExpr::from_json(&filter).unwrap())
    }

    #[tokio::test]
    async fn test_query_on_resolved_field() {
        let (engine, _) = engine();
        let out = engine
            .query("Post", &args(json!({ "shout": { "eq": "BETA" } })), false)
            .await
            .unwrap();
        assert_eq!(out.ids(), vec!["b"]);
        assert_eq!(out.nodes()[0].get("shout"), Some(&json!("BETA")));
        assert_eq!(engine.metrics().resolver_invocations(), 3);
    }

    #[tokio::test]
    async fn test_raw_fields_skip_materialization() {
        let (engine, _) = engine();
        let out = engine
            .query("Post", &args(json!({ "views": { "gte": 2 } })), false)
            .await
            .unwrap();
        assert_eq!(out.ids(), vec!["a", "c"]);
        assert_eq!(engine.metrics().resolver_invocations(), 0);
    }

    #[tokio::test]
    async fn test_sort_skip_limit() {
        let (engine, _) = engine();
        let query = QueryArgs::new()
            .with_sort(SortSpec::new().desc("views"))
            .with_skip(1)
            .with_limit(1);
        let out = engine.query("Post", &query, false).await.unwrap();
        assert_eq!(out.ids(), vec!["c"]);
    }

    #[tokio::test]
    async fn test_distinct_and_group() {
        let (engine, _) = engine();
        let values = engine.distinct("Post", &QueryArgs::new(), "shout").await.unwrap();
        assert_eq!(values, vec![json!("ALPHA"), json!("BETA"), json!("GAMMA")]);

        let groups = engine.group("Post", &QueryArgs::new(), "views").await.unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].field_value, json!(1));
    }

    #[tokio::test]
    async fn test_signals() {
        let (engine, store) = engine();
        let filter = args(json!({ "shout": { "eq": "ALPHA" } }));
        engine.query("Post", &filter, false).await.unwrap();
        assert_eq!(engine.cache().node_entries(), 3);

        let signal = store.upsert(
            Node::from_json(json!({
                "id": "a", "title": "omega", "views": 3,
                "internal": { "type": "Post", "contentDigest": "2" }
            }))
            .unwrap(),
        );
        engine.handle_signal(&signal);
        assert_eq!(engine.cache().node_entries(), 2);

        let out = engine.query("Post", &filter, false).await.unwrap();
        assert!(out.is_empty());

        engine.handle_signal(&StoreSignal::BootstrapFinished);
        assert_eq!(engine.cache().phase(), BuildPhase::SteadyState);

        engine.handle_signal(&StoreSignal::CacheCleared);
        assert_eq!(engine.cache().node_entries(), 0);
        assert_eq!(engine.indexer().usage("Post", "shout"), 0);
    }

    #[tokio::test]
    async fn test_alternating_raw_and_resolved_queries_keep_indexes() {
        let (engine, _) = engine();
        let views = args(json!({ "views": { "gte": 2 } }));
        let shout = args(json!({ "shout": { "eq": "BETA" } }));

        for _ in 0..5 {
            engine.query("Post", &views, false).await.unwrap();
        }
        assert_eq!(engine.metrics().indexes_built(), 1);

        for _ in 0..4 {
            assert_eq!(engine.query("Post", &shout, false).await.unwrap().ids(), vec!["b"]);
            assert_eq!(engine.query("Post", &views, false).await.unwrap().ids(), vec!["a", "c"]);
        }

        let snapshot = engine.metrics().snapshot();
        assert_eq!(snapshot.collections_synced, 2);
        assert_eq!(snapshot.indexes_built, 1);
        assert_eq!(snapshot.resolver_invocations, 3);
    }

    #[tokio::test]
    async fn test_store_change_resyncs_collection() {
        let (engine, store) = engine();
        let views = args(json!({ "views": { "gte": 2 } }));
        engine.query("Post", &views, false).await.unwrap();

        let signal = store.upsert(
            Node::from_json(json!({
                "id": "b", "title": "beta", "views": 9,
                "internal": { "type": "Post", "contentDigest": "2" }
            }))
            .unwrap(),
        );
        engine.handle_signal(&signal);

        let out = engine.query("Post", &views, false).await.unwrap();
        assert_eq!(out.ids(), vec!["a", "b", "c"]);
        assert_eq!(engine.metrics().snapshot().collections_synced, 2);
    }

    #[tokio::test]
    async fn test_errors_are_counted() {
        let (engine, _) = engine();
        let err = engine
            .query("Post", &args(json!({ "nope": { "eq": 1 } })), false)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NQ_UNKNOWN_FIELD");
        assert_eq!(engine.metrics().snapshot().queries_rejected, 1);

        let err = engine.query("Missing", &QueryArgs::new(), false).await.unwrap_err();
        assert_eq!(err.code(), "NQ_UNKNOWN_TYPE");
    }
}
