//! Resolver-aware materializer
//!
//! Produces node snapshots carrying the fields a query needs. Fields on one
//! object resolve strictly in order, each resolver seeing the fields
//! resolved before it. Nodes resolve concurrently and are joined; one
//! failing node fails the whole batch.

use std::sync::Arc;

use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::cache::{NodeKey, QueryKey, ResolutionCache};
use super::errors::{MaterializeError, MaterializeResult};
use crate::compiler::{RequiredField, RequiredFields};
use crate::node::Node;
use crate::observability::EngineMetrics;
use crate::schema::{ObjectType, ResolveContext, ResolveInfo, ResolveParams, TypeRegistry};

/// Materializes required fields on nodes, memoizing per node and per query
#[derive(Clone)]
pub struct Materializer {
    registry: Arc<dyn TypeRegistry>,
    cache: Arc<ResolutionCache>,
    metrics: Arc<EngineMetrics>,
}

impl Materializer {
    pub fn new(
        registry: Arc<dyn TypeRegistry>,
        cache: Arc<ResolutionCache>,
        metrics: Arc<EngineMetrics>,
    ) -> Self {
        Self {
            registry,
            cache,
            metrics,
        }
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    /// Whether any required field (at any depth) is computed by a resolver
    pub fn needs_resolution(&self, type_name: &str, fields: &RequiredFields) -> MaterializeResult<bool> {
        let object_type = self.object_type(type_name)?;
        self.has_resolver(&object_type, fields)
    }

    fn has_resolver(&self, object_type: &ObjectType, fields: &RequiredFields) -> MaterializeResult<bool> {
        for (name, required) in fields.fields() {
            let field = object_type
                .field(name)
                .ok_or_else(|| MaterializeError::unknown_field(object_type.name(), name))?;
            if field.resolver().is_some() {
                return Ok(true);
            }
            if let (RequiredField::Nested(sub), Some(nested)) = (required, field.kind().object_type()) {
                let nested = self.object_type(nested)?;
                if self.has_resolver(&nested, sub)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Returns snapshots of `nodes`, in the same order, carrying `fields`.
    ///
    /// Stored nodes are never modified.
    pub async fn materialize(
        &self,
        type_name: &str,
        nodes: &[Arc<Node>],
        fields: &RequiredFields,
        context: Arc<ResolveContext>,
    ) -> MaterializeResult<Vec<Arc<Node>>> {
        if !self.cache.query_cache_active() {
            return self
                .clone()
                .materialize_all(type_name.to_string(), nodes.to_vec(), fields.clone(), context)
                .await;
        }

        let key = QueryKey {
            type_name: type_name.to_string(),
            node_count: nodes.len(),
            fields: fields.clone(),
        };
        let (shared, hit) = self.cache.query_entry(key.clone(), || {
            self.clone()
                .materialize_all(type_name.to_string(), nodes.to_vec(), fields.clone(), context)
                .boxed()
        });
        if hit {
            self.metrics.increment_query_cache_hits();
        } else {
            self.metrics.increment_query_cache_misses();
        }

        let result = shared.clone().await;
        if result.is_err() {
            self.cache.evict_query(&key, &shared);
        }
        result
    }

    async fn materialize_all(
        self,
        type_name: String,
        nodes: Vec<Arc<Node>>,
        fields: RequiredFields,
        context: Arc<ResolveContext>,
    ) -> MaterializeResult<Vec<Arc<Node>>> {
        let object_type = self.object_type(&type_name)?;
        debug!(type_name = %type_name, nodes = nodes.len(), fields = %fields, "materializing nodes");

        let tasks = nodes
            .into_iter()
            .map(|node| self.materialize_node(Arc::clone(&object_type), node, &fields, &context));
        try_join_all(tasks).await
    }

    fn materialize_node(
        &self,
        object_type: Arc<ObjectType>,
        node: Arc<Node>,
        fields: &RequiredFields,
        context: &Arc<ResolveContext>,
    ) -> BoxFuture<'static, MaterializeResult<Arc<Node>>> {
        let resolve = self
            .clone()
            .resolve_node(object_type, Arc::clone(&node), fields.clone(), Arc::clone(context));

        if !self.cache.node_cache_enabled() {
            return resolve.boxed();
        }

        let key = NodeKey::new(&node, fields);
        let (shared, hit) = self.cache.node_entry(key.clone(), || resolve.boxed());
        if hit {
            self.metrics.increment_node_cache_hits();
        } else {
            self.metrics.increment_node_cache_misses();
        }

        let cache = Arc::clone(&self.cache);
        async move {
            let result = shared.clone().await;
            if result.is_err() {
                cache.evict_node(&key, &shared);
            }
            result
        }
        .boxed()
    }

    async fn resolve_node(
        self,
        object_type: Arc<ObjectType>,
        node: Arc<Node>,
        fields: RequiredFields,
        context: Arc<ResolveContext>,
    ) -> MaterializeResult<Arc<Node>> {
        let body = self
            .resolve_object(&object_type, node.id(), node.body().clone(), &fields, &context)
            .await?;
        Ok(Arc::new(node.with_body(body)))
    }

    /// Resolves `fields` on one object, in order
    fn resolve_object<'a>(
        &'a self,
        object_type: &'a ObjectType,
        node_id: &'a str,
        mut source: Map<String, Value>,
        fields: &'a RequiredFields,
        context: &'a Arc<ResolveContext>,
    ) -> BoxFuture<'a, MaterializeResult<Map<String, Value>>> {
        async move {
            for (name, required) in fields.fields() {
                let field = object_type
                    .field(name)
                    .ok_or_else(|| MaterializeError::unknown_field(object_type.name(), name))?;

                let value = match field.resolver() {
                    Some(resolver) => {
                        self.metrics.increment_resolver_invocations();
                        let params = ResolveParams {
                            source: source.clone(),
                            args: field.default_args().clone(),
                            context: Arc::clone(context),
                            info: ResolveInfo {
                                field_name: name.clone(),
                                parent_type: object_type.name().to_string(),
                                return_type: field.declared_type().to_string(),
                            },
                        };
                        resolver.resolve(params).await.map_err(|e| {
                            warn!(
                                type_name = object_type.name(),
                                field = %name,
                                node_id,
                                error = %e,
                                "resolver failed"
                            );
                            MaterializeError::resolution_failure(object_type.name(), name, node_id, &e)
                        })?
                    }
                    None => match source.get(name) {
                        Some(value) => value.clone(),
                        None => continue,
                    },
                };

                let value = match (required, field.kind().object_type()) {
                    (RequiredField::Nested(sub), Some(nested)) if !value.is_null() => {
                        let nested_type = self.object_type(nested)?;
                        self.resolve_value(&nested_type, node_id, value, sub, context).await?
                    }
                    _ => value,
                };
                source.insert(name.clone(), value);
            }
            Ok(source)
        }
        .boxed()
    }

    /// Resolves nested fields inside an object value, element-wise for lists
    fn resolve_value<'a>(
        &'a self,
        object_type: &'a ObjectType,
        node_id: &'a str,
        value: Value,
        fields: &'a RequiredFields,
        context: &'a Arc<ResolveContext>,
    ) -> BoxFuture<'a, MaterializeResult<Value>> {
        async move {
            match value {
                Value::Array(items) => {
                    let items = try_join_all(
                        items
                            .into_iter()
                            .map(|item| self.resolve_value(object_type, node_id, item, fields, context)),
                    )
                    .await?;
                    Ok(Value::Array(items))
                }
                Value::Object(map) => Ok(Value::Object(
                    self.resolve_object(object_type, node_id, map, fields, context).await?,
                )),
                other => Ok(other),
            }
        }
        .boxed()
    }

    fn object_type(&self, name: &str) -> MaterializeResult<Arc<ObjectType>> {
        self.registry
            .object_type(name)
            .ok_or_else(|| MaterializeError::unknown_type(name))
    }
}
