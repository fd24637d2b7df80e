//! Field resolvers
//!
//! A resolver computes a field's value from the snapshot being materialized.
//! Resolvers may suspend (e.g. to follow a link through the node store).

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::NodeStore;

/// Metadata handed to a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveInfo {
    pub field_name: String,
    pub parent_type: String,
    /// Declared return type, e.g. `[Node!]!`
    pub return_type: String,
}

/// Caller context shared by every resolver invocation of one query
#[derive(Clone)]
pub struct ResolveContext {
    store: Arc<dyn NodeStore>,
    path: Option<String>,
}

impl ResolveContext {
    pub fn new(store: Arc<dyn NodeStore>) -> Self {
        Self { store, path: None }
    }

    /// Attaches the request path (e.g. the page being built)
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn store(&self) -> &Arc<dyn NodeStore> {
        &self.store
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl fmt::Debug for ResolveContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolveContext")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Owned inputs of one resolver invocation
#[derive(Debug, Clone)]
pub struct ResolveParams {
    /// Snapshot of the object being materialized, including fields resolved
    /// earlier in the same pass
    pub source: Map<String, Value>,
    pub args: Map<String, Value>,
    pub context: Arc<ResolveContext>,
    pub info: ResolveInfo,
}

/// Error raised by a resolver
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ResolverError {
    message: String,
}

impl ResolverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Computes a field value
pub trait FieldResolver: Send + Sync {
    fn resolve(&self, params: ResolveParams) -> BoxFuture<'static, Result<Value, ResolverError>>;
}

struct FnResolver<F>(F);

impl<F, Fut> FieldResolver for FnResolver<F>
where
    F: Fn(ResolveParams) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
{
    fn resolve(&self, params: ResolveParams) -> BoxFuture<'static, Result<Value, ResolverError>> {
        Box::pin((self.0)(params))
    }
}

/// Wraps an async closure as a resolver
pub fn resolver_fn<F, Fut>(f: F) -> Arc<dyn FieldResolver>
where
    F: Fn(ResolveParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, ResolverError>> + Send + 'static,
{
    Arc::new(FnResolver(f))
}

/// Follows references stored in the field to other nodes.
///
/// The raw field value holds either one reference or a list of them. By
/// default references are node ids; `by_field` matches a field of the
/// target type instead.
#[derive(Debug, Clone)]
pub struct LinkResolver {
    by: Option<(String, String)>,
}

impl LinkResolver {
    /// Links by node id
    pub fn by_id() -> Self {
        Self { by: None }
    }

    /// Links by equality on `field` of nodes of `target_type`
    pub fn by_field(field: impl Into<String>, target_type: impl Into<String>) -> Self {
        Self {
            by: Some((field.into(), target_type.into())),
        }
    }

    fn lookup(&self, store: &dyn NodeStore, reference: &Value) -> Value {
        let found = match &self.by {
            None => reference.as_str().and_then(|id| store.node(id)),
            Some((field, target_type)) => store
                .nodes_by_type(target_type)
                .into_iter()
                .find(|n| n.get(field) == Some(reference)),
        };
        found.map(|n| n.to_json()).unwrap_or(Value::Null)
    }
}

impl FieldResolver for LinkResolver {
    fn resolve(&self, params: ResolveParams) -> BoxFuture<'static, Result<Value, ResolverError>> {
        let this = self.clone();
        Box::pin(async move {
            let store = params.context.store();
            let resolved = match params.source.get(&params.info.field_name) {
                None | Some(Value::Null) => Value::Null,
                Some(Value::Array(refs)) => Value::Array(
                    refs.iter()
                        .map(|r| this.lookup(store.as_ref(), r))
                        .filter(|v| !v.is_null())
                        .collect(),
                ),
                Some(reference) => this.lookup(store.as_ref(), reference),
            };
            Ok(resolved)
        })
    }
}
