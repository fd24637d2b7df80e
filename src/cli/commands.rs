//! CLI command implementations
//!
//! Each command loads its inputs, runs once and writes one JSON response
//! to stdout. Logs go to stderr.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::compiler::QueryArgs;
use crate::engine::{EngineConfig, QueryEngine};
use crate::error::EngineError;
use crate::executor::QueryOutput;
use crate::filter::FilterShapeDeriver;
use crate::node::{MemoryNodeStore, Node};
use crate::schema::{SchemaLoader, SchemaRegistry};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};

/// Request accepted by the `query` command.
///
/// `filter`, `sort`, `skip` and `limit` are read as [`QueryArgs`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    first_only: bool,
}

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args().command)
}

/// Run a parsed command
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Query {
            schema,
            nodes,
            config,
        } => query(&schema, &nodes, config.as_deref()),
        Command::Shape { schema, type_name } => shape(&schema, &type_name),
    }
}

/// Execute one query read from stdin
pub fn query(schema_path: &Path, nodes_path: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let engine = load_engine(schema_path, nodes_path, config_path)?;
    let request = read_request()?;

    match execute_request(&engine, &request) {
        Ok(output) => write_response(output.to_json()),
        Err(e) => {
            write_error(e.code_str(), e.message())?;
            Err(e)
        }
    }
}

/// Print the derived filter shape of one type
pub fn shape(schema_path: &Path, type_name: &str) -> CliResult<()> {
    let registry = load_registry(schema_path)?;
    let deriver = FilterShapeDeriver::new(registry);
    let shape = deriver
        .derive(type_name)
        .map_err(|e| CliError::from(EngineError::from(e)))?;
    write_response(shape.to_json())
}

/// Runs a parsed request against an engine on a single-threaded runtime
pub fn execute_request(engine: &QueryEngine, request: &Value) -> CliResult<QueryOutput> {
    let header: QueryRequest = serde_json::from_value(request.clone())
        .map_err(|e| CliError::invalid_request(format!("Invalid query request: {}", e)))?;
    let args = QueryArgs::from_json(request)
        .map_err(|e| CliError::from(EngineError::from(e)))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let output = runtime.block_on(engine.query(&header.type_name, &args, header.first_only))?;
    Ok(output)
}

/// Builds an engine from schema, nodes and optional config files
pub fn load_engine(
    schema_path: &Path,
    nodes_path: &Path,
    config_path: Option<&Path>,
) -> CliResult<QueryEngine> {
    let registry = load_registry(schema_path)?;
    let store = Arc::new(load_nodes(nodes_path)?);
    let config = match config_path {
        Some(path) => EngineConfig::from_file(path)
            .map_err(|e| CliError::input_error(e.to_string()))?,
        None => EngineConfig::default(),
    };

    info!(nodes = store.len(), "engine loaded");
    Ok(QueryEngine::new(registry, store, config))
}

fn load_registry(path: &Path) -> CliResult<Arc<SchemaRegistry>> {
    let registry = SchemaLoader::from_file(path)
        .and_then(|builder| builder.build())
        .map_err(|e| CliError::input_error(e.to_string()))?;
    Ok(Arc::new(registry))
}

fn load_nodes(path: &Path) -> CliResult<MemoryNodeStore> {
    let content = fs::read_to_string(path).map_err(|e| {
        CliError::input_error(format!("Failed to read nodes {}: {}", path.display(), e))
    })?;
    let values: Vec<Value> = serde_json::from_str(&content)
        .map_err(|e| CliError::input_error(format!("Invalid nodes JSON: {}", e)))?;

    let nodes = values
        .into_iter()
        .map(Node::from_json)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| CliError::input_error(e.to_string()))?;
    Ok(MemoryNodeStore::with_nodes(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn engine() -> QueryEngine {
        let schema = file(
            r#"{ "types": [{ "name": "Post", "node": true, "fields": { "title": "String", "views": "Int" } }] }"#,
        );
        let nodes = file(
            r#"[
                { "id": "a", "title": "alpha", "views": 3, "internal": { "type": "Post" } },
                { "id": "b", "title": "beta", "views": 1, "internal": { "type": "Post" } }
            ]"#,
        );
        load_engine(schema.path(), nodes.path(), None).unwrap()
    }

    #[test]
    fn test_execute_request() {
        let engine = engine();
        let request = json!({
            "type": "Post",
            "filter": { "views": { "gt": 0 } },
            "sort": { "fields": ["views"] },
            "firstOnly": true
        });
        let output = execute_request(&engine, &request).unwrap();
        assert_eq!(output.to_json()["id"], "b");
    }

    #[test]
    fn test_request_without_type_rejected() {
        let err = execute_request(&engine(), &json!({ "filter": {} })).unwrap_err();
        assert_eq!(err.code_str(), "NQ_CLI_INVALID_REQUEST");
    }

    #[test]
    fn test_engine_error_code_surfaces() {
        let request = json!({ "type": "Post", "filter": { "title": { "near": 1 } } });
        let err = execute_request(&engine(), &request).unwrap_err();
        assert_eq!(err.code_str(), "NQ_MALFORMED_QUERY");
    }

    #[test]
    fn test_bad_nodes_file() {
        let schema = file(r#"{ "types": [] }"#);
        let nodes = file(r#"[{ "id": "a" }]"#);
        match load_engine(schema.path(), nodes.path(), None) {
            Err(err) => assert_eq!(err.code_str(), "NQ_CLI_INPUT_ERROR"),
            Ok(_) => panic!("node without internal.type should be rejected"),
        }
    }
}
