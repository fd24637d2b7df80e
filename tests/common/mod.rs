//! Shared fixture: the three `Test` nodes and their type definitions

#![allow(dead_code)]

use std::sync::Arc;

use nodequery::compiler::{FilterExpr, QueryArgs, SortSpec};
use nodequery::executor::QueryOutput;
use nodequery::node::{MemoryNodeStore, Node};
use nodequery::schema::{ObjectTypeDef, SchemaBuilder, SchemaRegistry};
use nodequery::{EngineConfig, QueryEngine};
use serde_json::{json, Value};

pub fn schema() -> SchemaBuilder {
    SchemaBuilder::new()
        .object_type(ObjectTypeDef::new("TestKey").field("withEmptyArray", "[Int]"))
        .object_type(
            ObjectTypeDef::new("TestWithANested")
                .field("nestedKey", "String")
                .field("emptyArray", "[String]")
                .field("anotherEmptyArray", "[String]"),
        )
        .object_type(ObjectTypeDef::new("TestAnotherKey").field("withANested", "TestWithANested"))
        .object_type(
            ObjectTypeDef::new("TestFrontmatter")
                .field("date", "Date")
                .field("title", "String")
                .field("tags", "[String]")
                .field("blue", "Int")
                .field("circle", "String"),
        )
        .object_type(
            ObjectTypeDef::new("TestAnObjectArray")
                .field("aString", "String")
                .field("aNumber", "Int")
                .field("aBoolean", "Boolean")
                .field("anArray", "[Int]"),
        )
        .object_type(ObjectTypeDef::new("TestWaxOnly").field("foo", "Boolean"))
        .object_type(ObjectTypeDef::new("TestDocumentData").field("tag", "String"))
        .object_type(
            ObjectTypeDef::new("TestDocument")
                .field("data", "TestDocumentData")
                .field("number", "Int"),
        )
        .object_type(ObjectTypeDef::new("TestTag").field("document", "[TestDocument]"))
        .object_type(ObjectTypeDef::new("TestDataTags").field("tag", "TestTag"))
        .object_type(ObjectTypeDef::new("TestData").field("tags", "[TestDataTags]"))
        .object_type(
            ObjectTypeDef::new("Test")
                .node()
                .field("index", "Int")
                .field("name", "String")
                .field("string", "String")
                .field("float", "Float")
                .field("hair", "Int")
                .field("date", "Date")
                .field("anArray", "[Int]")
                .field("key", "TestKey")
                .field("anotherKey", "TestAnotherKey")
                .field("frontmatter", "TestFrontmatter")
                .field("anObjectArray", "[TestAnObjectArray]")
                .field("boolean", "Boolean")
                .field("waxOnly", "TestWaxOnly")
                .field("data", "TestData"),
        )
}

pub fn registry() -> Arc<SchemaRegistry> {
    Arc::new(schema().build().unwrap())
}

pub fn node_values() -> Vec<Value> {
    vec![
        json!({
            "id": "0",
            "parent": null,
            "children": [],
            "internal": { "type": "Test", "contentDigest": "0" },
            "index": 0,
            "name": "The Mad Max",
            "string": "a",
            "float": 1.5,
            "hair": 1,
            "date": "2006-07-22T22:39:53.000Z",
            "anArray": [1, 2, 3, 4],
            "key": { "withEmptyArray": [] },
            "anotherKey": {
                "withANested": { "nestedKey": "foo", "emptyArray": [], "anotherEmptyArray": [] }
            },
            "frontmatter": {
                "date": "2006-07-22T22:39:53.000Z",
                "title": "The world of dash and adventure",
                "tags": ["moo", "foo"],
                "blue": 100
            },
            "anObjectArray": [
                { "aString": "some string", "aNumber": 2, "aBoolean": true },
                { "aString": "some string", "aNumber": 2, "anArray": [1, 2] }
            ],
            "boolean": true
        }),
        json!({
            "id": "1",
            "parent": null,
            "children": [],
            "internal": { "type": "Test", "contentDigest": "1" },
            "index": 1,
            "name": "The Mad Wax",
            "string": "b",
            "float": 2.5,
            "hair": 2,
            "anArray": [1, 2, 5, 4],
            "waxOnly": { "foo": true },
            "anotherKey": { "withANested": { "nestedKey": "foo" } },
            "frontmatter": {
                "date": "2006-07-22T22:39:53.000Z",
                "title": "The world of slash and adventure",
                "blue": 10010,
                "circle": "happy"
            },
            "boolean": false,
            "data": {
                "tags": [
                    { "tag": { "document": [{ "data": { "tag": "Design System" }, "number": 3 }] } }
                ]
            }
        }),
        json!({
            "id": "2",
            "parent": null,
            "children": [],
            "internal": { "type": "Test", "contentDigest": "2" },
            "index": 2,
            "name": "The Mad Wax",
            "string": "c",
            "float": 3.5,
            "hair": 0,
            "date": "2006-07-29T22:39:53.000Z",
            "waxOnly": null,
            "anotherKey": { "withANested": { "nestedKey": "bar" } },
            "frontmatter": {
                "date": "2006-07-22T22:39:53.000Z",
                "title": "The world of shave and adventure",
                "blue": 10010,
                "circle": "happy"
            },
            "data": {
                "tags": [
                    { "tag": { "document": [{ "data": { "tag": "Gatsby" } }] } },
                    { "tag": { "document": [{ "data": { "tag": "Design System" }, "number": 5 }] } }
                ]
            }
        }),
    ]
}

pub fn nodes() -> Vec<Node> {
    node_values()
        .into_iter()
        .map(|value| Node::from_json(value).unwrap())
        .collect()
}

pub fn store() -> Arc<MemoryNodeStore> {
    Arc::new(MemoryNodeStore::with_nodes(nodes()))
}

pub fn engine() -> QueryEngine {
    engine_with(EngineConfig::default())
}

pub fn engine_with(config: EngineConfig) -> QueryEngine {
    QueryEngine::new(registry(), store(), config)
}

pub fn filter_args(filter: Value) -> QueryArgs {
    QueryArgs::new().with_filter(FilterExpr::from_json(&filter).unwrap())
}

pub fn sort_args(sort: Value) -> QueryArgs {
    QueryArgs::new().with_sort(SortSpec::from_json(&sort).unwrap())
}

pub async fn run_filter(engine: &QueryEngine, filter: Value) -> Vec<Arc<Node>> {
    engine
        .query("Test", &filter_args(filter), false)
        .await
        .unwrap()
        .into_vec()
}

pub async fn run_query(engine: &QueryEngine, args: &QueryArgs) -> QueryOutput {
    engine.query("Test", args, false).await.unwrap()
}

pub fn ids(nodes: &[Arc<Node>]) -> Vec<&str> {
    nodes.iter().map(|n| n.id()).collect()
}
