//! JSON Schema validation through the attribute lifecycle

use attrform_core::{
    EngineConfig, Error, JsonAttributes, MemoryHost, ReducerPipeline, ReducerRegistry,
    RelationConfig, SchemaRegistry,
};
use attrform_schemas::JsonSchemaValidator;
use pretty_assertions::assert_eq;
use serde_json::json;

fn name_attributes() -> JsonAttributes {
    let schema = SchemaRegistry::new()
        .parse(&json!({"type": "object", "properties": {"name": {"type": "string"}}}))
        .unwrap();
    JsonAttributes::new(ReducerPipeline::default())
        .with_validator(JsonSchemaValidator::new())
        .attribute("data", schema)
        .unwrap()
}

/// Registry with a `child` item schema and a `page` schema referring to it
fn page_registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry
        .parse_and_register(
            "child",
            &json!({
                "type": "object",
                "properties": {"id": {"type": "string"}, "name": {"type": "string"}}
            }),
        )
        .unwrap();
    registry
        .parse_and_register(
            "page",
            &json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string"},
                    "slug": {"type": "string"},
                    "children": {"type": "array", "items": "child"}
                },
                "reducers": ["slug", "relation:children"]
            }),
        )
        .unwrap();
    registry
}

fn page_attributes() -> JsonAttributes {
    let registry = page_registry();
    let config = EngineConfig::new()
        .with_relation(RelationConfig::has_many("children", "child", "page_id"));
    let pipeline = ReducerPipeline::new(ReducerRegistry::with_builtins(), config).unwrap();
    JsonAttributes::new(pipeline)
        .with_validator(JsonSchemaValidator::new())
        .attribute("data", registry.resolve("page").unwrap())
        .unwrap()
}

fn child_host() -> MemoryHost {
    MemoryHost::new().with_records(
        "children",
        vec![
            json!({"id": "1", "name": "first"}),
            json!({"id": "2", "name": "second"}),
        ],
    )
}

#[test]
fn test_invalid_value_raises_validation_failure() {
    let attributes = name_attributes();
    let mut host = MemoryHost::new();
    attributes
        .write(&mut host, "data", json!({"name": 1}))
        .unwrap();

    let err = attributes.validate(&mut host).unwrap_err();
    let failure = err.as_validation().expect("validation failure");
    assert!(failure.messages().contains_key("name"));
    assert_eq!(failure.prefix(), Some("data"));
    assert!(err
        .to_string()
        .starts_with("Error(s) while validating the schema:\n[data.name]: "));
}

#[test]
fn test_valid_value_passes() {
    let attributes = name_attributes();
    let mut host = MemoryHost::new();
    attributes
        .write(&mut host, "data", json!({"name": "ok"}))
        .unwrap();

    assert!(attributes.validate(&mut host).is_ok());
}

#[test]
fn test_failure_blocks_persistence() {
    let attributes = name_attributes();
    let mut host = MemoryHost::new();
    attributes
        .write(&mut host, "data", json!({"name": ["not", "a", "string"]}))
        .unwrap();

    let err = attributes.save(&mut host).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(host.persist_count(), 0);
}

#[test]
fn test_relation_keys_validate_as_records() {
    let attributes = page_attributes();
    let mut host = child_host();

    attributes
        .write(
            &mut host,
            "data",
            json!({"name": "Home Page", "children": [{"id": "1"}, {"id": "2"}]}),
        )
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.attached(), vec!["1", "2"]);
    let stored = host.attribute_value("data").unwrap();
    assert_eq!(stored["slug"], "home-page");
    assert_eq!(stored["children"], json!(["1", "2"]));
}

#[test]
fn test_nested_failure_path() {
    let attributes = page_attributes();
    // stored directly so the set phase never sees the bad record
    let mut host = child_host().with_attribute(
        "data",
        &json!({"name": "Home", "children": [{"id": "1", "name": 5}]}),
    );

    let err = attributes.save(&mut host).unwrap_err();
    let failure = err.as_validation().unwrap();
    assert_eq!(failure.paths(), vec!["data.children.0.name"]);
    assert!(host.journal().is_empty());
}
