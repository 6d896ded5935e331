//! Relation reducer behaviour across kinds and query policies


use attrform_core::{
    EngineConfig, JsonAttributes, MemoryHost, QueryPolicy, ReducerPipeline, ReducerRegistry,
    RelationConfig, Schema,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_support::*;

fn tag_schema() -> Arc<Schema> {
    Arc::new(Schema::object().named("tag").property("id", Schema::string()))
}

fn tagged_attributes(relation: RelationConfig) -> JsonAttributes {
    let schema = Schema::object().property("tags", Schema::array_of(tag_schema()));
    let pipeline = ReducerPipeline::new(
        ReducerRegistry::with_builtins(),
        EngineConfig::new().with_relation(relation),
    )
    .unwrap();
    JsonAttributes::new(pipeline)
        .attribute_with_reducers("meta", schema, &["relation:tags".into()])
        .unwrap()
}

fn tag_host() -> MemoryHost {
    MemoryHost::new().with_records(
        "tags",
        vec![json!({"id": "a", "label": "A"}), json!({"id": "b", "label": "B"})],
    )
}

#[test]
fn test_many_to_many_links_keep_their_path() {
    let attributes = tagged_attributes(
        RelationConfig::belongs_to_many("tags", "tag").with_path_column("handle"),
    );
    let mut host = tag_host();

    attributes
        .write(&mut host, "meta", json!({"tags": [{"id": "b"}, {"id": "a"}]}))
        .unwrap();
    attributes.save(&mut host).unwrap();

    let links = &host.table("tags").unwrap().links;
    assert_eq!(links.len(), 2);
    assert_eq!(links[0].key, "b");
    assert_eq!(links[0].path.as_deref(), Some("tags.0"));
    assert_eq!(links[1].path.as_deref(), Some("tags.1"));
    // many-to-many never touches the related record
    assert!(host.table("tags").unwrap().records[0].get("test_id").is_none());
}

#[test]
fn test_duplicate_keys_attach_once() {
    let attributes = tagged_attributes(RelationConfig::belongs_to_many("tags", "tag"));
    let mut host = tag_host();

    attributes
        .write(&mut host, "meta", json!({"tags": ["a", "a", "b"]}))
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.attached(), vec!["a", "b"]);
    assert_eq!(host.journal().len(), 2);
}

#[test]
fn test_query_policy_never() {
    let attributes = tagged_attributes(
        RelationConfig::belongs_to_many("tags", "tag").with_query_policy(QueryPolicy::Never),
    );
    let mut host = tag_host();
    attributes
        .write(&mut host, "meta", json!({"tags": ["a"]}))
        .unwrap();

    let read = attributes.read(&mut host, "meta").unwrap();
    assert_eq!(read["tags"], json!([null]));
}

#[test]
fn test_query_policy_always_on_persisted_record() {
    let attributes = tagged_attributes(
        RelationConfig::belongs_to_many("tags", "tag").with_query_policy(QueryPolicy::Always),
    );
    let mut host = tag_host().persisted();
    attributes
        .write(&mut host, "meta", json!({"tags": ["b"]}))
        .unwrap();

    let read = attributes.read(&mut host, "meta").unwrap();
    assert_eq!(read["tags"], json!([{"id": "b", "label": "B"}]));
}

#[test]
fn test_update_on_set_writes_back() {
    let attributes = tagged_attributes(
        RelationConfig::belongs_to_many("tags", "tag").with_update_on_set(true),
    );
    let mut host = tag_host();

    attributes
        .write(&mut host, "meta", json!({"tags": [{"id": "a", "label": "Renamed"}]}))
        .unwrap();

    assert_eq!(host.table("tags").unwrap().find("a").unwrap()["label"], "Renamed");
    assert_eq!(host.attribute_value("meta").unwrap(), json!({"tags": ["a"]}));
}

#[test]
fn test_missing_record_at_commit_is_reported() {
    let attributes = attributes();
    let mut host = children_host(1);

    attributes
        .write(&mut host, "data", json!({"children": ["1", "7"]}))
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.attached(), vec!["1"]);
    assert_eq!(report.reconciliations[0].misses, vec!["7".to_string()]);
    assert_eq!(host.linked_keys("children"), vec!["1"]);
}

#[test]
fn test_missed_key_attaches_once_its_record_exists() {
    let attributes = attributes();
    let mut host = children_host(1);

    attributes
        .write(&mut host, "data", json!({"children": ["1", "7"]}))
        .unwrap();
    let first = attributes.save(&mut host).unwrap();
    assert_eq!(first.attached(), vec!["1"]);
    let stored = host.attribute_value("data").unwrap();
    assert_eq!(
        stored[NAMESPACE]["relation:children"]["current"]["children"],
        json!({"children.0": "1"})
    );

    let mut host = host.with_records("children", vec![child_record("7")]);
    let second = attributes.save(&mut host).unwrap();

    assert_eq!(second.attached(), vec!["7"]);
    assert!(second.reconciliations[0].misses.is_empty());
    assert_eq!(host.linked_keys("children"), vec!["1", "7"]);
}

#[test]
fn test_single_child_and_list_share_one_generation() {
    let attributes = attributes();
    let mut host = children_host(3);

    attributes
        .write(
            &mut host,
            "data",
            json!({"children": ["1", "2"], "child": "2"}),
        )
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.attached(), vec!["1", "2"]);
    let stored = host.attribute_value("data").unwrap();
    assert_eq!(
        stored[NAMESPACE]["relation:children"]["current"]["children"],
        json!({"children.0": "1", "children.1": "2", "child": "2"})
    );
}

#[test]
fn test_custom_metadata_namespace() {
    let config = EngineConfig::new()
        .with_metadata_namespace("_links")
        .with_relation(children_relation());
    let pipeline = ReducerPipeline::new(ReducerRegistry::with_builtins(), config).unwrap();
    let attributes = JsonAttributes::new(pipeline)
        .attribute_with_reducers("data", data_schema(), &["relation:children".into()])
        .unwrap();
    let mut host = children_host(1);

    attributes
        .write(&mut host, "data", json!({"children": ["1"]}))
        .unwrap();
    attributes.save(&mut host).unwrap();

    let stored = host.attribute_value("data").unwrap();
    assert!(stored.get("_links").is_some());
    assert!(stored.get(NAMESPACE).is_none());
    assert!(attributes.read(&mut host, "data").unwrap().get("_links").is_none());
}
