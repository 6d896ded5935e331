//! End-to-end tests for attribute reads, writes and save cycles over the memory host


use attrform_core::{
    AttributeValidator, Error, Host, LinkOperation, Messages, Phase, Result, ValidationFailure,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_support::*;

#[test]
fn test_write_derives_slug() {
    let attributes = attributes();
    let mut host = children_host(0);

    attributes
        .write(&mut host, "data", json!({"name": "Foo Bar"}))
        .unwrap();

    let stored = host.attribute_value("data").unwrap();
    assert_eq!(stored, json!({"name": "Foo Bar", "slug": "foo-bar"}));
}

#[test]
fn test_set_stores_keys_and_get_expands_them() {
    let attributes = attributes();
    let mut host = children_host(3);

    attributes
        .write(
            &mut host,
            "data",
            json!({
                "name": "Parent",
                "children": [child_record("1"), child_record("2")],
                "child": child_record("3")
            }),
        )
        .unwrap();

    let stored = host.attribute_value("data").unwrap();
    assert_eq!(stored["children"], json!(["1", "2"]));
    assert_eq!(stored["child"], json!("3"));

    // a new record may query its relations directly
    let read = attributes.read(&mut host, "data").unwrap();
    assert_eq!(read["children"], json!([child_record("1"), child_record("2")]));
    assert_eq!(read["child"], child_record("3"));
}

#[test]
fn test_set_creates_records_without_key() {
    let attributes = attributes();
    let mut host = children_host(3);

    attributes
        .write(
            &mut host,
            "data",
            json!({"name": "Parent", "children": [{"name": "fresh"}]}),
        )
        .unwrap();

    let stored = host.attribute_value("data").unwrap();
    assert_eq!(stored["children"], json!(["4"]));
    let created = host.table("children").unwrap().find("4").unwrap();
    assert_eq!(created["name"], "fresh");
}

#[test]
fn test_save_attaches_new_children() {
    let attributes = attributes();
    let mut host = children_host(2);

    attributes
        .write(
            &mut host,
            "data",
            json!({"name": "Parent", "children": [child_record("1"), child_record("2")]}),
        )
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.attached(), vec!["1", "2"]);
    assert!(report.detached().is_empty());
    assert_eq!(report.persisted, 2);
    assert_eq!(host.linked_keys("children"), vec!["1", "2"]);
    assert_eq!(
        host.table("children").unwrap().records[0]["test_id"],
        json!("1")
    );

    let stored = host.attribute_value("data").unwrap();
    assert_eq!(
        stored[NAMESPACE]["relation:children"],
        json!({
            "current": {"children": {"children.0": "1", "children.1": "2"}},
            "pending": {}
        })
    );
}

#[test]
fn test_save_reconciles_against_previous_links() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);

    attributes
        .write(
            &mut host,
            "data",
            json!({"name": "Stored", "children": [{"id": "1"}, {"id": "2"}]}),
        )
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.detached(), vec!["3"]);
    assert_eq!(report.attached(), vec!["2"]);
    assert_eq!(
        host.journal(),
        &[
            LinkOperation::Detach {
                relation: "children".to_string(),
                key: "3".to_string(),
            },
            LinkOperation::Attach {
                relation: "children".to_string(),
                key: "2".to_string(),
                path: Some("children.1".to_string()),
            },
        ]
    );
    assert_eq!(host.linked_keys("children"), vec!["1", "2"]);
}

#[test]
fn test_second_commit_is_a_no_op() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);
    attributes
        .write(&mut host, "data", json!({"children": ["1", "2"]}))
        .unwrap();
    attributes.save(&mut host).unwrap();

    host.clear_journal();
    let before = host.attribute_value("data").unwrap();
    let attribute = attributes.get("data").unwrap();
    let after = attributes
        .pipeline()
        .run_phase(Phase::Commit, attribute, before.clone(), &mut host, true)
        .unwrap();

    assert_eq!(after, before);
    assert!(host.journal().is_empty());
}

#[test]
fn test_saving_unchanged_value_issues_no_link_calls() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);

    let report = attributes.save(&mut host).unwrap();
    assert!(report.attached().is_empty());
    assert!(report.detached().is_empty());
    assert!(host.journal().is_empty());

    let stored = host.attribute_value("data").unwrap();
    assert_eq!(
        stored[NAMESPACE]["relation:children"]["current"]["children"],
        json!({"children.0": "1", "children.1": "3"})
    );
    assert_eq!(stored[NAMESPACE]["relation:children"]["pending"], json!({}));
}

#[test]
fn test_emptied_list_detaches_everything() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);

    attributes
        .write(&mut host, "data", json!({"name": "Stored", "children": []}))
        .unwrap();
    let report = attributes.save(&mut host).unwrap();

    assert_eq!(report.detached(), vec!["1", "3"]);
    assert!(host.linked_keys("children").is_empty());
}

#[test]
fn test_persist_failure_skips_commit() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);
    attributes
        .write(&mut host, "data", json!({"children": ["2"]}))
        .unwrap();

    host.set_fail_persist(true);
    let err = attributes.save(&mut host).unwrap_err();

    assert!(matches!(err, Error::Host { ref operation, .. } if operation == "persist"));
    assert!(host.journal().is_empty());
    assert_eq!(host.linked_keys("children"), vec!["1", "3"]);

    // retrying after the store recovers reconciles normally
    host.set_fail_persist(false);
    let report = attributes.save(&mut host).unwrap();
    assert_eq!(report.detached(), vec!["1", "3"]);
    assert_eq!(report.attached(), vec!["2"]);
}

#[test]
fn test_write_keeps_private_metadata_and_read_hides_it() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);
    host.load_relation("children").unwrap();

    attributes
        .write(&mut host, "data", json!({"name": "Renamed", "children": ["1", "3"]}))
        .unwrap();

    let stored = host.attribute_value("data").unwrap();
    assert!(stored.get(NAMESPACE).is_some());

    let read = attributes.read(&mut host, "data").unwrap();
    assert!(read.get(NAMESPACE).is_none());
    assert_eq!(read["name"], "Renamed");
    assert_eq!(read["children"], json!([child_record("1"), child_record("3")]));
}

#[test]
fn test_persisted_record_does_not_query_unloaded_relation() {
    let attributes = attributes();
    let mut host = linked_host(3, &["1", "3"]);

    let read = attributes.read(&mut host, "data").unwrap();
    assert_eq!(read["children"], json!([null, null]));
}

#[test]
fn test_get_records_misses() {
    let attributes = attributes();
    let mut host = children_host(1);
    let attribute = attributes.get("data").unwrap();
    let mut diagnostics = attrform_core::Diagnostics::new();

    let value = attributes
        .pipeline()
        .run_phase_with_diagnostics(
            Phase::Get,
            attribute,
            json!({"children": ["1", "9"]}),
            &mut host,
            false,
            &mut diagnostics,
        )
        .unwrap();

    assert_eq!(value["children"], json!([child_record("1"), null]));
    assert_eq!(diagnostics.misses.len(), 1);
    assert_eq!(diagnostics.misses[0].key, "9");
    assert_eq!(diagnostics.misses[0].path, "data.children.1");
}

#[test]
fn test_unknown_attribute() {
    let attributes = attributes();
    let mut host = children_host(0);
    let err = attributes.read(&mut host, "other").unwrap_err();
    assert!(matches!(err, Error::UnknownAttribute { name } if name == "other"));
}

#[derive(Debug)]
struct NameMustBeString;

impl AttributeValidator for NameMustBeString {
    fn validate(&self, value: &Value, _descriptor: &Value) -> Result<Messages> {
        let mut messages = Messages::new();
        if let Some(name) = value.get("name").filter(|name| !name.is_string()) {
            messages.insert("name".to_string(), vec![format!("{name} is not of type \"string\"")]);
        }
        Ok(messages)
    }
}

#[test]
fn test_validation_failure_blocks_save() {
    let attributes = attributes().with_validator(NameMustBeString);
    let mut host = children_host(2);
    attributes
        .write(&mut host, "data", json!({"name": 1, "children": ["1"]}))
        .unwrap();

    let err = attributes.save(&mut host).unwrap_err();
    let failure: &ValidationFailure = err.as_validation().unwrap();
    assert_eq!(failure.paths(), vec!["data.name"]);
    assert_eq!(
        err.to_string(),
        "Error(s) while validating the schema:\n[data.name]: 1 is not of type \"string\""
    );
    assert_eq!(host.persist_count(), 0);
    assert!(host.journal().is_empty());
}
