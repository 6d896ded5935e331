//! Property-based tests for schema flattening and wildcard matching

use attrform_core::{path, PathMatcher, Schema};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Strategy for generating nested schemas of objects, arrays and scalars
fn schema_strategy() -> impl Strategy<Value = Schema> {
    let leaf = prop_oneof![
        Just(Schema::string()),
        Just(Schema::integer()),
        Just(Schema::boolean()),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(("[a-z]{1,6}", inner.clone()), 1..4).prop_map(|properties| {
                properties
                    .into_iter()
                    .fold(Schema::object(), |schema, (name, property)| {
                        schema.property(name, property)
                    })
            }),
            inner.prop_map(|item| Schema::array_of(item)),
        ]
    })
}

/// Strategy for generating arbitrary JSON documents
fn document_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z ]{0,8}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,4}", inner), 0..5)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

proptest! {
    #[test]
    fn prop_parents_precede_children(schema in schema_strategy()) {
        let nodes = schema.nodes(None);
        let paths = nodes.paths();

        for (index, node) in nodes.iter().enumerate() {
            if let Some(parent) = node.parent_path() {
                let position = paths.iter().position(|candidate| *candidate == parent);
                prop_assert!(
                    matches!(position, Some(position) if position < index),
                    "parent of {} is missing or comes later", node.path
                );
            }
        }
    }

    #[test]
    fn prop_wildcard_expands_to_every_index(count in 0usize..20) {
        let items: Vec<Value> = (0..count).map(|index| json!({"id": index.to_string()})).collect();
        let data = json!({"items": items});
        let mut matcher = PathMatcher::new(&data);

        let expected: Vec<String> = (0..count).map(|index| format!("items.{index}")).collect();
        prop_assert_eq!(matcher.matching_paths("items.*").unwrap(), expected);

        let ids = matcher.matching_paths("items.*.id").unwrap();
        prop_assert_eq!(ids.len(), count);
    }

    #[test]
    fn prop_data_paths_resolve(document in document_strategy()) {
        for data_path in path::data_paths(&document) {
            prop_assert!(path::get(&document, &data_path).is_some(), "unresolved path {}", data_path);
        }
    }

    #[test]
    fn prop_matched_nodes_are_concrete(
        schema in schema_strategy(),
        document in document_strategy(),
    ) {
        let nodes = schema.nodes_from_data(&document, None).unwrap();
        for node in &nodes {
            prop_assert!(!node.has_wildcard(), "unexpanded node {}", node.path);
        }
    }
}
