//! Conversion between schemas and JSON-Schema shaped descriptors

use super::{Property, Schema, SchemaKind, SchemaRegistry, SchemaType};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const KNOWN_KEYS: &[&str] = &[
    "type",
    "name",
    "properties",
    "items",
    "prefixItems",
    "required",
    "default",
    "enum",
    "reducers",
];

impl Schema {
    /// Structural descriptor suitable for a JSON-Schema validator
    ///
    /// Reducers are not part of the descriptor.
    pub fn to_descriptor(&self) -> Value {
        let mut out = Map::new();
        let ty = self.schema_type();

        let type_value = if self.is_nullable() && ty != SchemaType::Null {
            json!(["null", ty.as_str()])
        } else {
            json!(ty.as_str())
        };
        out.insert("type".to_string(), type_value);

        if let Some(name) = self.explicit_name() {
            if name != ty.as_str() {
                out.insert("name".to_string(), json!(name));
            }
        }

        match self.kind() {
            SchemaKind::Object { properties } => {
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, property)| (name.clone(), property.to_descriptor()))
                    .collect();
                out.insert("properties".to_string(), Value::Object(properties));
                if !self.required_fields().is_empty() {
                    out.insert("required".to_string(), json!(self.required_fields()));
                }
            }
            SchemaKind::ArrayOf(item) => {
                out.insert("items".to_string(), item.to_descriptor());
            }
            SchemaKind::Tuple(items) if is_positional(items) => {
                let items: Vec<Value> = items.values().map(Property::to_descriptor).collect();
                out.insert("prefixItems".to_string(), Value::Array(items));
            }
            SchemaKind::Tuple(items) if !items.is_empty() => {
                let items: Map<String, Value> = items
                    .iter()
                    .map(|(name, property)| (name.clone(), property.to_descriptor()))
                    .collect();
                out.insert("items".to_string(), Value::Object(items));
            }
            SchemaKind::Tuple(_) | SchemaKind::Scalar(_) => {}
        }

        if let Some(default) = self.default() {
            out.insert("default".to_string(), default.clone());
        }
        if let Some(values) = self.enumeration() {
            out.insert("enum".to_string(), Value::Array(values.to_vec()));
        }
        for (key, value) in self.extra() {
            out.insert(key.clone(), value.clone());
        }

        Value::Object(out)
    }
}

/// Slots named `0`, `1`, ... in order
fn is_positional(items: &IndexMap<String, Property>) -> bool {
    !items.is_empty()
        && items
            .keys()
            .enumerate()
            .all(|(index, name)| *name == index.to_string())
}

/// Build a schema tree from a descriptor
///
/// String values in `properties` and `items` are references to schemas
/// already registered under that name. Object-typed and array-typed property
/// descriptors become sub-schemas; other property descriptors are kept raw.
pub fn parse(descriptor: &Value, registry: &SchemaRegistry) -> Result<Schema> {
    let Value::Object(map) = descriptor else {
        return Err(Error::configuration("schema descriptor must be an object"));
    };

    let (schema_type, nullable) = parse_type(map.get("type"))?;
    let mut schema = match schema_type {
        SchemaType::Object => {
            let mut schema = Schema::object();
            if let Some(properties) = map.get("properties") {
                let properties = properties.as_object().ok_or_else(|| {
                    Error::configuration("'properties' must be an object of descriptors")
                })?;
                for (name, property) in properties {
                    schema = schema.property(name.clone(), parse_property(property, registry)?);
                }
            }
            schema
        }
        SchemaType::Array => parse_items(map, registry)?,
        other => Schema::scalar(other),
    };
    schema = schema.nullable(nullable);

    if let Some(name) = map.get("name").and_then(Value::as_str) {
        schema = schema.named(name);
    }
    if let Some(required) = map.get("required") {
        schema = schema.required(string_list(required, "required")?);
    }
    if let Some(default) = map.get("default") {
        schema = schema.default_value(default.clone());
    }
    if let Some(Value::Array(values)) = map.get("enum") {
        schema = schema.enum_values(values.clone());
    }
    if let Some(reducers) = map.get("reducers") {
        for id in string_list(reducers, "reducers")? {
            schema = schema.with_reducer(id);
        }
    }
    for (key, value) in map {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            schema = schema.attribute(key.clone(), value.clone());
        }
    }

    Ok(schema)
}

fn parse_items(map: &Map<String, Value>, registry: &SchemaRegistry) -> Result<Schema> {
    let Some(items) = map.get("prefixItems").or_else(|| map.get("items")) else {
        return Ok(Schema::tuple());
    };

    match items {
        Value::Array(slots) => {
            let mut schema = Schema::tuple();
            for (index, slot) in slots.iter().enumerate() {
                schema = schema.item(index.to_string(), parse_property(slot, registry)?);
            }
            Ok(schema)
        }
        Value::Object(slots) if !slots.contains_key("type") => {
            let mut schema = Schema::tuple();
            for (name, slot) in slots {
                schema = schema.item(name.clone(), parse_property(slot, registry)?);
            }
            Ok(schema)
        }
        single => Ok(Schema::array_of(parse_property(single, registry)?)),
    }
}

fn parse_property(descriptor: &Value, registry: &SchemaRegistry) -> Result<Property> {
    match descriptor {
        Value::String(reference) => Ok(Property::Schema(registry.resolve(reference)?)),
        Value::Object(map) if is_structural(map.get("type")) => {
            Ok(Property::Schema(Arc::new(parse(descriptor, registry)?)))
        }
        Value::Object(_) => Ok(Property::Raw(descriptor.clone())),
        other => Err(Error::configuration(format!(
            "expected a schema descriptor or schema name, found {other}"
        ))),
    }
}

fn is_structural(ty: Option<&Value>) -> bool {
    match ty {
        Some(Value::String(ty)) => ty == "object" || ty == "array",
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|ty| ty == "object" || ty == "array"),
        _ => false,
    }
}

/// Returns the type and whether `null` is allowed
fn parse_type(ty: Option<&Value>) -> Result<(SchemaType, bool)> {
    match ty {
        None => Ok((SchemaType::Object, true)),
        Some(Value::String(ty)) => Ok((ty.parse()?, false)),
        Some(Value::Array(types)) => {
            let names: Vec<&str> = types.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            let primary = names.iter().find(|ty| **ty != "null").copied().unwrap_or("null");
            Ok((primary.parse()?, nullable))
        }
        Some(other) => Err(Error::configuration(format!(
            "'type' must be a string or an array of strings, found {other}"
        ))),
    }
}

fn string_list(value: &Value, key: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::configuration(format!("'{key}' must be an array of strings")))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::configuration(format!("'{key}' must be an array of strings")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_descriptor_of_nested_schema() {
        let child = Schema::object().named("child").property("id", Schema::string());
        let schema = Schema::object()
            .property("name", Schema::string().nullable(false))
            .property("children", Schema::array_of(child))
            .required(["name"])
            .attribute("additionalProperties", json!(false));

        assert_eq!(
            schema.to_descriptor(),
            json!({
                "type": ["null", "object"],
                "properties": {
                    "name": {"type": "string"},
                    "children": {
                        "type": ["null", "array"],
                        "items": {
                            "type": ["null", "object"],
                            "name": "child",
                            "properties": {"id": {"type": ["null", "string"]}}
                        }
                    }
                },
                "required": ["name"],
                "additionalProperties": false
            })
        );
    }

    #[test]
    fn test_tuple_descriptor_uses_prefix_items() {
        let schema = Schema::tuple()
            .nullable(false)
            .item("0", Schema::string().nullable(false))
            .item("1", Property::Raw(json!({"type": "integer"})));
        assert_eq!(
            schema.to_descriptor(),
            json!({
                "type": "array",
                "prefixItems": [{"type": "string"}, {"type": "integer"}]
            })
        );
        assert_eq!(Schema::tuple().nullable(false).to_descriptor(), json!({"type": "array"}));
    }

    #[test]
    fn test_parse_resolves_references() {
        let mut registry = SchemaRegistry::new();
        registry.register("child", Schema::object().property("id", Schema::string()));

        let schema = parse(
            &json!({
                "type": "object",
                "properties": {
                    "children": {"type": "array", "items": "child"},
                    "title": {"type": "string", "maxLength": 10}
                },
                "reducers": ["slug"],
                "x-ui": {"hidden": true}
            }),
            &registry,
        )
        .unwrap();

        let properties = schema.properties().unwrap();
        let children = properties["children"].schema().unwrap();
        match children.kind() {
            SchemaKind::ArrayOf(item) => assert_eq!(item.type_name(), "child"),
            other => panic!("unexpected kind {other:?}"),
        }
        assert!(matches!(properties["title"], Property::Raw(_)));
        assert!(!schema.is_nullable());
        assert_eq!(schema.reducers().len(), 1);
        assert_eq!(schema.extra()["x-ui"], json!({"hidden": true}));
    }

    #[test]
    fn test_parse_unknown_reference() {
        let registry = SchemaRegistry::new();
        let err = parse(
            &json!({"properties": {"child": "missing"}}),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownSchema { name } if name == "missing"));
    }

    #[test]
    fn test_parse_item_property_map_becomes_tuple() {
        let registry = SchemaRegistry::new();
        let schema = parse(
            &json!({"type": "array", "items": {"first": {"type": "string"}}}),
            &registry,
        )
        .unwrap();
        assert!(matches!(schema.kind(), SchemaKind::Tuple(items) if items.contains_key("first")));
    }

    #[test]
    fn test_named_tuple_descriptor_keeps_item_map() {
        let registry = SchemaRegistry::new();
        let descriptor = json!({
            "type": "array",
            "items": {"first": {"type": "string"}, "second": {"type": "integer"}}
        });
        let schema = parse(&descriptor, &registry).unwrap();
        assert_eq!(schema.to_descriptor(), descriptor);
        assert_eq!(schema.nodes(None).paths(), vec!["first", "second"]);
    }

    #[test]
    fn test_positional_tuple_round_trip() {
        let registry = SchemaRegistry::new();
        let descriptor = json!({
            "type": "array",
            "prefixItems": [{"type": "string"}, {"type": "integer"}]
        });
        let schema = parse(&descriptor, &registry).unwrap();
        assert_eq!(schema.to_descriptor(), descriptor);
        assert_eq!(schema.nodes(None).paths(), vec!["0", "1"]);
    }

    #[test]
    fn test_out_of_order_slots_are_not_positional() {
        let schema = Schema::tuple()
            .nullable(false)
            .item("1", Property::Raw(json!({"type": "string"})))
            .item("0", Property::Raw(json!({"type": "integer"})));
        assert_eq!(
            schema.to_descriptor(),
            json!({
                "type": "array",
                "items": {"1": {"type": "string"}, "0": {"type": "integer"}}
            })
        );
    }

    #[test]
    fn test_descriptor_parse_round_trip() {
        let registry = SchemaRegistry::new();
        let schema = Schema::object()
            .named("page")
            .property("tags", Schema::array_of(Schema::string()))
            .default_value(json!({}));
        let descriptor = schema.to_descriptor();
        let parsed = parse(&descriptor, &registry).unwrap();
        assert_eq!(parsed.to_descriptor(), descriptor);
        assert_eq!(parsed.name(), "page");
    }
}
