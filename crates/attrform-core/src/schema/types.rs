//! Building blocks of a schema tree

use super::Schema;
use crate::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// JSON-Schema type keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl SchemaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaType::Object => "object",
            SchemaType::Array => "array",
            SchemaType::String => "string",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Boolean => "boolean",
            SchemaType::Null => "null",
        }
    }

    /// Object and array schemas contribute child nodes when flattened
    pub fn is_structural(&self) -> bool {
        matches!(self, SchemaType::Object | SchemaType::Array)
    }
}

impl fmt::Display for SchemaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "object" => Ok(SchemaType::Object),
            "array" => Ok(SchemaType::Array),
            "string" => Ok(SchemaType::String),
            "integer" => Ok(SchemaType::Integer),
            "number" => Ok(SchemaType::Number),
            "boolean" => Ok(SchemaType::Boolean),
            "null" => Ok(SchemaType::Null),
            other => Err(Error::configuration(format!(
                "unsupported schema type '{other}'"
            ))),
        }
    }
}

/// A property or item slot of a structural schema
#[derive(Debug, Clone)]
pub enum Property {
    /// A live sub-schema, possibly shared with other parents
    Schema(Arc<Schema>),
    /// A leaf descriptor kept verbatim
    Raw(Value),
}

impl Property {
    pub fn schema(&self) -> Option<&Arc<Schema>> {
        match self {
            Property::Schema(schema) => Some(schema),
            Property::Raw(_) => None,
        }
    }

    /// Name reported on the node built for this slot
    ///
    /// A sub-schema reports its name. A raw descriptor reports its `type`,
    /// skipping `"null"` when the type is a union.
    pub fn type_name(&self) -> String {
        match self {
            Property::Schema(schema) => schema.name().to_string(),
            Property::Raw(descriptor) => match descriptor.get("type") {
                Some(Value::String(ty)) => ty.clone(),
                Some(Value::Array(types)) => types
                    .iter()
                    .filter_map(Value::as_str)
                    .find(|ty| *ty != "null")
                    .unwrap_or("null")
                    .to_string(),
                _ => String::new(),
            },
        }
    }

    pub fn to_descriptor(&self) -> Value {
        match self {
            Property::Schema(schema) => schema.to_descriptor(),
            Property::Raw(descriptor) => descriptor.clone(),
        }
    }
}

impl From<Schema> for Property {
    fn from(schema: Schema) -> Self {
        Property::Schema(Arc::new(schema))
    }
}

impl From<Arc<Schema>> for Property {
    fn from(schema: Arc<Schema>) -> Self {
        Property::Schema(schema)
    }
}

impl From<Value> for Property {
    fn from(descriptor: Value) -> Self {
        Property::Raw(descriptor)
    }
}

/// Shape of a schema
#[derive(Debug, Clone)]
pub enum SchemaKind {
    Scalar(SchemaType),
    Object { properties: IndexMap<String, Property> },
    /// Every element is described by the same item schema
    ArrayOf(Box<Property>),
    /// Elements are described positionally; an empty tuple describes no items
    Tuple(IndexMap<String, Property>),
}

impl SchemaKind {
    pub fn schema_type(&self) -> SchemaType {
        match self {
            SchemaKind::Scalar(ty) => *ty,
            SchemaKind::Object { .. } => SchemaType::Object,
            SchemaKind::ArrayOf(_) | SchemaKind::Tuple(_) => SchemaType::Array,
        }
    }
}

/// Borrowed view of an array schema's items
#[derive(Debug, Clone, Copy)]
pub enum Items<'a> {
    Single(&'a Property),
    Tuple(&'a IndexMap<String, Property>),
}
