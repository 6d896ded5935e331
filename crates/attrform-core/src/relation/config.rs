//! Per-relation settings

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// When a key missing from the loaded relation may be looked up directly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    Never,
    Always,
    /// Query when the record is new or the pipeline runs inside a save cycle
    #[default]
    UnlessPersisted,
}

/// How the owning record is linked to related records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelationKind {
    /// Related records carry the owner's key in `foreign_key`
    HasMany { foreign_key: String },
    /// Links live in a pivot; `path_column` stores the attribute path of each link
    BelongsToMany {
        #[serde(default)]
        path_column: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationConfig {
    pub relation: String,
    pub kind: RelationKind,
    /// Name of the schema whose nodes hold keys of this relation
    pub item_schema: String,
    #[serde(default = "default_key_field")]
    pub key_field: String,
    #[serde(default)]
    pub query_policy: Option<QueryPolicy>,
    /// Write keyed objects back to the related record on set
    #[serde(default)]
    pub update_on_set: bool,
}

fn default_key_field() -> String {
    "id".to_string()
}

impl RelationConfig {
    pub fn has_many(
        relation: impl Into<String>,
        item_schema: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        Self::new(
            relation,
            item_schema,
            RelationKind::HasMany {
                foreign_key: foreign_key.into(),
            },
        )
    }

    pub fn belongs_to_many(relation: impl Into<String>, item_schema: impl Into<String>) -> Self {
        Self::new(
            relation,
            item_schema,
            RelationKind::BelongsToMany { path_column: None },
        )
    }

    fn new(relation: impl Into<String>, item_schema: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            relation: relation.into(),
            kind,
            item_schema: item_schema.into(),
            key_field: default_key_field(),
            query_policy: None,
            update_on_set: false,
        }
    }

    /// Store each link's attribute path in `column`; only meaningful for many-to-many
    pub fn with_path_column(mut self, column: impl Into<String>) -> Self {
        if let RelationKind::BelongsToMany { path_column } = &mut self.kind {
            *path_column = Some(column.into());
        }
        self
    }

    pub fn with_key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    pub fn with_query_policy(mut self, policy: QueryPolicy) -> Self {
        self.query_policy = Some(policy);
        self
    }

    pub fn with_update_on_set(mut self, update: bool) -> Self {
        self.update_on_set = update;
        self
    }

    /// Registry id of the reducer serving this relation
    pub fn reducer_id(&self) -> String {
        format!("relation:{}", self.relation)
    }

    pub fn path_column(&self) -> Option<&str> {
        match &self.kind {
            RelationKind::BelongsToMany { path_column } => path_column.as_deref(),
            RelationKind::HasMany { .. } => None,
        }
    }

    /// Key of a related record or of a bare key value
    ///
    /// Objects yield their `key_field`; strings and numbers are keys themselves.
    pub fn key_of(&self, value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => map.get(&self.key_field).and_then(scalar_key),
            other => scalar_key(other),
        }
    }
}

fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(key) if !key.is_empty() => Some(key.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
