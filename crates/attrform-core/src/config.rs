//! Engine-wide settings

use crate::relation::{QueryPolicy, RelationConfig};
use serde::{Deserialize, Serialize};

/// Namespace under which reducers keep private state inside an attribute value
pub const DEFAULT_METADATA_NAMESPACE: &str = "__relation_reducers";

/// Settings shared by every attribute of a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Reducer ids applied to every attribute before any other reducer
    pub global_reducers: Vec<String>,
    /// Log relation misses and unloaded relations at warn level
    pub debug: bool,
    pub metadata_namespace: String,
    /// Policy used by relations that do not set their own
    pub query_policy: QueryPolicy,
    pub relations: Vec<RelationConfig>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_reducers: Vec::new(),
            debug: false,
            metadata_namespace: DEFAULT_METADATA_NAMESPACE.to_string(),
            query_policy: QueryPolicy::default(),
            relations: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_global_reducer(mut self, id: impl Into<String>) -> Self {
        self.global_reducers.push(id.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_metadata_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.metadata_namespace = namespace.into();
        self
    }

    pub fn with_query_policy(mut self, policy: QueryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    pub fn with_relation(mut self, relation: RelationConfig) -> Self {
        self.relations.push(relation);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationKind;
    use serde_json::json;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_value(json!({
            "debug": true,
            "relations": [{
                "relation": "children",
                "kind": {"type": "has_many", "foreign_key": "test_id"},
                "item_schema": "child"
            }]
        }))
        .unwrap();

        assert!(config.debug);
        assert_eq!(config.metadata_namespace, DEFAULT_METADATA_NAMESPACE);
        assert_eq!(config.query_policy, QueryPolicy::UnlessPersisted);
        let relation = &config.relations[0];
        assert_eq!(relation.key_field, "id");
        assert_eq!(
            relation.kind,
            RelationKind::HasMany {
                foreign_key: "test_id".to_string()
            }
        );
    }
}
