//! Reducer exposing related records inside an attribute

use super::config::{QueryPolicy, RelationConfig};
use super::metadata::LinkageMetadata;
use super::reconcile::reconcile;
use crate::node::{Node, NodeSet};
use crate::path;
use crate::reducer::{Phase, Reducer, ReducerContext};
use crate::schema::SchemaType;
use crate::{Error, Result};
use serde_json::Value;
use tracing::{debug, warn};

/// Keys on disk, related records in memory
///
/// Nodes whose schema is the relation's item schema hold a key when stored
/// and the related record when read. Saving records which keys the value
/// references; committing links and unlinks records to match.
#[derive(Debug, Clone)]
pub struct RelationReducer {
    id: String,
    config: RelationConfig,
}

impl RelationReducer {
    pub fn new(config: RelationConfig) -> Self {
        Self {
            id: config.reducer_id(),
            config,
        }
    }

    pub fn config(&self) -> &RelationConfig {
        &self.config
    }

    fn applies_to(&self, node: &Node) -> bool {
        node.schema.as_ref().is_some_and(|schema| {
            schema.name() == self.config.item_schema && schema.schema_type() == SchemaType::Object
        })
    }

    fn metadata(&self, ctx: &ReducerContext<'_>, state: &Value) -> Result<LinkageMetadata> {
        LinkageMetadata::read(state, ctx.attribute(), &ctx.config().metadata_namespace, &self.id)
    }

    fn store_metadata(&self, ctx: &ReducerContext<'_>, metadata: &LinkageMetadata, state: &mut Value) -> Result<()> {
        metadata.write(state, ctx.attribute(), &ctx.config().metadata_namespace, &self.id)
    }

    fn should_query(&self, ctx: &ReducerContext<'_>) -> bool {
        match self.config.query_policy.unwrap_or(ctx.config().query_policy) {
            QueryPolicy::Never => false,
            QueryPolicy::Always => true,
            QueryPolicy::UnlessPersisted => !ctx.host().exists() || ctx.is_saving(),
        }
    }

    /// Related record for `key`: the loaded relation first, then a direct query
    fn resolve(&self, ctx: &mut ReducerContext<'_>, key: &str, node: &Node) -> Option<Value> {
        let relation = self.config.relation.as_str();
        let debug_enabled = ctx.config().debug;

        match ctx.host().loaded_relation(relation) {
            Some(records) => {
                let found = records
                    .iter()
                    .find(|record| self.config.key_of(record).as_deref() == Some(key));
                if let Some(record) = found {
                    return Some(record.clone());
                }
            }
            None if debug_enabled => {
                warn!(
                    relation,
                    reducer = %self.id,
                    "relation is needed by reducer but not explicitly loaded"
                );
            }
            None => {}
        }

        if self.should_query(ctx) {
            match ctx.host().find_related(relation, key) {
                Ok(Some(record)) => return Some(record),
                Ok(None) => {}
                Err(err) => debug!(relation, key, error = %err, "related record query failed"),
            }
        }

        if debug_enabled {
            warn!(relation, key, path = %node.path, "related record not found");
        }
        let phase = ctx.phase();
        ctx.diagnostics_mut()
            .record_miss(relation, key, node.path.clone(), phase);
        None
    }
}

impl Reducer for RelationReducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn handles(&self, _phase: Phase) -> bool {
        true
    }

    fn prepare(&self, ctx: &mut ReducerContext<'_>, mut state: Value) -> Result<Value> {
        if ctx.phase() != Phase::Save {
            return Ok(state);
        }
        let relation = self.config.relation.as_str();
        if !ctx.host().relation_loaded(relation) {
            ctx.host_mut()
                .load_relation(relation)
                .map_err(|err| Error::host(format!("loading relation '{relation}'"), err))?;
        }

        let mut metadata = self.metadata(ctx, &state)?;
        let is_null = path::get(&state, ctx.attribute()).map_or(true, Value::is_null);
        if is_null && metadata.is_empty() {
            return Ok(state);
        }
        metadata.begin_pending(relation);
        self.store_metadata(ctx, &metadata, &mut state)?;
        Ok(state)
    }

    fn get(&self, ctx: &mut ReducerContext<'_>, node: &Node, mut state: Value) -> Result<Value> {
        if !self.applies_to(node) {
            return Ok(state);
        }
        // an object here has already been expanded
        let key = match path::get(&state, &node.path) {
            Some(value) if !value.is_object() => self.config.key_of(value),
            _ => None,
        };
        let Some(key) = key else {
            return Ok(state);
        };

        let record = self.resolve(ctx, &key, node).unwrap_or(Value::Null);
        path::set(&mut state, &node.path, record);
        Ok(state)
    }

    fn set(&self, ctx: &mut ReducerContext<'_>, node: &Node, mut state: Value) -> Result<Value> {
        if !self.applies_to(node) {
            return Ok(state);
        }
        let object = match path::get(&state, &node.path) {
            Some(object @ Value::Object(_)) => object.clone(),
            _ => return Ok(state),
        };

        let key = match self.config.key_of(&object) {
            Some(key) => {
                if self.config.update_on_set {
                    ctx.host_mut()
                        .update_related(&self.config, &object)
                        .map_err(|err| Error::host("updating related record", err))?;
                }
                key
            }
            None => {
                let created = ctx
                    .host_mut()
                    .create_related(&self.config, &object)
                    .map_err(|err| Error::host("creating related record", err))?;
                self.config.key_of(&created).ok_or_else(|| {
                    Error::reducer(
                        self.id.clone(),
                        Phase::Set,
                        format!("created record has no '{}'", self.config.key_field),
                    )
                })?
            }
        };

        path::set(&mut state, &node.path, Value::String(key));
        Ok(state)
    }

    fn save(&self, ctx: &mut ReducerContext<'_>, node: &Node, mut state: Value) -> Result<Value> {
        if !self.applies_to(node) {
            return Ok(state);
        }
        let Some(key) = path::get(&state, &node.path).and_then(|value| self.config.key_of(value)) else {
            return Ok(state);
        };

        let mut metadata = self.metadata(ctx, &state)?;
        metadata.record_pending(&self.config.relation, node.relative_path(ctx.attribute()), key);
        self.store_metadata(ctx, &metadata, &mut state)?;
        Ok(state)
    }

    fn commit(&self, ctx: &mut ReducerContext<'_>, _nodes: &NodeSet, mut state: Value) -> Result<Value> {
        let mut metadata = self.metadata(ctx, &state)?;
        if !metadata.has_pending(&self.config.relation) {
            return Ok(state);
        }

        let report = reconcile(ctx.host_mut(), &self.config, &mut metadata)?;
        ctx.diagnostics_mut().record_reconciliation(report);
        self.store_metadata(ctx, &metadata, &mut state)?;
        Ok(state)
    }
}
