//! Reducer pipeline implementation
//!
//! This module composes attribute schemas with their reducers and folds the
//! reducers over the matched nodes of an attribute value for one phase.
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use super::registry::ReducerRegistry;
use super::types::{Phase, Reducer, ReducerContext, ReducerRef};
use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::host::Host;
use crate::node::{Node, NodeSet};
use crate::relation::RelationReducer;
use crate::schema::Schema;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, trace};

/// An attribute's schema with its reducers resolved
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    name: String,
    schema: Arc<Schema>,
    reducers: Vec<Arc<dyn Reducer>>,
}

impl AttributeSchema {
    /// Attach `extra` reducers to a scoped copy of `schema` and resolve them all
    ///
    /// The shared schema is never modified, so other attributes using it keep
    /// their own reducer lists.
    pub fn compose(
        name: impl Into<String>,
        schema: Arc<Schema>,
        extra: &[ReducerRef],
        registry: &ReducerRegistry,
    ) -> Result<Self> {
        let schema = if extra.is_empty() {
            schema
        } else {
            let mut scoped = Schema::clone(&schema);
            for reducer in extra {
                scoped.add_reducer(reducer.clone());
            }
            Arc::new(scoped)
        };
        let reducers = registry.resolve_all(schema.reducers())?;

        Ok(Self {
            name: name.into(),
            schema,
            reducers,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn reducers(&self) -> &[Arc<dyn Reducer>] {
        &self.reducers
    }
}

/// Runs reducers for a phase over an attribute value
#[derive(Debug, Clone)]
pub struct ReducerPipeline {
    registry: ReducerRegistry,
    config: EngineConfig,
    global: Vec<Arc<dyn Reducer>>,
    container: Vec<Arc<dyn Reducer>>,
}

impl Default for ReducerPipeline {
    fn default() -> Self {
        Self {
            registry: ReducerRegistry::with_builtins(),
            config: EngineConfig::default(),
            global: Vec::new(),
            container: Vec::new(),
        }
    }
}

impl ReducerPipeline {
    /// Build a pipeline, registering one relation reducer per configured relation
    /// and resolving the configured global reducers
    pub fn new(mut registry: ReducerRegistry, config: EngineConfig) -> Result<Self> {
        for relation in &config.relations {
            registry.register(RelationReducer::new(relation.clone()));
        }

        let global = config
            .global_reducers
            .iter()
            .map(|id| {
                registry
                    .get(id)
                    .ok_or_else(|| Error::UnknownReducer { id: id.clone() })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            registry,
            config,
            global,
            container: Vec::new(),
        })
    }

    /// Add a reducer applied to every attribute after the global reducers
    pub fn add_container_reducer(&mut self, reducer: &ReducerRef) -> Result<()> {
        let reducer = self.registry.resolve(reducer)?;
        self.container.push(reducer);
        Ok(())
    }

    pub fn with_container_reducer(mut self, reducer: impl Into<ReducerRef>) -> Result<Self> {
        self.add_container_reducer(&reducer.into())?;
        Ok(self)
    }

    pub fn compose(
        &self,
        name: impl Into<String>,
        schema: Arc<Schema>,
        extra: &[ReducerRef],
    ) -> Result<AttributeSchema> {
        AttributeSchema::compose(name, schema, extra, &self.registry)
    }

    pub fn registry(&self) -> &ReducerRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Global, then container, then attribute reducers that handle `phase`
    pub fn reducers_for<'p>(
        &'p self,
        attribute: &'p AttributeSchema,
        phase: Phase,
    ) -> Vec<&'p Arc<dyn Reducer>> {
        self.global
            .iter()
            .chain(&self.container)
            .chain(attribute.reducers())
            .filter(|reducer| reducer.handles(phase))
            .collect()
    }

    /// Matched nodes of `value`, rooted at the attribute name
    pub fn nodes_for(&self, attribute: &AttributeSchema, value: &Value) -> Result<NodeSet> {
        Ok(attribute
            .schema()
            .nodes_from_data(value, None)?
            .prefixed(attribute.name()))
    }

    /// Run one phase and discard diagnostics
    pub fn run_phase(
        &self,
        phase: Phase,
        attribute: &AttributeSchema,
        value: Value,
        host: &mut dyn Host,
        saving: bool,
    ) -> Result<Value> {
        let mut diagnostics = Diagnostics::new();
        self.run_phase_with_diagnostics(phase, attribute, value, host, saving, &mut diagnostics)
    }

    pub fn run_phase_with_diagnostics(
        &self,
        phase: Phase,
        attribute: &AttributeSchema,
        value: Value,
        host: &mut dyn Host,
        saving: bool,
        diagnostics: &mut Diagnostics,
    ) -> Result<Value> {
        let span = tracing::debug_span!("run_phase", %phase, attribute = attribute.name());
        let _guard = span.enter();

        let reducers = self.reducers_for(attribute, phase);
        if reducers.is_empty() {
            trace!("no reducers for phase");
            return Ok(value);
        }

        let nodes = self.nodes_for(attribute, &value)?;
        debug!(
            reducers = reducers.len(),
            nodes = nodes.len(),
            "running reducers"
        );

        let mut state = wrap(attribute.name(), value);
        let mut ctx = ReducerContext::new(
            phase,
            attribute.name(),
            saving,
            &self.config,
            host,
            diagnostics,
        );

        if phase == Phase::Commit {
            for reducer in &reducers {
                trace!(reducer = reducer.id(), "commit");
                state = reducer.commit(&mut ctx, &nodes, state)?;
            }
        } else {
            for reducer in &reducers {
                state = reducer.prepare(&mut ctx, state)?;
            }
            for node in &nodes {
                for reducer in &reducers {
                    trace!(reducer = reducer.id(), path = %node.path, "reduce");
                    state = apply(reducer, phase, &mut ctx, node, state)?;
                }
            }
        }

        Ok(unwrap(attribute.name(), state))
    }
}

fn apply(
    reducer: &Arc<dyn Reducer>,
    phase: Phase,
    ctx: &mut ReducerContext<'_>,
    node: &Node,
    state: Value,
) -> Result<Value> {
    match phase {
        Phase::Get => reducer.get(ctx, node, state),
        Phase::Set => reducer.set(ctx, node, state),
        Phase::Save => reducer.save(ctx, node, state),
        // commit is folded over the whole node set
        Phase::Commit => Ok(state),
    }
}

fn wrap(name: &str, value: Value) -> Value {
    let mut wrapper = Map::new();
    wrapper.insert(name.to_string(), value);
    Value::Object(wrapper)
}

fn unwrap(name: &str, state: Value) -> Value {
    match state {
        Value::Object(mut wrapper) => wrapper.remove(name).unwrap_or(Value::Null),
        _ => Value::Null,
    }
}
