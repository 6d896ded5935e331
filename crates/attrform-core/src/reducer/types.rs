//! Core reducer types

use crate::config::EngineConfig;
use crate::diagnostics::Diagnostics;
use crate::host::Host;
use crate::node::{Node, NodeSet};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Lifecycle point at which reducers run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Reading a stored value
    Get,
    /// Writing a caller-provided value
    Set,
    /// Immediately before the record is persisted
    Save,
    /// After persistence succeeded
    Commit,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Get, Phase::Set, Phase::Save, Phase::Commit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Get => "get",
            Phase::Set => "set",
            Phase::Save => "save",
            Phase::Commit => "commit",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Phase::Get),
            "set" => Ok(Phase::Set),
            "save" => Ok(Phase::Save),
            "commit" => Ok(Phase::Commit),
            _ => Err(Error::UnknownPhase {
                phase: s.to_string(),
            }),
        }
    }
}

/// Everything a reducer may consult or touch while it runs
///
/// The state handed to reducers is the attribute value wrapped under the
/// attribute name, so node paths are absolute within it.
pub struct ReducerContext<'a> {
    phase: Phase,
    attribute: &'a str,
    saving: bool,
    config: &'a EngineConfig,
    host: &'a mut dyn Host,
    diagnostics: &'a mut Diagnostics,
}

impl<'a> ReducerContext<'a> {
    pub fn new(
        phase: Phase,
        attribute: &'a str,
        saving: bool,
        config: &'a EngineConfig,
        host: &'a mut dyn Host,
        diagnostics: &'a mut Diagnostics,
    ) -> Self {
        Self {
            phase,
            attribute,
            saving,
            config,
            host,
            diagnostics,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attribute(&self) -> &str {
        self.attribute
    }

    /// True while the pipeline runs inside a save cycle
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    pub fn host(&self) -> &dyn Host {
        &*self.host
    }

    pub fn host_mut(&mut self) -> &mut dyn Host {
        &mut *self.host
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        self.diagnostics
    }
}

impl fmt::Debug for ReducerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReducerContext")
            .field("phase", &self.phase)
            .field("attribute", &self.attribute)
            .field("saving", &self.saving)
            .finish_non_exhaustive()
    }
}

/// A transformation applied at one or more phases
///
/// `get`, `set` and `save` are folded over every matched node in order and
/// return the new state. `commit` runs once with the whole node set. Methods a
/// reducer does not override leave the state untouched.
pub trait Reducer: Send + Sync + fmt::Debug {
    fn id(&self) -> &str;

    fn handles(&self, phase: Phase) -> bool;

    /// Runs once before the per-node fold of every phase except commit
    fn prepare(&self, _ctx: &mut ReducerContext<'_>, state: Value) -> Result<Value> {
        Ok(state)
    }

    fn get(&self, _ctx: &mut ReducerContext<'_>, _node: &Node, state: Value) -> Result<Value> {
        Ok(state)
    }

    fn set(&self, _ctx: &mut ReducerContext<'_>, _node: &Node, state: Value) -> Result<Value> {
        Ok(state)
    }

    fn save(&self, _ctx: &mut ReducerContext<'_>, _node: &Node, state: Value) -> Result<Value> {
        Ok(state)
    }

    fn commit(&self, _ctx: &mut ReducerContext<'_>, _nodes: &NodeSet, state: Value) -> Result<Value> {
        Ok(state)
    }
}

/// Per-node closure signature used by [`FnReducer`]
pub type ReducerFn =
    dyn Fn(&mut ReducerContext<'_>, &Node, Value) -> Result<Value> + Send + Sync;

/// A closure acting as a reducer for a single per-node phase
///
/// Commit operates on whole node sets and is never handled by a closure.
#[derive(Clone)]
pub struct FnReducer {
    id: String,
    phase: Phase,
    func: Arc<ReducerFn>,
}

impl FnReducer {
    pub fn new<F>(id: impl Into<String>, phase: Phase, func: F) -> Self
    where
        F: Fn(&mut ReducerContext<'_>, &Node, Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            phase,
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for FnReducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReducer")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl Reducer for FnReducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn handles(&self, phase: Phase) -> bool {
        phase == self.phase && phase != Phase::Commit
    }

    fn get(&self, ctx: &mut ReducerContext<'_>, node: &Node, state: Value) -> Result<Value> {
        (self.func)(ctx, node, state)
    }

    fn set(&self, ctx: &mut ReducerContext<'_>, node: &Node, state: Value) -> Result<Value> {
        (self.func)(ctx, node, state)
    }

    fn save(&self, ctx: &mut ReducerContext<'_>, node: &Node, state: Value) -> Result<Value> {
        (self.func)(ctx, node, state)
    }
}

/// A reducer named by registry id or given directly
#[derive(Debug, Clone)]
pub enum ReducerRef {
    Id(String),
    Instance(Arc<dyn Reducer>),
}

impl ReducerRef {
    pub fn instance(reducer: impl Reducer + 'static) -> Self {
        ReducerRef::Instance(Arc::new(reducer))
    }

    pub fn id(&self) -> &str {
        match self {
            ReducerRef::Id(id) => id,
            ReducerRef::Instance(reducer) => reducer.id(),
        }
    }
}

impl From<&str> for ReducerRef {
    fn from(id: &str) -> Self {
        ReducerRef::Id(id.to_string())
    }
}

impl From<String> for ReducerRef {
    fn from(id: String) -> Self {
        ReducerRef::Id(id)
    }
}

impl From<Arc<dyn Reducer>> for ReducerRef {
    fn from(reducer: Arc<dyn Reducer>) -> Self {
        ReducerRef::Instance(reducer)
    }
}

impl From<FnReducer> for ReducerRef {
    fn from(reducer: FnReducer) -> Self {
        ReducerRef::instance(reducer)
    }
}
