//! Bundled reducers registered by [`ReducerRegistry::with_builtins`](super::ReducerRegistry::with_builtins)

use super::types::{Phase, Reducer, ReducerContext};
use crate::node::Node;
use crate::path;
use crate::Result;
use serde_json::Value;

/// Fills an empty slug field from a sibling text field on write
#[derive(Debug, Clone)]
pub struct SlugReducer {
    id: String,
    source: String,
    target: String,
}

impl Default for SlugReducer {
    fn default() -> Self {
        Self::new("name", "slug")
    }
}

impl SlugReducer {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: "slug".to_string(),
            source: source.into(),
            target: target.into(),
        }
    }

    /// Register under a different id, for a second slug pair on the same registry
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl Reducer for SlugReducer {
    fn id(&self) -> &str {
        &self.id
    }

    fn handles(&self, phase: Phase) -> bool {
        phase == Phase::Set
    }

    fn set(&self, _ctx: &mut ReducerContext<'_>, node: &Node, mut state: Value) -> Result<Value> {
        if node.last_segment() != self.target {
            return Ok(state);
        }
        let filled = path::get(&state, &node.path)
            .and_then(Value::as_str)
            .is_some_and(|slug| !slug.is_empty());
        if filled {
            return Ok(state);
        }

        let source_path = path::join(node.parent_path().unwrap_or_default(), &self.source);
        let Some(source) = path::get(&state, &source_path).and_then(Value::as_str) else {
            return Ok(state);
        };
        let slug = slugify(source);
        path::set(&mut state, &node.path, Value::String(slug));
        Ok(state)
    }
}

/// Writes a schema's declared default where the value is absent
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultsReducer;

impl Reducer for DefaultsReducer {
    fn id(&self) -> &str {
        "defaults"
    }

    fn handles(&self, phase: Phase) -> bool {
        phase == Phase::Set
    }

    fn set(&self, _ctx: &mut ReducerContext<'_>, node: &Node, mut state: Value) -> Result<Value> {
        let Some(default) = node.default_value() else {
            return Ok(state);
        };
        let parent_is_object = node
            .parent_path()
            .and_then(|parent| path::get(&state, parent))
            .is_some_and(Value::is_object);
        if parent_is_object && path::get(&state, &node.path).is_none() {
            path::set(&mut state, &node.path, default.clone());
        }
        Ok(state)
    }
}

/// Lowercase, alphanumeric runs joined by single dashes
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;
    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}
