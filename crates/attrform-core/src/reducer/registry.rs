//! Reducer lookup by id

use super::built_in::{DefaultsReducer, SlugReducer};
use super::types::{Reducer, ReducerRef};
use crate::{Error, Result};
use indexmap::IndexMap;
use std::sync::Arc;

/// Ordered id to reducer map
#[derive(Debug, Clone, Default)]
pub struct ReducerRegistry {
    reducers: IndexMap<String, Arc<dyn Reducer>>,
}

impl ReducerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled `slug` and `defaults` reducers
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SlugReducer::default());
        registry.register(DefaultsReducer);
        registry
    }

    /// Register under the reducer's own id, replacing any previous entry
    pub fn register(&mut self, reducer: impl Reducer + 'static) -> &mut Self {
        self.register_arc(Arc::new(reducer))
    }

    pub fn register_arc(&mut self, reducer: Arc<dyn Reducer>) -> &mut Self {
        let id = reducer.id().to_string();
        if self.reducers.insert(id.clone(), reducer).is_some() {
            tracing::debug!(reducer = %id, "replaced registered reducer");
        }
        self
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Reducer>> {
        self.reducers.get(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.reducers.contains_key(id)
    }

    pub fn resolve(&self, reducer: &ReducerRef) -> Result<Arc<dyn Reducer>> {
        match reducer {
            ReducerRef::Instance(instance) => Ok(Arc::clone(instance)),
            ReducerRef::Id(id) => self.get(id).ok_or_else(|| Error::UnknownReducer { id: id.clone() }),
        }
    }

    pub fn resolve_all<'a, I>(&self, reducers: I) -> Result<Vec<Arc<dyn Reducer>>>
    where
        I: IntoIterator<Item = &'a ReducerRef>,
    {
        reducers.into_iter().map(|reducer| self.resolve(reducer)).collect()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.reducers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}
