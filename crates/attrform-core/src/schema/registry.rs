//! Named schemas that descriptors can refer to

use super::{descriptor, Schema};
use crate::{Error, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

/// Ordered map from schema name to shared schema
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    schemas: IndexMap<String, Arc<Schema>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, naming it after the key when it has no name yet
    pub fn register(&mut self, name: impl Into<String>, mut schema: Schema) -> Arc<Schema> {
        let name = name.into();
        schema.set_name_if_missing(&name);
        let schema = Arc::new(schema);
        self.schemas.insert(name, Arc::clone(&schema));
        schema
    }

    pub fn register_arc(&mut self, name: impl Into<String>, schema: Arc<Schema>) {
        self.schemas.insert(name.into(), schema);
    }

    /// Parse a descriptor against the schemas registered so far
    pub fn parse(&self, descriptor: &Value) -> Result<Schema> {
        descriptor::parse(descriptor, self)
    }

    pub fn parse_and_register(
        &mut self,
        name: impl Into<String>,
        descriptor: &Value,
    ) -> Result<Arc<Schema>> {
        let schema = self.parse(descriptor)?;
        Ok(self.register(name, schema))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<Schema>> {
        self.get(name).ok_or_else(|| Error::UnknownSchema {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
