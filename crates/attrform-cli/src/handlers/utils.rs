//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use attrform_core::{
    JsonAttributes, MemoryFixture, MemoryHost, ReducerPipeline, ReducerRef, ReducerRegistry, Schema,
};
use attrform_schemas::{JsonSchemaValidator, SchemaLoader};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Resolve `schema` as a descriptor file path, or by name from the schemas directory
///
/// Descriptors in the configured schemas directory are registered first, so a
/// descriptor file given by path may refer to them.
pub fn load_schema(schema: &str, config: &Config) -> Result<Arc<Schema>> {
    let mut loader = SchemaLoader::new();
    if let Some(dir) = &config.paths.schemas_dir {
        let loaded = loader.load_dir(dir)?;
        debug!(dir = %dir.display(), schemas = loaded.len(), "registered schemas directory");
    }

    let path = Path::new(schema);
    if path.is_file() {
        return Ok(loader.load_schema(path)?);
    }

    match (&config.paths.schemas_dir, loader.registry().get(schema)) {
        (_, Some(found)) => Ok(found),
        (Some(dir), None) => Err(Error::SchemaNotFound {
            name: schema.to_string(),
            hint: Some(format!("not a file and not defined in {}", dir.display())),
        }),
        (None, None) => Err(Error::SchemaNotFound {
            name: schema.to_string(),
            hint: Some("not a file and no schemas directory configured".to_string()),
        }),
    }
}

/// Read a JSON or YAML document
pub fn load_document(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(SchemaLoader::new().load_document(path)?)
}

pub fn load_fixture(path: &Path) -> Result<MemoryFixture> {
    let document = load_document(path)?;
    serde_json::from_value(document).map_err(|err| {
        Error::invalid_args(format!("{} is not a fixture: {err}", path.display()))
    })
}

pub fn pipeline(config: &Config) -> Result<ReducerPipeline> {
    Ok(ReducerPipeline::new(
        ReducerRegistry::with_builtins(),
        config.engine.clone(),
    )?)
}

/// Attributes of a record with a single attribute `name` described by `schema`
pub fn attributes(
    config: &Config,
    name: &str,
    schema: Arc<Schema>,
    reducers: &[String],
    validate: bool,
) -> Result<JsonAttributes> {
    let reducers: Vec<ReducerRef> = reducers.iter().map(|id| ReducerRef::from(id.as_str())).collect();
    let mut attributes = JsonAttributes::new(pipeline(config)?);
    if validate {
        attributes = attributes.with_validator(JsonSchemaValidator::new());
    }
    Ok(attributes.attribute_with_reducers(name, schema, &reducers)?)
}

pub fn host_from(fixture: Option<&Path>) -> Result<MemoryHost> {
    match fixture {
        Some(path) => Ok(MemoryHost::from_fixture(load_fixture(path)?)),
        None => Ok(MemoryHost::new()),
    }
}
