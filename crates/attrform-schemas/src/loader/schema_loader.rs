//! Loading descriptor files into a schema registry
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use crate::loader::{
    cache::{CacheConfig, SchemaCache},
    error::{LoaderError, LoaderResult},
    parser::{Format, SchemaParser},
};
use attrform_core::{Error, Schema, SchemaRegistry};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub cache: CacheConfig,
    /// Reject files whose root is not a schema descriptor before parsing them
    pub validate_descriptors: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache: CacheConfig::default(),
            validate_descriptors: true,
        }
    }
}

/// Reads descriptor files and registers the schemas they describe
#[derive(Debug)]
pub struct SchemaLoader {
    config: LoaderConfig,
    cache: SchemaCache,
    parser: SchemaParser,
    registry: SchemaRegistry,
}

impl Default for SchemaLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self {
            cache: SchemaCache::with_config(config.cache.clone()),
            parser: SchemaParser::new(),
            registry: SchemaRegistry::new(),
            config,
        }
    }

    /// Start from schemas registered elsewhere so files can refer to them
    pub fn with_registry(mut self, registry: SchemaRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SchemaRegistry {
        &mut self.registry
    }

    pub fn into_registry(self) -> SchemaRegistry {
        self.registry
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Read a descriptor file as plain JSON
    pub fn load_descriptor(&mut self, path: &Path) -> LoaderResult<Value> {
        if let Some(cached) = self.cache.get(path)? {
            debug!(path = %path.display(), "descriptor cache hit");
            return Ok(cached);
        }

        let descriptor = self.parser.parse_file(path)?;
        if self.config.validate_descriptors {
            self.parser.validate_descriptor(&descriptor, path)?;
        }

        self.cache.put(path, descriptor.clone())?;
        Ok(descriptor)
    }

    /// Read a data document of any shape
    pub fn load_document(&self, path: &Path) -> LoaderResult<Value> {
        self.parser.parse_file(path)
    }

    /// Parse a descriptor file and register it under its `name`, or its file stem
    pub fn load_schema(&mut self, path: &Path) -> LoaderResult<Arc<Schema>> {
        let descriptor = self.load_descriptor(path)?;
        let name = schema_name(&descriptor, path)?;

        let schema = self
            .registry
            .parse_and_register(name.clone(), &descriptor)
            .map_err(|e| LoaderError::schema_error(path.to_path_buf(), e))?;
        debug!(schema = %name, path = %path.display(), "registered schema");
        Ok(schema)
    }

    /// Load every supported file in `dir`
    ///
    /// Files are visited in name order. A file that refers to a schema not yet
    /// registered is retried after the others, so references may point at any
    /// file in the directory.
    pub fn load_dir(&mut self, dir: &Path) -> LoaderResult<Vec<String>> {
        let mut pending = schema_files(dir)?;
        let mut loaded = Vec::new();

        while !pending.is_empty() {
            let before = pending.len();
            let mut deferred = Vec::new();
            let mut unresolved = Vec::new();

            for path in pending {
                match self.load_schema(&path) {
                    Ok(schema) => loaded.push(schema.name().to_string()),
                    Err(LoaderError::SchemaError {
                        source: Error::UnknownSchema { name },
                        ..
                    }) => {
                        unresolved.push(name);
                        deferred.push(path);
                    }
                    Err(err) => return Err(err),
                }
            }

            if deferred.len() == before {
                return Err(unresolved_error(&deferred, unresolved));
            }
            pending = deferred;
        }

        info!(dir = %dir.display(), schemas = loaded.len(), "loaded schema directory");
        Ok(loaded)
    }
}

fn schema_name(descriptor: &Value, path: &Path) -> LoaderResult<String> {
    if let Some(name) = descriptor.get("name").and_then(Value::as_str) {
        return Ok(name.to_string());
    }
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| LoaderError::invalid_descriptor(path.to_path_buf(), "cannot derive a schema name"))
}

fn schema_files(dir: &Path) -> LoaderResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir).map_err(|e| LoaderError::io_error(dir.to_path_buf(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| LoaderError::io_error(dir.to_path_buf(), e))?
            .path();
        if path.is_file() && Format::is_supported(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn unresolved_error(files: &[PathBuf], mut names: Vec<String>) -> LoaderError {
    names.sort();
    names.dedup();
    LoaderError::UnresolvedReferences {
        files: files
            .iter()
            .map(|path| {
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string())
            })
            .collect(),
        names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_schema_name_prefers_descriptor_name() {
        let path = Path::new("schemas/page.yaml");
        assert_eq!(schema_name(&json!({"name": "article"}), path).unwrap(), "article");
        assert_eq!(schema_name(&json!({"type": "object"}), path).unwrap(), "page");
    }

    #[test]
    fn test_schema_files_skip_unsupported() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yaml"), "type: object").unwrap();
        fs::write(dir.path().join("a.json"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.json")).unwrap();

        let names: Vec<_> = schema_files(dir.path())
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.json", "b.yaml"]);
    }

    #[test]
    fn test_load_schema_registers_under_file_stem() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("tag.json");
        fs::write(&file, r#"{"type": "object", "properties": {"id": {"type": "string"}}}"#).unwrap();

        let mut loader = SchemaLoader::new();
        let schema = loader.load_schema(&file).unwrap();
        assert_eq!(schema.name(), "tag");
        assert!(loader.registry().contains("tag"));
    }
}
