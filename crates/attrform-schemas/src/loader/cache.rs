//! In-memory cache of parsed descriptor files
//!
//! Copyright (c) 2025 Attrform Team
//! Licensed under the Apache-2.0 license

use crate::loader::error::{LoaderError, LoaderResult};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Parsed descriptor with the file state it was read from
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub content: Value,
    pub cached_at: SystemTime,
    /// File modification time when cached
    pub file_mtime: SystemTime,
    pub file_path: PathBuf,
}

impl CacheEntry {
    pub fn new(content: Value, file_path: PathBuf, file_mtime: SystemTime) -> Self {
        Self {
            content,
            cached_at: SystemTime::now(),
            file_mtime,
            file_path,
        }
    }

    /// Stale once the file changed or the entry outlived `max_age`
    pub fn is_valid(&self, current_mtime: SystemTime, max_age: Option<Duration>) -> bool {
        if current_mtime > self.file_mtime {
            return false;
        }
        match (max_age, self.cached_at.elapsed()) {
            (Some(max_age), Ok(elapsed)) => elapsed <= max_age,
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_age: Option<Duration>,
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_age: Some(Duration::from_secs(3600)),
            enabled: true,
        }
    }
}

/// Least-recently-used cache keyed by canonical file path
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: HashMap<PathBuf, CacheEntry>,
    config: CacheConfig,
    access_order: Vec<PathBuf>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::with_config(CacheConfig::default())
    }

    pub fn with_config(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            config,
            access_order: Vec::new(),
        }
    }

    /// Cached content for `path`, if present and still fresh
    pub fn get(&mut self, path: &Path) -> LoaderResult<Option<Value>> {
        if !self.config.enabled {
            return Ok(None);
        }

        let canonical = canonicalize(path)?;
        let Some(entry) = self.entries.get(&canonical) else {
            return Ok(None);
        };

        if entry.is_valid(modified(path)?, self.config.max_age) {
            let content = entry.content.clone();
            self.touch(&canonical);
            Ok(Some(content))
        } else {
            self.evict(&canonical);
            Ok(None)
        }
    }

    pub fn put(&mut self, path: &Path, content: Value) -> LoaderResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let canonical = canonicalize(path)?;
        let entry = CacheEntry::new(content, canonical.clone(), modified(path)?);

        if !self.entries.contains_key(&canonical) && self.entries.len() >= self.config.max_entries {
            if let Some(oldest) = self.access_order.first().cloned() {
                self.evict(&oldest);
            }
        }

        self.entries.insert(canonical.clone(), entry);
        self.touch(&canonical);
        Ok(())
    }

    pub fn remove(&mut self, path: &Path) -> LoaderResult<bool> {
        let canonical = canonicalize(path)?;
        let removed = self.entries.contains_key(&canonical);
        self.evict(&canonical);
        Ok(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, path: &Path) {
        self.access_order.retain(|entry| entry != path);
        self.access_order.push(path.to_path_buf());
    }

    fn evict(&mut self, path: &Path) {
        self.entries.remove(path);
        self.access_order.retain(|entry| entry != path);
    }
}

fn canonicalize(path: &Path) -> LoaderResult<PathBuf> {
    path.canonicalize()
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}

fn modified(path: &Path) -> LoaderResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| LoaderError::io_error(path.to_path_buf(), e))
}
