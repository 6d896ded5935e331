//! Interface to the record that owns the attributes
//!
//! The engine never talks to storage directly. Everything it needs from the
//! owning record (its raw attribute documents, its relations, persistence)
//! goes through [`Host`], so the same pipeline works over a database model,
//! a test double, or the bundled [`MemoryHost`](crate::memory::MemoryHost).

use crate::error::HostError;
use crate::relation::RelationConfig;
use serde_json::Value;

/// Result type for host operations
pub type HostResult<T> = std::result::Result<T, HostError>;

pub trait Host {
    /// Whether the record has been persisted before
    fn exists(&self) -> bool;

    /// Stored JSON document for an attribute
    fn raw_attribute(&self, name: &str) -> Option<String>;

    fn set_raw_attribute(&mut self, name: &str, raw: String);

    fn persist(&mut self) -> HostResult<()>;

    fn relation_loaded(&self, relation: &str) -> bool;

    /// Records of a loaded relation; `None` when the relation is not loaded
    fn loaded_relation(&self, relation: &str) -> Option<&[Value]>;

    fn load_relation(&mut self, relation: &str) -> HostResult<()>;

    /// Query a single related record by key without loading the relation
    fn find_related(&self, relation: &str, key: &str) -> HostResult<Option<Value>>;

    /// Create a related record from an object without a key and return it with its key
    fn create_related(&mut self, relation: &RelationConfig, object: &Value) -> HostResult<Value>;

    fn update_related(&mut self, relation: &RelationConfig, object: &Value) -> HostResult<()>;

    /// Link a related record; `path` is the attribute path the key came from
    fn attach(&mut self, relation: &RelationConfig, key: &str, path: Option<&str>) -> HostResult<()>;

    fn detach(&mut self, relation: &RelationConfig, key: &str) -> HostResult<()>;
}
