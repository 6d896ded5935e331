//! Linkage state stored inside the attribute value
//!
//! Each relation reducer keeps two generations of `path -> key` maps per
//! relation under `<attribute>.<namespace>.<reducer id>`: `current` is what was
//! linked at the last commit and `pending` is what the last save computed. A
//! relation absent from `pending` has no save waiting to be reconciled.

use crate::path;
use crate::{Error, Result};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Relative attribute path to related key, in node order
pub type PathKeys = IndexMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkageMetadata {
    pub current: IndexMap<String, PathKeys>,
    pub pending: IndexMap<String, PathKeys>,
}

impl LinkageMetadata {
    fn location(attribute: &str, namespace: &str, reducer_id: &str) -> String {
        path::join(&path::join(attribute, namespace), reducer_id)
    }

    /// Read the metadata kept in `state`; missing metadata reads as empty
    pub fn read(state: &Value, attribute: &str, namespace: &str, reducer_id: &str) -> Result<Self> {
        match path::get(state, &Self::location(attribute, namespace, reducer_id)) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(raw) => serde_json::from_value(raw.clone()).map_err(|err| Error::Json {
                message: format!("invalid linkage metadata for '{reducer_id}'"),
                source: err,
            }),
        }
    }

    pub fn write(&self, state: &mut Value, attribute: &str, namespace: &str, reducer_id: &str) -> Result<()> {
        match path::get(state, attribute) {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(Error::configuration(format!(
                    "attribute '{attribute}' must hold an object to carry linkage metadata"
                )))
            }
        }
        let location = Self::location(attribute, namespace, reducer_id);
        path::set(state, &location, serde_json::to_value(self)?);
        Ok(())
    }

    /// Start a new pending generation for `relation`
    pub fn begin_pending(&mut self, relation: &str) {
        self.pending.insert(relation.to_string(), PathKeys::new());
    }

    pub fn record_pending(&mut self, relation: &str, path: impl Into<String>, key: impl Into<String>) {
        self.pending
            .entry(relation.to_string())
            .or_default()
            .insert(path.into(), key.into());
    }

    pub fn has_pending(&self, relation: &str) -> bool {
        self.pending.contains_key(relation)
    }

    pub fn current_keys(&self, relation: &str) -> Vec<String> {
        unique_keys(self.current.get(relation))
    }

    pub fn pending_keys(&self, relation: &str) -> Vec<String> {
        unique_keys(self.pending.get(relation))
    }

    /// Path that first produced `key` in the pending generation
    pub fn pending_path(&self, relation: &str, key: &str) -> Option<&str> {
        self.pending
            .get(relation)?
            .iter()
            .find(|(_, pending_key)| pending_key.as_str() == key)
            .map(|(path, _)| path.as_str())
    }

    /// `current := pending; pending := {}` for `relation`
    pub fn rotate(&mut self, relation: &str) {
        self.rotate_linked(relation, &[]);
    }

    /// Rotate `relation`, leaving `unlinked` keys out of the new current generation
    ///
    /// A key whose attach failed is not linked, so it stays out of `current`
    /// and the next save attaches it again.
    pub fn rotate_linked(&mut self, relation: &str, unlinked: &[String]) {
        let mut pending = self.pending.shift_remove(relation).unwrap_or_default();
        pending.retain(|_, key| !unlinked.contains(key));
        self.current.insert(relation.to_string(), pending);
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.pending.is_empty()
    }
}

fn unique_keys(keys: Option<&PathKeys>) -> Vec<String> {
    keys.map(|keys| keys.values().cloned().collect::<IndexSet<_>>().into_iter().collect())
        .unwrap_or_default()
}

/// Drop the reducers' private namespace from an attribute value
pub fn strip_namespace(value: &mut Value, namespace: &str) {
    if let Value::Object(map) = value {
        map.remove(namespace);
    }
}

/// Copy the private namespace of `stored` into `incoming`
///
/// Callers writing a new value never see the namespace, so it has to be
/// carried across from the stored document to survive a write. An incoming
/// value that is not an object cannot carry it.
pub fn carry_namespace(stored: &Value, incoming: &mut Value, namespace: &str) {
    let Some(private) = stored.get(namespace) else {
        return;
    };
    if let Value::Object(map) = incoming {
        map.insert(namespace.to_string(), private.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NS: &str = "__relation_reducers";

    #[test]
    fn test_read_missing_is_empty() {
        let state = json!({"data": {"name": "x"}});
        let metadata = LinkageMetadata::read(&state, "data", NS, "relation:children").unwrap();
        assert!(metadata.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let mut state = json!({"data": {"children": ["1"]}});
        let mut metadata = LinkageMetadata::default();
        metadata.record_pending("children", "children.0", "1");
        metadata.write(&mut state, "data", NS, "relation:children").unwrap();

        assert_eq!(
            state["data"][NS]["relation:children"],
            json!({"current": {}, "pending": {"children": {"children.0": "1"}}})
        );
        let read = LinkageMetadata::read(&state, "data", NS, "relation:children").unwrap();
        assert_eq!(read, metadata);
    }

    #[test]
    fn test_write_rejects_array_attribute() {
        let mut state = json!({"data": ["1"]});
        let err = LinkageMetadata::default()
            .write(&mut state, "data", NS, "relation:children")
            .unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn test_keys_are_unique_in_order() {
        let mut metadata = LinkageMetadata::default();
        metadata.record_pending("children", "children.0", "2");
        metadata.record_pending("children", "child", "1");
        metadata.record_pending("children", "children.1", "2");
        assert_eq!(metadata.pending_keys("children"), vec!["2", "1"]);
        assert_eq!(metadata.pending_path("children", "2"), Some("children.0"));
    }

    #[test]
    fn test_rotate() {
        let mut metadata = LinkageMetadata::default();
        metadata.record_pending("children", "children.0", "1");
        metadata.rotate("children");
        assert_eq!(metadata.current_keys("children"), vec!["1"]);
        assert!(!metadata.has_pending("children"));
    }

    #[test]
    fn test_rotate_linked_drops_unlinked_paths() {
        let mut metadata = LinkageMetadata::default();
        metadata.record_pending("children", "children.0", "1");
        metadata.record_pending("children", "children.1", "7");
        metadata.record_pending("children", "child", "7");
        metadata.rotate_linked("children", &["7".to_string()]);
        assert_eq!(
            metadata.current["children"],
            [("children.0".to_string(), "1".to_string())].into_iter().collect::<PathKeys>()
        );
        assert!(!metadata.has_pending("children"));
    }

    #[test]
    fn test_namespace_helpers() {
        let stored = json!({"name": "old", NS: {"relation:children": {}}});
        let mut incoming = json!({"name": "new"});
        carry_namespace(&stored, &mut incoming, NS);
        assert_eq!(incoming[NS], json!({"relation:children": {}}));

        strip_namespace(&mut incoming, NS);
        assert_eq!(incoming, json!({"name": "new"}));
    }
}
