//! Expansion of wildcard node paths against concrete data
//!
//! A node path without `*` is kept as-is whether or not the data contains it.
//! A wildcard path is replaced by every distinct prefix of a data path that it
//! matches, in data order, so `children.*` over a three-element array becomes
//! `children.0`, `children.1` and `children.2`. When the data has no match the
//! node disappears.

use crate::node::{Node, NodeSet};
use crate::path::{self, WILDCARD};
use crate::{Error, Result};
use indexmap::IndexSet;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Matches node paths against the leaf paths of one document
#[derive(Debug, Clone)]
pub struct PathMatcher {
    data_paths: Vec<String>,
    pattern_cache: HashMap<String, Regex>,
}

impl PathMatcher {
    pub fn new(data: &Value) -> Self {
        Self {
            data_paths: path::data_paths(data),
            pattern_cache: HashMap::new(),
        }
    }

    pub fn data_paths(&self) -> &[String] {
        &self.data_paths
    }

    /// Concrete paths for one node path
    pub fn matching_paths(&mut self, node_path: &str) -> Result<Vec<String>> {
        if !path::has_wildcard(node_path) {
            return Ok(vec![node_path.to_string()]);
        }

        let regex = self.get_or_compile(node_path)?;
        let matches: IndexSet<String> = self
            .data_paths
            .iter()
            .filter_map(|data_path| regex.captures(data_path))
            .filter_map(|captures| captures.get(1))
            .map(|found| found.as_str().to_string())
            .collect();
        Ok(matches.into_iter().collect())
    }

    /// Replace every wildcard node with one node per concrete match
    pub fn match_nodes(&mut self, nodes: &NodeSet) -> Result<NodeSet> {
        let mut matched = NodeSet::new();
        for node in nodes {
            for concrete in self.matching_paths(&node.path)? {
                matched.push(Node {
                    path: concrete,
                    ..node.clone()
                });
            }
        }
        Ok(matched)
    }

    fn get_or_compile(&mut self, node_path: &str) -> Result<Regex> {
        if let Some(regex) = self.pattern_cache.get(node_path) {
            return Ok(regex.clone());
        }
        let regex = compile_pattern(node_path)?;
        self.pattern_cache
            .insert(node_path.to_string(), regex.clone());
        Ok(regex)
    }
}

/// Anchored regex for a node path; the match must end on a segment boundary
pub fn compile_pattern(node_path: &str) -> Result<Regex> {
    let body = path::segments(node_path)
        .map(|segment| {
            if segment == WILDCARD {
                "[^.]+".to_string()
            } else {
                regex::escape(segment)
            }
        })
        .collect::<Vec<_>>()
        .join(r"\.");

    Regex::new(&format!(r"^({body})(?:\.|$)")).map_err(|err| Error::Configuration {
        message: format!("invalid node path pattern '{node_path}'"),
        source: Some(err.into()),
    })
}

/// Match `nodes` against `data` in one call
pub fn match_against_data(nodes: &NodeSet, data: &Value) -> Result<NodeSet> {
    PathMatcher::new(data).match_nodes(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_literal_paths_pass_through() {
        let mut matcher = PathMatcher::new(&Value::Null);
        assert_eq!(matcher.matching_paths("a.b").unwrap(), vec!["a.b"]);
    }

    #[test]
    fn test_wildcard_respects_segment_boundary() {
        let data = json!({"items": [{"id": 1, "identifier": 2}]});
        let mut matcher = PathMatcher::new(&data);
        assert_eq!(matcher.matching_paths("items.*.id").unwrap(), vec!["items.0.id"]);
        assert_eq!(matcher.matching_paths("items.*").unwrap(), vec!["items.0"]);
    }

    #[test]
    fn test_root_wildcard_matches_first_segment() {
        let data = json!([{"id": 1}, {"id": 2}, 3]);
        let mut matcher = PathMatcher::new(&data);
        assert_eq!(matcher.matching_paths("*").unwrap(), vec!["0", "1", "2"]);
        assert_eq!(matcher.matching_paths("*.id").unwrap(), vec!["0.id", "1.id"]);
    }

    #[test]
    fn test_empty_and_null_collections_drop_wildcards() {
        let mut matcher = PathMatcher::new(&json!({"children": []}));
        assert!(matcher.matching_paths("children.*").unwrap().is_empty());

        let mut matcher = PathMatcher::new(&json!({"children": null}));
        assert!(matcher.matching_paths("children.*").unwrap().is_empty());
    }

    #[test]
    fn test_literal_segments_are_escaped() {
        let data = json!({"a+b": [1], "aab": [2]});
        let mut matcher = PathMatcher::new(&data);
        assert_eq!(matcher.matching_paths("a+b.*").unwrap(), vec!["a+b.0"]);
    }

    #[test]
    fn test_match_nodes_keeps_node_order() {
        let nodes: NodeSet = ["list", "list.*", "list.*.id"]
            .into_iter()
            .map(|path| Node::new(path, "x", None))
            .collect();
        let data = json!({"list": [{"id": 1}, {"id": 2}]});
        let matched = match_against_data(&nodes, &data).unwrap();
        assert_eq!(
            matched.paths(),
            vec!["list", "list.0", "list.1", "list.0.id", "list.1.id"]
        );
    }
}
