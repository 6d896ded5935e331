//! Addressable positions inside a schema
//!
//! Flattening a schema yields one [`Node`] per reachable path in pre-order:
//! a property precedes everything below it and siblings keep their declared
//! order. Array items appear under the `*` segment until the nodes are matched
//! against concrete data.

use crate::matcher::PathMatcher;
use crate::path::{self, WILDCARD};
use crate::schema::{Property, Schema, SchemaKind};
use crate::Result;
use serde_json::Value;
use std::sync::Arc;

/// A path inside a schema together with the schema describing it
#[derive(Debug, Clone)]
pub struct Node {
    pub path: String,
    pub type_name: String,
    pub schema: Option<Arc<Schema>>,
    /// `default` of a slot kept as a raw descriptor
    pub raw_default: Option<Value>,
}

impl Node {
    pub fn new(path: impl Into<String>, type_name: impl Into<String>, schema: Option<Arc<Schema>>) -> Self {
        Self {
            path: path.into(),
            type_name: type_name.into(),
            schema,
            raw_default: None,
        }
    }

    fn from_property(name: &str, property: &Property) -> Self {
        let mut node = Self::new(name, property.type_name(), property.schema().cloned());
        if let Property::Raw(descriptor) = property {
            node.raw_default = descriptor.get("default").cloned();
        }
        node
    }

    /// Declared default, from the node's schema or its raw descriptor
    pub fn default_value(&self) -> Option<&Value> {
        match &self.schema {
            Some(schema) => schema.default(),
            None => self.raw_default.as_ref(),
        }
    }

    pub fn prepend_path(&mut self, segment: &str) {
        self.path = path::join(segment, &self.path);
    }

    /// Whether this node sits strictly below `root`
    pub fn is_in_path(&self, root: &str) -> bool {
        root.is_empty()
            || self
                .path
                .strip_prefix(root)
                .is_some_and(|rest| rest.starts_with('.'))
    }

    /// Path with the `root.` prefix removed, or the full path when not below `root`
    pub fn relative_path(&self, root: &str) -> &str {
        if root.is_empty() {
            return &self.path;
        }
        self.path
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(&self.path)
    }

    pub fn has_wildcard(&self) -> bool {
        path::has_wildcard(&self.path)
    }

    pub fn last_segment(&self) -> &str {
        path::last_segment(&self.path)
    }

    pub fn parent_path(&self) -> Option<&str> {
        path::parent(&self.path)
    }

    /// Name of the node's schema, if it has one
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref().map(Schema::name)
    }
}

/// Ordered collection of nodes
#[derive(Debug, Clone, Default)]
pub struct NodeSet {
    nodes: Vec<Node>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Prefix every node's path with `segment`
    pub fn prepend_path(&mut self, segment: &str) -> &mut Self {
        for node in &mut self.nodes {
            node.prepend_path(segment);
        }
        self
    }

    /// Consuming form of [`NodeSet::prepend_path`]
    pub fn prefixed(mut self, segment: &str) -> Self {
        self.prepend_path(segment);
        self
    }

    /// Strict descendants of `root`, re-rooted so their paths no longer start with it
    pub fn from_path(&self, root: &str) -> NodeSet {
        self.nodes
            .iter()
            .filter(|node| node.is_in_path(root))
            .map(|node| {
                let mut node = node.clone();
                node.path = node.relative_path(root).to_string();
                node
            })
            .collect()
    }

    pub fn find(&self, path: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.path == path)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.path.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Extend<Node> for NodeSet {
    fn extend<I: IntoIterator<Item = Node>>(&mut self, iter: I) {
        self.nodes.extend(iter);
    }
}

impl FromIterator<Node> for NodeSet {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for NodeSet {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a Node;
    type IntoIter = std::slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl Schema {
    /// Flatten the schema into nodes, optionally restricted to the subtree at `root`
    pub fn nodes(&self, root: Option<&str>) -> NodeSet {
        let nodes = flatten(self);
        match root {
            Some(root) => nodes.from_path(root),
            None => nodes,
        }
    }

    /// Flatten, then expand wildcard nodes against the paths present in `data`
    pub fn nodes_from_data(&self, data: &Value, root: Option<&str>) -> Result<NodeSet> {
        let mut matcher = PathMatcher::new(data);
        matcher.match_nodes(&self.nodes(root))
    }
}

fn flatten(schema: &Schema) -> NodeSet {
    let slots: Vec<(&str, &Property)> = match schema.kind() {
        SchemaKind::Object { properties } => properties
            .iter()
            .map(|(name, property)| (name.as_str(), property))
            .collect(),
        SchemaKind::Tuple(items) => items
            .iter()
            .map(|(name, property)| (name.as_str(), property))
            .collect(),
        SchemaKind::ArrayOf(item) => vec![(WILDCARD, item.as_ref())],
        SchemaKind::Scalar(_) => Vec::new(),
    };

    let mut nodes = NodeSet::new();
    for (name, property) in slots {
        nodes.push(Node::from_property(name, property));
        if let Some(sub) = property.schema().filter(|sub| sub.is_structural()) {
            nodes.extend(flatten(sub).prefixed(name));
        }
    }
    nodes
}
