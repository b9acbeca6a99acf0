//! A reference [`Adapter`] over a syntax tree described in JSON.
//!
//! ```json
//! {
//!   "types": ["Module", "Function"],
//!   "root": {
//!     "type": "Module",
//!     "attributes": { "name": "main" },
//!     "children": [
//!       { "type": "Function", "id": "f1", "attributes": { "name": "run" },
//!         "conditions": ["f2"] },
//!       { "type": "Function", "id": "f2", "attributes": { "name": "stop" } }
//!     ]
//!   }
//! }
//! ```
//!
//! Node types listed in `types` are known even when no node has them. Types
//! that appear in the tree are always known. `conditions` refers to other
//! nodes by `id`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::{Adapter, Attributes};

#[derive(Error, Debug)]
pub enum JsonTreeError {
    #[error("Failed to read syntax tree {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid syntax tree: {0}")]
    Format(#[from] serde_json::Error),
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),
    #[error("Node {node} refers to unknown condition node {condition}")]
    UnknownCondition { node: String, condition: String },
}

#[derive(Debug, Clone, Deserialize)]
struct TreeDocument {
    #[serde(default)]
    types: Vec<String>,
    root: JsonNode,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonNode {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attributes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    conditions: Vec<String>,
    #[serde(default)]
    children: Vec<JsonNode>,
}

#[derive(Debug, Clone)]
struct FlatNode {
    node_type: String,
    attributes: Option<BTreeMap<String, String>>,
    parent: Option<usize>,
    conditions: Vec<usize>,
}

/// Syntax tree loaded from JSON. Node handles are indices in document order,
/// the root being `0`.
#[derive(Debug, Clone)]
pub struct JsonTree {
    nodes: Vec<FlatNode>,
    types: BTreeSet<String>,
}

impl JsonTree {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, JsonTreeError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| JsonTreeError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, JsonTreeError> {
        let document: TreeDocument = serde_json::from_str(content)?;

        let mut nodes = Vec::new();
        let mut pending_conditions = Vec::new();
        let mut ids = HashMap::new();
        flatten(
            document.root,
            None,
            &mut nodes,
            &mut pending_conditions,
            &mut ids,
        )?;

        for (index, condition_ids) in pending_conditions {
            for condition in condition_ids {
                let target = ids.get(&condition).copied().ok_or_else(|| {
                    JsonTreeError::UnknownCondition {
                        node: index.to_string(),
                        condition: condition.clone(),
                    }
                })?;
                nodes[index].conditions.push(target);
            }
        }

        let mut types: BTreeSet<String> = document.types.into_iter().collect();
        types.extend(nodes.iter().map(|node| node.node_type.clone()));

        tracing::debug!(nodes = nodes.len(), types = types.len(), "loaded syntax tree");
        Ok(Self { nodes, types })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> usize {
        0
    }
}

fn flatten(
    node: JsonNode,
    parent: Option<usize>,
    nodes: &mut Vec<FlatNode>,
    pending_conditions: &mut Vec<(usize, Vec<String>)>,
    ids: &mut HashMap<String, usize>,
) -> Result<(), JsonTreeError> {
    let index = nodes.len();
    if let Some(id) = node.id {
        if ids.insert(id.clone(), index).is_some() {
            return Err(JsonTreeError::DuplicateId(id));
        }
    }
    if !node.conditions.is_empty() {
        pending_conditions.push((index, node.conditions));
    }
    nodes.push(FlatNode {
        node_type: node.node_type,
        attributes: node.attributes,
        parent,
        conditions: Vec::new(),
    });
    for child in node.children {
        flatten(child, Some(index), nodes, pending_conditions, ids)?;
    }
    Ok(())
}

/// Attribute map of one [`JsonTree`] node.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonAttributes {
    node_type: String,
    values: BTreeMap<String, String>,
}

impl Attributes for JsonAttributes {
    fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    fn value_of(&self, name: &str) -> String {
        self.values.get(name).cloned().unwrap_or_default()
    }

    fn to_display_string(&self) -> String {
        let values = self
            .values
            .iter()
            .map(|(name, value)| format!("{}=\"{}\"", name, value))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}[{}]", self.node_type, values)
    }
}

impl Adapter for JsonTree {
    type Node = usize;

    fn parents_of(&self, node: &usize) -> Vec<usize> {
        let mut parents = Vec::new();
        let mut current = self.nodes.get(*node).and_then(|n| n.parent);
        while let Some(index) = current {
            parents.push(index);
            current = self.nodes[index].parent;
        }
        parents
    }

    fn nodes_of_type(&self, type_name: &str) -> Vec<usize> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.node_type == type_name)
            .map(|(index, _)| index)
            .collect()
    }

    fn conditions_of(&self, node: &usize) -> Vec<usize> {
        self.nodes
            .get(*node)
            .map(|n| n.conditions.clone())
            .unwrap_or_default()
    }

    fn attributes_of(&self, node: &usize) -> Option<Box<dyn Attributes>> {
        let node = self.nodes.get(*node)?;
        let values = node.attributes.clone()?;
        Some(Box::new(JsonAttributes {
            node_type: node.node_type.clone(),
            values,
        }))
    }

    fn type_exists(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const TREE: &str = r#"{
        "types": ["Module", "Class", "Function", "Macro"],
        "root": {
            "type": "Module",
            "attributes": { "name": "main" },
            "children": [
                {
                    "type": "Class",
                    "id": "c",
                    "attributes": { "name": "Engine" },
                    "children": [
                        { "type": "Function", "id": "f1", "attributes": { "name": "run", "lines": "12" },
                          "conditions": ["f2"] },
                        { "type": "Function", "id": "f2", "attributes": { "name": "stop", "lines": "3" } }
                    ]
                },
                { "type": "Comment" }
            ]
        }
    }"#;

    #[test]
    fn test_document_order_handles() {
        let tree = JsonTree::from_json(TREE).unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.nodes_of_type("Function"), vec![2, 3]);
        assert_eq!(tree.nodes_of_type("Module"), vec![0]);
    }

    #[test]
    fn test_parents_nearest_first() {
        let tree = JsonTree::from_json(TREE).unwrap();
        assert_eq!(tree.parents_of(&2), vec![1, 0]);
        assert!(tree.parents_of(&0).is_empty());
    }

    #[test]
    fn test_conditions_resolve_ids() {
        let tree = JsonTree::from_json(TREE).unwrap();
        assert_eq!(tree.conditions_of(&2), vec![3]);
        assert!(tree.conditions_of(&3).is_empty());
    }

    #[test]
    fn test_attributes() {
        let tree = JsonTree::from_json(TREE).unwrap();
        let attributes = tree.attributes_of(&2).unwrap();
        assert!(attributes.has("name"));
        assert_eq!(attributes.value_of("lines"), "12");
        assert_eq!(
            attributes.to_display_string(),
            "Function[lines=\"12\" name=\"run\"]"
        );
        assert!(tree.attributes_of(&4).is_none());
    }

    #[test]
    fn test_known_types() {
        let tree = JsonTree::from_json(TREE).unwrap();
        assert!(tree.type_exists("Macro"));
        assert!(tree.type_exists("Comment"));
        assert!(!tree.type_exists("Enum"));
    }

    #[test]
    fn test_invalid_documents() {
        let duplicate = r#"{ "root": { "type": "A", "id": "x", "children": [ { "type": "B", "id": "x" } ] } }"#;
        assert!(matches!(
            JsonTree::from_json(duplicate),
            Err(JsonTreeError::DuplicateId(id)) if id == "x"
        ));

        let dangling = r#"{ "root": { "type": "A", "conditions": ["nowhere"] } }"#;
        assert!(matches!(
            JsonTree::from_json(dangling),
            Err(JsonTreeError::UnknownCondition { .. })
        ));

        assert!(matches!(
            JsonTree::from_json("{ \"types\": [] }"),
            Err(JsonTreeError::Format(_))
        ));
    }
}
