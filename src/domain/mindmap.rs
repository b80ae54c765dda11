//! Mind map forest model.
//!
//! Nodes carry at most one parent reference; edges and depth levels are
//! derived from the parent links rather than stored. Invalid input
//! (duplicate ids, dangling parents, cycles) is rejected at construction
//! so layout code can assume a forest.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when validating mind map input
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MindMapError {
    #[error("Duplicate node id: {0}")]
    DuplicateId(String),

    #[error("Node '{node}' references unknown parent '{parent}'")]
    UnknownParent { node: String, parent: String },

    #[error("Parent chain of node '{0}' forms a cycle")]
    Cycle(String),
}

/// A single labeled node; root nodes have no parent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MindMapNode {
    pub id: String,

    pub label: String,

    /// Parent node id; absent for roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

impl MindMapNode {
    pub fn root(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent: None,
        }
    }

    pub fn child(
        id: impl Into<String>,
        label: impl Into<String>,
        parent: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            parent: Some(parent.into()),
        }
    }
}

/// A directed edge derived from a parent link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MindMapEdge {
    pub from: String,
    pub to: String,
}

/// A validated forest of labeled nodes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawMindMap")]
pub struct MindMap {
    nodes: Vec<MindMapNode>,
}

/// Unvalidated wire shape; `MindMap` deserialization goes through this
#[derive(Debug, Deserialize)]
struct RawMindMap {
    nodes: Vec<MindMapNode>,
}

impl TryFrom<RawMindMap> for MindMap {
    type Error = MindMapError;

    fn try_from(raw: RawMindMap) -> Result<Self, Self::Error> {
        MindMap::new(raw.nodes)
    }
}

impl MindMap {
    /// Validate and build a mind map from nodes.
    ///
    /// Rejects duplicate ids, parent references to unknown nodes, and
    /// cyclic parent chains.
    pub fn new(nodes: Vec<MindMapNode>) -> Result<Self, MindMapError> {
        let mut parents: HashMap<&str, Option<&str>> = HashMap::new();

        for node in &nodes {
            if parents
                .insert(node.id.as_str(), node.parent.as_deref())
                .is_some()
            {
                return Err(MindMapError::DuplicateId(node.id.clone()));
            }
        }

        for node in &nodes {
            if let Some(parent) = node.parent.as_deref() {
                if !parents.contains_key(parent) {
                    return Err(MindMapError::UnknownParent {
                        node: node.id.clone(),
                        parent: parent.to_string(),
                    });
                }
            }

            // Walk the parent chain; more hops than nodes means a cycle.
            let mut hops = 0usize;
            let mut current = node.parent.as_deref();
            while let Some(id) = current {
                hops += 1;
                if hops > nodes.len() {
                    return Err(MindMapError::Cycle(node.id.clone()));
                }
                current = parents.get(id).copied().flatten();
            }
        }

        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[MindMapNode] {
        &self.nodes
    }

    /// Root nodes (no parent), in input order
    pub fn roots(&self) -> Vec<&MindMapNode> {
        self.nodes.iter().filter(|n| n.parent.is_none()).collect()
    }

    /// Edges derived 1:1 from parent links, in input order
    pub fn edges(&self) -> Vec<MindMapEdge> {
        self.nodes
            .iter()
            .filter_map(|node| {
                node.parent.as_ref().map(|parent| MindMapEdge {
                    from: parent.clone(),
                    to: node.id.clone(),
                })
            })
            .collect()
    }

    /// Depth of each node: length of the parent chain to its root
    pub fn levels(&self) -> HashMap<String, usize> {
        let parents: HashMap<&str, Option<&str>> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.parent.as_deref()))
            .collect();

        self.nodes
            .iter()
            .map(|node| {
                let mut depth = 0usize;
                let mut current = node.parent.as_deref();
                while let Some(id) = current {
                    depth += 1;
                    current = parents.get(id).copied().flatten();
                }
                (node.id.clone(), depth)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
