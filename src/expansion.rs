//! Expansion bookkeeping.
//!
//! Records which neighbours each expansion revealed, so a collapse removes
//! exactly those nodes and relations (plus whatever was expanded from them)
//! and nothing that was on the canvas before.
//!
//! The tree is stored as an arena keyed by node id with explicit parent and
//! child links instead of nested maps.

use crate::types::{NodeConnection, NodeId, RelationId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpansionEntry {
    pub parent: Option<NodeId>,
    /// Connections revealed by expanding this node
    pub neighbors: Vec<NodeConnection>,
    /// Revealed neighbour ids; each has its own entry
    pub children: IndexSet<NodeId>,
}

/// Node and relation ids an expansion subtree revealed, deduplicated and in
/// discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandedIds {
    pub node_ids: Vec<NodeId>,
    pub relation_ids: Vec<RelationId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpansionTree {
    entries: HashMap<NodeId, ExpansionEntry>,
    roots: IndexSet<NodeId>,
}

impl ExpansionTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that expanding `node_id` revealed `neighbors`.
    ///
    /// Re-expanding a node replaces its neighbour list and resets its children.
    pub fn add_expanded(&mut self, node_id: &str, neighbors: Vec<NodeConnection>) {
        if !self.entries.contains_key(node_id) {
            self.entries.insert(node_id.to_string(), ExpansionEntry::default());
            self.roots.insert(node_id.to_string());
        }

        let stale: Vec<NodeId> = self
            .entries
            .get(node_id)
            .map(|entry| entry.children.iter().cloned().collect())
            .unwrap_or_default();
        for child in stale {
            self.drop_subtree(&child);
        }

        let mut children = IndexSet::new();
        for connection in &neighbors {
            let child_id = connection.neighbor.id.clone();
            if child_id == node_id || self.is_ancestor(&child_id, node_id) {
                continue;
            }
            self.detach(&child_id);
            self.entries.insert(
                child_id.clone(),
                ExpansionEntry {
                    parent: Some(node_id.to_string()),
                    ..Default::default()
                },
            );
            children.insert(child_id);
        }

        // Connections back to an ancestor are not this expansion's to collapse
        let neighbors = neighbors
            .into_iter()
            .filter(|c| children.contains(&c.neighbor.id))
            .collect();
        if let Some(entry) = self.entries.get_mut(node_id) {
            entry.neighbors = neighbors;
            entry.children = children;
        }
    }

    /// A node counts as expanded while its expansion revealed at least one child.
    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.entries
            .get(node_id)
            .is_some_and(|entry| !entry.children.is_empty())
    }

    pub fn entry(&self, node_id: &str) -> Option<&ExpansionEntry> {
        self.entries.get(node_id)
    }

    /// Ids revealed by expanding `node_id` and, recursively, by expanding
    /// anything it revealed.
    pub fn collect_node_and_relation_ids(&self, node_id: &str) -> ExpandedIds {
        let mut node_ids = IndexSet::new();
        let mut relation_ids = IndexSet::new();
        let mut stack = vec![node_id.to_string()];

        while let Some(id) = stack.pop() {
            let Some(entry) = self.entries.get(&id) else {
                continue;
            };
            if entry.children.is_empty() {
                continue;
            }
            for connection in &entry.neighbors {
                node_ids.insert(connection.neighbor.id.clone());
                relation_ids.insert(connection.relation.id.clone());
            }
            // reversed so children are visited in insertion order
            stack.extend(entry.children.iter().rev().cloned());
        }

        ExpandedIds {
            node_ids: node_ids.into_iter().collect(),
            relation_ids: relation_ids.into_iter().collect(),
        }
    }

    /// Forget what expanding `node_id` revealed, including nested expansions.
    pub fn remove_expanded(&mut self, node_id: &str) {
        let children: Vec<NodeId> = match self.entries.get_mut(node_id) {
            Some(entry) => {
                entry.neighbors.clear();
                std::mem::take(&mut entry.children).into_iter().collect()
            }
            None => return,
        };
        for child in children {
            self.drop_subtree(&child);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.roots.clear();
    }

    fn is_ancestor(&self, candidate: &str, node_id: &str) -> bool {
        let mut current = self.entries.get(node_id).and_then(|e| e.parent.as_deref());
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.entries.get(id).and_then(|e| e.parent.as_deref());
        }
        false
    }

    fn drop_subtree(&mut self, node_id: &str) {
        let mut stack = vec![node_id.to_string()];
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.entries.remove(&id) {
                stack.extend(entry.children);
            }
            self.roots.shift_remove(&id);
        }
    }

    /// Unlink an entry from its parent (or the roots) and drop its subtree.
    fn detach(&mut self, node_id: &str) {
        let parent = self.entries.get(node_id).and_then(|e| e.parent.clone());
        if let Some(parent) = parent {
            if let Some(parent_entry) = self.entries.get_mut(&parent) {
                parent_entry.children.shift_remove(node_id);
            }
        }
        self.drop_subtree(node_id);
    }
}
