//! Spatial Index Module
//!
//! R-tree over the renderable nodes' bounding squares. Used for point hit
//! testing and for the square-overlap test auto-connect runs on every pointer
//! move, turning both from O(n) scans into O(log n) queries.

use crate::geometry::{Point, Rect};
use crate::types::NodeId;
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// Bounding square of one renderable node.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub node_id: NodeId,
    pub bounds: Rect,
}

impl SpatialEntry {
    /// Square of half-width `size` around `center`, matching how nodes are drawn.
    pub fn new(node_id: NodeId, center: Point, size: f64) -> Self {
        Self {
            node_id,
            bounds: Rect::around(center, size),
        }
    }
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.bounds.min.x, self.bounds.min.y],
            [self.bounds.max.x, self.bounds.max.y],
        )
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

/// R-tree of node squares keyed by node id.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<NodeId, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move a node's square.
    pub fn insert(&mut self, node_id: &str, center: Point, size: f64) {
        if let Some(old_entry) = self.entries.remove(node_id) {
            self.tree.remove(&old_entry);
        }

        let entry = SpatialEntry::new(node_id.to_string(), center, size);
        self.tree.insert(entry.clone());
        self.entries.insert(node_id.to_string(), entry);
    }

    pub fn remove(&mut self, node_id: &str) -> bool {
        if let Some(entry) = self.entries.remove(node_id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    pub fn bounds(&self, node_id: &str) -> Option<Rect> {
        self.entries.get(node_id).map(|entry| entry.bounds)
    }

    /// Ids of all squares containing the point.
    pub fn query_point(&self, point: Point) -> Vec<NodeId> {
        let envelope = AABB::from_point([point.x, point.y]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.bounds.contains(point))
            .map(|entry| entry.node_id.clone())
            .collect()
    }

    /// Ids of all squares strictly overlapping `rect`.
    pub fn query_overlapping(&self, rect: &Rect) -> Vec<NodeId> {
        let envelope = AABB::from_corners([rect.min.x, rect.min.y], [rect.max.x, rect.max.y]);

        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.bounds.overlaps(rect))
            .map(|entry| entry.node_id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}
