//! Graph mirror store.
//!
//! Owns the renderable multigraph the external renderer draws. Every mutation
//! goes through [`GraphStore`]; plugins borrow it through the canvas and never
//! touch the node and relation maps directly.
//!
//! ## Invariants
//!
//! - A renderable relation exists only while both endpoint nodes exist.
//!   Relations with a missing endpoint are dropped silently at insertion, and
//!   removing a node drops its incident relations.
//! - Adding an element whose id is already present is a no-op.
//! - The spatial index always mirrors node positions and sizes.

pub mod attributes;
pub mod parallel;

pub use attributes::{RelationKind, RenderNode, RenderRelation};
pub use parallel::ParallelIndex;

use crate::constants::*;
use crate::geometry::{Point, Rect};
use crate::spatial_index::SpatialIndex;
use crate::types::{Node, NodeId, Relation, RelationId};
use attributes::{node_attributes, node_graph_size, parse_style_number, relation_attributes};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// Round to two decimals, the precision the size factor is shown with.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct GraphStore {
    nodes: IndexMap<NodeId, RenderNode>,
    relations: IndexMap<RelationId, RenderRelation>,
    highlighted_nodes: IndexSet<NodeId>,
    highlighted_relations: IndexSet<RelationId>,
    spatial: SpatialIndex,
    zoom_factor: f64,
    node_size_factor: f64,
    label_size_factor: f64,
}

impl Default for GraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphStore {
    pub fn new() -> Self {
        Self {
            nodes: IndexMap::new(),
            relations: IndexMap::new(),
            highlighted_nodes: IndexSet::new(),
            highlighted_relations: IndexSet::new(),
            spatial: SpatialIndex::new(),
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            node_size_factor: 1.0,
            label_size_factor: 1.0,
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Insert a node, deriving its visual attributes from the style record.
    ///
    /// Returns false when a node with the same id already exists.
    pub fn add_node(&mut self, node: &Node) -> bool {
        self.insert_node(node, false)
    }

    pub fn add_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) -> usize {
        nodes.into_iter().filter(|node| self.add_node(node)).count()
    }

    /// Insert a client-only node. Its id must carry the provisional prefix.
    pub fn add_provisional_node(&mut self, node: &Node) -> bool {
        debug_assert!(node.id.starts_with(PROVISIONAL_ID_PREFIX));
        self.insert_node(node, true)
    }

    fn insert_node(&mut self, node: &Node, provisional: bool) -> bool {
        if self.nodes.contains_key(&node.id) {
            trace!(node_id = %node.id, "node already present");
            return false;
        }

        let mut render = node_attributes(node, self.node_size_factor);
        render.provisional = provisional;
        self.spatial
            .insert(&node.id, Point::new(render.x, render.y), render.size);
        self.nodes.insert(node.id.clone(), render);
        debug!(node_id = %node.id, provisional, "node added");
        true
    }

    /// Un-highlight and remove a node together with its incident relations.
    pub fn remove_node(&mut self, id: &str) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }
        self.un_highlight_node(id);

        let incident: Vec<RelationId> = self.relations_of(id);
        for relation_id in incident {
            self.remove_relation(&relation_id);
        }

        self.spatial.remove(id);
        self.nodes.shift_remove(id);
        debug!(node_id = %id, "node removed");
        true
    }

    pub fn node(&self, id: &str) -> Option<&RenderNode> {
        self.nodes.get(id)
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &RenderNode)> {
        self.nodes.iter()
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().cloned().collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_position(&self, id: &str) -> Option<Point> {
        self.nodes.get(id).map(|n| Point::new(n.x, n.y))
    }

    pub fn set_node_position(&mut self, id: &str, position: Point) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        node.x = position.x;
        node.y = position.y;
        self.spatial.insert(id, position, node.size);
        true
    }

    pub fn move_node_by(&mut self, id: &str, dx: f64, dy: f64) -> bool {
        match self.node_position(id) {
            Some(position) => self.set_node_position(id, position.offset(dx, dy)),
            None => false,
        }
    }

    pub fn set_node_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.nodes.get_mut(id) {
            Some(node) => {
                node.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Unhide every node and relation.
    pub fn show_all(&mut self) {
        for node in self.nodes.values_mut() {
            node.hidden = false;
        }
        for relation in self.relations.values_mut() {
            relation.hidden = false;
        }
    }

    /// Merge refreshed domain nodes, keeping each node's current position and flags.
    pub fn update_nodes<'a>(&mut self, nodes: impl IntoIterator<Item = &'a Node>) {
        for node in nodes {
            let Some(current) = self.nodes.get(&node.id) else {
                continue;
            };
            let mut render = node_attributes(node, self.node_size_factor);
            render.x = current.x;
            render.y = current.y;
            render.highlighted = current.highlighted;
            render.hidden = current.hidden;
            render.provisional = current.provisional;

            self.spatial
                .insert(&node.id, Point::new(render.x, render.y), render.size);
            self.nodes.insert(node.id.clone(), render);
        }
    }

    // ------------------------------------------------------------------
    // Relations
    // ------------------------------------------------------------------

    /// Insert a relation between two existing nodes.
    ///
    /// Returns false when the relation already exists or an endpoint is missing.
    pub fn add_relation(&mut self, relation: &Relation) -> bool {
        self.insert_relation(relation, false)
    }

    pub fn add_relations<'a>(
        &mut self,
        relations: impl IntoIterator<Item = &'a Relation>,
    ) -> usize {
        relations
            .into_iter()
            .filter(|relation| self.add_relation(relation))
            .count()
    }

    pub fn add_provisional_relation(&mut self, relation: &Relation) -> bool {
        debug_assert!(relation.id.starts_with(PROVISIONAL_ID_PREFIX));
        self.insert_relation(relation, true)
    }

    fn insert_relation(&mut self, relation: &Relation, provisional: bool) -> bool {
        if self.relations.contains_key(&relation.id) {
            trace!(relation_id = %relation.id, "relation already present");
            return false;
        }
        if !self.nodes.contains_key(&relation.source_id)
            || !self.nodes.contains_key(&relation.target_id)
        {
            trace!(relation_id = %relation.id, "relation endpoint missing, skipped");
            return false;
        }

        let mut render = relation_attributes(relation);
        render.provisional = provisional;
        self.relations.insert(relation.id.clone(), render);
        debug!(relation_id = %relation.id, provisional, "relation added");
        true
    }

    pub fn remove_relation(&mut self, id: &str) -> bool {
        self.highlighted_relations.shift_remove(id);
        self.relations.shift_remove(id).is_some()
    }

    /// Point a relation at a different target node.
    pub fn retarget_relation(&mut self, id: &str, target: &str) -> bool {
        if !self.nodes.contains_key(target) {
            return false;
        }
        match self.relations.get_mut(id) {
            Some(relation) => {
                relation.target = target.to_string();
                relation.data.target_id = target.to_string();
                true
            }
            None => false,
        }
    }

    pub fn relation(&self, id: &str) -> Option<&RenderRelation> {
        self.relations.get(id)
    }

    pub fn has_relation(&self, id: &str) -> bool {
        self.relations.contains_key(id)
    }

    pub fn relations(&self) -> impl Iterator<Item = (&RelationId, &RenderRelation)> {
        self.relations.iter()
    }

    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Ids of the relations touching `node_id` at either end.
    pub fn relations_of(&self, node_id: &str) -> Vec<RelationId> {
        self.relations
            .iter()
            .filter(|(_, r)| r.source == node_id || r.target == node_id)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn set_relation_hidden(&mut self, id: &str, hidden: bool) -> bool {
        match self.relations.get_mut(id) {
            Some(relation) => {
                relation.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Merge refreshed domain relations, keeping parallel indexing and flags.
    pub fn update_relations<'a>(&mut self, relations: impl IntoIterator<Item = &'a Relation>) {
        for relation in relations {
            let Some(current) = self.relations.get(&relation.id) else {
                continue;
            };
            let mut render = relation_attributes(relation);
            render.source = current.source.clone();
            render.target = current.target.clone();
            render.kind = current.kind;
            render.curvature = current.curvature;
            render.parallel_index = current.parallel_index;
            render.parallel_min_index = current.parallel_min_index;
            render.parallel_max_index = current.parallel_max_index;
            render.highlighted = current.highlighted;
            render.hidden = current.hidden;
            render.provisional = current.provisional;
            if render.highlighted {
                render.color = SELECTED_RELATION_COLOR.to_string();
            }
            self.relations.insert(relation.id.clone(), render);
        }
    }

    // ------------------------------------------------------------------
    // Highlighting
    // ------------------------------------------------------------------

    pub fn highlight_node(&mut self, id: &str) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.highlighted {
            return;
        }
        node.highlighted = true;
        self.highlighted_nodes.insert(id.to_string());
    }

    pub fn un_highlight_node(&mut self, id: &str) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.highlighted = false;
        }
        self.highlighted_nodes.shift_remove(id);
    }

    pub fn un_highlight_nodes(&mut self) {
        for id in std::mem::take(&mut self.highlighted_nodes) {
            if let Some(node) = self.nodes.get_mut(&id) {
                node.highlighted = false;
            }
        }
    }

    pub fn is_node_highlighted(&self, id: &str) -> bool {
        self.highlighted_nodes.contains(id)
    }

    /// Highlighted node ids in highlight order.
    pub fn highlighted_nodes(&self) -> Vec<NodeId> {
        self.highlighted_nodes.iter().cloned().collect()
    }

    pub fn highlight_relation(&mut self, id: &str) {
        let Some(relation) = self.relations.get_mut(id) else {
            return;
        };
        if relation.highlighted {
            return;
        }
        relation.highlighted = true;
        relation.color = SELECTED_RELATION_COLOR.to_string();
        self.highlighted_relations.insert(id.to_string());
    }

    pub fn un_highlight_relation(&mut self, id: &str) {
        if let Some(relation) = self.relations.get_mut(id) {
            relation.highlighted = false;
            relation.color = attributes::relation_color(&relation.data);
        }
        self.highlighted_relations.shift_remove(id);
    }

    pub fn un_highlight_relations(&mut self) {
        for id in std::mem::take(&mut self.highlighted_relations) {
            if let Some(relation) = self.relations.get_mut(&id) {
                relation.highlighted = false;
                relation.color = attributes::relation_color(&relation.data);
            }
        }
    }

    pub fn is_relation_highlighted(&self, id: &str) -> bool {
        self.highlighted_relations.contains(id)
    }

    pub fn highlighted_relations(&self) -> Vec<RelationId> {
        self.highlighted_relations.iter().cloned().collect()
    }

    /// Clear every node and relation highlight.
    pub fn un_highlight_all(&mut self) {
        self.un_highlight_nodes();
        self.un_highlight_relations();
    }

    // ------------------------------------------------------------------
    // Parallel relations
    // ------------------------------------------------------------------

    /// Recompute parallel indices for every relation.
    pub fn index_parallel_relations(&mut self) {
        let indices = parallel::compute_parallel_indices(&self.relations);
        for (id, relation) in self.relations.iter_mut() {
            match indices.get(id) {
                Some(index) => {
                    relation.parallel_index = Some(index.index);
                    relation.parallel_min_index = Some(index.min);
                    relation.parallel_max_index = Some(index.max);
                }
                None => {
                    relation.parallel_index = None;
                    relation.parallel_min_index = None;
                    relation.parallel_max_index = None;
                }
            }
        }
        trace!(groups = indices.len(), "parallel relations indexed");
    }

    pub fn adapt_relation_type_and_curvature(&mut self, id: &str) {
        if let Some(relation) = self.relations.get_mut(id) {
            parallel::adapt_type_and_curvature(relation);
        }
    }

    pub fn adapt_relations_type_and_curvature(&mut self) {
        for relation in self.relations.values_mut() {
            parallel::adapt_type_and_curvature(relation);
        }
    }

    // ------------------------------------------------------------------
    // Spatial queries
    // ------------------------------------------------------------------

    /// Visible node under a graph-space point, closest center first.
    pub fn node_at(&self, point: Point) -> Option<NodeId> {
        self.spatial
            .query_point(point)
            .into_iter()
            .filter_map(|id| self.nodes.get(&id).map(|n| (id, n)))
            .filter(|(_, n)| !n.hidden)
            .map(|(id, n)| {
                let (dx, dy) = point.delta_to(Point::new(n.x, n.y));
                (id, dx * dx + dy * dy)
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    /// First visible node, in insertion order, whose square overlaps `id`'s square.
    pub fn overlapping_node(&self, id: &str) -> Option<NodeId> {
        let bounds: Rect = self.spatial.bounds(id)?;
        self.spatial
            .query_overlapping(&bounds)
            .into_iter()
            .filter(|other| other != id)
            .filter_map(|other| {
                let (index, _, node) = self.nodes.get_full(&other)?;
                (!node.hidden).then_some((index, other))
            })
            .min_by_key(|(index, _)| *index)
            .map(|(_, other)| other)
    }

    // ------------------------------------------------------------------
    // Factors
    // ------------------------------------------------------------------

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Set the zooming ratio, rounded to one decimal and clamped.
    pub fn set_zoom_factor(&mut self, factor: f64) -> f64 {
        let rounded = (factor * 10.0).round() / 10.0;
        self.zoom_factor = rounded.clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR);
        self.zoom_factor
    }

    pub fn node_size_factor(&self) -> f64 {
        self.node_size_factor
    }

    /// Set the node size factor and recompute every node's size from its diameter.
    pub fn set_node_size_factor(&mut self, factor: f64) -> f64 {
        self.node_size_factor = round2(factor).max(MIN_NODE_SIZE_FACTOR);

        for (id, node) in self.nodes.iter_mut() {
            let diameter = parse_style_number(node.data.style.get("diameter"));
            let border_width = parse_style_number(node.data.style.get("border-width"))
                .unwrap_or(DEFAULT_NODE_BORDER_WIDTH);
            node.size = node_graph_size(diameter, self.node_size_factor);
            node.border_size = border_width / node.size;
            self.spatial.insert(id, Point::new(node.x, node.y), node.size);
        }
        self.node_size_factor
    }

    pub fn label_size_factor(&self) -> f64 {
        self.label_size_factor
    }

    pub fn set_label_size_factor(&mut self, factor: f64) -> f64 {
        self.label_size_factor = round2(factor).max(MIN_NODE_SIZE_FACTOR);
        self.label_size_factor
    }

    /// Drop every node and relation. Factors are kept.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.relations.clear();
        self.highlighted_nodes.clear();
        self.highlighted_relations.clear();
        self.spatial.clear();
    }
}
