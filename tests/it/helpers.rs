//! Test helpers and builders for reducing boilerplate in tests.
//!
//! This module provides:
//! - `InMemoryGraphApi` - a `GraphApi` backed by maps, with call counters,
//!   failure injection and an optional response delay
//! - `node()` / `relation()` fixture builders
//! - `TestCanvas` helpers for feeding pointer events in graph coordinates

#![allow(dead_code)]

use async_trait::async_trait;
use graph_explorer::api::{GraphApi, NewNode, NewRelation};
use graph_explorer::error::{ApiError, ApiResult};
use graph_explorer::geometry::Point;
use graph_explorer::input::{CanvasEvent, Modifiers, MouseButton};
use graph_explorer::settings::Settings;
use graph_explorer::types::{Node, NodeConnection, NodeId, Relation, RelationId};
use graph_explorer::GraphCanvas;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fixtures
// ============================================================================

/// A persisted node at an explicit graph position.
pub fn node(id: &str, x: f64, y: f64) -> Node {
    let mut node = Node::placeholder(id).with_title(id).with_position(x, y);
    node.db_id = Some(id.to_string());
    node
}

/// A persisted relation of type `knows`.
pub fn relation(id: &str, source: &str, target: &str) -> Relation {
    let mut relation = Relation::new(id, source, target).with_type("knows");
    relation.db_id = Some(id.to_string());
    relation
}

// ============================================================================
// InMemoryGraphApi
// ============================================================================

#[derive(Default)]
pub struct InMemoryGraphApi {
    nodes: Mutex<IndexMap<NodeId, Node>>,
    relations: Mutex<IndexMap<RelationId, Relation>>,
    next_id: Mutex<u64>,
    calls: Mutex<HashMap<&'static str, usize>>,
    failing: Mutex<HashSet<&'static str>>,
    delay: Mutex<Option<Duration>>,
    posted_nodes: Mutex<Vec<NewNode>>,
    posted_relations: Mutex<Vec<NewRelation>>,
}

impl InMemoryGraphApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(self, node: Node) -> Self {
        self.nodes.lock().insert(node.id.clone(), node);
        self
    }

    pub fn with_relation(self, relation: Relation) -> Self {
        self.relations.lock().insert(relation.id.clone(), relation);
        self
    }

    /// Make every call to `operation` fail with a rejection.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub fn node(&self, id: &str) -> Option<Node> {
        self.nodes.lock().get(id).cloned()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.lock().len()
    }

    pub fn relations(&self) -> Vec<Relation> {
        self.relations.lock().values().cloned().collect()
    }

    pub fn posted_nodes(&self) -> Vec<NewNode> {
        self.posted_nodes.lock().clone()
    }

    pub fn posted_relations(&self) -> Vec<NewRelation> {
        self.posted_relations.lock().clone()
    }

    async fn enter(&self, operation: &'static str) -> ApiResult<()> {
        *self.calls.lock().entry(operation).or_default() += 1;
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().contains(operation) {
            return Err(ApiError::Rejected {
                status: 500,
                message: format!("{operation} failed"),
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut next = self.next_id.lock();
        *next += 1;
        format!("{prefix}-{}", *next)
    }
}

#[async_trait]
impl GraphApi for InMemoryGraphApi {
    async fn post_node(&self, request: NewNode) -> ApiResult<Node> {
        self.enter("post_node").await?;
        self.posted_nodes.lock().push(request.clone());
        let id = self.next_id("node");
        let node = Node {
            id: id.clone(),
            db_id: Some(id.clone()),
            title: request.title,
            labels: request.labels,
            style: request.style,
            ..Default::default()
        };
        self.nodes.lock().insert(id, node.clone());
        Ok(node)
    }

    async fn post_relation(&self, request: NewRelation) -> ApiResult<Relation> {
        self.enter("post_relation").await?;
        self.posted_relations.lock().push(request.clone());
        let id = self.next_id("relation");
        let mut relation = Relation::new(id.as_str(), request.source_id, request.target_id)
            .with_type(request.relation_type);
        relation.db_id = Some(id.clone());
        self.relations.lock().insert(id, relation.clone());
        Ok(relation)
    }

    async fn delete_node(&self, id: &str) -> ApiResult<()> {
        self.enter("delete_node").await?;
        self.nodes
            .lock()
            .shift_remove(id)
            .ok_or_else(|| ApiError::NotFound(id.to_string()))?;
        self.relations.lock().retain(|_, r| !r.connects(id));
        Ok(())
    }

    async fn fetch_nodes(&self, ids: &[NodeId]) -> ApiResult<Vec<Node>> {
        self.enter("fetch_nodes").await?;
        let nodes = self.nodes.lock();
        Ok(ids.iter().filter_map(|id| nodes.get(id).cloned()).collect())
    }

    async fn fetch_relations(&self, ids: &[RelationId]) -> ApiResult<Vec<Relation>> {
        self.enter("fetch_relations").await?;
        let relations = self.relations.lock();
        Ok(ids.iter().filter_map(|id| relations.get(id).cloned()).collect())
    }

    async fn node_connections(&self, id: &str) -> ApiResult<Vec<NodeConnection>> {
        self.enter("node_connections").await?;
        let nodes = self.nodes.lock();
        let relations = self.relations.lock();
        Ok(relations
            .values()
            .filter(|r| r.connects(id))
            .filter_map(|r| {
                let other = if r.source_id == id { &r.target_id } else { &r.source_id };
                nodes.get(other).map(|neighbor| NodeConnection {
                    relation: r.clone(),
                    neighbor: neighbor.clone(),
                })
            })
            .collect())
    }

    async fn relations_by_node_ids(&self, ids: &[NodeId]) -> ApiResult<Vec<Relation>> {
        self.enter("relations_by_node_ids").await?;
        let relations = self.relations.lock();
        Ok(relations
            .values()
            .filter(|r| ids.contains(&r.source_id) && ids.contains(&r.target_id))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Canvas helpers
// ============================================================================

/// A canvas over `api` with default settings and the built-in camera
/// (800x600, centered on the graph origin, ratio 1).
pub fn canvas_with(api: Arc<InMemoryGraphApi>) -> GraphCanvas {
    GraphCanvas::new(api, Settings::default())
}

/// Viewport position of a graph-space point.
pub fn screen(canvas: &GraphCanvas, x: f64, y: f64) -> Point {
    canvas.viewport().graph_to_viewport(Point::new(x, y))
}

pub fn down_node(canvas: &GraphCanvas, id: &str, at: Point, modifiers: Modifiers) {
    canvas.handle_event(CanvasEvent::DownNode {
        node_id: id.to_string(),
        position: at,
        button: MouseButton::Left,
        modifiers,
    });
}

pub fn down_stage(canvas: &GraphCanvas, at: Point, modifiers: Modifiers) {
    canvas.handle_event(CanvasEvent::DownStage {
        position: at,
        button: MouseButton::Left,
        modifiers,
    });
}

pub fn move_to(canvas: &GraphCanvas, at: Point) {
    canvas.handle_event(CanvasEvent::MouseMove {
        position: at,
        modifiers: Modifiers::NONE,
    });
}

pub fn mouse_up(canvas: &GraphCanvas, at: Point) {
    canvas.handle_event(CanvasEvent::MouseUp {
        position: at,
        modifiers: Modifiers::NONE,
    });
}

pub fn click_node(canvas: &GraphCanvas, id: &str, at: Point) {
    canvas.handle_event(CanvasEvent::ClickNode {
        node_id: id.to_string(),
        position: at,
    });
}
