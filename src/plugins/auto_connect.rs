//! Drag-to-connect (ctrl + drag from a node).
//!
//! Phase one is local: a provisional ghost node follows the pointer, joined to
//! the source by a provisional ghost relation. When the ghost overlaps another
//! node the relation snaps to that node and the ghost hides.
//!
//! Phase two runs on mouse up. Snapped, only the relation is created remotely;
//! unsnapped, a node is created at the ghost's position first. The ghosts are
//! discarded once the remote calls resolve, whatever the outcome, and the
//! server's objects take their place.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::api::{NewNode, NewRelation};
use crate::constants::{GHOST_NODE_DIAMETER, GHOST_RELATION_SHAFT_WIDTH, PROVISIONAL_ID_PREFIX};
use crate::error::ApiError;
use crate::geometry::Point;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::notifications::Notification;
use crate::types::{Node, NodeId, Relation, StyleProperties};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A fresh id in the provisional namespace.
pub fn provisional_id() -> String {
    format!("{PROVISIONAL_ID_PREFIX}{}", Uuid::new_v4())
}

#[derive(Debug, Default)]
struct Gesture {
    /// Node the last node-down happened on
    source: Option<NodeId>,
    ghost_node: Option<NodeId>,
    ghost_relation: Option<Relation>,
    /// Real node the ghost relation currently snaps to
    target: Option<NodeId>,
    last_point: Option<Point>,
}

impl Gesture {
    fn is_active(&self) -> bool {
        self.ghost_node.is_some()
    }
}

/// Everything the commit needs, detached from the live gesture.
#[derive(Debug)]
struct PendingCommit {
    source: NodeId,
    target: Option<NodeId>,
    ghost_node: NodeId,
    ghost_relation: Relation,
    ghost_position: Point,
}

#[derive(Debug, Default)]
pub struct AutoConnectPlugin {
    gesture: Mutex<Gesture>,
}

impl AutoConnectPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.lock().is_active()
    }

    /// Real node the ghost relation snaps to, if any.
    pub fn target(&self) -> Option<NodeId> {
        self.gesture.lock().target.clone()
    }

    pub fn ghost_node(&self) -> Option<NodeId> {
        self.gesture.lock().ghost_node.clone()
    }

    pub fn ghost_relation(&self) -> Option<Relation> {
        self.gesture.lock().ghost_relation.clone()
    }

    fn record_source(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let mut gesture = self.gesture.lock();
        if gesture.is_active() {
            return;
        }
        gesture.source = event.node_id().map(str::to_string);
        // The ghost follows the pointer from the press point
        gesture.last_point = Some(ctx.viewport.viewport_to_graph(event.position));
    }

    fn begin(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let mut gesture = self.gesture.lock();
        let Some(source) = gesture.source.clone() else {
            return;
        };
        if gesture.is_active() {
            return;
        }

        let relation_type = ctx.settings.read().default_relation_type.clone();
        let ghost_node = Node::placeholder(provisional_id())
            .with_style("diameter", GHOST_NODE_DIAMETER.to_string());
        let mut ghost_relation = Relation::new(provisional_id(), source.as_str(), ghost_node.id.as_str())
            .with_style("shaft-width", GHOST_RELATION_SHAFT_WIDTH);
        ghost_relation.relation_type = relation_type.unwrap_or_default();

        {
            let mut graph = ctx.graph.lock();
            let Some(position) = graph.node_position(&source) else {
                return;
            };
            let ghost_node = ghost_node.with_position(position.x, position.y);
            graph.add_provisional_node(&ghost_node);
            graph.add_provisional_relation(&ghost_relation);
            graph.index_parallel_relations();
            graph.adapt_relation_type_and_curvature(&ghost_relation.id);
            graph.un_highlight_nodes();
            graph.highlight_node(&ghost_node.id);
            gesture.ghost_node = Some(ghost_node.id);
        }

        debug!(source = %source, ghost = ?gesture.ghost_node, "auto-connect started");
        gesture.ghost_relation = Some(ghost_relation);
        gesture.target = None;
        if gesture.last_point.is_none() {
            gesture.last_point = Some(ctx.viewport.viewport_to_graph(event.position));
        }
    }

    fn follow(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let mut gesture = self.gesture.lock();
        let Gesture {
            source: Some(source),
            ghost_node: Some(ghost),
            ghost_relation: Some(relation),
            target,
            last_point,
        } = &mut *gesture
        else {
            return;
        };

        let point = ctx.viewport.viewport_to_graph(event.position);
        let (dx, dy) = last_point.map_or((0.0, 0.0), |previous| previous.delta_to(point));
        *last_point = Some(point);

        let mut graph = ctx.graph.lock();
        graph.move_node_by(ghost, dx, dy);

        let overlap = graph
            .overlapping_node(ghost)
            .filter(|id| !id.starts_with(PROVISIONAL_ID_PREFIX));

        match overlap {
            Some(other) if other != *source && target.as_ref() != Some(&other) => {
                graph.set_node_hidden(ghost, true);
                graph.retarget_relation(&relation.id, &other);
                relation.target_id = other.clone();
                *target = Some(other);
            }
            None if target.is_some() => {
                graph.set_node_hidden(ghost, false);
                graph.retarget_relation(&relation.id, ghost);
                relation.target_id = ghost.clone();
                *target = None;
            }
            _ => return,
        }
        graph.index_parallel_relations();
        graph.adapt_relation_type_and_curvature(&relation.id);
    }

    /// Detach the finished gesture for committing.
    fn take_commit(&self, ctx: &PluginContext) -> Option<PendingCommit> {
        // Presses that never became a gesture leave nothing behind either
        let gesture = std::mem::take(&mut *self.gesture.lock());
        if !gesture.is_active() {
            return None;
        }
        let ghost_node = gesture.ghost_node?;
        let ghost_relation = gesture.ghost_relation?;
        let source = gesture.source?;
        let ghost_position = ctx.graph.lock().node_position(&ghost_node)?;
        Some(PendingCommit {
            source,
            target: gesture.target,
            ghost_node,
            ghost_relation,
            ghost_position,
        })
    }

    fn mouse_up(&self, ctx: &PluginContext) {
        let Some(commit) = self.take_commit(ctx) else {
            return;
        };
        let task_ctx = ctx.clone();
        ctx.spawn("auto-connect", async move {
            commit_connection(&task_ctx, commit).await;
        });
    }

    /// The state was left without a mouse up; drop the ghosts.
    fn abandon(&self, ctx: &PluginContext) {
        let gesture = std::mem::take(&mut *self.gesture.lock());
        if let Some(ghost) = gesture.ghost_node {
            discard_ghosts(ctx, &ghost, gesture.ghost_relation.as_ref().map(|r| r.id.as_str()));
        }
    }
}

fn discard_ghosts(ctx: &PluginContext, ghost_node: &str, ghost_relation: Option<&str>) {
    let mut graph = ctx.graph.lock();
    if let Some(id) = ghost_relation {
        graph.remove_relation(id);
    }
    graph.remove_node(ghost_node);
    graph.index_parallel_relations();
}

async fn commit_connection(ctx: &PluginContext, commit: PendingCommit) {
    let api = ctx.items.api().clone();
    let settings = ctx.settings();

    let mut created = None;
    let target_id = match &commit.target {
        Some(target) => target.clone(),
        None => {
            let mut style = StyleProperties::new();
            style.insert("x".into(), commit.ghost_position.x.to_string());
            style.insert("y".into(), commit.ghost_position.y.to_string());
            let request = NewNode {
                labels: settings.default_node_label.iter().cloned().collect(),
                title: String::new(),
                style,
            };
            match api.post_node(request).await {
                Ok(node) => {
                    let id = node.id.clone();
                    created = Some(node);
                    id
                }
                Err(e) => {
                    fail(ctx, &commit, "Node could not be created", &e);
                    return;
                }
            }
        }
    };

    let request = NewRelation {
        source_id: commit.source.clone(),
        target_id,
        relation_type: settings
            .default_relation_type
            .clone()
            .unwrap_or_else(|| commit.ghost_relation.relation_type.clone()),
    };

    let relation = match api.post_relation(request).await {
        Ok(relation) => relation,
        Err(e) => {
            if let Some(node) = &created {
                // Best effort: do not leave an unconnected node behind
                if let Err(delete_error) = api.delete_node(&node.id).await {
                    warn!(node_id = %node.id, "compensating delete failed: {delete_error}");
                }
            }
            fail(ctx, &commit, "Relation could not be created", &e);
            return;
        }
    };

    if let Some(node) = created.as_mut() {
        let position = commit.ghost_position;
        node.style
            .entry("x".into())
            .or_insert_with(|| position.x.to_string());
        node.style
            .entry("y".into())
            .or_insert_with(|| position.y.to_string());
        ctx.items.set_node(node.clone());
    }
    ctx.items.set_relation(relation.clone());

    {
        let mut graph = ctx.graph.lock();
        if let Some(node) = &created {
            graph.add_node(node);
        }
        graph.add_relation(&relation);
        graph.remove_relation(&commit.ghost_relation.id);
        graph.remove_node(&commit.ghost_node);
        graph.index_parallel_relations();
        graph.adapt_relation_type_and_curvature(&relation.id);
    }
    debug!(relation_id = %relation.id, node_created = created.is_some(), "auto-connect committed");
}

fn fail(ctx: &PluginContext, commit: &PendingCommit, title: &str, error: &ApiError) {
    warn!("auto-connect failed: {error}");
    discard_ghosts(ctx, &commit.ghost_node, Some(&commit.ghost_relation.id));
    ctx.notify(Notification::error(title).with_description(error.to_string()));
}

impl InteractionPlugin for AutoConnectPlugin {
    fn name(&self) -> &'static str {
        "auto-connect"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        let (down, down_ctx) = (self.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeDown,
            StateCallback::new().main(move |event| down.record_source(&down_ctx, event)),
        );

        let (before, main, after) = (self.clone(), self.clone(), self.clone());
        let (before_ctx, main_ctx, after_ctx) = (ctx.clone(), ctx.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeAutoConnect,
            StateCallback::new()
                .before(move |event| before.begin(&before_ctx, event))
                .main(move |event| main.follow(&main_ctx, event))
                .after(move || after.abandon(&after_ctx)),
        );

        let up_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::MouseUp,
            StateCallback::new().main(move |_| self.mouse_up(&up_ctx)),
        );
        subscriptions
    }
}
