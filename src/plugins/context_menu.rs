//! Right-click menus for nodes, relations, multi-selections and the canvas.
//!
//! The plugin only decides which menu opens and runs the chosen action; the
//! host draws the menu. Closing the menu returns the state machine to idle.

use super::expand::{collapse_node, expand_node};
use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::geometry::Point;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::types::{NodeId, RelationId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuKind {
    Node,
    Relation,
    Multiselect,
    Canvas,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMenuAction {
    Expand,
    Collapse,
    Hide,
    HideRelations,
    HideAll,
    ShowAll,
}

/// An open menu and the items it acts on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextMenu {
    pub kind: ContextMenuKind,
    pub node_ids: Vec<NodeId>,
    pub relation_ids: Vec<RelationId>,
    /// Viewport position the menu opens at
    pub position: Point,
}

impl ContextMenu {
    fn new(kind: ContextMenuKind, position: Point) -> Self {
        Self {
            kind,
            node_ids: Vec::new(),
            relation_ids: Vec::new(),
            position,
        }
    }
}

#[derive(Debug, Default)]
pub struct ContextMenuPlugin {
    menu: Mutex<Option<ContextMenu>>,
}

impl ContextMenuPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn menu(&self) -> Option<ContextMenu> {
        self.menu.lock().clone()
    }

    pub fn is_open(&self) -> bool {
        self.menu.lock().is_some()
    }

    /// Actions the open menu offers, in display order.
    pub fn actions(&self, ctx: &PluginContext) -> Vec<ContextMenuAction> {
        let Some(menu) = self.menu() else {
            return Vec::new();
        };
        match menu.kind {
            ContextMenuKind::Node => {
                let expanded = menu
                    .node_ids
                    .first()
                    .is_some_and(|id| ctx.expansions.lock().is_expanded(id));
                let toggle = if expanded {
                    ContextMenuAction::Collapse
                } else {
                    ContextMenuAction::Expand
                };
                vec![ContextMenuAction::Hide, toggle]
            }
            ContextMenuKind::Relation => vec![ContextMenuAction::Hide],
            ContextMenuKind::Multiselect => {
                let mut actions = Vec::new();
                if !menu.node_ids.is_empty() {
                    actions.push(ContextMenuAction::Hide);
                }
                if !menu.relation_ids.is_empty() {
                    actions.push(ContextMenuAction::HideRelations);
                }
                actions
            }
            ContextMenuKind::Canvas => vec![ContextMenuAction::HideAll, ContextMenuAction::ShowAll],
        }
    }

    /// Close the menu and return the state machine to idle.
    pub fn close(&self, ctx: &PluginContext) {
        self.menu.lock().take();
        ctx.ism.reset_state();
    }

    /// Run `action` against the open menu's items, then close the menu.
    ///
    /// Returns false when no menu is open or the menu does not offer `action`.
    pub fn perform(&self, ctx: &PluginContext, action: ContextMenuAction) -> bool {
        if !self.actions(ctx).contains(&action) {
            return false;
        }
        let Some(menu) = self.menu() else {
            return false;
        };
        debug!(?action, kind = ?menu.kind, "context menu action");

        match action {
            ContextMenuAction::Expand => {
                if let Some(node_id) = menu.node_ids.first().cloned() {
                    let task_ctx = ctx.clone();
                    ctx.spawn("expand-node", async move {
                        // Failures are already reported as notifications
                        let _ = expand_node(&task_ctx, &node_id).await;
                    });
                }
            }
            ContextMenuAction::Collapse => {
                if let Some(node_id) = menu.node_ids.first() {
                    collapse_node(ctx, node_id);
                }
            }
            ContextMenuAction::Hide if menu.kind == ContextMenuKind::Relation => {
                let mut graph = ctx.graph.lock();
                for id in &menu.relation_ids {
                    graph.set_relation_hidden(id, true);
                }
            }
            ContextMenuAction::Hide => {
                let mut graph = ctx.graph.lock();
                for id in &menu.node_ids {
                    graph.set_node_hidden(id, true);
                }
            }
            ContextMenuAction::HideRelations => {
                let mut graph = ctx.graph.lock();
                for id in &menu.relation_ids {
                    graph.set_relation_hidden(id, true);
                }
            }
            ContextMenuAction::HideAll => {
                let mut graph = ctx.graph.lock();
                for id in graph.node_ids() {
                    graph.set_node_hidden(&id, true);
                }
            }
            ContextMenuAction::ShowAll => ctx.graph.lock().show_all(),
        }

        self.close(ctx);
        true
    }

    fn open(&self, menu: ContextMenu) {
        debug!(kind = ?menu.kind, "context menu opened");
        *self.menu.lock() = Some(menu);
    }

    fn multiselect(ctx: &PluginContext, position: Point) -> ContextMenu {
        let graph = ctx.graph.lock();
        ContextMenu {
            node_ids: graph.highlighted_nodes(),
            relation_ids: graph.highlighted_relations(),
            ..ContextMenu::new(ContextMenuKind::Multiselect, position)
        }
    }

    fn on_node(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let Some(node_id) = event.node_id() else {
            return;
        };
        let known = ctx.items.has_node(node_id);
        let highlighted = ctx.graph.lock().highlighted_nodes();

        if known && highlighted.len() > 1 && highlighted.iter().any(|id| id == node_id) {
            self.open(Self::multiselect(ctx, event.position));
        } else if known {
            self.open(ContextMenu {
                node_ids: vec![node_id.to_string()],
                ..ContextMenu::new(ContextMenuKind::Node, event.position)
            });
        } else {
            warn!(node_id, "no node with this id, context menu not opened");
        }
    }

    fn on_relation(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let Some(relation_id) = event.relation_id() else {
            return;
        };
        let highlighted_nodes = ctx.graph.lock().highlighted_nodes().len();

        if highlighted_nodes > 1 {
            self.open(Self::multiselect(ctx, event.position));
        } else if ctx.items.has_relation(relation_id) {
            self.open(ContextMenu {
                relation_ids: vec![relation_id.to_string()],
                ..ContextMenu::new(ContextMenuKind::Relation, event.position)
            });
        } else {
            warn!(relation_id, "no relation with this id, context menu not opened");
        }
    }

    fn on_stage(&self, event: &InteractionEvent) {
        self.open(ContextMenu::new(ContextMenuKind::Canvas, event.position));
    }
}

impl InteractionPlugin for ContextMenuPlugin {
    fn name(&self) -> &'static str {
        "context-menu"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        let (node, node_ctx) = (self.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeContextMenu,
            StateCallback::new().main(move |event| node.on_node(&node_ctx, event)),
        );

        let (relation, relation_ctx) = (self.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::RelationContextMenu,
            StateCallback::new().main(move |event| relation.on_relation(&relation_ctx, event)),
        );

        subscriptions.on(
            &ctx.ism,
            InteractionState::StageContextMenu,
            StateCallback::new().main(move |event| self.on_stage(event)),
        );
        subscriptions
    }
}
