//! Node and relation clicks: exclusive highlight plus a details request.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::types::{NodeId, RelationId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The item whose details the host should show.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum FocusedItem {
    Node(NodeId),
    Relation(RelationId),
}

#[derive(Debug, Default)]
pub struct ItemClickPlugin {
    focused: Mutex<Option<FocusedItem>>,
}

impl ItemClickPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<FocusedItem> {
        self.focused.lock().clone()
    }

    /// Take the pending details request.
    pub fn take_focused(&self) -> Option<FocusedItem> {
        self.focused.lock().take()
    }

    fn node_clicked(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let Some(node_id) = event.node_id() else {
            return;
        };
        // Only items backed by the cache have details to show
        if !ctx.items.has_node(node_id) {
            return;
        }
        {
            let mut graph = ctx.graph.lock();
            graph.un_highlight_relations();
            graph.un_highlight_nodes();
            graph.highlight_node(node_id);
        }
        debug!(node_id, "node focused");
        *self.focused.lock() = Some(FocusedItem::Node(node_id.to_string()));
    }

    fn relation_clicked(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let Some(relation_id) = event.relation_id() else {
            return;
        };
        if !ctx.items.has_relation(relation_id) {
            return;
        }
        {
            let mut graph = ctx.graph.lock();
            graph.un_highlight_relations();
            graph.un_highlight_nodes();
            graph.highlight_relation(relation_id);
        }
        debug!(relation_id, "relation focused");
        *self.focused.lock() = Some(FocusedItem::Relation(relation_id.to_string()));
    }
}

impl InteractionPlugin for ItemClickPlugin {
    fn name(&self) -> &'static str {
        "item-click"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        let (node, node_ctx) = (self.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeClick,
            StateCallback::new().main(move |event| node.node_clicked(&node_ctx, event)),
        );

        let relation_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::RelationClick,
            StateCallback::new().main(move |event| self.relation_clicked(&relation_ctx, event)),
        );
        subscriptions
    }
}
