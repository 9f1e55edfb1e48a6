//! Ctrl + click on the stage creates a node at the pointer.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::api::NewNode;
use crate::geometry::Point;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::notifications::Notification;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct QuickNodePlugin;

impl QuickNodePlugin {
    pub fn new() -> Self {
        Self
    }

    fn create(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let point = ctx.viewport.viewport_to_graph(event.position);
        let labels: Vec<String> = ctx.settings.read().default_node_label.iter().cloned().collect();
        let task_ctx = ctx.clone();
        ctx.spawn("quick-node", async move {
            create_node_at(&task_ctx, point, labels).await;
        });
    }
}

async fn create_node_at(ctx: &PluginContext, point: Point, labels: Vec<String>) {
    let request = NewNode {
        labels,
        ..Default::default()
    };
    let mut node = match ctx.items.api().post_node(request).await {
        Ok(node) => node,
        Err(e) => {
            warn!("quick node failed: {e}");
            ctx.notify(Notification::error("Node could not be created").with_description(e.to_string()));
            return;
        }
    };

    node.style.insert("x".into(), point.x.to_string());
    node.style.insert("y".into(), point.y.to_string());
    ctx.items.set_node(node.clone());
    ctx.graph.lock().add_node(&node);
    debug!(node_id = %node.id, "quick node created");
}

impl InteractionPlugin for QuickNodePlugin {
    fn name(&self) -> &'static str {
        "quick-node"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();
        let main_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeQuick,
            StateCallback::new().main(move |event| self.create(&main_ctx, event)),
        );
        subscriptions
    }
}
