//! Drag highlighted nodes with the pointer.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::geometry::Point;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Default)]
pub struct DragNodesPlugin {
    /// Graph-space position of the last node press
    pressed_at: Mutex<Option<Point>>,
    /// Graph-space pointer position of the previous move
    last_point: Mutex<Option<Point>>,
}

impl DragNodesPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_point.lock().is_some()
    }

    fn press(&self, ctx: &PluginContext, event: &InteractionEvent) {
        *self.pressed_at.lock() = Some(ctx.viewport.viewport_to_graph(event.position));
    }

    fn start(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let origin = self.pressed_at.lock().take();
        let Some(node_id) = event.node_id() else {
            return;
        };
        {
            let mut graph = ctx.graph.lock();
            if !graph.has_node(node_id) {
                return;
            }
            if !graph.is_node_highlighted(node_id) {
                graph.un_highlight_nodes();
            }
            graph.highlight_node(node_id);
        }
        *self.last_point.lock() =
            Some(origin.unwrap_or_else(|| ctx.viewport.viewport_to_graph(event.position)));
    }

    fn drag(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let point = ctx.viewport.viewport_to_graph(event.position);
        let Some(previous) = self.last_point.lock().replace(point) else {
            return;
        };
        let (dx, dy) = previous.delta_to(point);

        let mut graph = ctx.graph.lock();
        for id in graph.highlighted_nodes() {
            graph.move_node_by(&id, dx, dy);
        }
    }

    /// Write the final positions of the dragged nodes back to the items cache.
    fn finish(&self, ctx: &PluginContext) {
        if self.last_point.lock().take().is_none() {
            return;
        }
        let positions: Vec<_> = {
            let graph = ctx.graph.lock();
            graph
                .highlighted_nodes()
                .into_iter()
                .filter_map(|id| graph.node_position(&id).map(|p| (id, p)))
                .collect()
        };
        for (id, position) in &positions {
            ctx.items.set_node_position(id, *position);
        }
        debug!(count = positions.len(), "drag finished");
    }
}

impl InteractionPlugin for DragNodesPlugin {
    fn name(&self) -> &'static str {
        "drag-nodes"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        let (down, down_ctx) = (self.clone(), ctx.clone());
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeDown,
            StateCallback::new().main(move |event| down.press(&down_ctx, event)),
        );

        let (before, main, after) = (self.clone(), self.clone(), self);
        let (before_ctx, main_ctx, after_ctx) = (ctx.clone(), ctx.clone(), ctx.clone());

        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeDrag,
            StateCallback::new()
                .before(move |event| before.start(&before_ctx, event))
                .main(move |event| main.drag(&main_ctx, event))
                .after(move || after.finish(&after_ctx)),
        );
        subscriptions
    }
}
