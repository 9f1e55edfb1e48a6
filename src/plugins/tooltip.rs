//! Dwell tooltips for nodes and relations.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::constants::TOOLTIP_OFFSET;
use crate::geometry::Point;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::types::GraphElement;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// An open tooltip, anchored in viewport pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub item: GraphElement,
    pub anchor: Point,
    /// Distance between the anchor and the tooltip box
    pub offset: f64,
}

#[derive(Debug, Default)]
pub struct TooltipPlugin {
    current: Mutex<Option<Tooltip>>,
}

impl TooltipPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Tooltip> {
        self.current.lock().clone()
    }

    pub fn clear(&self) {
        self.current.lock().take();
    }

    fn show(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let tooltip = {
            let graph = ctx.graph.lock();
            if let Some(node) = event.node_id().and_then(|id| graph.node(id)) {
                Some(Tooltip {
                    item: GraphElement::Node(node.data.clone()),
                    anchor: ctx.viewport.graph_to_viewport(Point::new(node.x, node.y)),
                    offset: ctx.viewport.scale_size(node.size) + TOOLTIP_OFFSET,
                })
            } else {
                event
                    .relation_id()
                    .and_then(|id| graph.relation(id))
                    .map(|relation| Tooltip {
                        item: GraphElement::Relation(relation.data.clone()),
                        anchor: event.position,
                        offset: ctx.viewport.scale_size(1.0) + TOOLTIP_OFFSET,
                    })
            }
        };
        if tooltip.is_some() {
            *self.current.lock() = tooltip;
        }
    }
}

impl InteractionPlugin for TooltipPlugin {
    fn name(&self) -> &'static str {
        "node-relation-mouseover"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        for state in [InteractionState::NodeTooltip, InteractionState::RelationTooltip] {
            let (plugin, show_ctx) = (self.clone(), ctx.clone());
            subscriptions.on(
                &ctx.ism,
                state,
                StateCallback::new().main(move |event| plugin.show(&show_ctx, event)),
            );
        }

        for state in [
            InteractionState::NodeLeave,
            InteractionState::NodeClick,
            InteractionState::NodeContextMenu,
            InteractionState::RelationLeave,
            InteractionState::RelationClick,
            InteractionState::RelationContextMenu,
        ] {
            let plugin = self.clone();
            subscriptions.on(
                &ctx.ism,
                state,
                StateCallback::new().main(move |_| plugin.clear()),
            );
        }

        // Moving a node leaves the tooltip pointing at nothing
        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeDrag,
            StateCallback::new().before(move |_| self.clear()),
        );
        subscriptions
    }
}
