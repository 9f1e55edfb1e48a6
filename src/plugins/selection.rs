//! Rectangle selection (shift + drag on the stage).
//!
//! While active the plugin exposes the rectangle in viewport pixels for the
//! renderer's overlay. On mouse up every visible node whose center lies in the
//! rectangle is highlighted, and every relation between visible nodes whose
//! endpoints lie in it once shrunk to the border of their node squares.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::geometry::{Point, Rect, angle_degrees, distance_to_square_border, move_point};
use crate::graph::GraphStore;
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use crate::types::{NodeId, RelationId};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Overlay rectangle in viewport pixels. Width and height are negative when
/// the pointer moved up or left of the start point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SelectionRectangle {
    pub fn start(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn end(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }
}

#[derive(Debug, Default)]
pub struct SelectionPlugin {
    rectangle: Mutex<Option<SelectionRectangle>>,
}

impl SelectionPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// The overlay to draw, if a selection is in progress.
    pub fn rectangle(&self) -> Option<SelectionRectangle> {
        *self.rectangle.lock()
    }

    pub fn is_active(&self) -> bool {
        self.rectangle.lock().is_some()
    }

    fn begin(&self, event: &InteractionEvent) {
        *self.rectangle.lock() = Some(SelectionRectangle {
            x: event.position.x,
            y: event.position.y,
            width: 0.0,
            height: 0.0,
        });
    }

    fn resize(&self, event: &InteractionEvent) {
        if let Some(rectangle) = self.rectangle.lock().as_mut() {
            rectangle.width = event.position.x - rectangle.x;
            rectangle.height = event.position.y - rectangle.y;
        }
    }

    fn commit(&self, ctx: &PluginContext) {
        crate::profile_scope!("selection.commit");
        let Some(rectangle) = self.rectangle.lock().take() else {
            return;
        };

        let area = Rect::from_corners(
            ctx.viewport.viewport_to_graph(rectangle.start()),
            ctx.viewport.viewport_to_graph(rectangle.end()),
        );

        let mut graph = ctx.graph.lock();
        let (node_ids, relation_ids) = items_inside(&graph, &area);
        for id in &node_ids {
            graph.highlight_node(id);
        }
        for id in &relation_ids {
            graph.highlight_relation(id);
        }
        debug!(
            nodes = node_ids.len(),
            relations = relation_ids.len(),
            "selection committed"
        );
    }
}

/// Visible nodes and relations contained in a graph-space rectangle.
pub fn items_inside(graph: &GraphStore, area: &Rect) -> (Vec<NodeId>, Vec<RelationId>) {
    let node_ids = graph
        .nodes()
        .filter(|(_, node)| !node.hidden && area.contains(Point::new(node.x, node.y)))
        .map(|(id, _)| id.clone())
        .collect();

    let relation_ids = graph
        .relations()
        .filter(|(_, relation)| !relation.hidden)
        .filter(|(_, relation)| {
            let (Some(source), Some(target)) =
                (graph.node(&relation.source), graph.node(&relation.target))
            else {
                return false;
            };
            if source.hidden || target.hidden {
                return false;
            }
            let from = Point::new(source.x, source.y);
            let to = Point::new(target.x, target.y);
            let forward = angle_degrees(from, to);
            let backward = angle_degrees(to, from);
            let start = move_point(from, distance_to_square_border(source.size, forward), forward);
            let end = move_point(to, distance_to_square_border(target.size, backward), backward);
            area.contains(start) && area.contains(end)
        })
        .map(|(id, _)| id.clone())
        .collect();

    (node_ids, relation_ids)
}

impl InteractionPlugin for SelectionPlugin {
    fn name(&self) -> &'static str {
        "selection-tool"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();
        let (before, main, up) = (self.clone(), self.clone(), self);

        subscriptions.on(
            &ctx.ism,
            InteractionState::NodeSelection,
            StateCallback::new()
                .before(move |event| before.begin(event))
                .main(move |event| main.resize(event)),
        );

        let up_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::MouseUp,
            StateCallback::new().main(move |_| up.commit(&up_ctx)),
        );
        subscriptions
    }
}
