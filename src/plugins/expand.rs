//! Expand and collapse a node's neighbourhood.
//!
//! Expanding fetches a node's connections, skips neighbours that are already
//! known locally (unhiding them instead), and lays the new ones out on a ring
//! around the node. What each expansion revealed goes into the expansion tree
//! so collapsing removes exactly that and nothing else.

use super::PluginContext;
use crate::error::ApiResult;
use crate::geometry::{Point, circle_layout};
use crate::graph::attributes::{node_graph_size, parse_style_number};
use crate::notifications::Notification;
use crate::types::{Node, NodeConnection, Relation};
use tracing::{debug, warn};

fn graph_size(node: &Node, node_size_factor: f64) -> f64 {
    node_graph_size(parse_style_number(node.style.get("diameter")), node_size_factor)
}

/// Reveal the neighbours of `node_id`. Returns how many nodes were added.
pub async fn expand_node(ctx: &PluginContext, node_id: &str) -> ApiResult<usize> {
    let Some(node) = ctx.items.store_node(node_id) else {
        warn!(node_id, "expand: node missing locally");
        ctx.notify(Notification::warning(format!("Node {node_id} is not loaded locally")));
        return Ok(0);
    };

    let api = ctx.items.api().clone();
    let connections = match api.node_connections(node_id).await {
        Ok(connections) => connections,
        Err(e) => {
            warn!(node_id, "expand failed: {e}");
            ctx.notify(Notification::error("Node could not be expanded").with_description(e.to_string()));
            return Err(e);
        }
    };

    let settings = ctx.settings();
    let (mut new_nodes, mut relations, revealed) = {
        let mut graph = ctx.graph.lock();
        let mut new_nodes: Vec<Node> = Vec::new();
        let mut relations: Vec<Relation> = Vec::new();
        let mut revealed: Vec<NodeConnection> = Vec::new();

        for connection in connections {
            let neighbor_id = connection.neighbor.id.as_str();
            let known = ctx.items.has_node(neighbor_id) || graph.has_node(neighbor_id);
            if known {
                graph.set_node_hidden(neighbor_id, false);
            }
            graph.set_relation_hidden(&connection.relation.id, false);
            if known || new_nodes.iter().any(|n| n.id == neighbor_id) {
                continue;
            }
            new_nodes.push(connection.neighbor.clone());
            relations.push(connection.relation.clone());
            revealed.push(connection);
        }
        (new_nodes, relations, revealed)
    };

    if new_nodes.is_empty() {
        ctx.notify(Notification::info("No new nodes found"));
        return Ok(0);
    }

    if settings.auto_connect_on_expand {
        let new_ids: Vec<String> = new_nodes.iter().map(|n| n.id.clone()).collect();
        match api.relations_by_node_ids(&new_ids).await {
            Ok(extra) => {
                for relation in extra {
                    if !relations.iter().any(|r| r.id == relation.id) {
                        relations.push(relation);
                    }
                }
            }
            // The neighbours themselves are still worth showing
            Err(e) => warn!(node_id, "expand: relations among new nodes not loaded: {e}"),
        }
    }

    {
        let mut graph = ctx.graph.lock();
        let Some(center) = graph.node_position(node_id) else {
            debug!(node_id, "expand: node left the canvas meanwhile");
            return Ok(0);
        };
        let factor = graph.node_size_factor();
        let biggest = new_nodes
            .iter()
            .map(|n| graph_size(n, factor))
            .fold(f64::NEG_INFINITY, f64::max);
        let distance = biggest + graph_size(&node, factor) + settings.expand_ring_spacing;

        let viewport = &ctx.viewport;
        let positions = circle_layout(
            viewport.graph_to_viewport(center),
            new_nodes.len(),
            viewport.scale_size(distance),
        );
        for (neighbor, position) in new_nodes.iter_mut().zip(positions) {
            let Point { x, y } = viewport.viewport_to_graph(position);
            neighbor.style.insert("x".into(), x.to_string());
            neighbor.style.insert("y".into(), y.to_string());
        }

        graph.add_nodes(&new_nodes);
        graph.add_relations(&relations);
        graph.index_parallel_relations();
        graph.adapt_relations_type_and_curvature();
    }

    let added = new_nodes.len();
    ctx.items.set_nodes(new_nodes);
    ctx.items.set_relations(relations);
    ctx.expansions.lock().add_expanded(node_id, revealed);
    debug!(node_id, added, "node expanded");
    Ok(added)
}

/// Remove everything expanding `node_id` revealed, recursively.
pub fn collapse_node(ctx: &PluginContext, node_id: &str) -> usize {
    crate::profile_scope!("collapse.node");
    let ids = ctx.expansions.lock().collect_node_and_relation_ids(node_id);
    {
        let mut graph = ctx.graph.lock();
        for id in &ids.relation_ids {
            graph.remove_relation(id);
        }
        for id in &ids.node_ids {
            graph.remove_node(id);
        }
        graph.index_parallel_relations();
        graph.adapt_relations_type_and_curvature();
    }
    ctx.items.remove_nodes(&ids.node_ids);
    ctx.items.remove_relations(&ids.relation_ids);
    ctx.expansions.lock().remove_expanded(node_id);
    debug!(node_id, removed = ids.node_ids.len(), "node collapsed");
    ids.node_ids.len()
}
