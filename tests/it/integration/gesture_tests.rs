//! Pointer gestures driven through the canvas: drag, click, selection,
//! tooltips and wheel scaling.

use crate::helpers::{
    canvas_with, click_node, down_node, down_stage, mouse_up, move_to, node, relation, screen,
    InMemoryGraphApi,
};
use graph_explorer::geometry::Point;
use graph_explorer::input::{CanvasEvent, InteractionState, Modifiers};
use graph_explorer::plugins::FocusedItem;
use graph_explorer::types::GraphElement;
use graph_explorer::viewport::CameraState;
use graph_explorer::GraphCanvas;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn loaded_canvas() -> GraphCanvas {
    let canvas = canvas_with(Arc::new(InMemoryGraphApi::new()));
    canvas.load(
        vec![node("a", 0.0, 0.0), node("b", 200.0, 0.0), node("c", 0.0, 200.0)],
        vec![relation("ab", "a", "b")],
    );
    canvas
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_drag_moves_the_pressed_node_and_ends_idle() {
    let canvas = loaded_canvas();

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::NONE);
    move_to(&canvas, screen(&canvas, 10.0, 0.0));
    assert_eq!(canvas.state(), InteractionState::NodeDrag);
    assert!(canvas.drag().is_dragging());
    move_to(&canvas, screen(&canvas, 50.0, 20.0));
    mouse_up(&canvas, screen(&canvas, 50.0, 20.0));

    assert_eq!(canvas.state(), InteractionState::Idle);
    assert!(!canvas.drag().is_dragging());
    assert_eq!(canvas.graph().node_position("a"), Some(Point::new(50.0, 20.0)));
    assert_eq!(canvas.graph().node_position("b"), Some(Point::new(200.0, 0.0)));

    // Final positions are persisted in the cached style record
    let cached = canvas.items().store_node("a").unwrap();
    assert_eq!(cached.style.get("x").map(String::as_str), Some("50"));
    assert_eq!(cached.style.get("y").map(String::as_str), Some("20"));

    // A click after a drag is not a click
    click_node(&canvas, "a", screen(&canvas, 50.0, 20.0));
    assert_eq!(canvas.click().focused(), None);
    assert_eq!(canvas.state(), InteractionState::Idle);
}

#[test]
fn test_drag_carries_every_highlighted_node() {
    let canvas = loaded_canvas();
    {
        let mut graph = canvas.graph();
        graph.highlight_node("a");
        graph.highlight_node("b");
    }

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::NONE);
    move_to(&canvas, screen(&canvas, 5.0, 5.0));
    mouse_up(&canvas, screen(&canvas, 5.0, 5.0));

    let graph = canvas.graph();
    assert_eq!(graph.node_position("a"), Some(Point::new(5.0, 5.0)));
    assert_eq!(graph.node_position("b"), Some(Point::new(205.0, 5.0)));
    assert_eq!(graph.node_position("c"), Some(Point::new(0.0, 200.0)));
}

#[test]
fn test_dragging_an_unselected_node_drops_the_selection() {
    let canvas = loaded_canvas();
    canvas.graph().highlight_node("b");

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::NONE);
    move_to(&canvas, screen(&canvas, 5.0, 0.0));
    mouse_up(&canvas, screen(&canvas, 5.0, 0.0));

    let graph = canvas.graph();
    assert_eq!(graph.highlighted_nodes(), vec!["a".to_string()]);
    assert_eq!(graph.node_position("b"), Some(Point::new(200.0, 0.0)));
}

#[test]
fn test_click_focuses_and_highlights_node() {
    let canvas = loaded_canvas();
    canvas.graph().highlight_relation("ab");

    down_node(&canvas, "b", screen(&canvas, 200.0, 0.0), Modifiers::NONE);
    mouse_up(&canvas, screen(&canvas, 200.0, 0.0));
    click_node(&canvas, "b", screen(&canvas, 200.0, 0.0));

    assert_eq!(canvas.state(), InteractionState::NodeClick);
    assert_eq!(canvas.click().focused(), Some(FocusedItem::Node("b".into())));
    let graph = canvas.graph();
    assert_eq!(graph.highlighted_nodes(), vec!["b".to_string()]);
    assert!(graph.highlighted_relations().is_empty());
}

#[test]
fn test_relation_click_focuses_relation() {
    let canvas = loaded_canvas();
    let at = screen(&canvas, 100.0, 0.0);
    canvas.handle_event(CanvasEvent::EnterRelation {
        relation_id: "ab".into(),
        position: at,
    });
    canvas.handle_event(CanvasEvent::ClickRelation {
        relation_id: "ab".into(),
        position: at,
    });

    assert_eq!(canvas.click().take_focused(), Some(FocusedItem::Relation("ab".into())));
    assert!(canvas.graph().is_relation_highlighted("ab"));
    assert_eq!(canvas.click().focused(), None);
}

#[test]
fn test_selection_highlights_contained_items() {
    let canvas = loaded_canvas();

    down_stage(&canvas, screen(&canvas, -50.0, -50.0), Modifiers::shift());
    assert_eq!(canvas.state(), InteractionState::NodeSelection);
    move_to(&canvas, screen(&canvas, 100.0, 100.0));
    move_to(&canvas, screen(&canvas, 250.0, 50.0));

    let rectangle = canvas.selection().rectangle().unwrap();
    assert_eq!(rectangle.start(), screen(&canvas, -50.0, -50.0));
    assert_eq!(rectangle.end(), screen(&canvas, 250.0, 50.0));

    mouse_up(&canvas, screen(&canvas, 250.0, 50.0));

    assert_eq!(canvas.state(), InteractionState::Idle);
    assert!(!canvas.selection().is_active());
    let graph = canvas.graph();
    assert!(graph.is_node_highlighted("a"));
    assert!(graph.is_node_highlighted("b"));
    assert!(!graph.is_node_highlighted("c"));
    assert!(graph.is_relation_highlighted("ab"));
}

#[test]
fn test_selection_skips_hidden_nodes() {
    let canvas = loaded_canvas();
    canvas.graph().set_node_hidden("b", true);

    down_stage(&canvas, screen(&canvas, -50.0, -50.0), Modifiers::shift());
    move_to(&canvas, screen(&canvas, 250.0, 250.0));
    mouse_up(&canvas, screen(&canvas, 250.0, 250.0));

    let graph = canvas.graph();
    assert_eq!(graph.highlighted_nodes(), vec!["a".to_string(), "c".to_string()]);
    assert!(graph.highlighted_relations().is_empty());
}

#[test]
fn test_tooltip_shows_after_dwell_and_clears_on_leave() {
    let canvas = loaded_canvas();
    let at = screen(&canvas, 200.0, 0.0);
    let start = Instant::now();

    canvas.handle_event_at(
        CanvasEvent::EnterNode {
            node_id: "b".into(),
            position: at,
        },
        start,
    );
    assert_eq!(canvas.tick(start + Duration::from_millis(100)), 0);
    assert!(canvas.tooltip().current().is_none());

    assert_eq!(canvas.tick(start + canvas.settings().tooltip_delay()), 1);
    let tooltip = canvas.tooltip().current().unwrap();
    assert!(matches!(&tooltip.item, GraphElement::Node(node) if node.id == "b"));
    assert_eq!(tooltip.anchor, at);
    assert!(tooltip.offset > 0.0);

    canvas.handle_event(CanvasEvent::LeaveNode {
        node_id: "b".into(),
        position: at,
    });
    assert!(canvas.tooltip().current().is_none());
    assert_eq!(canvas.state(), InteractionState::Idle);
}

#[test]
fn test_relation_tooltip_anchors_at_pointer() {
    let canvas = loaded_canvas();
    let at = screen(&canvas, 90.0, 3.0);
    let start = Instant::now();

    canvas.handle_event_at(
        CanvasEvent::EnterRelation {
            relation_id: "ab".into(),
            position: at,
        },
        start,
    );
    canvas.tick(start + Duration::from_secs(5));

    let tooltip = canvas.tooltip().current().unwrap();
    assert!(matches!(&tooltip.item, GraphElement::Relation(r) if r.id == "ab"));
    assert_eq!(tooltip.anchor, at);
}

#[test]
fn test_wheel_scales_labels_and_nodes() {
    let canvas = loaded_canvas();
    let before = canvas.graph().node("a").unwrap().size;

    canvas.handle_event(CanvasEvent::Wheel {
        position: Point::new(0.0, 0.0),
        delta: 1.0,
        modifiers: Modifiers::shift(),
    });
    assert_eq!(canvas.state(), InteractionState::Idle);
    assert!(close(canvas.graph().label_size_factor(), 1.1));
    assert!(close(canvas.settings().label_size_factor, 1.1));

    canvas.handle_event(CanvasEvent::Wheel {
        position: Point::new(0.0, 0.0),
        delta: -1.0,
        modifiers: Modifiers::alt(),
    });
    assert_eq!(canvas.state(), InteractionState::Idle);
    assert!(close(canvas.graph().node_size_factor(), 0.9));
    assert!(canvas.graph().node("a").unwrap().size < before);
}

#[test]
fn test_ctrl_wheel_steps_zoom_factor() {
    let canvas = loaded_canvas();
    let initial = canvas.graph().zoom_factor();

    canvas.handle_event(CanvasEvent::Wheel {
        position: Point::new(0.0, 0.0),
        delta: 3.0,
        modifiers: Modifiers::ctrl(),
    });

    assert_eq!(canvas.state(), InteractionState::Idle);
    assert!(close(canvas.graph().zoom_factor(), initial + 0.1));
    assert!(close(canvas.settings().zoom_factor, initial + 0.1));
}

#[test]
fn test_camera_updates_reach_viewport_and_labels() {
    let canvas = loaded_canvas();
    let sizes = canvas.label_sizes();

    canvas.handle_event(CanvasEvent::CameraUpdated(CameraState {
        x: 100.0,
        y: 0.0,
        ratio: 2.0,
    }));
    canvas.handle_event(CanvasEvent::Resize {
        width: 1000.0,
        height: 500.0,
    });

    assert_eq!(canvas.viewport().dimensions(), (1000.0, 500.0));
    assert_eq!(
        canvas.viewport().graph_to_viewport(Point::new(100.0, 0.0)),
        Point::new(500.0, 250.0)
    );
    assert!(close(canvas.label_sizes().node, sizes.node / 2.0));
    assert_eq!(canvas.state(), InteractionState::Idle);
}
