//! Gestures that commit to the remote collaborator: auto-connect and quick node.

use crate::helpers::{
    canvas_with, click_node, down_node, down_stage, mouse_up, move_to, node, screen,
    InMemoryGraphApi,
};
use graph_explorer::constants::PROVISIONAL_ID_PREFIX;
use graph_explorer::geometry::Point;
use graph_explorer::input::{CanvasEvent, InteractionState, Modifiers};
use graph_explorer::notifications::NotificationKind;
use graph_explorer::settings::Settings;
use graph_explorer::GraphCanvas;
use std::sync::Arc;

fn api_with_a_and_c() -> Arc<InMemoryGraphApi> {
    Arc::new(
        InMemoryGraphApi::new()
            .with_node(node("a", 0.0, 0.0))
            .with_node(node("c", 300.0, 0.0)),
    )
}

fn canvas_over(api: &Arc<InMemoryGraphApi>) -> GraphCanvas {
    let canvas = canvas_with(api.clone());
    canvas.load(vec![node("a", 0.0, 0.0), node("c", 300.0, 0.0)], Vec::new());
    canvas
}

fn provisional_count(canvas: &GraphCanvas) -> usize {
    let graph = canvas.graph();
    graph
        .nodes()
        .filter(|(id, _)| id.starts_with(PROVISIONAL_ID_PREFIX))
        .count()
        + graph
            .relations()
            .filter(|(id, _)| id.starts_with(PROVISIONAL_ID_PREFIX))
            .count()
}

#[tokio::test]
async fn test_auto_connect_onto_existing_node_creates_only_a_relation() {
    let api = api_with_a_and_c();
    let canvas = canvas_over(&api);

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    assert_eq!(canvas.state(), InteractionState::NodeAutoConnect);
    move_to(&canvas, screen(&canvas, 150.0, 0.0));
    assert!(canvas.auto_connect().is_active());
    assert_eq!(canvas.auto_connect().target(), None);
    assert_eq!(provisional_count(&canvas), 2);

    move_to(&canvas, screen(&canvas, 300.0, 0.0));
    assert_eq!(canvas.auto_connect().target().as_deref(), Some("c"));
    let ghost = canvas.auto_connect().ghost_node().unwrap();
    assert!(canvas.graph().node(&ghost).unwrap().hidden);

    mouse_up(&canvas, screen(&canvas, 300.0, 0.0));
    assert_eq!(canvas.state(), InteractionState::Idle);
    canvas.settle().await;

    assert_eq!(api.calls("post_node"), 0);
    assert_eq!(api.calls("post_relation"), 1);
    let posted = api.posted_relations();
    assert_eq!((posted[0].source_id.as_str(), posted[0].target_id.as_str()), ("a", "c"));

    let graph = canvas.graph();
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.relation_count(), 1);
    let (id, relation) = graph.relations().next().unwrap();
    assert!(!id.starts_with(PROVISIONAL_ID_PREFIX));
    assert_eq!((relation.source.as_str(), relation.target.as_str()), ("a", "c"));
    drop(graph);

    assert_eq!(provisional_count(&canvas), 0);
    assert!(canvas.items().has_relation(id_of_only_relation(&api).as_str()));
}

fn id_of_only_relation(api: &InMemoryGraphApi) -> String {
    let relations = api.relations();
    assert_eq!(relations.len(), 1);
    relations[0].id.clone()
}

#[tokio::test]
async fn test_ghost_follows_pointer_after_an_earlier_click() {
    let api = api_with_a_and_c();
    let canvas = canvas_over(&api);

    down_node(&canvas, "c", screen(&canvas, 300.0, 0.0), Modifiers::NONE);
    mouse_up(&canvas, screen(&canvas, 300.0, 0.0));
    click_node(&canvas, "c", screen(&canvas, 300.0, 0.0));
    canvas.ism().reset_state();

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 0.0, -100.0));

    let ghost = canvas.auto_connect().ghost_node().unwrap();
    assert_eq!(canvas.graph().node_position(&ghost), Some(Point::new(0.0, -100.0)));
    assert_eq!(canvas.auto_connect().target(), None);

    mouse_up(&canvas, screen(&canvas, 0.0, -100.0));
    canvas.settle().await;
    let posted = api.posted_nodes();
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].style.get("y").map(String::as_str), Some("-100"));
    assert_eq!(api.posted_relations()[0].source_id, "a");
}

#[tokio::test]
async fn test_moving_off_a_node_unsnaps_the_ghost() {
    let api = api_with_a_and_c();
    let canvas = canvas_over(&api);

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 300.0, 0.0));
    assert_eq!(canvas.auto_connect().target().as_deref(), Some("c"));

    move_to(&canvas, screen(&canvas, 300.0, 200.0));
    assert_eq!(canvas.auto_connect().target(), None);
    let ghost = canvas.auto_connect().ghost_node().unwrap();
    let relation = canvas.auto_connect().ghost_relation().unwrap();
    assert_eq!(relation.target_id, ghost);
    assert!(!canvas.graph().node(&ghost).unwrap().hidden);
}

#[tokio::test]
async fn test_auto_connect_into_empty_space_creates_node_and_relation() {
    let api = api_with_a_and_c();
    let settings = Settings {
        default_node_label: Some("label-person".into()),
        default_relation_type: Some("knows".into()),
        ..Default::default()
    };
    let canvas = GraphCanvas::new(api.clone(), settings);
    canvas.load(vec![node("a", 0.0, 0.0), node("c", 300.0, 0.0)], Vec::new());

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 60.0, 80.0));
    move_to(&canvas, screen(&canvas, 120.0, 160.0));
    mouse_up(&canvas, screen(&canvas, 120.0, 160.0));
    canvas.settle().await;

    let posted_nodes = api.posted_nodes();
    assert_eq!(posted_nodes.len(), 1);
    assert_eq!(posted_nodes[0].labels, vec!["label-person".to_string()]);
    assert_eq!(posted_nodes[0].style.get("x").map(String::as_str), Some("120"));
    assert_eq!(posted_nodes[0].style.get("y").map(String::as_str), Some("160"));

    let posted_relations = api.posted_relations();
    assert_eq!(posted_relations.len(), 1);
    assert_eq!(posted_relations[0].relation_type, "knows");
    assert_eq!(posted_relations[0].source_id, "a");

    let created = posted_relations[0].target_id.clone();
    let graph = canvas.graph();
    assert_eq!(graph.node_position(&created), Some(Point::new(120.0, 160.0)));
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.relation_count(), 1);
    drop(graph);
    assert!(canvas.items().has_node(&created));
    assert_eq!(provisional_count(&canvas), 0);
}

#[tokio::test]
async fn test_failed_relation_deletes_the_created_node() {
    let api = api_with_a_and_c();
    api.fail_on("post_relation");
    let canvas = canvas_over(&api);

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 100.0, 150.0));
    mouse_up(&canvas, screen(&canvas, 100.0, 150.0));
    canvas.settle().await;

    assert_eq!(api.calls("post_node"), 1);
    assert_eq!(api.calls("delete_node"), 1);
    assert_eq!(api.node_count(), 2);

    assert_eq!(provisional_count(&canvas), 0);
    assert_eq!(canvas.graph().node_count(), 2);
    assert_eq!(canvas.graph().relation_count(), 0);

    let notifications = canvas.notifications();
    let latest = notifications.latest().unwrap();
    assert_eq!(latest.kind, NotificationKind::Error);
    assert_eq!(latest.title, "Relation could not be created");
}

#[tokio::test]
async fn test_failed_node_post_skips_the_relation() {
    let api = api_with_a_and_c();
    api.fail_on("post_node");
    let canvas = canvas_over(&api);

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 100.0, 150.0));
    mouse_up(&canvas, screen(&canvas, 100.0, 150.0));
    canvas.settle().await;

    assert_eq!(api.calls("post_relation"), 0);
    assert_eq!(provisional_count(&canvas), 0);
    assert_eq!(
        canvas.notifications().latest().map(|n| n.title.clone()),
        Some("Node could not be created".to_string())
    );
}

#[tokio::test]
async fn test_leaving_auto_connect_without_mouse_up_discards_ghosts() {
    let api = api_with_a_and_c();
    let canvas = canvas_over(&api);

    down_node(&canvas, "a", screen(&canvas, 0.0, 0.0), Modifiers::ctrl());
    move_to(&canvas, screen(&canvas, 100.0, 100.0));
    assert_eq!(provisional_count(&canvas), 2);

    canvas.ism().reset_state();
    assert!(!canvas.auto_connect().is_active());
    assert_eq!(provisional_count(&canvas), 0);
    canvas.settle().await;
    assert_eq!(api.calls("post_relation"), 0);
}

#[tokio::test]
async fn test_ctrl_click_on_stage_creates_a_node() {
    let api = Arc::new(InMemoryGraphApi::new());
    let canvas = canvas_with(api.clone());
    let at = screen(&canvas, 100.0, 50.0);

    down_stage(&canvas, at, Modifiers::ctrl());
    assert_eq!(canvas.state(), InteractionState::NodeQuick);
    canvas.handle_event(CanvasEvent::UpStage {
        position: at,
        modifiers: Modifiers::ctrl(),
    });
    mouse_up(&canvas, at);
    assert_eq!(canvas.state(), InteractionState::Idle);
    canvas.settle().await;

    assert_eq!(api.node_count(), 1);
    let graph = canvas.graph();
    assert_eq!(graph.node_count(), 1);
    let (id, _) = graph.nodes().next().unwrap();
    assert_eq!(graph.node_position(id), Some(Point::new(100.0, 50.0)));
    assert!(canvas.items().has_node(id));
}

#[tokio::test]
async fn test_quick_node_failure_is_reported() {
    let api = Arc::new(InMemoryGraphApi::new());
    api.fail_on("post_node");
    let canvas = canvas_with(api.clone());
    let at = screen(&canvas, 0.0, 0.0);

    down_stage(&canvas, at, Modifiers::ctrl());
    canvas.handle_event(CanvasEvent::UpStage {
        position: at,
        modifiers: Modifiers::ctrl(),
    });
    mouse_up(&canvas, at);
    canvas.settle().await;

    assert_eq!(canvas.graph().node_count(), 0);
    assert_eq!(
        canvas.notifications().latest().map(|n| n.kind),
        Some(NotificationKind::Error)
    );
}

#[test]
fn test_commits_outside_a_runtime_are_reported() {
    let api = Arc::new(InMemoryGraphApi::new());
    let canvas = canvas_with(api.clone());
    let at = screen(&canvas, 0.0, 0.0);

    down_stage(&canvas, at, Modifiers::ctrl());
    canvas.handle_event(CanvasEvent::UpStage {
        position: at,
        modifiers: Modifiers::ctrl(),
    });

    assert_eq!(canvas.pending_tasks(), 0);
    assert_eq!(api.calls("post_node"), 0);
    assert_eq!(
        canvas.notifications().latest().map(|n| n.kind),
        Some(NotificationKind::Error)
    );
}
