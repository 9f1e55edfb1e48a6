//! Unit tests for the items cache and its single-flight fetching.

use crate::helpers::{node, relation, InMemoryGraphApi};
use graph_explorer::error::ApiError;
use graph_explorer::geometry::Point;
use graph_explorer::items::ItemsStore;
use std::sync::Arc;
use std::time::Duration;

fn store_over(api: InMemoryGraphApi) -> (Arc<InMemoryGraphApi>, ItemsStore) {
    let api = Arc::new(api);
    let items = ItemsStore::new(api.clone());
    (api, items)
}

#[tokio::test]
async fn test_cached_nodes_skip_the_remote() {
    let (api, items) = store_over(InMemoryGraphApi::new());
    items.set_node(node("a", 0.0, 0.0));

    let found = items.get_node("a").await.unwrap();
    assert_eq!(found.map(|n| n.id), Some("a".to_string()));
    assert_eq!(api.calls("fetch_nodes"), 0);
}

#[tokio::test]
async fn test_missing_nodes_are_fetched_and_cached() {
    let (api, items) = store_over(InMemoryGraphApi::new().with_node(node("a", 1.0, 2.0)));

    assert!(items.get_node("a").await.unwrap().is_some());
    assert!(items.has_node("a"));
    assert!(items.get_node("a").await.unwrap().is_some());
    assert_eq!(api.calls("fetch_nodes"), 1);
}

#[tokio::test]
async fn test_unknown_ids_are_skipped() {
    let (_, items) = store_over(InMemoryGraphApi::new().with_node(node("a", 0.0, 0.0)));

    let ids = vec!["missing".to_string(), "a".to_string()];
    let found = items.get_nodes(&ids).await.unwrap();
    assert_eq!(found.len(), 1);
    assert!(!items.has_node("missing"));
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_request() {
    let (api, items) = store_over(InMemoryGraphApi::new().with_node(node("a", 0.0, 0.0)));
    api.set_delay(Duration::from_millis(20));

    let (first, second, third) = tokio::join!(
        items.get_node("a"),
        items.get_node("a"),
        items.get_node("a")
    );

    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_some());
    assert!(third.unwrap().is_some());
    assert_eq!(api.calls("fetch_nodes"), 1);
    assert_eq!(items.in_flight(), 0);
}

#[tokio::test]
async fn test_waiters_share_the_failure() {
    let (api, items) = store_over(InMemoryGraphApi::new().with_node(node("a", 0.0, 0.0)));
    api.set_delay(Duration::from_millis(20));
    api.fail_on("fetch_nodes");

    let (first, second) = tokio::join!(items.get_node("a"), items.get_node("a"));

    let first = first.unwrap_err();
    assert!(matches!(first, ApiError::Rejected { status: 500, .. }));
    assert_eq!(second.unwrap_err(), first);
    assert_eq!(api.calls("fetch_nodes"), 1);
    assert_eq!(items.in_flight(), 0);
    assert!(!items.has_node("a"));
}

#[tokio::test]
async fn test_relations_are_fetched_like_nodes() {
    let (api, items) = store_over(
        InMemoryGraphApi::new()
            .with_node(node("a", 0.0, 0.0))
            .with_node(node("b", 0.0, 0.0))
            .with_relation(relation("r1", "a", "b")),
    );
    api.set_delay(Duration::from_millis(10));

    let (first, second) = tokio::join!(items.get_relation("r1"), items.get_relation("r1"));
    assert!(first.unwrap().is_some());
    assert!(second.unwrap().is_some());
    assert!(items.has_relation("r1"));
    assert_eq!(api.calls("fetch_relations"), 1);
}

#[test]
fn test_position_is_written_into_style() {
    let items = ItemsStore::new(Arc::new(InMemoryGraphApi::new()));
    items.set_node(node("a", 0.0, 0.0));

    assert!(items.set_node_position("a", Point::new(12.5, -3.0)));
    let stored = items.store_node("a").unwrap();
    assert_eq!(stored.style.get("x").map(String::as_str), Some("12.5"));
    assert_eq!(stored.style.get("y").map(String::as_str), Some("-3"));
    assert!(!items.set_node_position("missing", Point::new(0.0, 0.0)));
}

#[test]
fn test_pseudo_nodes_are_filtered() {
    let items = ItemsStore::new(Arc::new(InMemoryGraphApi::new()));
    items.set_node(node("persisted", 0.0, 0.0));
    items.set_node(graph_explorer::types::Node::placeholder("pseudo"));

    let listed: Vec<String> = items.store_non_pseudo_nodes().into_iter().map(|n| n.id).collect();
    assert_eq!(listed, vec!["persisted".to_string()]);
}

#[test]
fn test_removing_a_node_drops_its_relations() {
    let (_, items) = store_over(InMemoryGraphApi::new());
    items.set_nodes([node("a", 0.0, 0.0), node("b", 1.0, 0.0), node("c", 2.0, 0.0)]);
    items.set_relations([relation("ab", "a", "b"), relation("bc", "b", "c")]);

    assert_eq!(items.remove_node("a").map(|n| n.id), Some("a".to_string()));
    assert!(!items.has_relation("ab"));
    assert!(items.has_relation("bc"));

    items.remove_nodes(&["c".to_string()]);
    assert!(!items.has_relation("bc"));
    assert!(items.has_node("b"));
}

#[test]
fn test_relations_of_a_node_carry_their_direction() {
    let (_, items) = store_over(InMemoryGraphApi::new());
    items.set_relations([
        relation("ab", "a", "b"),
        relation("ca", "c", "a"),
        relation("aa", "a", "a"),
        relation("bc", "b", "c"),
    ]);

    let listed: Vec<(&str, String)> = items
        .relations_of("a")
        .iter()
        .map(|(direction, relation)| (direction.glyph(), relation.id.clone()))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("→", "ab".to_string()),
            ("←", "ca".to_string()),
            ("↩", "aa".to_string()),
        ]
    );
}
