//! Unit tests for the graph mirror store and parallel relation curvature.

use crate::helpers::{node, relation};
use graph_explorer::constants::{BASE_RELATION_CURVATURE, CURVATURE_AMPLITUDE};
use graph_explorer::geometry::Point;
use graph_explorer::graph::{GraphStore, RelationKind};
use graph_explorer::types::Node;

fn store_with_pair() -> GraphStore {
    let mut store = GraphStore::new();
    store.add_node(&node("a", 0.0, 0.0));
    store.add_node(&node("b", 200.0, 0.0));
    store
}

fn reindex(store: &mut GraphStore) {
    store.index_parallel_relations();
    store.adapt_relations_type_and_curvature();
}

#[test]
fn test_single_relation_is_straight() {
    let mut store = store_with_pair();
    assert!(store.add_relation(&relation("r1", "a", "b")));
    reindex(&mut store);

    assert_eq!(store.node_count(), 2);
    assert_eq!(store.relation_count(), 1);
    let r1 = store.relation("r1").unwrap();
    assert_eq!(r1.kind, RelationKind::Straight);
    assert_eq!(r1.parallel_index, None);
    assert_eq!(r1.curvature, 0.0);
}

#[test]
fn test_opposite_relations_curve_to_opposite_sides() {
    let mut store = store_with_pair();
    store.add_relation(&relation("r1", "a", "b"));
    store.add_relation(&relation("r2", "b", "a"));
    reindex(&mut store);

    let r1 = store.relation("r1").unwrap();
    let r2 = store.relation("r2").unwrap();
    assert!(r1.parallel_index.is_some() && r1.parallel_max_index.is_some());
    assert!(r2.parallel_index.is_some() && r2.parallel_max_index.is_some());
    assert_eq!(r1.kind, RelationKind::Curved);
    assert_eq!(r2.kind, RelationKind::Curved);
    assert!(r1.curvature != 0.0);
    assert!(r1.curvature.signum() == -r2.curvature.signum());
    assert!((r1.curvature + r2.curvature).abs() < 1e-12);
}

#[test]
fn test_parallel_curvature_is_monotonic_and_bounded() {
    let bound = CURVATURE_AMPLITUDE * BASE_RELATION_CURVATURE;

    for count in 2..8 {
        let mut store = store_with_pair();
        for i in 0..count {
            store.add_relation(&relation(&format!("r{i}"), "a", "b"));
        }
        reindex(&mut store);

        let mut members: Vec<(i32, f64)> = store
            .relations()
            .map(|(_, r)| (r.parallel_index.unwrap(), r.curvature))
            .collect();
        members.sort_by_key(|(index, _)| *index);

        for pair in members.windows(2) {
            assert!(pair[0].1 < pair[1].1, "count {count}: {members:?}");
        }
        for (index, curvature) in &members {
            assert!(curvature.abs() < bound);
            assert_eq!(*index == 0, *curvature == 0.0);
        }
    }
}

#[test]
fn test_adding_twice_is_a_no_op() {
    let mut store = store_with_pair();
    let moved = node("a", 999.0, 999.0);
    assert!(!store.add_node(&moved));
    assert_eq!(store.node_position("a"), Some(Point::new(0.0, 0.0)));

    assert!(store.add_relation(&relation("r1", "a", "b")));
    assert!(!store.add_relation(&relation("r1", "a", "b")));
    assert_eq!(store.relation_count(), 1);
}

#[test]
fn test_relation_requires_both_endpoints() {
    let mut store = store_with_pair();
    assert!(!store.add_relation(&relation("r1", "a", "missing")));
    assert!(!store.add_relation(&relation("r2", "missing", "b")));
    assert_eq!(store.relation_count(), 0);
}

#[test]
fn test_remove_node_cascades_to_relations() {
    let mut store = store_with_pair();
    store.add_node(&node("c", 0.0, 200.0));
    store.add_relation(&relation("ab", "a", "b"));
    store.add_relation(&relation("ca", "c", "a"));
    store.add_relation(&relation("bc", "b", "c"));
    store.highlight_node("a");

    assert!(store.remove_node("a"));
    assert!(!store.has_node("a"));
    assert_eq!(store.relations_of("a"), Vec::<String>::new());
    assert!(store.has_relation("bc"));
    assert_eq!(store.relation_count(), 1);
    assert!(store.highlighted_nodes().is_empty());
}

#[test]
fn test_explicit_zero_coordinates_are_kept() {
    let mut store = GraphStore::new();
    store.add_node(&Node::placeholder("origin").with_position(0.0, 0.0));
    assert_eq!(store.node_position("origin"), Some(Point::new(0.0, 0.0)));
}

#[test]
fn test_unpositioned_nodes_land_on_the_same_spot() {
    let mut first = GraphStore::new();
    let mut second = GraphStore::new();
    first.add_node(&Node::placeholder("wanderer"));
    second.add_node(&Node::placeholder("wanderer"));
    assert_eq!(first.node_position("wanderer"), second.node_position("wanderer"));
}

#[test]
fn test_show_all_reveals_hidden_elements() {
    let mut store = store_with_pair();
    store.add_relation(&relation("r1", "a", "b"));
    store.set_node_hidden("a", true);
    store.set_relation_hidden("r1", true);

    store.show_all();
    assert!(!store.node("a").unwrap().hidden);
    assert!(!store.relation("r1").unwrap().hidden);
}

#[test]
fn test_retarget_moves_relation_end() {
    let mut store = store_with_pair();
    store.add_node(&node("c", 0.0, 200.0));
    store.add_relation(&relation("r1", "a", "b"));

    assert!(store.retarget_relation("r1", "c"));
    assert_eq!(store.relation("r1").unwrap().target, "c");
    assert!(!store.retarget_relation("r1", "missing"));
    assert_eq!(store.relation("r1").unwrap().target, "c");
}
