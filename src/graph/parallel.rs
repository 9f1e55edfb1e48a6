//! Parallel relation indexing and curvature assignment.
//!
//! Relations are grouped by their unordered endpoint pair. Indices are signed
//! and expressed in the pair's canonical orientation (smaller endpoint id
//! towards the larger one), so that a relation and its reverse bend to opposite
//! sides of the straight line between the two nodes.
//!
//! - one direction only, `k` relations: indices are centered around zero.
//!   Odd groups keep index 0 (drawn straight), even groups skip it.
//! - both directions: canonical relations get `1..=n`, reverse ones `-1..=-m`.

use super::attributes::{RelationKind, RenderRelation};
use crate::constants::{BASE_RELATION_CURVATURE, CURVATURE_AMPLITUDE};
use crate::types::{NodeId, RelationId};
use indexmap::IndexMap;

/// Parallel group membership of one relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParallelIndex {
    pub index: i32,
    pub min: i32,
    pub max: i32,
}

impl ParallelIndex {
    /// Largest absolute index in the group.
    pub fn max_abs(&self) -> i32 {
        self.min.abs().max(self.max.abs())
    }
}

/// Bound on the curvature of a group whose largest absolute index is `max_index`.
///
/// Grows asymptotically towards `amplitude * base` instead of linearly.
pub fn max_curvature(max_index: i32) -> f64 {
    let max_index = max_index.abs() as f64;
    CURVATURE_AMPLITUDE * (1.0 - (-max_index / CURVATURE_AMPLITUDE).exp()) * BASE_RELATION_CURVATURE
}

/// Curvature of the relation at `index` in a group bounded by `max_index`.
pub fn curvature(index: i32, max_index: i32) -> f64 {
    if index < 0 {
        return -curvature(-index, max_index);
    }
    if max_index == 0 {
        return 0.0;
    }
    max_curvature(max_index) * index as f64 / max_index.abs() as f64
}

fn canonical_pair(source: &str, target: &str) -> (NodeId, NodeId) {
    if source <= target {
        (source.to_string(), target.to_string())
    } else {
        (target.to_string(), source.to_string())
    }
}

fn centered_indices(count: usize) -> Vec<i32> {
    let count = count as i32;
    if count % 2 == 1 {
        let half = (count - 1) / 2;
        (-half..=half).collect()
    } else {
        let half = count / 2;
        (-half..=-1).chain(1..=half).collect()
    }
}

/// Compute parallel indices for every relation belonging to a group of two or more.
///
/// Relations that are alone between their endpoints get no entry.
pub fn compute_parallel_indices(
    relations: &IndexMap<RelationId, RenderRelation>,
) -> IndexMap<RelationId, ParallelIndex> {
    let mut groups: IndexMap<(NodeId, NodeId), (Vec<RelationId>, Vec<RelationId>)> =
        IndexMap::new();

    for (id, relation) in relations {
        let pair = canonical_pair(&relation.source, &relation.target);
        let forward = relation.source == pair.0;
        let group = groups.entry(pair).or_default();
        if forward {
            group.0.push(id.clone());
        } else {
            group.1.push(id.clone());
        }
    }

    let mut indices = IndexMap::new();
    for (forward, reverse) in groups.into_values() {
        if forward.len() + reverse.len() < 2 {
            continue;
        }

        let assigned: Vec<(RelationId, i32)> = if reverse.is_empty() || forward.is_empty() {
            let members = if reverse.is_empty() { forward } else { reverse };
            let centered = centered_indices(members.len());
            members.into_iter().zip(centered).collect()
        } else {
            let forward = forward.into_iter().zip(1..);
            let reverse = reverse.into_iter().zip((1..).map(|i: i32| -i));
            forward.chain(reverse).collect()
        };

        let min = assigned.iter().map(|(_, i)| *i).min().unwrap_or(0);
        let max = assigned.iter().map(|(_, i)| *i).max().unwrap_or(0);
        for (id, index) in assigned {
            indices.insert(id, ParallelIndex { index, min, max });
        }
    }

    indices
}

/// Assign type and curvature to one relation from its parallel index fields.
pub fn adapt_type_and_curvature(relation: &mut RenderRelation) {
    match (relation.parallel_index, relation.parallel_min_index) {
        (Some(index), Some(min)) => {
            let max = relation.parallel_max_index.unwrap_or(index);
            let max_abs = min.abs().max(max.abs());
            relation.kind = if index != 0 {
                RelationKind::Curved
            } else {
                RelationKind::Straight
            };
            relation.curvature = curvature(index, max_abs);
        }
        (Some(index), None) => {
            relation.kind = RelationKind::Curved;
            let max = relation.parallel_max_index.unwrap_or(index).abs();
            relation.curvature = curvature(index, max);
        }
        _ => {
            relation.kind = RelationKind::Straight;
            relation.curvature = 0.0;
        }
    }
}
