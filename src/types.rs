//! Domain types mirrored from the graph database.
//!
//! Nodes and relations arrive from the remote data collaborator in these shapes.
//! Visual attributes live in the `style` record as strings, the same format the
//! external stylesheet uses, and are parsed by [`crate::graph::attributes`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type NodeId = String;
pub type RelationId = String;

/// Stylesheet-shaped visual attributes (`x`, `y`, `diameter`, `color`, `caption`, ...).
pub type StyleProperties = BTreeMap<String, String>;

/// Item properties keyed by property name.
pub type ItemProperties = BTreeMap<String, Property>;

/// A typed property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: serde_json::Value,
}

impl Property {
    pub fn new(kind: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            value,
        }
    }
}

/// A graph database node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Pseudo nodes have no database id
    #[serde(default, rename = "dbId", skip_serializing_if = "Option::is_none")]
    pub db_id: Option<NodeId>,
    /// Only meta nodes carry a semantic id
    #[serde(default, rename = "semanticId", skip_serializing_if = "Option::is_none")]
    pub semantic_id: Option<NodeId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "longDescription")]
    pub long_description: String,
    /// Ids of the nodes acting as this node's labels
    #[serde(default)]
    pub labels: Vec<NodeId>,
    #[serde(default)]
    pub properties: ItemProperties,
    #[serde(default)]
    pub style: StyleProperties,
}

impl Node {
    /// Bare node carrying only an id, used for provisional elements.
    pub fn placeholder(id: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn with_position(self, x: f64, y: f64) -> Self {
        self.with_style("x", x.to_string()).with_style("y", y.to_string())
    }

    /// Pseudo nodes have not been defined in the database yet.
    pub fn is_pseudo(&self) -> bool {
        self.db_id.is_none()
    }
}

/// A directed graph database relation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub id: RelationId,
    #[serde(default, rename = "dbId", skip_serializing_if = "Option::is_none")]
    pub db_id: Option<RelationId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Id of the node describing this relation's type
    #[serde(rename = "type")]
    pub relation_type: NodeId,
    #[serde(default)]
    pub properties: ItemProperties,
    pub source_id: NodeId,
    pub target_id: NodeId,
    #[serde(default)]
    pub style: StyleProperties,
}

impl Relation {
    pub fn new(
        id: impl Into<RelationId>,
        source_id: impl Into<NodeId>,
        target_id: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, relation_type: impl Into<NodeId>) -> Self {
        self.relation_type = relation_type.into();
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    pub fn is_self_relation(&self) -> bool {
        self.source_id == self.target_id
    }

    /// Whether the relation touches `node_id` at either end.
    pub fn connects(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }

    /// Direction of this relation as seen from `node_id`.
    pub fn direction_from(&self, node_id: &str) -> Option<RelationDirection> {
        if self.is_self_relation() && self.source_id == node_id {
            Some(RelationDirection::SelfLoop)
        } else if self.source_id == node_id {
            Some(RelationDirection::Outgoing)
        } else if self.target_id == node_id {
            Some(RelationDirection::Incoming)
        } else {
            None
        }
    }
}

/// Direction indicator for a relation listed next to one of its nodes.
///
/// Self relations get their own "return" glyph so they are never mistaken for
/// a plain outgoing or incoming relation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationDirection {
    Outgoing,
    Incoming,
    SelfLoop,
}

impl RelationDirection {
    pub fn glyph(&self) -> &'static str {
        match self {
            RelationDirection::Outgoing => "→",
            RelationDirection::Incoming => "←",
            RelationDirection::SelfLoop => "↩",
        }
    }
}

/// One entry of a neighbour fetch: the connecting relation and the node on the other end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeConnection {
    pub relation: Relation,
    pub neighbor: Node,
}

/// Either kind of graph element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GraphElement {
    Node(Node),
    Relation(Relation),
}

impl GraphElement {
    pub fn id(&self) -> &str {
        match self {
            GraphElement::Node(node) => &node.id,
            GraphElement::Relation(relation) => &relation.id,
        }
    }
}
