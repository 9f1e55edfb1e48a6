//! Low-level canvas events and the payload handed to state callbacks.

use crate::geometry::Point;
use crate::types::{NodeId, RelationId};
use crate::viewport::CameraState;
use serde::{Deserialize, Serialize};

/// Modifier keys held while an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        shift: false,
        alt: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Self::NONE
        }
    }

    pub fn any(&self) -> bool {
        self.ctrl || self.shift || self.alt
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

/// Element an event refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EventTarget {
    #[default]
    None,
    Stage,
    Node(NodeId),
    Relation(RelationId),
}

/// Events emitted by the rendering surface, tagged with the element under the
/// cursor. Positions are viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    DownNode {
        node_id: NodeId,
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    EnterNode {
        node_id: NodeId,
        position: Point,
    },
    LeaveNode {
        node_id: NodeId,
        position: Point,
    },
    ClickNode {
        node_id: NodeId,
        position: Point,
    },
    RightClickNode {
        node_id: NodeId,
        position: Point,
    },
    EnterRelation {
        relation_id: RelationId,
        position: Point,
    },
    LeaveRelation {
        relation_id: RelationId,
        position: Point,
    },
    ClickRelation {
        relation_id: RelationId,
        position: Point,
    },
    RightClickRelation {
        relation_id: RelationId,
        position: Point,
    },
    DownStage {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    UpStage {
        position: Point,
        modifiers: Modifiers,
    },
    RightClickStage {
        position: Point,
    },
    MouseMove {
        position: Point,
        modifiers: Modifiers,
    },
    MouseUp {
        position: Point,
        modifiers: Modifiers,
    },
    Wheel {
        position: Point,
        delta: f64,
        modifiers: Modifiers,
    },
    Resize {
        width: f64,
        height: f64,
    },
    CameraUpdated(CameraState),
}

/// Payload passed to `before` and `main` callbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub target: EventTarget,
    /// Pointer position in viewport pixels
    pub position: Point,
    pub modifiers: Modifiers,
    /// Wheel delta; positive scrolls up
    pub delta: f64,
    pub camera: Option<CameraState>,
    pub dimensions: Option<(f64, f64)>,
}

impl InteractionEvent {
    pub fn at(position: Point) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn node(node_id: impl Into<NodeId>, position: Point) -> Self {
        Self {
            target: EventTarget::Node(node_id.into()),
            position,
            ..Default::default()
        }
    }

    pub fn relation(relation_id: impl Into<RelationId>, position: Point) -> Self {
        Self {
            target: EventTarget::Relation(relation_id.into()),
            position,
            ..Default::default()
        }
    }

    pub fn stage(position: Point) -> Self {
        Self {
            target: EventTarget::Stage,
            position,
            ..Default::default()
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    pub fn node_id(&self) -> Option<&str> {
        match &self.target {
            EventTarget::Node(id) => Some(id),
            _ => None,
        }
    }

    pub fn relation_id(&self) -> Option<&str> {
        match &self.target {
            EventTarget::Relation(id) => Some(id),
            _ => None,
        }
    }
}
