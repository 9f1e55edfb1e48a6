//! Interaction states and their transition table.
//!
//! ## State Transitions
//!
//! ```text
//! Idle          -> NodeEnter | NodeDown | RelationEnter | StageDown | Scale | ZoomFactor
//!                  | NodeContextMenu | StageContextMenu | RelationContextMenu
//! StageDown     -> NodeSelection (shift) | NodeQuick (ctrl) | Idle
//! NodeDown      -> NodeDrag (move) | NodeAutoConnect (ctrl) | NodeClick | NodeContextMenu
//! NodeEnter     -> NodeDown | NodeLeave | NodeTooltip (dwell) | NodeContextMenu
//! RelationEnter -> RelationLeave | RelationClick | RelationTooltip | RelationContextMenu
//!
//! MouseUp, Resize, CameraUpdate are direct: no successors, callbacks always run.
//! ```

use serde::{Deserialize, Serialize};

/// Every interpretation the canvas can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionState {
    Idle,
    StageDown,
    StageContextMenu,
    NodeDown,
    NodeEnter,
    NodeQuick,
    NodeAutoConnect,
    NodeLeave,
    NodeDrag,
    NodeClick,
    NodeSelection,
    NodeContextMenu,
    NodeTooltip,
    RelationEnter,
    RelationLeave,
    RelationClick,
    RelationContextMenu,
    RelationTooltip,
    MouseUp,
    Resize,
    CameraUpdate,
    Scale,
    ZoomFactor,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl InteractionState {
    pub const ALL: [InteractionState; 23] = [
        Self::Idle,
        Self::StageDown,
        Self::StageContextMenu,
        Self::NodeDown,
        Self::NodeEnter,
        Self::NodeQuick,
        Self::NodeAutoConnect,
        Self::NodeLeave,
        Self::NodeDrag,
        Self::NodeClick,
        Self::NodeSelection,
        Self::NodeContextMenu,
        Self::NodeTooltip,
        Self::RelationEnter,
        Self::RelationLeave,
        Self::RelationClick,
        Self::RelationContextMenu,
        Self::RelationTooltip,
        Self::MouseUp,
        Self::Resize,
        Self::CameraUpdate,
        Self::Scale,
        Self::ZoomFactor,
    ];

    /// States a transition from `self` may legally move to.
    pub fn successors(&self) -> &'static [InteractionState] {
        use InteractionState::*;
        match self {
            Idle => &[
                NodeEnter,
                NodeDown,
                RelationEnter,
                StageDown,
                Scale,
                ZoomFactor,
                NodeContextMenu,
                StageContextMenu,
                RelationContextMenu,
            ],
            StageDown => &[NodeSelection, NodeQuick, Idle],
            StageContextMenu => &[Idle],
            NodeDown => &[NodeDrag, NodeAutoConnect, NodeClick, NodeContextMenu],
            NodeEnter => &[NodeDown, NodeLeave, NodeTooltip, NodeContextMenu],
            NodeQuick => &[Idle],
            NodeAutoConnect => &[Idle],
            NodeLeave => &[Idle, NodeEnter, RelationEnter],
            NodeDrag => &[Idle],
            NodeClick => &[NodeLeave, NodeContextMenu],
            NodeSelection => &[Idle],
            NodeContextMenu => &[Idle],
            NodeTooltip => &[NodeDown, NodeLeave, NodeContextMenu],
            RelationEnter => &[
                RelationLeave,
                RelationClick,
                RelationTooltip,
                RelationContextMenu,
            ],
            RelationLeave => &[Idle, NodeEnter, NodeDown, RelationEnter],
            RelationClick => &[RelationLeave, RelationContextMenu],
            RelationContextMenu => &[Idle],
            RelationTooltip => &[RelationClick, RelationLeave],
            MouseUp | Resize | CameraUpdate => &[],
            Scale => &[Idle],
            ZoomFactor => &[Idle],
        }
    }

    pub fn can_transition_to(&self, target: InteractionState) -> bool {
        self.successors().contains(&target)
    }

    /// Bookkeeping signals whose callbacks run regardless of the current state.
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::MouseUp | Self::Resize | Self::CameraUpdate)
    }

    /// Returns true for states that end a pointer gesture on mouse up
    pub fn resets_on_mouse_up(&self) -> bool {
        matches!(
            self,
            Self::NodeDrag
                | Self::NodeSelection
                | Self::NodeAutoConnect
                | Self::StageDown
                | Self::NodeQuick
        )
    }

    pub fn is_context_menu(&self) -> bool {
        matches!(
            self,
            Self::NodeContextMenu | Self::RelationContextMenu | Self::StageContextMenu
        )
    }
}

/// Editing mode of the canvas. Carried for hosts, not used for dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Default,
    Edit,
}
