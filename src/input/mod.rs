//! Canvas input handling.
//!
//! The rendering surface emits low-level pointer events. They all funnel into
//! one [`InteractionStateManager`] per canvas, which decides which single
//! interpretation of a gesture is active and dispatches to the plugin callbacks
//! registered on that state.
//!
//! ## Modules
//!
//! - `state` - Interaction state enum and its transition table
//! - `event` - Raw canvas events and the callback payload
//! - `manager` - The state manager: transitions, dispatch, event translation

mod event;
mod manager;
mod state;

pub use event::{CanvasEvent, EventTarget, InteractionEvent, Modifiers, MouseButton};
pub use manager::{AfterCallback, CallbackId, EventCallback, InteractionStateManager, StateCallback};
pub use state::{InteractionMode, InteractionState};
