//! Graph explorer canvas core.
//!
//! An interaction state machine that arbitrates pointer gestures on a graph
//! canvas, a mirror store holding the renderable graph, a cache of the remote
//! node and relation data, and the plugins that connect them.
//!
//! - `input` - interaction states, events and the state manager
//! - `graph` - the graph mirror store, visual attributes, parallel relations
//! - `items` - remote data cache with single-flight fetches
//! - `plugins` - drag, selection, auto-connect, click, tooltip, context menu,
//!   expand/collapse, quick node, scale
//! - `canvas` - wires all of the above into one host-facing type

pub mod api;
pub mod canvas;
pub mod constants;
pub mod error;
pub mod expansion;
pub mod geometry;
pub mod graph;
pub mod input;
pub mod items;
pub mod logging;
pub mod notifications;
pub mod perf;
pub mod plugins;
pub mod settings;
pub mod settings_watcher;
pub mod spatial_index;
pub mod types;
pub mod viewport;

pub use canvas::GraphCanvas;
pub use error::{ApiError, ApiResult, SettingsError};
pub use input::{CanvasEvent, InteractionState, InteractionStateManager};
pub use settings::Settings;
