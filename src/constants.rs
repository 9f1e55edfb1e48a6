//! Application-wide constants.
//!
//! Centralizes the visual defaults and interaction timings used by the graph
//! mirror store and the interaction plugins. Values that users may tune live in
//! [`crate::settings::Settings`] and fall back to these.

// ============================================================================
// Node Defaults
// ============================================================================

/// Fill color for nodes without a `color` style entry
pub const DEFAULT_NODE_COLOR: &str = "gray";

/// Style diameter used when a node has no `diameter` style entry
pub const DEFAULT_NODE_SIZE: f64 = 50.0;

/// Style diameter to graph size conversion
pub const NODE_SCALE_FACTOR: f64 = 0.5;

/// Border color for nodes without a `border-color` style entry
pub const DEFAULT_NODE_BORDER_COLOR: &str = "#000000";

/// Border width (style units) for nodes without a `border-width` style entry
pub const DEFAULT_NODE_BORDER_WIDTH: f64 = 5.0;

/// Label color for nodes without a `text-color-internal` style entry
pub const DEFAULT_NODE_LABEL_COLOR: &str = "#000000";

/// Default node label size in pixels
pub const DEFAULT_NODE_LABEL_SIZE: f64 = 6.0;

/// Smallest allowed node size factor
pub const MIN_NODE_SIZE_FACTOR: f64 = 0.1;

// ============================================================================
// Relation Defaults
// ============================================================================

/// Stroke color for relations without a `color` style entry
pub const DEFAULT_RELATION_COLOR: &str = "#cccccc";

/// Shaft width used when a relation has no `shaft-width` style entry
pub const DEFAULT_RELATION_SIZE: f64 = 2.0;

/// Shaft width to graph size conversion
pub const RELATION_SCALE_FACTOR: f64 = 0.5;

/// Label color for relations without a `text-color-internal` style entry
pub const DEFAULT_RELATION_LABEL_COLOR: &str = "#000000";

/// Label background for relations without a `text-color-external` style entry
pub const DEFAULT_RELATION_LABEL_BACKGROUND_COLOR: &str = "#ffffff";

/// Label padding for relations without a `padding` style entry
pub const DEFAULT_RELATION_LABEL_PADDING: f64 = 3.0;

/// Default relation label size in pixels
pub const DEFAULT_RELATION_LABEL_SIZE: f64 = 6.0;

/// Color applied to highlighted relations
pub const SELECTED_RELATION_COLOR: &str = "#1a73e8";

// ============================================================================
// Curvature
// ============================================================================

/// Curvature of a single curved relation before parallel-group scaling
pub const BASE_RELATION_CURVATURE: f64 = 0.25;

/// Amplitude of the asymptotic parallel-group curvature bound
pub const CURVATURE_AMPLITUDE: f64 = 3.5;

// ============================================================================
// Interaction Timing
// ============================================================================

/// Dwell time before a hovered node or relation shows its tooltip
pub const TOOLTIP_DELAY_MS: u64 = 700;

// ============================================================================
// Zoom & Scale
// ============================================================================

/// Default camera zooming ratio per wheel step
pub const DEFAULT_ZOOM_FACTOR: f64 = 2.0;

/// Minimum zooming ratio
pub const MIN_ZOOM_FACTOR: f64 = 1.1;

/// Maximum zooming ratio
pub const MAX_ZOOM_FACTOR: f64 = 3.0;

/// Zooming ratio change per ctrl+wheel step
pub const ZOOM_FACTOR_STEP: f64 = 0.1;

/// Node and label size factor change per wheel step
pub const SCALE_STEP: f64 = 0.1;

// ============================================================================
// Plugins
// ============================================================================

/// Style diameter of the ghost node drawn while auto-connecting
pub const GHOST_NODE_DIAMETER: f64 = 50.0;

/// Shaft width of the ghost relation drawn while auto-connecting
pub const GHOST_RELATION_SHAFT_WIDTH: &str = "5px";

/// Id prefix reserved for provisional (client-only) elements
pub const PROVISIONAL_ID_PREFIX: &str = "ghost:";

/// Extra distance between an expanded node and its revealed neighbours
pub const EXPAND_RING_SPACING: f64 = 50.0;

/// Distance in pixels between a tooltip and the hovered element
pub const TOOLTIP_OFFSET: f64 = 10.0;
