//! Wheel gestures with modifiers.
//!
//! - shift + wheel scales labels
//! - alt + wheel scales nodes
//! - ctrl + wheel changes the camera zooming ratio
//!
//! Each gesture is a single step and resets the state machine right away.

use super::{InteractionPlugin, PluginContext, Subscriptions};
use crate::constants::{SCALE_STEP, ZOOM_FACTOR_STEP};
use crate::input::{InteractionEvent, InteractionState, StateCallback};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Rendered label sizes in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LabelSizes {
    pub node: f64,
    pub relation: f64,
}

#[derive(Debug)]
pub struct ScalePlugin {
    camera_ratio: Mutex<f64>,
}

impl Default for ScalePlugin {
    fn default() -> Self {
        Self {
            camera_ratio: Mutex::new(1.0),
        }
    }
}

impl ScalePlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label sizes for the current camera ratio, so labels follow the zoom.
    pub fn label_sizes(&self, ctx: &PluginContext) -> LabelSizes {
        let ratio = *self.camera_ratio.lock();
        let factor = ctx.graph.lock().label_size_factor();
        let settings = ctx.settings.read();
        LabelSizes {
            node: settings.node_label_size / ratio * factor,
            relation: settings.relation_label_size / ratio * factor,
        }
    }

    fn camera_updated(&self, event: &InteractionEvent) {
        if let Some(camera) = event.camera {
            *self.camera_ratio.lock() = camera.ratio;
        }
    }

    fn scale(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let step = if event.delta > 0.0 { SCALE_STEP } else { -SCALE_STEP };
        {
            let mut graph = ctx.graph.lock();
            let mut settings = ctx.settings.write();
            if event.modifiers.shift {
                let factor = graph.label_size_factor() + step;
                settings.label_size_factor = graph.set_label_size_factor(factor);
                debug!(factor = settings.label_size_factor, "label size factor");
            }
            if event.modifiers.alt {
                let factor = graph.node_size_factor() + step;
                settings.node_size_factor = graph.set_node_size_factor(factor);
                debug!(factor = settings.node_size_factor, "node size factor");
            }
        }
        ctx.ism.reset_state();
    }
}

impl InteractionPlugin for ScalePlugin {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();

        let camera = self.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::CameraUpdate,
            StateCallback::new().main(move |event| camera.camera_updated(event)),
        );

        let scale_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::Scale,
            StateCallback::new().main(move |event| self.scale(&scale_ctx, event)),
        );
        subscriptions
    }
}

#[derive(Debug, Default)]
pub struct ZoomFactorPlugin;

impl ZoomFactorPlugin {
    pub fn new() -> Self {
        Self
    }

    fn step(&self, ctx: &PluginContext, event: &InteractionEvent) {
        let step = if event.delta > 0.0 {
            ZOOM_FACTOR_STEP
        } else {
            -ZOOM_FACTOR_STEP
        };
        {
            let mut graph = ctx.graph.lock();
            let factor = graph.zoom_factor() + step;
            let applied = graph.set_zoom_factor(factor);
            ctx.settings.write().zoom_factor = applied;
            debug!(factor = applied, "zoom factor");
        }
        ctx.ism.reset_state();
    }
}

impl InteractionPlugin for ZoomFactorPlugin {
    fn name(&self) -> &'static str {
        "quick-zoom-factor"
    }

    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions {
        let mut subscriptions = Subscriptions::new();
        let zoom_ctx = ctx.clone();
        subscriptions.on(
            &ctx.ism,
            InteractionState::ZoomFactor,
            StateCallback::new().main(move |event| self.step(&zoom_ctx, event)),
        );
        subscriptions
    }
}
