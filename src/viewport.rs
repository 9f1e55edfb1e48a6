//! Coordinate transforms between graph space and the viewport.
//!
//! The renderer owns the real camera; plugins only need the conversions, so
//! they depend on the [`Viewport`] trait. [`Camera`] is a plain implementation
//! for hosts without their own renderer state and for tests.

use crate::geometry::Point;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Coordinate transforms the rendering collaborator must provide.
pub trait Viewport: Send + Sync {
    /// Convert a viewport (pixel) position to graph space
    fn viewport_to_graph(&self, point: Point) -> Point;

    /// Convert a graph-space position to viewport pixels
    fn graph_to_viewport(&self, point: Point) -> Point;

    /// Convert a graph-space size to viewport pixels
    fn scale_size(&self, size: f64) -> f64;

    /// Viewport dimensions in pixels
    fn dimensions(&self) -> (f64, f64);

    /// Called when the host reports a resized canvas.
    fn resized(&self, _width: f64, _height: f64) {}

    /// Called when the host reports a camera move or zoom.
    fn camera_updated(&self, _state: CameraState) {}
}

/// Camera state as reported by camera-update events.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Graph-space point shown at the viewport center
    pub x: f64,
    pub y: f64,
    /// Graph units per pixel; larger means zoomed out
    pub ratio: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            ratio: 1.0,
        }
    }
}

/// Minimal camera: pan plus uniform zoom around the viewport center.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    pub state: CameraState,
    pub width: f64,
    pub height: f64,
}

impl Camera {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            state: CameraState::default(),
            width,
            height,
        }
    }

    pub fn with_state(mut self, state: CameraState) -> Self {
        self.state = state;
        self
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

impl Viewport for Camera {
    fn viewport_to_graph(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.width / 2.0) * self.state.ratio + self.state.x,
            (point.y - self.height / 2.0) * self.state.ratio + self.state.y,
        )
    }

    fn graph_to_viewport(&self, point: Point) -> Point {
        Point::new(
            (point.x - self.state.x) / self.state.ratio + self.width / 2.0,
            (point.y - self.state.y) / self.state.ratio + self.height / 2.0,
        )
    }

    fn scale_size(&self, size: f64) -> f64 {
        size / self.state.ratio
    }

    fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// A [`Camera`] that follows resize and camera-update events.
#[derive(Debug)]
pub struct SharedCamera {
    camera: RwLock<Camera>,
}

impl SharedCamera {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera: RwLock::new(camera),
        }
    }

    pub fn snapshot(&self) -> Camera {
        self.camera.read().clone()
    }

    pub fn state(&self) -> CameraState {
        self.camera.read().state
    }
}

impl Viewport for SharedCamera {
    fn viewport_to_graph(&self, point: Point) -> Point {
        self.camera.read().viewport_to_graph(point)
    }

    fn graph_to_viewport(&self, point: Point) -> Point {
        self.camera.read().graph_to_viewport(point)
    }

    fn scale_size(&self, size: f64) -> f64 {
        self.camera.read().scale_size(size)
    }

    fn dimensions(&self) -> (f64, f64) {
        self.camera.read().dimensions()
    }

    fn resized(&self, width: f64, height: f64) {
        self.camera.write().resize(width, height);
    }

    fn camera_updated(&self, state: CameraState) {
        self.camera.write().state = state;
    }
}
