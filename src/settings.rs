//! User-tunable canvas settings, persisted as JSON.
//!
//! Missing keys fall back to defaults and unknown keys are ignored, so older
//! and newer settings files both load.

use crate::constants::*;
use crate::error::SettingsError;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const SETTINGS_DIR: &str = "graph-explorer";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Dwell time before a hover tooltip opens
    pub tooltip_delay_ms: u64,
    pub zoom_factor: f64,
    pub node_size_factor: f64,
    pub label_size_factor: f64,
    /// Also fetch relations among freshly expanded neighbours
    pub auto_connect_on_expand: bool,
    pub expand_ring_spacing: f64,
    /// Label id given to nodes created by auto-connect and quick node
    pub default_node_label: Option<String>,
    /// Relation type id given to relations created by auto-connect
    pub default_relation_type: Option<String>,
    pub node_label_size: f64,
    pub relation_label_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tooltip_delay_ms: TOOLTIP_DELAY_MS,
            zoom_factor: DEFAULT_ZOOM_FACTOR,
            node_size_factor: 1.0,
            label_size_factor: 1.0,
            auto_connect_on_expand: true,
            expand_ring_spacing: EXPAND_RING_SPACING,
            default_node_label: None,
            default_relation_type: None,
            node_label_size: DEFAULT_NODE_LABEL_SIZE,
            relation_label_size: DEFAULT_RELATION_LABEL_SIZE,
        }
    }
}

impl Settings {
    /// Load from `path`. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file missing, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings.sanitized())
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from the per-user default location.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = default_settings_path().context("no config directory on this platform")?;
        Self::load(&path).with_context(|| format!("loading settings from {}", path.display()))
    }

    pub fn tooltip_delay(&self) -> Duration {
        Duration::from_millis(self.tooltip_delay_ms)
    }

    /// Clamp factors into their allowed ranges.
    pub fn sanitized(mut self) -> Self {
        self.zoom_factor = self.zoom_factor.clamp(MIN_ZOOM_FACTOR, MAX_ZOOM_FACTOR);
        self.node_size_factor = self.node_size_factor.max(MIN_NODE_SIZE_FACTOR);
        self.label_size_factor = self.label_size_factor.max(MIN_NODE_SIZE_FACTOR);
        self
    }
}

pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}
