//! The graph canvas: one state manager, one graph mirror, one items cache and
//! the plugins wired between them.
//!
//! Hosts feed low-level pointer events into [`GraphCanvas::handle_event`], call
//! [`GraphCanvas::tick`] from their frame loop so dwell tooltips can fire, and
//! read plugin state (selection overlay, tooltip, context menu, focused item)
//! when drawing.

use crate::api::GraphApi;
use crate::error::ApiResult;
use crate::graph::GraphStore;
use crate::input::{CanvasEvent, InteractionState, InteractionStateManager, StateCallback};
use crate::items::ItemsStore;
use crate::notifications::{Notification, NotificationCenter};
use crate::plugins::{
    AutoConnectPlugin, ContextMenuPlugin, DragNodesPlugin, InteractionPlugin, ItemClickPlugin,
    LabelSizes, PluginContext, QuickNodePlugin, ScalePlugin, SelectionPlugin, Subscriptions,
    TooltipPlugin, ZoomFactorPlugin, collapse_node, expand_node,
};
use crate::settings::Settings;
use crate::settings_watcher::{SettingsEvent, SettingsWatcher};
use crate::types::{Node, Relation};
use crate::viewport::{Camera, SharedCamera, Viewport};
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Viewport size used until the host reports a resize
const INITIAL_VIEWPORT: (f64, f64) = (800.0, 600.0);

pub struct GraphCanvas {
    ctx: PluginContext,
    drag: Arc<DragNodesPlugin>,
    selection: Arc<SelectionPlugin>,
    auto_connect: Arc<AutoConnectPlugin>,
    click: Arc<ItemClickPlugin>,
    tooltip: Arc<TooltipPlugin>,
    context_menu: Arc<ContextMenuPlugin>,
    scale: Arc<ScalePlugin>,
    subscriptions: Subscriptions,
}

impl GraphCanvas {
    /// Canvas with its own camera.
    pub fn new(api: Arc<dyn GraphApi>, settings: Settings) -> Self {
        let (width, height) = INITIAL_VIEWPORT;
        let camera = Arc::new(SharedCamera::new(Camera::new(width, height)));
        Self::with_viewport(api, camera, settings)
    }

    /// Canvas whose coordinate transforms come from the host renderer.
    pub fn with_viewport(api: Arc<dyn GraphApi>, viewport: Arc<dyn Viewport>, settings: Settings) -> Self {
        let settings = settings.sanitized();
        let ism = Arc::new(InteractionStateManager::with_tooltip_delay(settings.tooltip_delay()));
        let items = Arc::new(ItemsStore::new(api));
        let ctx = PluginContext::new(ism, items, viewport, settings);

        let mut canvas = Self {
            ctx,
            drag: Arc::new(DragNodesPlugin::new()),
            selection: Arc::new(SelectionPlugin::new()),
            auto_connect: Arc::new(AutoConnectPlugin::new()),
            click: Arc::new(ItemClickPlugin::new()),
            tooltip: Arc::new(TooltipPlugin::new()),
            context_menu: Arc::new(ContextMenuPlugin::new()),
            scale: Arc::new(ScalePlugin::new()),
            subscriptions: Subscriptions::new(),
        };
        canvas.install_viewport_sync();

        let builtin: [Arc<dyn InteractionPlugin>; 9] = [
            canvas.drag.clone(),
            canvas.selection.clone(),
            canvas.auto_connect.clone(),
            canvas.click.clone(),
            canvas.tooltip.clone(),
            canvas.context_menu.clone(),
            canvas.scale.clone(),
            Arc::new(QuickNodePlugin::new()),
            Arc::new(ZoomFactorPlugin::new()),
        ];
        for plugin in builtin {
            canvas.install(plugin);
        }
        canvas
    }

    /// Install an additional plugin. It stays installed until the canvas drops.
    pub fn install(&mut self, plugin: Arc<dyn InteractionPlugin>) {
        let name = plugin.name();
        let subscriptions = plugin.install(&self.ctx);
        debug!(plugin = name, callbacks = subscriptions.len(), "plugin installed");
        self.subscriptions.extend(subscriptions);
    }

    fn install_viewport_sync(&mut self) {
        let ism = self.ctx.ism.clone();
        let resize_viewport = self.ctx.viewport.clone();
        self.subscriptions.on(
            &ism,
            InteractionState::Resize,
            StateCallback::new().main(move |event| {
                if let Some((width, height)) = event.dimensions {
                    resize_viewport.resized(width, height);
                }
            }),
        );
        let camera_viewport = self.ctx.viewport.clone();
        self.subscriptions.on(
            &ism,
            InteractionState::CameraUpdate,
            StateCallback::new().main(move |event| {
                if let Some(camera) = event.camera {
                    camera_viewport.camera_updated(camera);
                }
            }),
        );
    }

    // ------------------------------------------------------------------
    // Shared state
    // ------------------------------------------------------------------

    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    pub fn ism(&self) -> &Arc<InteractionStateManager> {
        &self.ctx.ism
    }

    pub fn state(&self) -> InteractionState {
        self.ctx.ism.current_state()
    }

    pub fn graph(&self) -> MutexGuard<'_, GraphStore> {
        self.ctx.graph.lock()
    }

    pub fn items(&self) -> &Arc<ItemsStore> {
        &self.ctx.items
    }

    pub fn viewport(&self) -> &Arc<dyn Viewport> {
        &self.ctx.viewport
    }

    pub fn notifications(&self) -> MutexGuard<'_, NotificationCenter> {
        self.ctx.notifications.lock()
    }

    pub fn settings(&self) -> Settings {
        self.ctx.settings()
    }

    // ------------------------------------------------------------------
    // Plugin state
    // ------------------------------------------------------------------

    pub fn drag(&self) -> &DragNodesPlugin {
        &self.drag
    }

    pub fn selection(&self) -> &SelectionPlugin {
        &self.selection
    }

    pub fn auto_connect(&self) -> &AutoConnectPlugin {
        &self.auto_connect
    }

    pub fn click(&self) -> &ItemClickPlugin {
        &self.click
    }

    pub fn tooltip(&self) -> &TooltipPlugin {
        &self.tooltip
    }

    pub fn context_menu(&self) -> &ContextMenuPlugin {
        &self.context_menu
    }

    pub fn label_sizes(&self) -> LabelSizes {
        self.scale.label_sizes(&self.ctx)
    }

    // ------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------

    /// Put query results on the canvas: cache them and mirror them into the graph.
    pub fn load(&self, nodes: Vec<Node>, relations: Vec<Relation>) {
        {
            let mut graph = self.ctx.graph.lock();
            graph.add_nodes(&nodes);
            graph.add_relations(&relations);
            graph.index_parallel_relations();
            graph.adapt_relations_type_and_curvature();
        }
        info!(nodes = nodes.len(), relations = relations.len(), "graph loaded");
        self.ctx.items.set_nodes(nodes);
        self.ctx.items.set_relations(relations);
    }

    /// Empty the canvas and every cache.
    pub fn clear(&self) {
        self.ctx.ism.reset_state();
        self.ctx.graph.lock().reset();
        self.ctx.items.clear();
        self.ctx.expansions.lock().clear();
    }

    pub async fn expand(&self, node_id: &str) -> ApiResult<usize> {
        expand_node(&self.ctx, node_id).await
    }

    pub fn collapse(&self, node_id: &str) -> usize {
        collapse_node(&self.ctx, node_id)
    }

    pub fn is_expanded(&self, node_id: &str) -> bool {
        self.ctx.expansions.lock().is_expanded(node_id)
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    pub fn handle_event(&self, event: CanvasEvent) {
        self.handle_event_at(event, Instant::now());
    }

    /// Dispatch an event observed at `now`; dwell timers are armed relative to it.
    pub fn handle_event_at(&self, event: CanvasEvent, now: Instant) {
        self.ctx.ism.handle_event(event, now);
    }

    /// Fire due tooltips and expire old notifications. Returns how many tooltips fired.
    pub fn tick(&self, now: Instant) -> usize {
        self.ctx.notifications.lock().remove_expired(now);
        self.ctx.ism.tick(now)
    }

    /// Wait until every background commit has finished.
    pub async fn settle(&self) {
        self.ctx.settle().await;
    }

    pub fn pending_tasks(&self) -> usize {
        self.ctx.pending_tasks()
    }

    pub fn notify(&self, notification: Notification) {
        self.ctx.notify(notification);
    }

    // ------------------------------------------------------------------
    // Settings
    // ------------------------------------------------------------------

    pub fn apply_settings(&self, settings: Settings) {
        let settings = settings.sanitized();
        self.ctx.ism.set_tooltip_delay(settings.tooltip_delay());
        {
            let mut graph = self.ctx.graph.lock();
            graph.set_zoom_factor(settings.zoom_factor);
            graph.set_node_size_factor(settings.node_size_factor);
            graph.set_label_size_factor(settings.label_size_factor);
        }
        *self.ctx.settings.write() = settings;
        debug!("settings applied");
    }

    /// Apply whatever the watcher reported since the last poll.
    ///
    /// Returns true when settings changed.
    pub fn poll_settings(&self, watcher: &mut SettingsWatcher) -> bool {
        match watcher.poll() {
            Some(SettingsEvent::Changed(settings)) => {
                info!(path = %watcher.path().display(), "settings reloaded");
                self.apply_settings(settings);
                true
            }
            Some(SettingsEvent::Removed) => {
                info!("settings file removed, using defaults");
                self.apply_settings(Settings::default());
                true
            }
            None => false,
        }
    }
}

impl Drop for GraphCanvas {
    fn drop(&mut self) {
        // Callbacks hold the context, which holds the manager
        self.subscriptions.unsubscribe(&self.ctx.ism);
    }
}
