//! Interaction plugins.
//!
//! Each plugin subscribes to one or more interaction states on install and
//! reacts inside the callbacks. Plugins never touch each other; everything they
//! share is reachable through the [`PluginContext`].
//!
//! Lock discipline: the graph lock is never held while calling into the state
//! manager, and never held across an `.await`.

pub mod auto_connect;
pub mod click;
pub mod context_menu;
pub mod drag;
pub mod expand;
pub mod quick_node;
pub mod scale;
pub mod selection;
pub mod tooltip;

pub use auto_connect::AutoConnectPlugin;
pub use click::{FocusedItem, ItemClickPlugin};
pub use context_menu::{ContextMenu, ContextMenuAction, ContextMenuKind, ContextMenuPlugin};
pub use drag::DragNodesPlugin;
pub use expand::{collapse_node, expand_node};
pub use quick_node::QuickNodePlugin;
pub use scale::{LabelSizes, ScalePlugin, ZoomFactorPlugin};
pub use selection::{SelectionPlugin, SelectionRectangle};
pub use tooltip::{Tooltip, TooltipPlugin};

use crate::expansion::ExpansionTree;
use crate::graph::GraphStore;
use crate::input::{CallbackId, InteractionState, InteractionStateManager, StateCallback};
use crate::items::ItemsStore;
use crate::notifications::{Notification, NotificationCenter};
use crate::settings::Settings;
use crate::viewport::Viewport;
use parking_lot::{Mutex, RwLock};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{trace, warn};

/// Shared handles every plugin works against.
#[derive(Clone)]
pub struct PluginContext {
    pub ism: Arc<InteractionStateManager>,
    pub graph: Arc<Mutex<GraphStore>>,
    pub items: Arc<ItemsStore>,
    pub viewport: Arc<dyn Viewport>,
    pub notifications: Arc<Mutex<NotificationCenter>>,
    pub settings: Arc<RwLock<Settings>>,
    pub expansions: Arc<Mutex<ExpansionTree>>,
    tasks: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl PluginContext {
    pub fn new(
        ism: Arc<InteractionStateManager>,
        items: Arc<ItemsStore>,
        viewport: Arc<dyn Viewport>,
        settings: Settings,
    ) -> Self {
        let mut graph = GraphStore::new();
        graph.set_zoom_factor(settings.zoom_factor);
        graph.set_node_size_factor(settings.node_size_factor);
        graph.set_label_size_factor(settings.label_size_factor);

        Self {
            ism,
            graph: Arc::new(Mutex::new(graph)),
            items,
            viewport,
            notifications: Arc::new(Mutex::new(NotificationCenter::new())),
            settings: Arc::new(RwLock::new(settings)),
            expansions: Arc::new(Mutex::new(ExpansionTree::new())),
            tasks: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }

    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Run a commit in the background on the current tokio runtime.
    ///
    /// Outside a runtime the commit is dropped and the user is told so.
    pub fn spawn<F>(&self, label: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match Handle::try_current() {
            Ok(handle) => {
                trace!(task = label, "spawning plugin task");
                let mut tasks = self.tasks.lock();
                tasks.retain(|task| !task.is_finished());
                tasks.push(handle.spawn(future));
            }
            Err(_) => {
                warn!(task = label, "no async runtime, plugin task dropped");
                self.notify(
                    Notification::error("Action could not be completed")
                        .with_description(format!("{label}: no async runtime available")),
                );
            }
        }
    }

    /// Number of spawned tasks that have not finished yet.
    pub fn pending_tasks(&self) -> usize {
        self.tasks
            .lock()
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    /// Wait for every spawned task, including tasks spawned while waiting.
    pub async fn settle(&self) {
        loop {
            let pending = std::mem::take(&mut *self.tasks.lock());
            if pending.is_empty() {
                break;
            }
            for task in pending {
                if let Err(e) = task.await {
                    warn!("plugin task failed: {e}");
                }
            }
        }
    }
}

/// Callback registrations made by one plugin.
#[derive(Debug, Default)]
pub struct Subscriptions {
    entries: Vec<(InteractionState, CallbackId)>,
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` on `state` and remember the registration.
    pub fn on(&mut self, ism: &InteractionStateManager, state: InteractionState, callback: StateCallback) {
        let id = ism.on(state, callback);
        self.entries.push((state, id));
    }

    pub fn extend(&mut self, other: Subscriptions) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = InteractionState> + '_ {
        self.entries.iter().map(|(state, _)| *state)
    }

    /// Remove every registration from `ism`.
    pub fn unsubscribe(&mut self, ism: &InteractionStateManager) {
        for (state, id) in self.entries.drain(..) {
            ism.off(state, id);
        }
    }
}

/// A unit of canvas behaviour driven by interaction states.
pub trait InteractionPlugin: Send + Sync {
    fn name(&self) -> &'static str;

    /// Register callbacks. Callbacks hold their own clone of `ctx`.
    fn install(self: Arc<Self>, ctx: &PluginContext) -> Subscriptions;
}
