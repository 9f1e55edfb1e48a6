//! Interaction state manager.
//!
//! One manager per canvas arbitrates the whole low-level event stream so that
//! exactly one interpretation of a gesture wins. Plugins register callback
//! triples per state with [`InteractionStateManager::on`]:
//!
//! - `before` runs at most once per episode (entry until the next reset)
//! - `main` runs on every dispatch while the state is current
//! - `after` runs once, right before the state is left
//!
//! Callbacks are invoked with no internal lock held, so a callback may call
//! back into the manager (most commonly [`reset_state`](InteractionStateManager::reset_state)).

use super::event::{CanvasEvent, EventTarget, InteractionEvent, MouseButton};
use super::state::{InteractionMode, InteractionState};
use crate::constants::TOOLTIP_DELAY_MS;
use crate::types::NodeId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::trace;

pub type EventCallback = Arc<dyn Fn(&InteractionEvent) + Send + Sync>;
pub type AfterCallback = Arc<dyn Fn() + Send + Sync>;

/// A `{before, main, after}` triple registered on one state.
#[derive(Clone, Default)]
pub struct StateCallback {
    pub before: Option<EventCallback>,
    pub main: Option<EventCallback>,
    pub after: Option<AfterCallback>,
}

impl StateCallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before(mut self, f: impl Fn(&InteractionEvent) + Send + Sync + 'static) -> Self {
        self.before = Some(Arc::new(f));
        self
    }

    pub fn main(mut self, f: impl Fn(&InteractionEvent) + Send + Sync + 'static) -> Self {
        self.main = Some(Arc::new(f));
        self
    }

    pub fn after(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.after = Some(Arc::new(f));
        self
    }
}

/// Handle returned by [`InteractionStateManager::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

struct Registration {
    id: CallbackId,
    callback: StateCallback,
    before_executed: bool,
    after_executed: bool,
}

#[derive(Debug, Clone)]
struct PendingTooltip {
    deadline: Instant,
    event: InteractionEvent,
}

struct Inner {
    current: InteractionState,
    mode: InteractionMode,
    registrations: HashMap<InteractionState, Vec<Registration>>,
    next_id: u64,
    /// Node pressed by the current gesture, forwarded to drag callbacks
    down_node: Option<NodeId>,
    last_relation_event: Option<InteractionEvent>,
    node_tooltip: Option<PendingTooltip>,
    relation_tooltip: Option<PendingTooltip>,
}

pub struct InteractionStateManager {
    inner: Mutex<Inner>,
    tooltip_delay: Mutex<Duration>,
}

impl Default for InteractionStateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionStateManager {
    pub fn new() -> Self {
        Self::with_tooltip_delay(Duration::from_millis(TOOLTIP_DELAY_MS))
    }

    pub fn with_tooltip_delay(tooltip_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: InteractionState::Idle,
                mode: InteractionMode::Default,
                registrations: HashMap::new(),
                next_id: 0,
                down_node: None,
                last_relation_event: None,
                node_tooltip: None,
                relation_tooltip: None,
            }),
            tooltip_delay: Mutex::new(tooltip_delay),
        }
    }

    pub fn current_state(&self) -> InteractionState {
        self.inner.lock().current
    }

    pub fn mode(&self) -> InteractionMode {
        self.inner.lock().mode
    }

    pub fn set_mode(&self, mode: InteractionMode) {
        self.inner.lock().mode = mode;
    }

    pub fn tooltip_delay(&self) -> Duration {
        *self.tooltip_delay.lock()
    }

    pub fn set_tooltip_delay(&self, delay: Duration) {
        *self.tooltip_delay.lock() = delay;
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Register a callback triple on `state`. Callbacks of one state run in
    /// registration order.
    pub fn on(&self, state: InteractionState, callback: StateCallback) -> CallbackId {
        let mut inner = self.inner.lock();
        let id = CallbackId(inner.next_id);
        inner.next_id += 1;
        inner.registrations.entry(state).or_default().push(Registration {
            id,
            callback,
            before_executed: false,
            after_executed: false,
        });
        id
    }

    /// Remove a registration. Returns false if it was not registered on `state`.
    pub fn off(&self, state: InteractionState, id: CallbackId) -> bool {
        let mut inner = self.inner.lock();
        let Some(registrations) = inner.registrations.get_mut(&state) else {
            return false;
        };
        let before = registrations.len();
        registrations.retain(|r| r.id != id);
        registrations.len() != before
    }

    pub fn callback_count(&self, state: InteractionState) -> usize {
        self.inner
            .lock()
            .registrations
            .get(&state)
            .map_or(0, Vec::len)
    }

    // ------------------------------------------------------------------
    // Core state machine
    // ------------------------------------------------------------------

    /// Move to `target` if it is a legal successor of the current state.
    ///
    /// Illegal transitions are ignored. Returns whether the state changed.
    pub fn transition_to(&self, target: InteractionState) -> bool {
        let afters = {
            let mut inner = self.inner.lock();
            let current = inner.current;
            if !current.can_transition_to(target) {
                trace!(from = ?current, to = ?target, "transition ignored");
                return false;
            }
            let afters = take_pending_afters(&mut inner, current);
            inner.current = target;
            trace!(from = ?current, to = ?target, "transition");
            afters
        };

        for after in afters {
            after();
        }
        true
    }

    /// Run the callbacks of `state` if it is current, or unconditionally for
    /// direct states.
    pub fn execute_state_callbacks(&self, state: InteractionState, event: &InteractionEvent) {
        let (befores, mains) = {
            let mut inner = self.inner.lock();
            if !state.is_direct() && inner.current != state {
                return;
            }
            let Some(registrations) = inner.registrations.get_mut(&state) else {
                return;
            };

            let mut befores = Vec::new();
            let mut mains = Vec::new();
            for registration in registrations.iter_mut() {
                if !registration.before_executed {
                    if let Some(before) = &registration.callback.before {
                        registration.before_executed = true;
                        befores.push(before.clone());
                    }
                }
                if let Some(main) = &registration.callback.main {
                    mains.push(main.clone());
                }
            }
            (befores, mains)
        };

        for before in befores {
            before(event);
        }
        for main in mains {
            main(event);
        }
    }

    /// Clear every episode flag and return to idle, whatever the current state.
    ///
    /// Pending `after` callbacks of the state being left still run.
    pub fn reset_state(&self) {
        let afters = {
            let mut inner = self.inner.lock();
            for registrations in inner.registrations.values_mut() {
                for registration in registrations.iter_mut() {
                    registration.before_executed = false;
                    registration.after_executed = false;
                }
            }

            let current = inner.current;
            if current == InteractionState::Idle {
                return;
            }
            let afters = take_pending_afters(&mut inner, current);
            inner.current = InteractionState::Idle;
            trace!(from = ?current, "reset to idle");
            afters
        };

        for after in afters {
            after();
        }
    }

    // ------------------------------------------------------------------
    // Event translation
    // ------------------------------------------------------------------

    /// Translate one rendering-surface event into transitions and dispatches.
    pub fn handle_event(&self, event: CanvasEvent, now: Instant) {
        use InteractionState as S;

        match event {
            CanvasEvent::DownNode {
                node_id,
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Right {
                    return;
                }
                self.inner.lock().down_node = Some(node_id.clone());
                let payload = InteractionEvent::node(node_id, position).with_modifiers(modifiers);
                self.transition_to(S::NodeDown);
                self.execute_state_callbacks(S::NodeDown, &payload);
                if modifiers.ctrl {
                    self.transition_to(S::NodeAutoConnect);
                }
            }
            CanvasEvent::EnterNode { node_id, position } => {
                // The renderer may report entering a node before leaving the
                // relation under the cursor; emit the relation leave first.
                if self.current_state() == S::RelationEnter {
                    let last = self.inner.lock().last_relation_event.clone();
                    if let Some(last) = last {
                        self.transition_to(S::RelationLeave);
                        self.execute_state_callbacks(S::RelationLeave, &last);
                    }
                }

                let payload = InteractionEvent::node(node_id, position);
                self.transition_to(S::NodeEnter);
                self.execute_state_callbacks(S::NodeEnter, &payload);

                let deadline = now + self.tooltip_delay();
                self.inner.lock().node_tooltip = Some(PendingTooltip {
                    deadline,
                    event: payload,
                });
            }
            CanvasEvent::RightClickNode { node_id, position } => {
                let payload = InteractionEvent::node(node_id, position);
                self.transition_to(S::NodeContextMenu);
                self.execute_state_callbacks(S::NodeContextMenu, &payload);
            }
            CanvasEvent::LeaveNode { node_id, position } => {
                self.inner.lock().node_tooltip = None;
                let payload = InteractionEvent::node(node_id, position);
                self.transition_to(S::NodeLeave);
                self.execute_state_callbacks(S::NodeLeave, &payload);
                if self.current_state() == S::NodeLeave {
                    self.reset_state();
                }
            }
            CanvasEvent::ClickNode { node_id, position } => {
                let payload = InteractionEvent::node(node_id, position);
                self.transition_to(S::NodeClick);
                self.execute_state_callbacks(S::NodeClick, &payload);
            }
            CanvasEvent::EnterRelation {
                relation_id,
                position,
            } => {
                let payload = InteractionEvent::relation(relation_id, position);
                self.inner.lock().last_relation_event = Some(payload.clone());
                self.transition_to(S::RelationEnter);
                self.execute_state_callbacks(S::RelationEnter, &payload);

                let deadline = now + self.tooltip_delay();
                self.inner.lock().relation_tooltip = Some(PendingTooltip {
                    deadline,
                    event: payload,
                });
            }
            CanvasEvent::LeaveRelation {
                relation_id,
                position,
            } => {
                self.inner.lock().relation_tooltip = None;
                let payload = InteractionEvent::relation(relation_id, position);
                self.transition_to(S::RelationLeave);
                self.execute_state_callbacks(S::RelationLeave, &payload);
                if self.current_state() == S::RelationLeave {
                    self.reset_state();
                }
            }
            CanvasEvent::ClickRelation {
                relation_id,
                position,
            } => {
                let payload = InteractionEvent::relation(relation_id, position);
                self.transition_to(S::RelationClick);
                self.execute_state_callbacks(S::RelationClick, &payload);
            }
            CanvasEvent::RightClickRelation {
                relation_id,
                position,
            } => {
                let payload = InteractionEvent::relation(relation_id, position);
                self.transition_to(S::RelationContextMenu);
                self.execute_state_callbacks(S::RelationContextMenu, &payload);
            }
            CanvasEvent::DownStage {
                position,
                button,
                modifiers,
            } => {
                if button == MouseButton::Right {
                    return;
                }
                self.transition_to(S::StageDown);
                if modifiers.shift {
                    // The selection anchors at the press point
                    let payload = InteractionEvent::stage(position).with_modifiers(modifiers);
                    self.transition_to(S::NodeSelection);
                    self.execute_state_callbacks(S::NodeSelection, &payload);
                } else if modifiers.ctrl {
                    self.transition_to(S::NodeQuick);
                }
            }
            CanvasEvent::UpStage {
                position,
                modifiers,
            } => {
                let payload = InteractionEvent::stage(position).with_modifiers(modifiers);
                self.execute_state_callbacks(S::NodeQuick, &payload);
            }
            CanvasEvent::RightClickStage { position } => {
                let payload = InteractionEvent::stage(position);
                self.transition_to(S::StageContextMenu);
                self.execute_state_callbacks(S::StageContextMenu, &payload);
            }
            CanvasEvent::MouseMove {
                position,
                modifiers,
            } => self.handle_mouse_move(
                InteractionEvent::at(position).with_modifiers(modifiers),
            ),
            CanvasEvent::MouseUp {
                position,
                modifiers,
            } => {
                let payload = InteractionEvent::at(position).with_modifiers(modifiers);
                self.execute_state_callbacks(S::MouseUp, &payload);
                if self.current_state().resets_on_mouse_up() {
                    self.reset_state();
                }
            }
            CanvasEvent::Wheel {
                position,
                delta,
                modifiers,
            } => {
                if !modifiers.any() || delta == 0.0 {
                    return;
                }
                let payload = InteractionEvent::at(position)
                    .with_modifiers(modifiers)
                    .with_delta(delta);
                if modifiers.ctrl {
                    self.transition_to(S::ZoomFactor);
                    self.execute_state_callbacks(S::ZoomFactor, &payload);
                } else {
                    self.transition_to(S::Scale);
                    self.execute_state_callbacks(S::Scale, &payload);
                }
            }
            CanvasEvent::Resize { width, height } => {
                let payload = InteractionEvent {
                    dimensions: Some((width, height)),
                    ..Default::default()
                };
                self.execute_state_callbacks(S::Resize, &payload);
            }
            CanvasEvent::CameraUpdated(camera) => {
                let payload = InteractionEvent {
                    camera: Some(camera),
                    ..Default::default()
                };
                self.execute_state_callbacks(S::CameraUpdate, &payload);
            }
        }
    }

    fn handle_mouse_move(&self, event: InteractionEvent) {
        crate::profile_scope!("ism.mouse_move");
        use InteractionState as S;

        let down_node = {
            let mut inner = self.inner.lock();
            if inner.current == S::RelationEnter {
                if let Some(last) = inner.last_relation_event.as_mut() {
                    last.position = event.position;
                }
            }
            inner.down_node.clone()
        };

        if self.current_state() == S::NodeDown {
            self.transition_to(S::NodeDrag);
        }

        self.execute_state_callbacks(S::NodeSelection, &event);
        self.execute_state_callbacks(S::NodeAutoConnect, &event);

        let drag_event = InteractionEvent {
            target: down_node.map_or(EventTarget::None, EventTarget::Node),
            ..event
        };
        self.execute_state_callbacks(S::NodeDrag, &drag_event);
    }

    // ------------------------------------------------------------------
    // Tooltip timers
    // ------------------------------------------------------------------

    /// Earliest pending tooltip deadline, for hosts that schedule wakeups.
    pub fn next_deadline(&self) -> Option<Instant> {
        let inner = self.inner.lock();
        [&inner.node_tooltip, &inner.relation_tooltip]
            .into_iter()
            .flatten()
            .map(|pending| pending.deadline)
            .min()
    }

    /// Fire dwell tooltips whose deadline has passed. Returns how many fired.
    pub fn tick(&self, now: Instant) -> usize {
        let (node, relation) = {
            let mut inner = self.inner.lock();
            let node = take_due(&mut inner.node_tooltip, now);
            let relation = take_due(&mut inner.relation_tooltip, now);
            (node, relation)
        };

        let mut fired = 0;
        if let Some(event) = node {
            self.transition_to(InteractionState::NodeTooltip);
            self.execute_state_callbacks(InteractionState::NodeTooltip, &event);
            fired += 1;
        }
        if let Some(event) = relation {
            self.transition_to(InteractionState::RelationTooltip);
            self.execute_state_callbacks(InteractionState::RelationTooltip, &event);
            fired += 1;
        }
        fired
    }
}

fn take_due(slot: &mut Option<PendingTooltip>, now: Instant) -> Option<InteractionEvent> {
    if slot.as_ref().is_some_and(|pending| pending.deadline <= now) {
        slot.take().map(|pending| pending.event)
    } else {
        None
    }
}

fn take_pending_afters(inner: &mut Inner, state: InteractionState) -> Vec<AfterCallback> {
    let Some(registrations) = inner.registrations.get_mut(&state) else {
        return Vec::new();
    };
    registrations
        .iter_mut()
        .filter(|r| !r.after_executed)
        .filter_map(|r| {
            let after = r.callback.after.clone()?;
            r.after_executed = true;
            Some(after)
        })
        .collect()
}
