//! In-memory handles used by the terminal front end, the script runner and
//! the tests. Every handle is cheap to clone and shares its state.

use super::events::{EventSender, UiEvent};
use super::{IntervalTimer, StructuralWatcher, TextField, Trigger};
use crate::types::{InputEvent, InputKind, MutationRecord, ObserveOptions, TimerId, TriggerId};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// ── LocalField ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct FieldState {
    value: String,
    undo: Vec<String>,
    redo: Vec<String>,
    watchers: Vec<LocalWatcher>,
    assignments: Vec<String>,
    dispatched: Vec<InputEvent>,
}

/// Single-line text field with its own undo/redo history.
#[derive(Clone)]
pub struct LocalField {
    state: Arc<Mutex<FieldState>>,
    events: EventSender,
}

impl LocalField {
    pub fn new(initial: impl Into<String>, events: EventSender) -> Self {
        Self {
            state: Arc::new(Mutex::new(FieldState {
                value: initial.into(),
                ..FieldState::default()
            })),
            events,
        }
    }

    /// User edit whose resulting value is `value`.
    pub fn edit(&self, value: impl Into<String>, kind: InputKind) {
        let value = value.into();
        {
            let mut state = self.state.lock().expect("field lock");
            let previous = std::mem::replace(&mut state.value, value.clone());
            state.undo.push(previous);
            state.redo.clear();
        }
        self.events.send(UiEvent::Input(InputEvent::user(value, kind)));
    }

    pub fn insert_char(&self, c: char) {
        let mut next = self.value();
        next.push(c);
        self.edit(next, InputKind::InsertText);
    }

    pub fn delete_backward(&self) -> bool {
        let mut next = self.value();
        if next.pop().is_none() {
            return false;
        }
        self.edit(next, InputKind::DeleteContentBackward);
        true
    }

    pub fn undo(&self) -> bool {
        let value = {
            let mut state = self.state.lock().expect("field lock");
            let Some(previous) = state.undo.pop() else {
                return false;
            };
            let current = std::mem::replace(&mut state.value, previous.clone());
            state.redo.push(current);
            previous
        };
        self.events
            .send(UiEvent::Input(InputEvent::user(value, InputKind::HistoryUndo)));
        true
    }

    pub fn redo(&self) -> bool {
        let value = {
            let mut state = self.state.lock().expect("field lock");
            let Some(next) = state.redo.pop() else {
                return false;
            };
            let current = std::mem::replace(&mut state.value, next.clone());
            state.undo.push(current);
            next
        };
        self.events
            .send(UiEvent::Input(InputEvent::user(value, InputKind::HistoryRedo)));
        true
    }

    /// Replace the field's content through a structural insertion. Watchers
    /// see a child-list change. No value-change notification is raised.
    pub fn insert_content(&self, text: impl Into<String>) {
        let text = text.into();
        let watchers = {
            let mut state = self.state.lock().expect("field lock");
            state.value = text.clone();
            state.watchers.clone()
        };
        for watcher in watchers {
            watcher.notify(vec![MutationRecord::child_list_added(text.clone())]);
        }
    }

    /// Values assigned through `TextField::set_value`, oldest first.
    pub fn assignments(&self) -> Vec<String> {
        self.state.lock().expect("field lock").assignments.clone()
    }

    pub fn dispatched(&self) -> Vec<InputEvent> {
        self.state.lock().expect("field lock").dispatched.clone()
    }

    fn attach_watcher(&self, watcher: LocalWatcher) {
        self.state
            .lock()
            .expect("field lock")
            .watchers
            .push(watcher);
    }
}

impl TextField for LocalField {
    fn value(&self) -> String {
        self.state.lock().expect("field lock").value.clone()
    }

    fn set_value(&self, value: &str) {
        let mut state = self.state.lock().expect("field lock");
        state.value = value.to_string();
        state.assignments.push(value.to_string());
    }

    fn dispatch_input(&self, event: InputEvent) {
        self.state
            .lock()
            .expect("field lock")
            .dispatched
            .push(event.clone());
        self.events.send(UiEvent::Input(event));
    }
}

// ── LocalTrigger ──────────────────────────────────────────────────────────────

struct TriggerState {
    enabled: bool,
    opacity: f32,
}

#[derive(Clone)]
pub struct LocalTrigger {
    id: TriggerId,
    state: Arc<Mutex<TriggerState>>,
    events: EventSender,
}

impl LocalTrigger {
    pub fn new(id: TriggerId, enabled: bool, events: EventSender) -> Self {
        Self {
            id,
            state: Arc::new(Mutex::new(TriggerState {
                enabled,
                opacity: 1.0,
            })),
            events,
        }
    }

    /// Queue an activation. A disabled trigger swallows the click.
    pub fn click(&self) -> bool {
        if !self.is_enabled() {
            return false;
        }
        self.events.send(UiEvent::Activate(self.id));
        true
    }
}

impl Trigger for LocalTrigger {
    fn is_enabled(&self) -> bool {
        self.state.lock().expect("trigger lock").enabled
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().expect("trigger lock").enabled = enabled;
    }

    fn opacity(&self) -> f32 {
        self.state.lock().expect("trigger lock").opacity
    }

    fn set_opacity(&self, opacity: f32) {
        self.state.lock().expect("trigger lock").opacity = opacity;
    }
}

// ── LocalWatcher ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct WatcherState {
    options: Option<ObserveOptions>,
    observe_calls: u64,
}

#[derive(Clone)]
pub struct LocalWatcher {
    state: Arc<Mutex<WatcherState>>,
    events: EventSender,
}

impl LocalWatcher {
    /// Create a watcher that receives `field`'s structural changes. It stays
    /// silent until `observe` is called.
    pub fn scoped_to(field: &LocalField) -> Self {
        let watcher = Self {
            state: Arc::new(Mutex::new(WatcherState::default())),
            events: field.events.clone(),
        };
        field.attach_watcher(watcher.clone());
        watcher
    }

    pub fn observe_calls(&self) -> u64 {
        self.state.lock().expect("watcher lock").observe_calls
    }

    fn notify(&self, records: Vec<MutationRecord>) {
        let Some(options) = self.state.lock().expect("watcher lock").options else {
            return;
        };
        let batch = records
            .into_iter()
            .filter(|record| options.accepts(record.kind))
            .collect::<Vec<_>>();
        if !batch.is_empty() {
            self.events.send(UiEvent::Mutations(batch));
        }
    }
}

impl StructuralWatcher for LocalWatcher {
    fn observe(&self, options: ObserveOptions) {
        let mut state = self.state.lock().expect("watcher lock");
        state.options = Some(options);
        state.observe_calls += 1;
    }

    fn disconnect(&self) {
        self.state.lock().expect("watcher lock").options = None;
    }

    fn is_observing(&self) -> bool {
        self.state.lock().expect("watcher lock").options.is_some()
    }
}

// ── DeadlineTimer ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Interval {
    period: Duration,
    next_due: Instant,
}

struct TimerState {
    now: Instant,
    next_id: u64,
    intervals: BTreeMap<TimerId, Interval>,
}

/// Interval timer driven by an external clock. The host calls
/// `fire_next_due` and processes each tick before asking for the next one.
#[derive(Clone)]
pub struct DeadlineTimer {
    state: Arc<Mutex<TimerState>>,
    events: EventSender,
}

impl DeadlineTimer {
    pub fn new(now: Instant, events: EventSender) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState {
                now,
                next_id: 1,
                intervals: BTreeMap::new(),
            })),
            events,
        }
    }

    pub fn now(&self) -> Instant {
        self.state.lock().expect("timer lock").now
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state
            .lock()
            .expect("timer lock")
            .intervals
            .values()
            .map(|interval| interval.next_due)
            .min()
    }

    pub fn is_active(&self, id: TimerId) -> bool {
        self.state
            .lock()
            .expect("timer lock")
            .intervals
            .contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().expect("timer lock").intervals.len()
    }

    /// Queue one tick for the earliest interval due at or before `now` and
    /// reschedule it. Returns the id that fired.
    pub fn fire_next_due(&self, now: Instant) -> Option<TimerId> {
        let fired = {
            let mut state = self.state.lock().expect("timer lock");
            let (id, due) = state
                .intervals
                .iter()
                .filter(|(_, interval)| interval.next_due <= now)
                .min_by_key(|(_, interval)| interval.next_due)
                .map(|(id, interval)| (*id, interval.next_due))?;
            state.now = state.now.max(due);
            if let Some(interval) = state.intervals.get_mut(&id) {
                interval.next_due = due + interval.period;
            }
            id
        };
        self.events.send(UiEvent::Tick(fired));
        Some(fired)
    }

    /// Move the clock forward without firing anything.
    pub fn settle(&self, now: Instant) {
        let mut state = self.state.lock().expect("timer lock");
        state.now = state.now.max(now);
    }
}

impl IntervalTimer for DeadlineTimer {
    fn set_interval(&self, period: Duration) -> TimerId {
        let mut state = self.state.lock().expect("timer lock");
        let id = TimerId(state.next_id);
        state.next_id += 1;
        let next_due = state.now + period;
        state.intervals.insert(id, Interval { period, next_due });
        id
    }

    fn clear_interval(&self, id: TimerId) {
        self.state.lock().expect("timer lock").intervals.remove(&id);
    }
}
