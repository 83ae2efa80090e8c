//! Record/playback controller for a single text field.
//!
//! The controller owns the capture buffer and the mode machine. It never
//! owns the field or the triggers; it reaches them through the `runtime`
//! traits and reacts to `UiEvent`s routed to it by `dispatch`.

use crate::capture::{log_repr, CaptureBuffer};
use crate::config::AppConfig;
use crate::fsm::ModeMachine;
use crate::logging::{JsonlLogger, LogEvent};
use crate::runtime::{IntervalTimer, StructuralWatcher, TextField, Trigger, UiEvent};
use crate::types::{
    CaptureSource, EventOrigin, InputEvent, Mode, MutationKind, MutationRecord, ObserveOptions,
    TimerId, TriggerId,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerSettings {
    pub playback_interval: Duration,
    pub enabled_opacity: f32,
    pub disabled_opacity: f32,
    pub structural_capture: bool,
    pub dedupe_across_sources: bool,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl ControllerSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            playback_interval: cfg.playback_interval(),
            enabled_opacity: cfg.presentation.enabled_opacity,
            disabled_opacity: cfg.presentation.disabled_opacity,
            structural_capture: cfg.capture.structural_watcher,
            dedupe_across_sources: cfg.capture.dedupe_across_sources,
        }
    }
}

pub struct ControllerHandles {
    pub field: Arc<dyn TextField>,
    pub record_trigger: Arc<dyn Trigger>,
    pub playback_trigger: Arc<dyn Trigger>,
    pub watcher: Arc<dyn StructuralWatcher>,
    pub timer: Arc<dyn IntervalTimer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    TriggerDisabled,
    HistoryNavigation,
    ProgrammaticOrigin,
    NotCapturing,
    CrossSourceDuplicate,
    NoChildListAdditions,
    StaleTimer,
    IllegalTransition,
}

impl IgnoreReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TriggerDisabled => "trigger_disabled",
            Self::HistoryNavigation => "history_navigation",
            Self::ProgrammaticOrigin => "programmatic_origin",
            Self::NotCapturing => "not_capturing",
            Self::CrossSourceDuplicate => "cross_source_duplicate",
            Self::NoChildListAdditions => "no_child_list_additions",
            Self::StaleTimer => "stale_timer",
            Self::IllegalTransition => "illegal_transition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlaybackCursor {
    timer: TimerId,
    position: usize,
}

/// Set the trigger non-activatable and dim it.
pub fn disable_button(trigger: &dyn Trigger, settings: &ControllerSettings) {
    trigger.set_enabled(false);
    trigger.set_opacity(settings.disabled_opacity);
}

pub fn enable_button(trigger: &dyn Trigger, settings: &ControllerSettings) {
    trigger.set_enabled(true);
    trigger.set_opacity(settings.enabled_opacity);
}

pub struct RecordingController {
    handles: ControllerHandles,
    settings: ControllerSettings,
    buffer: CaptureBuffer,
    machine: ModeMachine,
    playback: Option<PlaybackCursor>,
    logger: Option<JsonlLogger>,
}

impl RecordingController {
    pub fn new(handles: ControllerHandles, settings: ControllerSettings) -> Self {
        enable_button(handles.record_trigger.as_ref(), &settings);
        Self {
            buffer: CaptureBuffer::new(settings.dedupe_across_sources),
            handles,
            settings,
            machine: ModeMachine::default(),
            playback: None,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: JsonlLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn buffer(&self) -> &CaptureBuffer {
        &self.buffer
    }

    /// Index of the next value playback will assign, while playing.
    pub fn cursor(&self) -> Option<usize> {
        self.playback.map(|cursor| cursor.position)
    }

    pub fn playback_timer(&self) -> Option<TimerId> {
        self.playback.map(|cursor| cursor.timer)
    }

    /// Route one queued event to its handler. Activations of a trigger that
    /// is disabled at delivery time are dropped here.
    pub fn dispatch(&mut self, event: UiEvent) -> Dispatch {
        match event {
            UiEvent::Activate(id) => {
                if !self.trigger(id).is_enabled() {
                    self.log(
                        "debug",
                        "activation_ignored",
                        json!({"trigger": id, "mode": self.mode()}),
                    );
                    return Dispatch::Ignored(IgnoreReason::TriggerDisabled);
                }
                match id {
                    TriggerId::Record => self.handle_record_click(),
                    TriggerId::Playback => self.handle_playback_click(),
                }
            }
            UiEvent::Input(input) => self.handle_input(&input),
            UiEvent::Mutations(records) => self.handle_mutation(&records),
            UiEvent::Tick(id) => self.on_tick(id),
        }
    }

    pub fn handle_record_click(&mut self) -> Dispatch {
        if let Err(error) = self.machine.transition(Mode::Recording) {
            return self.reject_transition(error.to_string());
        }
        self.buffer.clear();
        disable_button(self.handles.record_trigger.as_ref(), &self.settings);
        enable_button(self.handles.playback_trigger.as_ref(), &self.settings);
        if self.settings.structural_capture {
            self.handles.watcher.observe(ObserveOptions::child_list());
        }
        self.log(
            "info",
            "record_started",
            json!({
                "session": self.machine.sessions,
                "structural_capture": self.settings.structural_capture,
            }),
        );
        Dispatch::Handled
    }

    pub fn handle_playback_click(&mut self) -> Dispatch {
        if let Err(error) = self.machine.transition(Mode::Playing) {
            return self.reject_transition(error.to_string());
        }
        disable_button(self.handles.record_trigger.as_ref(), &self.settings);
        disable_button(self.handles.playback_trigger.as_ref(), &self.settings);
        let timer = self
            .handles
            .timer
            .set_interval(self.settings.playback_interval);
        self.playback = Some(PlaybackCursor { timer, position: 0 });
        self.log(
            "info",
            "playback_started",
            json!({
                "values": self.buffer.len(),
                "interval_ms": self.settings.playback_interval.as_millis() as u64,
            }),
        );
        Dispatch::Handled
    }

    /// One playback timer tick: assign the next value, or finish.
    pub fn on_tick(&mut self, id: TimerId) -> Dispatch {
        let Some(cursor) = self.playback.filter(|cursor| cursor.timer == id) else {
            return Dispatch::Ignored(IgnoreReason::StaleTimer);
        };

        let Some(value) = self.buffer.get(cursor.position).map(str::to_string) else {
            return self.finish_playback(cursor);
        };

        self.handles.field.set_value(&value);
        self.handles.field.dispatch_input(InputEvent::synthetic(value.clone()));
        self.playback = Some(PlaybackCursor {
            position: cursor.position + 1,
            ..cursor
        });
        self.log(
            "debug",
            "playback_tick",
            json!({"cursor": cursor.position, "value": log_repr(&value)}),
        );
        Dispatch::Handled
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Dispatch {
        let reason = if event.kind.is_history() {
            Some(IgnoreReason::HistoryNavigation)
        } else if event.origin == EventOrigin::Programmatic {
            Some(IgnoreReason::ProgrammaticOrigin)
        } else if !self.machine.is_capturing() {
            Some(IgnoreReason::NotCapturing)
        } else {
            None
        };
        if let Some(reason) = reason {
            if reason != IgnoreReason::ProgrammaticOrigin {
                self.log(
                    "debug",
                    "capture_ignored",
                    json!({"source": CaptureSource::Input, "kind": event.kind, "reason": reason.as_str()}),
                );
            }
            return Dispatch::Ignored(reason);
        }
        self.capture(CaptureSource::Input, event.value.clone())
    }

    /// Capture the first added node of every child-list change in the batch.
    pub fn handle_mutation(&mut self, records: &[MutationRecord]) -> Dispatch {
        if !self.machine.is_capturing() {
            return Dispatch::Ignored(IgnoreReason::NotCapturing);
        }
        let mut outcome = Dispatch::Ignored(IgnoreReason::NoChildListAdditions);
        for record in records {
            if record.kind != MutationKind::ChildList {
                continue;
            }
            let Some(node) = record.added_nodes.first() else {
                continue;
            };
            let value = node.text.clone().unwrap_or_default();
            if self.capture(CaptureSource::Mutation, value) == Dispatch::Handled {
                outcome = Dispatch::Handled;
            } else if outcome != Dispatch::Handled {
                outcome = Dispatch::Ignored(IgnoreReason::CrossSourceDuplicate);
            }
        }
        outcome
    }

    fn capture(&mut self, source: CaptureSource, value: String) -> Dispatch {
        let repr = log_repr(&value);
        match self.buffer.push(source, value) {
            Some(seq) => {
                self.log(
                    "debug",
                    "value_captured",
                    json!({"seq": seq, "source": source, "value": repr}),
                );
                Dispatch::Handled
            }
            None => {
                self.log(
                    "debug",
                    "capture_ignored",
                    json!({"source": source, "reason": IgnoreReason::CrossSourceDuplicate.as_str()}),
                );
                Dispatch::Ignored(IgnoreReason::CrossSourceDuplicate)
            }
        }
    }

    fn finish_playback(&mut self, cursor: PlaybackCursor) -> Dispatch {
        self.handles.timer.clear_interval(cursor.timer);
        self.playback = None;
        if let Err(error) = self.machine.transition(Mode::Idle) {
            return self.reject_transition(error.to_string());
        }
        enable_button(self.handles.record_trigger.as_ref(), &self.settings);
        enable_button(self.handles.playback_trigger.as_ref(), &self.settings);
        self.log(
            "info",
            "playback_finished",
            json!({"values": cursor.position}),
        );
        Dispatch::Handled
    }

    fn reject_transition(&self, message: String) -> Dispatch {
        self.log("warn", "transition_rejected", json!({"error": message}));
        Dispatch::Ignored(IgnoreReason::IllegalTransition)
    }

    fn trigger(&self, id: TriggerId) -> &dyn Trigger {
        match id {
            TriggerId::Record => self.handles.record_trigger.as_ref(),
            TriggerId::Playback => self.handles.playback_trigger.as_ref(),
        }
    }

    fn log(&self, level: &str, event_type: &str, payload: Value) {
        if let Some(logger) = &self.logger {
            let _ = logger.append(&LogEvent {
                level,
                event_type,
                payload,
            });
        }
    }
}
