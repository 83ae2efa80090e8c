use crate::config::AppConfig;
use crate::controller::{ControllerHandles, ControllerSettings, Dispatch, RecordingController};
use crate::logging::JsonlLogger;
use crate::runtime::{
    event_queue, DeadlineTimer, EventQueue, LocalField, LocalTrigger, LocalWatcher, TextField,
    Trigger, UiEvent,
};
use crate::types::{EventOrigin, InputKind, Mode, TriggerId};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

pub const ACTIVITY_CAPACITY: usize = 64;

/// Host for one controller: owns the in-memory handles and the event queue,
/// and delivers queued events one at a time.
pub struct RecorderSession {
    pub field: LocalField,
    pub record_trigger: LocalTrigger,
    pub playback_trigger: LocalTrigger,
    pub watcher: LocalWatcher,
    pub timer: DeadlineTimer,
    controller: RecordingController,
    queue: EventQueue,
    activity: VecDeque<String>,
    insert_text: String,
}

/// What changed while pumping the queue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PumpReport {
    pub transitions: Vec<(Mode, Mode)>,
    /// Values assigned by playback ticks, in order.
    pub played: Vec<String>,
}

impl PumpReport {
    fn merge(&mut self, other: PumpReport) {
        self.transitions.extend(other.transitions);
        self.played.extend(other.played);
    }
}

impl RecorderSession {
    pub fn new(cfg: &AppConfig, now: Instant) -> Self {
        let (tx, queue) = event_queue();
        let field = LocalField::new(cfg.field.initial_value.clone(), tx.clone());
        let record_trigger = LocalTrigger::new(TriggerId::Record, true, tx.clone());
        let playback_trigger = LocalTrigger::new(
            TriggerId::Playback,
            cfg.presentation.playback_enabled_initially,
            tx.clone(),
        );
        if !cfg.presentation.playback_enabled_initially {
            playback_trigger.set_opacity(cfg.presentation.disabled_opacity);
        }
        let watcher = LocalWatcher::scoped_to(&field);
        let timer = DeadlineTimer::new(now, tx);

        let mut controller = RecordingController::new(
            ControllerHandles {
                field: Arc::new(field.clone()),
                record_trigger: Arc::new(record_trigger.clone()),
                playback_trigger: Arc::new(playback_trigger.clone()),
                watcher: Arc::new(watcher.clone()),
                timer: Arc::new(timer.clone()),
            },
            ControllerSettings::from_config(cfg),
        );
        if let Some(path) = &cfg.logging.path {
            let mut logger = JsonlLogger::new(path);
            logger.max_payload_bytes = cfg.logging.max_payload_bytes;
            controller = controller.with_logger(logger);
        }

        Self {
            field,
            record_trigger,
            playback_trigger,
            watcher,
            timer,
            controller,
            queue,
            activity: VecDeque::new(),
            insert_text: cfg.field.insert_text.clone(),
        }
    }

    pub fn controller(&self) -> &RecordingController {
        &self.controller
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode()
    }

    pub fn buffer_values(&self) -> Vec<String> {
        self.controller.buffer().values()
    }

    pub fn activity(&self) -> impl Iterator<Item = &str> {
        self.activity.iter().map(String::as_str)
    }

    pub fn click_record(&self) -> bool {
        self.record_trigger.click()
    }

    pub fn click_playback(&self) -> bool {
        self.playback_trigger.click()
    }

    /// Programmatic content insertion with the configured text.
    pub fn insert_configured_text(&self) {
        self.field.insert_content(self.insert_text.clone());
    }

    /// Deliver every queued event, including events raised while handling.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        while let Some(event) = self.queue.try_next() {
            let before = self.controller.mode();
            let observed = event.clone();
            let outcome = self.controller.dispatch(event);
            let after = self.controller.mode();
            if before != after {
                report.transitions.push((before, after));
                self.note(format!("mode {} -> {}", before.as_str(), after.as_str()));
            }
            self.observe_bubbled(&observed, outcome, &mut report);
        }
        report
    }

    /// Fire every timer tick due up to `now`, pumping after each so ticks and
    /// the notifications they raise stay interleaved.
    pub fn advance_to(&mut self, now: Instant) -> PumpReport {
        let mut report = self.pump();
        while self.timer.fire_next_due(now).is_some() {
            report.merge(self.pump());
        }
        self.timer.settle(now);
        report
    }

    /// Drive a running playback to completion from the timer's own clock.
    pub fn finish_playback(&mut self) -> PumpReport {
        let mut report = self.pump();
        while self.controller.mode() == Mode::Playing {
            let Some(deadline) = self.timer.next_deadline() else {
                break;
            };
            report.merge(self.advance_to(deadline));
        }
        report
    }

    /// Stand-in for ancestor listeners: bubbling input notifications are
    /// appended to the activity log.
    fn observe_bubbled(&mut self, event: &UiEvent, outcome: Dispatch, report: &mut PumpReport) {
        let UiEvent::Input(input) = event else {
            return;
        };
        if input.origin == EventOrigin::Programmatic {
            report.played.push(input.value.clone());
        }
        if !input.bubbles {
            return;
        }
        let origin = match input.origin {
            EventOrigin::User => "user",
            EventOrigin::Programmatic => "playback",
        };
        let kind = match input.kind {
            InputKind::Unspecified => "input",
            kind => kind.as_str(),
        };
        let status = match outcome {
            Dispatch::Handled => "recorded".to_string(),
            Dispatch::Ignored(reason) => reason.as_str().to_string(),
        };
        self.note(format!("{origin} {kind} {:?} [{status}]", input.value));
    }

    fn note(&mut self, line: String) {
        if self.activity.len() == ACTIVITY_CAPACITY {
            self.activity.pop_front();
        }
        self.activity.push_back(line);
    }

    pub fn field_value(&self) -> String {
        self.field.value()
    }

    pub fn triggers_enabled(&self) -> (bool, bool) {
        (
            self.record_trigger.is_enabled(),
            self.playback_trigger.is_enabled(),
        )
    }
}
