//! Headless driver: feeds a line-oriented script of user actions through a
//! `RecorderSession` on a virtual clock and reports what happened.

use crate::config::AppConfig;
use crate::errors::RecorderError;
use crate::logging::structured_fallback_line;
use crate::session::{PumpReport, RecorderSession};
use crate::types::{InputKind, Mode};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Record,
    Play,
    Type(String),
    Input(String),
    Backspace,
    Undo,
    Redo,
    Insert(String),
    Wait(Duration),
}

pub fn parse_script(source: &str) -> Result<Vec<ScriptStep>, RecorderError> {
    let mut steps = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, Some(rest)),
            None => (line, None),
        };
        let step = match (command, rest) {
            ("record", None) => ScriptStep::Record,
            ("play", None) => ScriptStep::Play,
            ("backspace", None) => ScriptStep::Backspace,
            ("undo", None) => ScriptStep::Undo,
            ("redo", None) => ScriptStep::Redo,
            ("type", Some(text)) => ScriptStep::Type(text.to_string()),
            ("input", rest) => ScriptStep::Input(rest.unwrap_or_default().to_string()),
            ("insert", Some(text)) => ScriptStep::Insert(text.to_string()),
            ("wait", Some(ms)) => {
                let ms = ms.trim().parse::<u64>().map_err(|e| {
                    RecorderError::Script(format!("line {}: invalid wait `{ms}`: {e}", idx + 1))
                })?;
                ScriptStep::Wait(Duration::from_millis(ms))
            }
            _ => {
                return Err(RecorderError::Script(format!(
                    "line {}: unrecognised command `{line}`",
                    idx + 1
                )))
            }
        };
        steps.push(step);
    }
    Ok(steps)
}

/// Run `steps` against a fresh session and return the output lines.
pub fn run_script(cfg: &AppConfig, steps: &[ScriptStep]) -> Vec<String> {
    let start = Instant::now();
    let mut clock = start;
    let mut session = RecorderSession::new(cfg, start);
    let mut lines = Vec::new();

    for step in steps {
        match step {
            ScriptStep::Record => {
                if !session.click_record() {
                    lines.push(line(&session, "ignored", "record trigger disabled"));
                }
            }
            ScriptStep::Play => {
                if !session.click_playback() {
                    lines.push(line(&session, "ignored", "playback trigger disabled"));
                }
            }
            ScriptStep::Type(text) => {
                for c in text.chars() {
                    session.field.insert_char(c);
                }
            }
            ScriptStep::Input(value) => session.field.edit(value.clone(), InputKind::InsertText),
            ScriptStep::Backspace => {
                session.field.delete_backward();
            }
            ScriptStep::Undo => {
                session.field.undo();
            }
            ScriptStep::Redo => {
                session.field.redo();
            }
            ScriptStep::Insert(text) => session.field.insert_content(text.clone()),
            ScriptStep::Wait(duration) => {
                clock += *duration;
                let report = session.advance_to(clock);
                report_lines(&session, &report, &mut lines);
                continue;
            }
        }
        let report = session.pump();
        report_lines(&session, &report, &mut lines);
    }

    let report = session.finish_playback();
    report_lines(&session, &report, &mut lines);
    lines.push(line(
        &session,
        "buffer",
        &format!("{:?}", session.buffer_values()),
    ));
    lines
}

fn report_lines(session: &RecorderSession, report: &PumpReport, lines: &mut Vec<String>) {
    // Transitions and ticks are reported in a fixed order per pump: entering
    // playback, then the values played, then leaving it.
    for (from, to) in &report.transitions {
        if *to == Mode::Idle {
            continue;
        }
        lines.push(structured_fallback_line(
            to.as_str(),
            "transition",
            &format!("{} -> {}", from.as_str(), to.as_str()),
        ));
    }
    for value in &report.played {
        lines.push(structured_fallback_line(Mode::Playing.as_str(), "tick", value));
    }
    for (from, to) in &report.transitions {
        if *to == Mode::Idle {
            lines.push(structured_fallback_line(
                session.mode().as_str(),
                "transition",
                &format!("{} -> {}", from.as_str(), to.as_str()),
            ));
        }
    }
}

fn line(session: &RecorderSession, event: &str, message: &str) -> String {
    structured_fallback_line(session.mode().as_str(), event, message)
}
