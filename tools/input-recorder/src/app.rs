use crate::config::AppConfig;
use crate::errors::RecorderError;
use crate::hotkeys::{intent_for_key, HotkeyAction, KeyIntent};
use crate::session::RecorderSession;
use crate::tui::{draw_recorder, RecorderView};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

const IDLE_POLL: Duration = Duration::from_millis(250);

fn term_err(error: io::Error) -> RecorderError {
    RecorderError::Terminal(error.to_string())
}

/// Run the interactive front end until the user quits.
pub fn run_interactive(cfg: &AppConfig) -> Result<(), RecorderError> {
    enable_raw_mode().map_err(term_err)?;
    let mut stdout = io::stdout();
    if let Err(error) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(term_err(error));
    }
    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend) {
        Ok(mut terminal) => {
            let result = event_loop(&mut terminal, cfg);
            let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
            let _ = terminal.show_cursor();
            result
        }
        Err(error) => {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            Err(term_err(error))
        }
    };
    disable_raw_mode().map_err(term_err)?;
    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    cfg: &AppConfig,
) -> Result<(), RecorderError> {
    let mut session = RecorderSession::new(cfg, Instant::now());
    loop {
        session.advance_to(Instant::now());
        let view = RecorderView::from_session(&session);
        terminal
            .draw(|frame| draw_recorder(frame, &view))
            .map_err(term_err)?;

        let timeout = session
            .timer
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(IDLE_POLL)
            .min(IDLE_POLL);
        if !event::poll(timeout).map_err(term_err)? {
            continue;
        }
        let Event::Key(key) = event::read().map_err(term_err)? else {
            continue;
        };
        let Some(intent) = intent_for_key(key) else {
            continue;
        };
        if apply_intent(&mut session, intent, Instant::now()) == Flow::Quit {
            return Ok(());
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Translate one key intent, pressed at `now`, into field edits or trigger
/// clicks, then deliver the resulting events. The session clock is brought
/// up to `now` first so a playback interval starts at the key press.
pub fn apply_intent(session: &mut RecorderSession, intent: KeyIntent, now: Instant) -> Flow {
    session.advance_to(now);
    match intent {
        KeyIntent::Action(HotkeyAction::Quit) => return Flow::Quit,
        KeyIntent::Action(HotkeyAction::Record) => {
            session.click_record();
        }
        KeyIntent::Action(HotkeyAction::Playback) => {
            session.click_playback();
        }
        KeyIntent::Action(HotkeyAction::Undo) => {
            session.field.undo();
        }
        KeyIntent::Action(HotkeyAction::Redo) => {
            session.field.redo();
        }
        KeyIntent::Action(HotkeyAction::Insert) => session.insert_configured_text(),
        KeyIntent::Type(c) => session.field.insert_char(c),
        KeyIntent::Backspace => {
            session.field.delete_backward();
        }
    }
    session.pump();
    Flow::Continue
}
