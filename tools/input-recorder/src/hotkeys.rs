use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub key: &'static str,
    pub action: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Record,
    Playback,
    Undo,
    Redo,
    Insert,
    Quit,
}

/// Anything a key press can do in the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIntent {
    Action(HotkeyAction),
    Type(char),
    Backspace,
}

pub const CONTROL_BINDINGS: [HotkeyBinding; 6] = [
    HotkeyBinding {
        key: "F2",
        action: "record",
    },
    HotkeyBinding {
        key: "F3",
        action: "playback",
    },
    HotkeyBinding {
        key: "C-z",
        action: "undo",
    },
    HotkeyBinding {
        key: "C-y",
        action: "redo",
    },
    HotkeyBinding {
        key: "F4",
        action: "insert",
    },
    HotkeyBinding {
        key: "Esc",
        action: "quit",
    },
];

pub fn controls_legend() -> String {
    format_bindings("Keys: ", &CONTROL_BINDINGS)
}

pub fn action_for_key(code: KeyCode, modifiers: KeyModifiers) -> Option<HotkeyAction> {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match code {
        KeyCode::F(2) => Some(HotkeyAction::Record),
        KeyCode::F(3) => Some(HotkeyAction::Playback),
        KeyCode::F(4) => Some(HotkeyAction::Insert),
        KeyCode::Esc => Some(HotkeyAction::Quit),
        KeyCode::Char('z') if ctrl => Some(HotkeyAction::Undo),
        KeyCode::Char('y') if ctrl => Some(HotkeyAction::Redo),
        KeyCode::Char('c') if ctrl => Some(HotkeyAction::Quit),
        _ => None,
    }
}

pub fn intent_for_key(key: KeyEvent) -> Option<KeyIntent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if let Some(action) = action_for_key(key.code, key.modifiers) {
        return Some(KeyIntent::Action(action));
    }
    let plain = !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
    match key.code {
        KeyCode::Char(c) if plain => Some(KeyIntent::Type(c)),
        KeyCode::Backspace => Some(KeyIntent::Backspace),
        _ => None,
    }
}

fn format_bindings(prefix: &str, bindings: &[HotkeyBinding]) -> String {
    let parts = bindings
        .iter()
        .map(|binding| format!("{} {}", binding.key, binding.action))
        .collect::<Vec<_>>();
    format!("{prefix}{}", parts.join("  "))
}
