use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use input_recorder::config::AppConfig;
use input_recorder::hotkeys::{
    action_for_key, controls_legend, intent_for_key, HotkeyAction, KeyIntent, CONTROL_BINDINGS,
};
use input_recorder::tui::{render_recorder, RecorderView};
use input_recorder::RecorderSession;
use std::time::Instant;

fn parse_binding(key: &str) -> (KeyCode, KeyModifiers) {
    if let Some(rest) = key.strip_prefix("C-") {
        let c = rest.chars().next().expect("ctrl binding char");
        return (KeyCode::Char(c), KeyModifiers::CONTROL);
    }
    if let Some(n) = key.strip_prefix('F') {
        return (
            KeyCode::F(n.parse().expect("function key number")),
            KeyModifiers::NONE,
        );
    }
    match key {
        "Esc" => (KeyCode::Esc, KeyModifiers::NONE),
        other => panic!("unexpected binding `{other}`"),
    }
}

#[test]
fn every_advertised_binding_has_behavior() {
    let legend = controls_legend();
    for binding in CONTROL_BINDINGS {
        assert!(
            legend.contains(&format!("{} {}", binding.key, binding.action)),
            "legend is missing `{}`",
            binding.key
        );
        let (code, modifiers) = parse_binding(binding.key);
        assert!(
            action_for_key(code, modifiers).is_some(),
            "advertised hotkey `{}` has no application behavior",
            binding.key
        );
    }
}

#[test]
fn bindings_resolve_to_expected_actions() {
    let cases = [
        (KeyCode::F(2), KeyModifiers::NONE, HotkeyAction::Record),
        (KeyCode::F(3), KeyModifiers::NONE, HotkeyAction::Playback),
        (KeyCode::F(4), KeyModifiers::NONE, HotkeyAction::Insert),
        (KeyCode::Char('z'), KeyModifiers::CONTROL, HotkeyAction::Undo),
        (KeyCode::Char('y'), KeyModifiers::CONTROL, HotkeyAction::Redo),
        (KeyCode::Char('c'), KeyModifiers::CONTROL, HotkeyAction::Quit),
        (KeyCode::Esc, KeyModifiers::NONE, HotkeyAction::Quit),
    ];
    for (code, modifiers, expected) in cases {
        assert_eq!(action_for_key(code, modifiers), Some(expected), "{code:?}");
    }
}

#[test]
fn plain_characters_type_and_modified_ones_do_not() {
    let plain = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::NONE);
    assert_eq!(intent_for_key(plain), Some(KeyIntent::Type('z')));

    let shifted = KeyEvent::new(KeyCode::Char('Z'), KeyModifiers::SHIFT);
    assert_eq!(intent_for_key(shifted), Some(KeyIntent::Type('Z')));

    let alt = KeyEvent::new(KeyCode::Char('z'), KeyModifiers::ALT);
    assert_eq!(intent_for_key(alt), None);

    let backspace = KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE);
    assert_eq!(intent_for_key(backspace), Some(KeyIntent::Backspace));

    let mut release = KeyEvent::new(KeyCode::F(2), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    assert_eq!(intent_for_key(release), None);
}

#[test]
fn rendered_session_tracks_recording_state() {
    let mut session = RecorderSession::new(&AppConfig::default(), Instant::now());
    let idle = render_recorder(&RecorderView::from_session(&session), 90, 14);
    assert!(idle.contains("[idle]"));
    assert!(idle.contains("Buffer (0)"));

    session.click_record();
    session.pump();
    session.field.insert_char('h');
    session.field.insert_char('i');
    session.pump();

    let view = RecorderView::from_session(&session);
    assert!(!view.record.enabled);
    assert!(view.playback.enabled);
    assert_eq!(view.cursor, None);

    let frame = render_recorder(&view, 90, 14);
    assert!(frame.contains("[recording]"));
    assert!(frame.contains("Buffer (2)"));
    assert!(frame.contains("\"hi\""));
    assert!(frame.contains("mode idle -> recording"));
    assert!(frame.contains("Keys: F2 record"));
}

#[test]
fn rendered_playback_highlights_the_cursor() {
    let start = Instant::now();
    let mut session = RecorderSession::new(&AppConfig::default(), start);
    session.click_record();
    session.pump();
    for c in "abc".chars() {
        session.field.insert_char(c);
    }
    session.click_playback();
    session.pump();
    session.advance_to(start + std::time::Duration::from_millis(200));

    let view = RecorderView::from_session(&session);
    assert_eq!(view.cursor, Some(1));
    let frame = render_recorder(&view, 90, 14);
    assert!(frame.contains("[playing]"));
    assert!(frame.contains("*   0 \"a\""));
    assert!(frame.contains(">   1 \"ab\""));
}
