use crate::hotkeys::controls_legend;
use crate::session::RecorderSession;
use crate::types::Mode;
use ratatui::backend::TestBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};

#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub label: String,
    pub enabled: bool,
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecorderView {
    pub mode: Mode,
    pub field_value: String,
    pub record: ButtonView,
    pub playback: ButtonView,
    pub buffer: Vec<String>,
    pub cursor: Option<usize>,
    pub activity: Vec<String>,
}

impl RecorderView {
    pub fn from_session(session: &RecorderSession) -> Self {
        use crate::runtime::{TextField, Trigger};
        let controller = session.controller();
        Self {
            mode: session.mode(),
            field_value: session.field.value(),
            record: ButtonView {
                label: "Record".to_string(),
                enabled: session.record_trigger.is_enabled(),
                opacity: session.record_trigger.opacity(),
            },
            playback: ButtonView {
                label: "Playback".to_string(),
                enabled: session.playback_trigger.is_enabled(),
                opacity: session.playback_trigger.opacity(),
            },
            buffer: controller.buffer().values(),
            cursor: controller.cursor(),
            activity: session.activity().map(str::to_string).collect(),
        }
    }
}

fn button_style(button: &ButtonView) -> Style {
    if button.enabled && button.opacity >= 1.0 {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM)
    }
}

fn mode_style(mode: Mode) -> Style {
    match mode {
        Mode::Idle => Style::default().fg(Color::Gray),
        Mode::Recording => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Mode::Playing => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    }
}

pub fn draw_recorder(frame: &mut Frame<'_>, view: &RecorderView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let field = Paragraph::new(view.field_value.as_str()).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(vec![
                Span::raw("Field "),
                Span::styled(format!("[{}]", view.mode.as_str()), mode_style(view.mode)),
            ])),
    );
    frame.render_widget(field, chunks[0]);

    let buttons = Line::from(vec![
        Span::styled(format!(" {} ", view.record.label), button_style(&view.record)),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", view.playback.label),
            button_style(&view.playback),
        ),
    ]);
    frame.render_widget(Paragraph::new(buttons), chunks[1]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    render_buffer(frame, view, body[0]);

    let skip = view
        .activity
        .len()
        .saturating_sub(body[1].height.saturating_sub(2) as usize);
    let activity = view
        .activity
        .iter()
        .skip(skip)
        .map(|line| ListItem::new(line.as_str()))
        .collect::<Vec<_>>();
    frame.render_widget(
        List::new(activity).block(Block::default().borders(Borders::ALL).title("Activity")),
        body[1],
    );

    frame.render_widget(
        Paragraph::new(controls_legend()).style(Style::default().fg(Color::DarkGray)),
        chunks[3],
    );
}

fn render_buffer(frame: &mut Frame<'_>, view: &RecorderView, area: Rect) {
    let items = view
        .buffer
        .iter()
        .enumerate()
        .map(|(idx, value)| {
            let marker = match view.cursor {
                Some(cursor) if cursor == idx => "> ",
                Some(cursor) if idx < cursor => "* ",
                _ => "  ",
            };
            let style = if view.cursor == Some(idx) {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("{idx:>3} {value:?}"), style),
            ]))
        })
        .collect::<Vec<_>>();
    let title = format!("Buffer ({})", view.buffer.len());
    frame.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        area,
    );
}

pub fn render_recorder(view: &RecorderView, width: u16, height: u16) -> String {
    let backend = TestBackend::new(width, height);
    let Ok(mut terminal) = Terminal::new(backend) else {
        return String::new();
    };
    if terminal.draw(|frame| draw_recorder(frame, view)).is_err() {
        return String::new();
    }

    let mut out = String::new();
    let buffer = terminal.backend().buffer().clone();
    for y in 0..height {
        for x in 0..width {
            if let Some(cell) = buffer.cell((x, y)) {
                out.push_str(cell.symbol());
            }
        }
        out.push('\n');
    }
    out
}
