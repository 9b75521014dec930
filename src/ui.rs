use ratatui::layout::{Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Clear, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::stopwatch::StopwatchState;
use stopwatch_core::{format_msc, LapExtremes, SessionState};

const START_GREEN: Color = Color::Rgb(0x50, 0xD1, 0x67);
const START_GREEN_BG: Color = Color::Rgb(0x1B, 0x36, 0x1F);
const STOP_RED: Color = Color::Rgb(0xE3, 0x39, 0x35);
const STOP_RED_BG: Color = Color::Rgb(0x3C, 0x17, 0x15);
const NEUTRAL_FG: Color = Color::Rgb(0xFF, 0xFF, 0xFF);
const NEUTRAL_BG: Color = Color::Rgb(0x3D, 0x3D, 0x3D);
const DISABLED_FG: Color = Color::Rgb(0x8B, 0x8B, 0x90);
const DISABLED_BG: Color = Color::Rgb(0x15, 0x15, 0x15);
const FASTEST_GREEN: Color = Color::Rgb(0x4B, 0xC0, 0x5F);
const SLOWEST_RED: Color = Color::Rgb(0xCC, 0x35, 0x31);

const BUTTON_WIDTH: u16 = 12;
const KEY_BAR: &str = "enter=start/stop  l=lap  r=reset  k/j=scroll  ?=help  q=quit";

/// Visual spec for one of the two action buttons.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ButtonSpec {
    pub label: &'static str,
    pub fg: Color,
    pub bg: Color,
    pub enabled: bool,
}

/// The visible button pair for a session state: a disabled Lap plus Start
/// while idle, Lap plus Stop while running, Reset plus Resume once stopped.
pub fn button_row(state: SessionState) -> [ButtonSpec; 2] {
    match state {
        SessionState::Idle => [
            ButtonSpec {
                label: "Lap",
                fg: DISABLED_FG,
                bg: DISABLED_BG,
                enabled: false,
            },
            ButtonSpec {
                label: "Start",
                fg: START_GREEN,
                bg: START_GREEN_BG,
                enabled: true,
            },
        ],
        SessionState::Running => [
            ButtonSpec {
                label: "Lap",
                fg: NEUTRAL_FG,
                bg: NEUTRAL_BG,
                enabled: true,
            },
            ButtonSpec {
                label: "Stop",
                fg: STOP_RED,
                bg: STOP_RED_BG,
                enabled: true,
            },
        ],
        SessionState::Stopped => [
            ButtonSpec {
                label: "Reset",
                fg: NEUTRAL_FG,
                bg: NEUTRAL_BG,
                enabled: true,
            },
            ButtonSpec {
                label: "Resume",
                fg: START_GREEN,
                bg: START_GREEN_BG,
                enabled: true,
            },
        ],
    }
}

/// Rectangles the event loop needs for mouse hit-testing.
#[derive(Clone, Copy, Default, Debug)]
pub struct ScreenLayout {
    pub lap_button: Rect,
    pub action_button: Rect,
    pub lap_list: Rect,
}

/// Draw the stopwatch screen and hand back the click targets.
pub fn draw_stopwatch(frame: &mut Frame, sw: &StopwatchState) -> ScreenLayout {
    let [header, timer, buttons, laps, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(3),
        Constraint::Length(5),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    frame.render_widget(
        Paragraph::new("STOPWATCH")
            .centered()
            .style(Style::new().add_modifier(Modifier::BOLD)),
        header,
    );

    frame.render_widget(
        Paragraph::new(format_msc(sw.session.total_ms()))
            .centered()
            .style(Style::new().add_modifier(Modifier::BOLD)),
        timer,
    );

    let [lap_rect, action_rect] = Layout::horizontal([
        Constraint::Length(BUTTON_WIDTH),
        Constraint::Length(BUTTON_WIDTH),
    ])
    .flex(Flex::SpaceBetween)
    .horizontal_margin(4)
    .areas(buttons);

    let [lap_spec, action_spec] = button_row(sw.session.state());
    draw_button(frame, lap_rect, &lap_spec);
    draw_button(frame, action_rect, &action_spec);

    if sw.session.laps().is_empty() {
        frame.render_widget(
            Paragraph::new("No laps. Press enter to start.")
                .centered()
                .style(Style::new().add_modifier(Modifier::DIM)),
            laps,
        );
    } else {
        frame.render_widget(List::new(lap_items(sw, laps)), laps);
    }

    frame.render_widget(
        Paragraph::new(KEY_BAR)
            .centered()
            .style(Style::new().add_modifier(Modifier::DIM)),
        footer,
    );

    ScreenLayout {
        lap_button: lap_rect,
        action_button: action_rect,
        lap_list: laps,
    }
}

fn draw_button(frame: &mut Frame, rect: Rect, spec: &ButtonSpec) {
    let style = Style::new().fg(spec.fg).bg(spec.bg);
    let label = Text::from(vec![Line::default(), Line::from(spec.label)]);
    frame.render_widget(
        Paragraph::new(label)
            .centered()
            .style(style)
            .block(Block::bordered().border_style(style)),
        rect,
    );
}

/// Lap rows for the viewport, newest first: from the scroll offset down,
/// at most one row per visible line. Rows tied with the fastest completed
/// lap are green, slowest red; when a lap is both, the slowest style wins.
/// The in-progress row is never flagged.
fn lap_items(sw: &StopwatchState, area: Rect) -> Vec<ListItem<'static>> {
    let session = &sw.session;
    let extremes = LapExtremes::scan(session.completed());
    let end = session.laps().len().min(sw.lap_scroll + area.height as usize);
    let mut items = Vec::new();

    for index in sw.lap_scroll..end {
        let label = format!("Lap {}", session.lap_number(index));
        let time = format_msc(session.lap_ms(index));
        let pad = (area.width as usize).saturating_sub(label.len() + time.len());
        let row = format!("{}{}{}", label, " ".repeat(pad), time);

        let value = session.lap_ms(index);
        let style = if index == 0 {
            Style::new()
        } else if extremes.is_slowest(value) {
            Style::new().fg(SLOWEST_RED)
        } else if extremes.is_fastest(value) {
            Style::new().fg(FASTEST_GREEN)
        } else {
            Style::new()
        };
        items.push(ListItem::new(row).style(style));
    }
    items
}

const HELP_TEXT: &str = "\
 Enter  Start / Stop / Resume
 Space  Same as Enter
 l      Record a lap
 r      Reset (while stopped)
 Up/k   Scroll laps up
 Down/j Scroll laps down
 ?      This help
 q      Quit

Buttons are clickable; the wheel
scrolls the lap list.

Press any key to close";

pub fn draw_help(frame: &mut Frame) {
    let area = popup_area(frame.area(), 38, 16);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(HELP_TEXT).block(Block::bordered().title("Help")),
        area,
    );
}

pub fn draw_confirm_quit(frame: &mut Frame) {
    let area = popup_area(frame.area(), 34, 6);
    frame.render_widget(Clear, area);
    let text = Text::from(vec![
        Line::from("The clock is still running."),
        Line::from("Quit anyway?"),
        Line::default(),
        Line::from("y = quit   n = keep timing"),
    ]);
    frame.render_widget(
        Paragraph::new(text)
            .centered()
            .block(Block::bordered().title("Quit")),
        area,
    );
}

fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [centered] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [centered] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(centered);
    centered
}
