mod stopwatch;
mod ui;

use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Context;
use ratatui::crossterm::event::{
    self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::layout::Position;
use ratatui::DefaultTerminal;

use crate::stopwatch::{Action, PumpCmd, StopwatchState};
use crate::ui::ScreenLayout;
use stopwatch_core::SessionState;

/// Refresh cadence while the clock is running.
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Everything the main loop reacts to. Keys, clicks and pump ticks all
/// arrive over one channel, so the loop is a single blocking receive.
enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    FocusGained,
    FocusLost,
    Tick,
}

enum PumpCtrl {
    Start(Duration),
    Stop,
    Quit,
}

/// Handle to the tick pump thread. The app starts it on start/resume and
/// stops it on stop; dropping the handle quits and joins the thread, so
/// the interval can never outlive the view.
struct Pump {
    ctrl: Sender<PumpCtrl>,
    thread: Option<JoinHandle<()>>,
}

impl Pump {
    fn spawn(events: Sender<AppEvent>) -> Self {
        let (ctrl, ctrl_rx) = mpsc::channel();
        let thread = thread::spawn(move || pump_thread(ctrl_rx, events));
        Self {
            ctrl,
            thread: Some(thread),
        }
    }

    fn start(&self, interval: Duration) {
        self.ctrl.send(PumpCtrl::Start(interval)).ok();
    }

    fn stop(&self) {
        self.ctrl.send(PumpCtrl::Stop).ok();
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.ctrl.send(PumpCtrl::Quit).ok();
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

/// Emit ticks at the requested interval while running; park quietly while
/// stopped. A control message wins over the next tick.
fn pump_thread(ctrl: Receiver<PumpCtrl>, events: Sender<AppEvent>) {
    let mut interval = TICK_INTERVAL;
    let mut running = false;

    loop {
        let msg = if running {
            match ctrl.recv_timeout(interval) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => {
                    if events.send(AppEvent::Tick).is_err() {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        } else {
            match ctrl.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            }
        };

        match msg {
            Some(PumpCtrl::Start(requested)) => {
                interval = requested;
                running = true;
            }
            Some(PumpCtrl::Stop) => running = false,
            Some(PumpCtrl::Quit) => break,
            None => {}
        }
    }
}

/// Forward terminal events onto the shared channel until it closes.
fn input_thread(events: Sender<AppEvent>) {
    loop {
        let forwarded = match event::read() {
            Ok(Event::Key(key)) => AppEvent::Key(key),
            Ok(Event::Mouse(mouse)) => AppEvent::Mouse(mouse),
            Ok(Event::Resize(_, _)) => AppEvent::Resize,
            Ok(Event::FocusGained) => AppEvent::FocusGained,
            Ok(Event::FocusLost) => AppEvent::FocusLost,
            Ok(_) => continue,
            Err(err) => {
                log::error!("input read failed: {err}");
                break;
            }
        };
        if events.send(forwarded).is_err() {
            break;
        }
    }
}

struct App {
    stopwatch: StopwatchState,
    pump: Pump,
    origin: Instant,
    layout: ScreenLayout,
    help_visible: bool,
    confirm_quit: bool,
    allow_redraw: bool,
    should_quit: bool,
}

impl App {
    fn new(events: Sender<AppEvent>) -> Self {
        Self {
            stopwatch: StopwatchState::new(),
            pump: Pump::spawn(events),
            origin: Instant::now(),
            layout: ScreenLayout::default(),
            help_visible: false,
            confirm_quit: false,
            allow_redraw: true,
            should_quit: false,
        }
    }

    fn now_ms(&self) -> u64 {
        // 0 is reserved as the not-running sentinel.
        (self.origin.elapsed().as_millis() as u64).max(1)
    }

    fn running(&self) -> bool {
        self.stopwatch.session.state() == SessionState::Running
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(key),
            AppEvent::Key(_) => {}
            AppEvent::Mouse(mouse) => self.handle_mouse(mouse),
            AppEvent::Resize => {}
            AppEvent::FocusGained => {
                self.allow_redraw = true;
                if self.running() {
                    self.pump.start(TICK_INTERVAL);
                }
            }
            AppEvent::FocusLost => {
                self.allow_redraw = false;
                self.pump.stop();
            }
            AppEvent::Tick => {
                let now = self.now_ms();
                self.stopwatch.session.tick(now);
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        // An open help screen swallows the dismissing key.
        if self.help_visible {
            self.help_visible = false;
            return;
        }

        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.should_quit = true,
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_quit = false
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => self.dispatch(Action::Primary),
            KeyCode::Char('l') => self.dispatch(Action::Lap),
            KeyCode::Char('r') => self.dispatch(Action::Reset),
            KeyCode::Up | KeyCode::Char('k') => self.dispatch(Action::ScrollUp),
            KeyCode::Down | KeyCode::Char('j') => self.dispatch(Action::ScrollDown),
            KeyCode::Char('?') => self.help_visible = true,
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.help_visible || self.confirm_quit {
            return;
        }
        let at = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.layout.action_button.contains(at) {
                    self.dispatch(Action::Primary);
                } else if self.layout.lap_button.contains(at) {
                    // The left button reads Lap until the clock stops,
                    // then Reset.
                    let action = match self.stopwatch.session.state() {
                        SessionState::Stopped => Action::Reset,
                        _ => Action::Lap,
                    };
                    self.dispatch(action);
                }
            }
            MouseEventKind::ScrollUp if self.layout.lap_list.contains(at) => {
                self.dispatch(Action::ScrollUp);
            }
            MouseEventKind::ScrollDown if self.layout.lap_list.contains(at) => {
                self.dispatch(Action::ScrollDown);
            }
            _ => {}
        }
    }

    fn dispatch(&mut self, action: Action) {
        let now = self.now_ms();
        match self.stopwatch.apply(action, now) {
            PumpCmd::Start => self.pump.start(TICK_INTERVAL),
            PumpCmd::Stop => self.pump.stop(),
            PumpCmd::Keep => {}
        }
    }

    fn request_quit(&mut self) {
        if self.running() {
            self.confirm_quit = true;
        } else {
            self.should_quit = true;
        }
    }

    fn draw(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        if !self.allow_redraw {
            return Ok(());
        }
        let mut layout = self.layout;
        terminal.draw(|frame| {
            layout = ui::draw_stopwatch(frame, &self.stopwatch);
            if self.help_visible {
                ui::draw_help(frame);
            }
            if self.confirm_quit {
                ui::draw_confirm_quit(frame);
            }
        })?;
        self.layout = layout;
        Ok(())
    }
}

fn event_loop(terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
    let (events_tx, events) = mpsc::channel();

    let input_tx = events_tx.clone();
    thread::spawn(move || input_thread(input_tx));

    let mut app = App::new(events_tx);
    app.draw(terminal)?;

    while !app.should_quit {
        let event = events.recv().context("event channel closed")?;
        app.handle_event(event);
        app.draw(terminal)?;
    }
    Ok(())
}

fn run(mut terminal: DefaultTerminal) -> anyhow::Result<()> {
    execute!(io::stdout(), EnableMouseCapture, EnableFocusChange)?;
    let result = event_loop(&mut terminal);
    execute!(io::stdout(), DisableMouseCapture, DisableFocusChange).ok();
    result
}

fn main() -> anyhow::Result<()> {
    env_logger::builder().parse_env("LOG").init();
    log::info!("stopwatch starting");

    let terminal = ratatui::init();
    let result = run(terminal);
    ratatui::restore();

    log::info!("stopwatch exiting");
    result
}
