use stopwatch_core::{Session, SessionState};

/// App-side stopwatch state: the session plus the presentation state the
/// core does not track.
pub struct StopwatchState {
    pub session: Session,
    pub lap_scroll: usize,
}

/// A user intent, decoded from a key press or a button click.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    /// The right-hand button: Start, Stop or Resume depending on state.
    Primary,
    Lap,
    Reset,
    ScrollUp,
    ScrollDown,
}

/// What the event loop should do with the tick pump after an action.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PumpCmd {
    Start,
    Stop,
    Keep,
}

impl StopwatchState {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            lap_scroll: 0,
        }
    }

    /// Apply a user action at the given time. State guards live in the
    /// session, so a disabled control simply changes nothing.
    pub fn apply(&mut self, action: Action, now_ms: u64) -> PumpCmd {
        match action {
            Action::Primary => match self.session.state() {
                SessionState::Idle => {
                    self.session.start(now_ms);
                    PumpCmd::Start
                }
                SessionState::Running => {
                    self.session.stop(now_ms);
                    PumpCmd::Stop
                }
                SessionState::Stopped => {
                    self.session.resume(now_ms);
                    PumpCmd::Start
                }
            },
            Action::Lap => {
                self.session.lap(now_ms);
                PumpCmd::Keep
            }
            Action::Reset => {
                self.session.reset();
                if self.session.state() == SessionState::Idle {
                    self.lap_scroll = 0;
                }
                PumpCmd::Keep
            }
            Action::ScrollUp => {
                self.lap_scroll = self.lap_scroll.saturating_sub(1);
                PumpCmd::Keep
            }
            Action::ScrollDown => {
                let max = self.session.laps().len().saturating_sub(1);
                if self.lap_scroll < max {
                    self.lap_scroll += 1;
                }
                PumpCmd::Keep
            }
        }
    }
}
