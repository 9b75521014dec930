//! Pure lap-timing logic with no platform dependencies.
//! Timestamps are supplied by the caller, so everything here is testable
//! on host with synthetic clocks.

/// Lifecycle of a timing session, derived from the session fields rather
/// than stored alongside them.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    /// No laps recorded, clock at zero.
    Idle,
    /// Clock running, the current lap accumulating.
    Running,
    /// Clock halted with laps on record; resumable.
    Stopped,
}

/// A stopwatch session: the lap list plus the running-segment timestamps.
///
/// `laps[0]` is the in-progress lap's accumulated offset; `laps[1..]` are
/// completed laps, newest first. `start_ms == 0 && now_ms == 0` means the
/// clock is not running; otherwise both are live timestamps with
/// `now_ms >= start_ms` (kept true by saturating arithmetic). `start`,
/// `lap` and `resume` clamp the caller's timestamp to at least 1ms, so a
/// session armed at time zero cannot collide with the sentinel.
///
/// Transitions called in the wrong state are silent no-ops, which is the
/// disabled-button behavior of the UI.
#[derive(Clone, Debug, Default)]
pub struct Session {
    laps: Vec<u64>,
    start_ms: u64,
    now_ms: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.start_ms > 0 {
            SessionState::Running
        } else if self.laps.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Stopped
        }
    }

    /// Begin a fresh session with a single zero lap.
    pub fn start(&mut self, now_ms: u64) {
        if self.state() != SessionState::Idle {
            return;
        }
        // 0 is reserved as the not-running sentinel.
        let now_ms = now_ms.max(1);
        self.laps.push(0);
        self.start_ms = now_ms;
        self.now_ms = now_ms;
    }

    /// Close the current lap and open a new one. The same timestamp closes
    /// the old lap and starts the new segment, so no time falls between
    /// laps.
    pub fn lap(&mut self, now_ms: u64) {
        if self.state() != SessionState::Running {
            return;
        }
        let now_ms = now_ms.max(1);
        let segment = now_ms.saturating_sub(self.start_ms);
        if let Some(current) = self.laps.first_mut() {
            *current += segment;
        }
        self.laps.insert(0, 0);
        self.start_ms = now_ms;
        self.now_ms = now_ms;
    }

    /// Halt the clock, folding the running segment into the current lap.
    /// The lap list is kept; `resume` continues where this left off.
    pub fn stop(&mut self, now_ms: u64) {
        if self.state() != SessionState::Running {
            return;
        }
        let segment = now_ms.saturating_sub(self.start_ms);
        if let Some(current) = self.laps.first_mut() {
            *current += segment;
        }
        self.start_ms = 0;
        self.now_ms = 0;
    }

    /// Restart the clock; the current lap keeps accumulating.
    pub fn resume(&mut self, now_ms: u64) {
        if self.state() != SessionState::Stopped {
            return;
        }
        let now_ms = now_ms.max(1);
        self.start_ms = now_ms;
        self.now_ms = now_ms;
    }

    /// Discard all laps and return to idle.
    pub fn reset(&mut self) {
        if self.state() != SessionState::Stopped {
            return;
        }
        self.laps.clear();
        self.start_ms = 0;
        self.now_ms = 0;
    }

    /// Refresh the observed time. This is what drives the display while
    /// running; a tick delivered after a stop is absorbed by the guard.
    pub fn tick(&mut self, now_ms: u64) {
        if self.state() != SessionState::Running {
            return;
        }
        self.now_ms = now_ms;
    }

    /// Elapsed time of the running segment, zero when halted.
    pub fn running_ms(&self) -> u64 {
        self.now_ms.saturating_sub(self.start_ms)
    }

    /// Total displayed time: every lap plus the running segment.
    pub fn total_ms(&self) -> u64 {
        self.laps.iter().sum::<u64>() + self.running_ms()
    }

    /// All laps, index 0 being the in-progress one.
    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    /// Completed laps only (everything but index 0). Statistics are
    /// computed over these; the in-progress lap never participates.
    pub fn completed(&self) -> &[u64] {
        self.laps.get(1..).unwrap_or(&[])
    }

    /// Display value for the lap at `index`; the in-progress lap includes
    /// the running segment.
    pub fn lap_ms(&self, index: usize) -> u64 {
        let stored = self.laps.get(index).copied().unwrap_or(0);
        if index == 0 {
            stored + self.running_ms()
        } else {
            stored
        }
    }

    /// Laps display newest first, so the newest carries the highest number.
    pub fn lap_number(&self, index: usize) -> usize {
        self.laps.len().saturating_sub(index)
    }
}

/// Fastest/slowest values over the completed laps, used to flag rows.
///
/// Requires at least two completed laps. Flagging is by value equality:
/// every lap tied with an extreme is flagged, not just the first
/// occurrence.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LapExtremes {
    fastest: Option<u64>,
    slowest: Option<u64>,
}

impl LapExtremes {
    pub fn scan(completed: &[u64]) -> Self {
        if completed.len() < 2 {
            return Self::default();
        }
        let mut min = u64::MAX;
        let mut max = 0;
        for &lap in completed {
            if lap < min {
                min = lap;
            }
            if lap > max {
                max = lap;
            }
        }
        Self {
            fastest: Some(min),
            slowest: Some(max),
        }
    }

    pub fn is_fastest(&self, lap_ms: u64) -> bool {
        self.fastest == Some(lap_ms)
    }

    pub fn is_slowest(&self, lap_ms: u64) -> bool {
        self.slowest == Some(lap_ms)
    }
}

/// Format milliseconds as "MM:SS:CC" (minutes, seconds, centiseconds).
/// There is no hours field; the minutes wrap at an hour.
pub fn format_msc(ms: u64) -> String {
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1000) % 60;
    let centis = (ms % 1000) / 10;
    format!("{:02}:{:02}:{:02}", minutes, seconds, centis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_idle() {
        let s = Session::new();
        assert_eq!(s.state(), SessionState::Idle);
        assert_eq!(s.total_ms(), 0);
        assert!(s.laps().is_empty());
    }

    #[test]
    fn start_opens_a_zero_lap() {
        let mut s = Session::new();
        s.start(1000);
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.laps(), &[0]);

        s.tick(1500);
        assert_eq!(s.running_ms(), 500);
        assert_eq!(s.total_ms(), 500);
        assert_eq!(s.lap_ms(0), 500);
    }

    #[test]
    fn lap_closes_current_and_opens_next() {
        let mut s = Session::new();
        s.start(1000);
        s.lap(4000);
        assert_eq!(s.laps(), &[0, 3000]);
        assert_eq!(s.completed(), &[3000]);

        s.tick(4500);
        assert_eq!(s.lap_ms(0), 500);
        assert_eq!(s.total_ms(), 3500);

        // Newest lap carries the highest number.
        assert_eq!(s.lap_number(0), 2);
        assert_eq!(s.lap_number(1), 1);
    }

    #[test]
    fn laps_sum_to_stop_minus_start() {
        let mut s = Session::new();
        s.start(10_000);
        s.tick(12_345); // a stale tick between presses must not lose time
        s.lap(13_000);
        s.lap(14_250);
        s.tick(15_000);
        s.stop(16_500);

        assert_eq!(s.state(), SessionState::Stopped);
        assert_eq!(s.laps(), &[2_250, 1_250, 3_000]);
        assert_eq!(s.laps().iter().sum::<u64>(), 6_500);
        assert_eq!(s.total_ms(), 6_500);
    }

    #[test]
    fn stop_resume_keeps_accumulating_current_lap() {
        let mut s = Session::new();
        s.start(100);
        s.lap(1_100);
        s.stop(1_700);
        assert_eq!(s.laps(), &[600, 1_000]);
        assert_eq!(s.state(), SessionState::Stopped);

        // The halted gap does not count.
        s.resume(5_100);
        assert_eq!(s.laps(), &[600, 1_000]);
        s.tick(5_500);
        assert_eq!(s.lap_ms(0), 1_000);
        assert_eq!(s.total_ms(), 2_000);

        s.stop(5_600);
        assert_eq!(s.laps(), &[1_100, 1_000]);
    }

    #[test]
    fn reset_requires_stopped() {
        let mut s = Session::new();
        s.reset();
        assert_eq!(s.state(), SessionState::Idle);

        s.start(100);
        s.reset();
        assert_eq!(s.state(), SessionState::Running);

        s.stop(400);
        s.reset();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.laps().is_empty());
        assert_eq!(s.total_ms(), 0);
    }

    #[test]
    fn guarded_transitions_leave_state_unchanged() {
        let mut s = Session::new();
        s.lap(500); // disabled while idle
        s.stop(500);
        s.resume(500);
        s.tick(500);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.laps().is_empty());
        assert_eq!(s.total_ms(), 0);

        let mut s = Session::new();
        s.start(100);
        s.start(900); // second start ignored
        s.resume(900);
        s.tick(600);
        assert_eq!(s.running_ms(), 500);
    }

    #[test]
    fn time_zero_timestamps_cannot_stop_the_clock() {
        // 0 doubles as the not-running sentinel; arming clamps it to 1ms.
        let mut s = Session::new();
        s.start(0);
        assert_eq!(s.state(), SessionState::Running);

        s.lap(0);
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.laps().len(), 2);

        s.stop(400);
        assert_eq!(s.state(), SessionState::Stopped);
        s.resume(0);
        assert_eq!(s.state(), SessionState::Running);
    }

    #[test]
    fn total_never_decreases() {
        let mut s = Session::new();
        let mut last = 0;
        s.start(1_000);
        for now in [1_100, 1_200, 1_300] {
            s.tick(now);
            assert!(s.total_ms() >= last);
            last = s.total_ms();
        }
        s.lap(1_350);
        assert!(s.total_ms() >= last);
        last = s.total_ms();
        s.tick(1_400);
        assert!(s.total_ms() >= last);
        last = s.total_ms();
        s.stop(1_450);
        assert!(s.total_ms() >= last);
        last = s.total_ms();
        s.resume(9_000);
        s.tick(9_050);
        assert!(s.total_ms() >= last);
    }

    #[test]
    fn extremes_flag_every_tie() {
        let x = LapExtremes::scan(&[100, 50, 50, 200]);
        assert!(x.is_fastest(50));
        assert!(x.is_slowest(200));
        assert!(!x.is_fastest(100));
        assert!(!x.is_slowest(100));
        assert!(!x.is_fastest(200));
    }

    #[test]
    fn extremes_need_two_completed_laps() {
        assert_eq!(LapExtremes::scan(&[]), LapExtremes::default());
        let x = LapExtremes::scan(&[750]);
        assert!(!x.is_fastest(750));
        assert!(!x.is_slowest(750));
    }

    #[test]
    fn uniform_laps_are_both_extremes() {
        let x = LapExtremes::scan(&[300, 300]);
        assert!(x.is_fastest(300));
        assert!(x.is_slowest(300));
    }

    #[test]
    fn formats_minutes_seconds_centis() {
        assert_eq!(format_msc(0), "00:00:00");
        assert_eq!(format_msc(125_430), "02:05:43");
        assert_eq!(format_msc(59_999), "00:59:99");
        assert_eq!(format_msc(60_000), "01:00:00");
        // No hours field: minutes wrap past the hour.
        assert_eq!(format_msc(3_661_000), "01:01:00");
    }
}
