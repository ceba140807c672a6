// crates/neoncut-core/src/playback.rs
//
// Wall-clock driven playhead. Stopped ⇄ Playing.
//
// The clock only owns its baseline timestamp; `current_time` and
// `is_playing` live in EditorState so every view reads one source of truth.
// `now` is any monotonic clock in seconds (a rAF timestamp / 1000, an
// Instant offset, a simulated counter in tests).

use crate::state::EditorState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockEvent {
    /// Not playing; nothing moved.
    Idle,
    Advanced,
    /// The playhead hit the end of the timeline. Playback stopped and the
    /// playhead rewound to 0.
    ReachedEnd,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackClock {
    last:      Option<f64>,
    max_delta: Option<f64>,
}

impl PlaybackClock {
    pub fn new(max_delta: Option<f64>) -> Self {
        Self { last: None, max_delta }
    }

    /// Begin playing from the current playhead. The baseline is dropped, so
    /// the next `tick` only records its timestamp and time spent stopped is
    /// never counted.
    pub fn start(&mut self, state: &mut EditorState) {
        state.is_playing = true;
        self.last = None;
        tracing::debug!(time = state.current_time, "playback started");
    }

    pub fn stop(&mut self, state: &mut EditorState) {
        state.is_playing = false;
        self.last = None;
        tracing::debug!(time = state.current_time, "playback stopped");
    }

    pub fn toggle(&mut self, state: &mut EditorState) {
        if state.is_playing {
            self.stop(state);
        } else {
            self.start(state);
        }
    }

    /// Per-frame step. A long stall (tab in background, debugger) is clamped
    /// to `max_delta` so the playhead does not leap.
    pub fn tick(&mut self, state: &mut EditorState, now: f64) -> ClockEvent {
        if !state.is_playing {
            return ClockEvent::Idle;
        }
        let last = self.last.replace(now).unwrap_or(now);
        let mut delta = (now - last).max(0.0);
        if let Some(max) = self.max_delta {
            delta = delta.min(max);
        }
        self.advance(state, delta)
    }

    /// Move the playhead by exactly `delta` seconds of playback.
    pub fn advance(&mut self, state: &mut EditorState, delta: f64) -> ClockEvent {
        if !state.is_playing {
            return ClockEvent::Idle;
        }
        state.current_time += delta.max(0.0);
        if state.current_time >= state.total_duration {
            self.stop(state);
            state.current_time = 0.0;
            return ClockEvent::ReachedEnd;
        }
        ClockEvent::Advanced
    }

    /// Jump the playhead. Does not change the play state.
    pub fn seek(&mut self, state: &mut EditorState, t: f64) {
        state.current_time = if t.is_finite() { t.clamp(0.0, state.total_duration) } else { 0.0 };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing(total: f64) -> (PlaybackClock, EditorState) {
        let mut state = EditorState::default();
        state.total_duration = total;
        let mut clock = PlaybackClock::new(Some(0.1));
        clock.start(&mut state);
        clock.tick(&mut state, 0.0);
        (clock, state)
    }

    #[test]
    fn reaching_end_stops_and_rewinds() {
        let (mut clock, mut state) = playing(10.0);
        assert_eq!(clock.advance(&mut state, 10.0), ClockEvent::ReachedEnd);
        assert!(!state.is_playing);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn tick_clamps_long_frames() {
        let (mut clock, mut state) = playing(10.0);
        assert_eq!(clock.tick(&mut state, 5.0), ClockEvent::Advanced);
        assert!((state.current_time - 0.1).abs() < 1e-9);
        clock.tick(&mut state, 5.05);
        assert!((state.current_time - 0.15).abs() < 1e-9);
    }

    #[test]
    fn unclamped_clock_takes_full_delta() {
        let mut state = EditorState::default();
        state.total_duration = 10.0;
        let mut clock = PlaybackClock::new(None);
        clock.start(&mut state);
        assert_eq!(clock.tick(&mut state, 100.0), ClockEvent::Advanced);
        assert_eq!(clock.tick(&mut state, 110.0), ClockEvent::ReachedEnd);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn stopped_clock_ignores_ticks() {
        let mut state = EditorState::default();
        let mut clock = PlaybackClock::new(Some(0.1));
        assert_eq!(clock.tick(&mut state, 3.0), ClockEvent::Idle);
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn restart_discards_paused_time() {
        let (mut clock, mut state) = playing(30.0);
        clock.tick(&mut state, 0.05);
        clock.stop(&mut state);
        clock.start(&mut state);
        clock.tick(&mut state, 50.0);
        clock.tick(&mut state, 50.05);
        assert!((state.current_time - 0.1).abs() < 1e-9);
    }

    #[test]
    fn seek_clamps_to_timeline() {
        let (mut clock, mut state) = playing(30.0);
        clock.seek(&mut state, 45.0);
        assert_eq!(state.current_time, 30.0);
        clock.seek(&mut state, -2.0);
        assert_eq!(state.current_time, 0.0);
        assert!(state.is_playing);
    }
}
