use crate::types::playback_state::PlaybackState;
use log::debug;
use std::time::{Duration, Instant};

pub const TICK_RATE: f64 = 60.0;
const TICK: f64 = 1.0 / TICK_RATE;
/// Upper bound on ticks applied by one `pump`, so a stalled host does not
/// jump the playhead by seconds at once.
const MAX_CATCH_UP_TICKS: u32 = 6;

/// Owns the playhead and advances it at a fixed 60 Hz while playing.
#[derive(Debug, Clone, Default)]
pub struct TimelinePlayerBridge {
    pub playback_state: PlaybackState,
    last_tick: Option<Instant>,
}

impl TimelinePlayerBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> f64 {
        self.playback_state.playhead
    }

    pub fn is_playing(&self) -> bool {
        self.playback_state.is_playing
    }

    /// Starts ticking. A second start while playing does nothing.
    ///
    /// Starting at or past the end rewinds to 0 first.
    pub fn start(&mut self, now: Instant, total_duration: f64) -> bool {
        if self.playback_state.is_playing {
            return false;
        }
        if self.playback_state.at_end(total_duration) {
            self.playback_state.playhead = 0.0;
        }
        self.playback_state.is_playing = true;
        self.last_tick = Some(now);
        debug!("playback started at {:.3}s", self.playback_state.playhead);
        true
    }

    pub fn stop(&mut self) -> bool {
        self.last_tick = None;
        if !self.playback_state.is_playing {
            return false;
        }
        self.playback_state.is_playing = false;
        debug!("playback stopped at {:.3}s", self.playback_state.playhead);
        true
    }

    /// Moves the playhead directly; playback keeps running from there.
    pub fn seek(&mut self, time: f64) {
        self.playback_state.playhead = time;
    }

    /// Advances one tick. Returns the new position, or None when stopped.
    pub fn tick(&mut self, total_duration: f64) -> Option<f64> {
        if !self.playback_state.is_playing {
            return None;
        }
        if self.playback_state.advance(TICK, total_duration) {
            self.stop();
        }
        Some(self.playback_state.playhead)
    }

    /// Converts wall-clock time since the last tick into whole ticks.
    pub fn pump(&mut self, now: Instant, total_duration: f64) -> Option<f64> {
        if !self.playback_state.is_playing {
            return None;
        }
        let last = *self.last_tick.get_or_insert(now);
        let elapsed = now.saturating_duration_since(last).as_secs_f64();
        let due = (elapsed * TICK_RATE).floor() as u32;
        if due == 0 {
            return None;
        }
        let ticks = if due > MAX_CATCH_UP_TICKS {
            self.last_tick = Some(now);
            MAX_CATCH_UP_TICKS
        } else {
            self.last_tick = Some(last + Duration::from_secs_f64(due as f64 * TICK));
            due
        };
        let mut position = None;
        for _ in 0..ticks {
            match self.tick(total_duration) {
                Some(p) => position = Some(p),
                None => break,
            }
        }
        position
    }
}
