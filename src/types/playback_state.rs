/// Transport state: where the playhead is and whether it is running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaybackState {
    pub playhead: f64, // seconds
    pub is_playing: bool,
}

impl PlaybackState {
    pub fn at_end(&self, end: f64) -> bool {
        self.playhead >= end
    }

    /// Moves the playhead forward, never past `end`. Returns true once the
    /// end is reached.
    pub fn advance(&mut self, seconds: f64, end: f64) -> bool {
        self.playhead = (self.playhead + seconds).min(end.max(0.0));
        self.at_end(end)
    }
}
