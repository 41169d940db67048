use crate::types::media::Clip;
use crate::types::track::clamp_track_index;
use eframe::egui;
use log::debug;

pub const MIN_TIME_SCALE: f32 = 1.0;
pub const MAX_TIME_SCALE: f32 = 2000.0;
/// Vertical gap between a track band and the clip body drawn inside it.
pub const CLIP_INSET: f32 = 5.0;

/// Converts between timeline seconds and canvas pixels.
///
/// The canvas origin is the top-left corner of the ruler; tracks start below
/// the ruler.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateMapper {
    time_scale: f32,
    pub track_height: f32,
    pub ruler_height: f32,
    pub track_count: usize,
}

impl CoordinateMapper {
    pub fn new(time_scale: f32, track_height: f32, ruler_height: f32, track_count: usize) -> Self {
        let mut mapper = Self {
            time_scale: MIN_TIME_SCALE,
            track_height,
            ruler_height,
            track_count,
        };
        mapper.set_time_scale(time_scale);
        mapper
    }

    /// Pixels per second
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Returns the scale actually applied after clamping.
    pub fn set_time_scale(&mut self, pixels_per_second: f32) -> f32 {
        if !pixels_per_second.is_finite() {
            debug!("ignoring non-finite time scale {pixels_per_second}");
            return self.time_scale;
        }
        let clamped = pixels_per_second.clamp(MIN_TIME_SCALE, MAX_TIME_SCALE);
        if clamped != pixels_per_second {
            debug!("time scale {pixels_per_second} clamped to {clamped}");
        }
        self.time_scale = clamped;
        clamped
    }

    pub fn time_to_pixel(&self, time: f64) -> f32 {
        (time * self.time_scale as f64) as f32
    }

    pub fn pixel_to_time(&self, x: f32) -> f64 {
        x as f64 / self.time_scale as f64
    }

    /// Seconds covered by `pixels` at the current scale.
    pub fn pixels_to_duration(&self, pixels: f32) -> f64 {
        self.pixel_to_time(pixels)
    }

    pub fn track_index_for_y(&self, y: f32) -> usize {
        let raw = ((y - self.ruler_height) / self.track_height).floor();
        if raw.is_nan() || raw < 0.0 {
            return 0;
        }
        clamp_track_index(raw as usize, self.track_count)
    }

    /// Unclamped lane under `y`, or `None` above the tracks or below the last one.
    pub fn track_at_y(&self, y: f32) -> Option<usize> {
        if y < self.ruler_height {
            return None;
        }
        let index = ((y - self.ruler_height) / self.track_height).floor() as usize;
        (index < self.track_count).then_some(index)
    }

    /// Pointer position to `(time, clamped track)`.
    pub fn point_to_time_track(&self, pos: egui::Pos2) -> (f64, usize) {
        (self.pixel_to_time(pos.x), self.track_index_for_y(pos.y))
    }

    pub fn track_top(&self, track_index: usize) -> f32 {
        self.ruler_height + track_index as f32 * self.track_height
    }

    pub fn content_height(&self) -> f32 {
        self.ruler_height + self.track_count as f32 * self.track_height
    }

    /// Canvas rect of a clip body placed at the given time span and track.
    pub fn span_rect(&self, start_time: f64, duration: f64, track_index: usize) -> egui::Rect {
        let track = clamp_track_index(track_index, self.track_count);
        egui::Rect::from_min_size(
            egui::pos2(self.time_to_pixel(start_time), self.track_top(track) + CLIP_INSET),
            egui::vec2(
                self.time_to_pixel(duration),
                (self.track_height - 2.0 * CLIP_INSET).max(1.0),
            ),
        )
    }

    pub fn clip_rect(&self, clip: &Clip) -> egui::Rect {
        self.span_rect(clip.start_time, clip.duration, clip.track_index)
    }
}

/// Helper function to format time as MM:SS.mmm
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let minutes = (seconds / 60.0) as i32;
    let secs = seconds % 60.0;
    format!("{:02}:{:06.3}", minutes, secs)
}

/// Ruler label, `mm:ss`.
pub fn format_ruler_label(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
