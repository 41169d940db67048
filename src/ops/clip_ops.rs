use crate::types::media::{Clip, MIN_CLIP_DURATION};
use crate::types::track::clamp_track_index;
use log::debug;

/// Offset applied to an Alt-drag duplicate so it does not sit exactly on top
/// of its source.
pub const DUPLICATE_OFFSET: f64 = 0.1;

/// Clamps start, duration and track of a clip into their valid ranges.
pub fn normalize_clip(mut clip: Clip, track_count: usize) -> Clip {
    let start = clamp_start(clip.start_time);
    let duration = clamp_duration(clip.duration);
    let track = clamp_track_index(clip.track_index, track_count);
    if start != clip.start_time || duration != clip.duration || track != clip.track_index {
        debug!(
            "clip {} clamped: start {} -> {}, duration {} -> {}, track {} -> {}",
            clip.id, clip.start_time, start, clip.duration, duration, clip.track_index, track
        );
    }
    clip.start_time = start;
    clip.duration = duration;
    clip.track_index = track;
    if let Some(volume) = clip.volume {
        clip.volume = Some(clamp_unit(volume));
    }
    if let Some(opacity) = clip.opacity {
        clip.opacity = Some(clamp_unit(opacity));
    }
    clip
}

pub fn clamp_start(start: f64) -> f64 {
    if start.is_nan() { 0.0 } else { start.max(0.0) }
}

pub fn clamp_duration(duration: f64) -> f64 {
    if duration.is_nan() {
        MIN_CLIP_DURATION
    } else {
        duration.max(MIN_CLIP_DURATION)
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() { 1.0 } else { value.clamp(0.0, 1.0) }
}

/// Copy of `clip` under a fresh id, nudged right by [`DUPLICATE_OFFSET`].
pub fn duplicate_clip(clip: &Clip) -> Clip {
    let mut copy = clip.clone();
    copy.id = uuid::Uuid::new_v4().to_string();
    copy.start_time = clip.start_time + DUPLICATE_OFFSET;
    copy.selected = false;
    copy
}

/// Start time after moving a clip by `delta` seconds.
pub fn moved_start(original_start: f64, delta: f64) -> f64 {
    clamp_start(original_start + delta)
}

/// Left-edge trim: the end stays where it was.
///
/// Returns `(start, duration)`. The start never goes below zero and never
/// closer than the minimum duration to the original end.
pub fn trim_left(original_start: f64, original_duration: f64, new_start: f64) -> (f64, f64) {
    let end = original_start + original_duration;
    let latest_start = (end - MIN_CLIP_DURATION).max(0.0);
    let start = clamp_start(new_start).min(latest_start);
    (start, clamp_duration(end - start))
}

/// Right-edge trim: the start stays where it was.
pub fn trim_right(original_duration: f64, delta: f64) -> f64 {
    clamp_duration(original_duration + delta)
}
