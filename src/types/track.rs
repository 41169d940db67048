use serde::{Deserialize, Serialize};

/// Lane type. Only decides the background tint of the lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Graphics,
}

impl TrackKind {
    pub fn label(self) -> &'static str {
        match self {
            TrackKind::Video => "Video",
            TrackKind::Audio => "Audio",
            TrackKind::Text => "Text",
            TrackKind::Graphics => "Graphics",
        }
    }
}

/// Default lane layout: two video, two audio, one text and one graphics track.
pub fn default_tracks() -> Vec<TrackKind> {
    vec![
        TrackKind::Video,
        TrackKind::Video,
        TrackKind::Audio,
        TrackKind::Audio,
        TrackKind::Text,
        TrackKind::Graphics,
    ]
}

/// Clamps a track index into `[0, track_count - 1]`.
pub fn clamp_track_index(index: usize, track_count: usize) -> usize {
    index.min(track_count.saturating_sub(1))
}
