use serde::{Deserialize, Serialize};

/// Shortest clip the timeline will hold, in seconds.
pub const MIN_CLIP_DURATION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video,
    Audio,
    Text,
    Graphics,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Fade,
    Dissolve,
    Wipe,
    Slide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub kind: TransitionKind,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transitions {
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub transition_in: Option<Transition>,
    #[serde(rename = "out", default, skip_serializing_if = "Option::is_none")]
    pub transition_out: Option<Transition>,
}

/// A time-bounded unit placed on one track.
///
/// `kind`, `color`, `thumbnail_url`, `volume`, `opacity`, `effects` and
/// `transitions` only affect how the clip is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ClipKind,
    pub track_index: usize,
    pub start_time: f64,
    pub duration: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transitions: Option<Transitions>,
}

impl Clip {
    pub fn new(
        id: impl Into<String>,
        kind: ClipKind,
        track_index: usize,
        start_time: f64,
        duration: f64,
    ) -> Self {
        let id = id.into();
        Clip {
            title: id.clone(),
            id,
            kind,
            track_index,
            start_time,
            duration,
            thumbnail_url: None,
            color: String::new(),
            selected: false,
            locked: false,
            volume: None,
            opacity: None,
            effects: Vec::new(),
            transitions: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_thumbnail(mut self, url: impl Into<String>) -> Self {
        self.thumbnail_url = Some(url.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }

    /// True when `time` lies inside `[start, end]`.
    pub fn contains_time(&self, time: f64) -> bool {
        time >= self.start_time && time <= self.end_time()
    }
}

/// Parses `#rrggbb` or `#rrggbbaa` into RGBA bytes.
pub fn parse_hex_color(value: &str) -> Option<[u8; 4]> {
    let hex = value.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => None,
    }
}
