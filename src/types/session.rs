use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Left,
    Right,
}

/// The single in-flight pointer interaction. Ends only on pointer-up.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    /// Moving a clip in time and across tracks
    Dragging {
        clip_id: String,
        origin: egui::Pos2,
        original_start_time: f64,
        original_track: usize,
    },
    /// Trimming one edge of a clip
    Resizing {
        clip_id: String,
        edge: ResizeEdge,
        origin: egui::Pos2,
        original_start_time: f64,
        original_duration: f64,
    },
    /// Scrubbing the playhead along the ruler
    Scrubbing,
}

impl Session {
    pub fn clip_id(&self) -> Option<&str> {
        match self {
            Session::Dragging { clip_id, .. } | Session::Resizing { clip_id, .. } => Some(clip_id),
            Session::Scrubbing => None,
        }
    }
}

/// Where the manipulated clip is drawn while a session is running.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipPreview {
    pub clip_id: String,
    pub start_time: f64,
    pub duration: f64,
    pub track_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResizeTooltip {
    pub edge: ResizeEdge,
    pub start_time: f64,
    pub duration: f64,
}

impl ResizeTooltip {
    pub fn text(&self) -> String {
        format!(
            "Start {:.2}s \u{2022} Dur {:.2}s",
            self.start_time, self.duration
        )
    }
}

/// Transient visuals owned by the interaction controller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionOverlay {
    pub preview: Option<ClipPreview>,
    pub snap_time: Option<f64>,
    pub tooltip: Option<ResizeTooltip>,
}

impl SessionOverlay {
    pub fn is_empty(&self) -> bool {
        self.preview.is_none() && self.snap_time.is_none() && self.tooltip.is_none()
    }
}
