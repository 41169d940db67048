//! Multi-track timeline engine: clips on tracks, drag/trim with magnetic
//! snapping, a scrubbable playhead, and a retained scene painted with egui.

pub mod error;

pub mod ops {
    pub mod clip_ops;
    pub mod geometry;
    pub mod snapping;
}

pub mod renderer {
    pub mod thumbnails;
    pub mod time_player_bridge;
    pub mod timeline_renderer;
}

pub mod types {
    pub mod config;
    pub mod media;
    pub mod playback_state;
    pub mod session;
    pub mod timeline;
    pub mod track;
}

pub mod ui {
    pub mod app;
    pub mod interaction;
    pub mod timeline_widget;
}

pub use error::{ConfigError, ThumbnailError, TimelineError};
pub use types::config::{Theme, TimelineConfig};
pub use types::media::{Clip, ClipKind};
pub use types::track::TrackKind;
pub use ui::interaction::{Modifiers, PointerButton, PointerEvent, TimelineEvent};
pub use ui::timeline_widget::{TimelineCallbacks, TimelineEngine};
