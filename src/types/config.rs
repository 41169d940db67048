use crate::error::{ConfigError, TimelineError};
use crate::types::media::ClipKind;
use crate::types::track::{TrackKind, default_tracks};
use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Construction parameters of a timeline instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub width: f32,
    pub height: f32,
    pub track_height: f32,
    pub ruler_height: f32,
    /// Pixels per second.
    pub time_scale: f32,
    pub tracks: Vec<TrackKind>,
    /// Snap distance in pixels.
    pub snap_threshold: f32,
    pub snapping_enabled: bool,
    /// Ruler scrubbing lands on whole frames of this rate.
    pub frame_rate: f64,
    /// Locked clips can still be selected but not dragged or trimmed.
    pub lock_blocks_interaction: bool,
    pub thumbnail_cache_size: usize,
    pub theme: Theme,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        TimelineConfig {
            width: 1200.0,
            height: 400.0,
            track_height: 60.0,
            ruler_height: 30.0,
            time_scale: 80.0,
            tracks: default_tracks(),
            snap_threshold: 15.0,
            snapping_enabled: true,
            frame_rate: 30.0,
            lock_blocks_interaction: false,
            thumbnail_cache_size: 64,
            theme: Theme::default(),
        }
    }
}

impl TimelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file at the given path.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        Self::from_json_str(&json)
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn validate(&self) -> Result<(), TimelineError> {
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(TimelineError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };
        positive("width", self.width)?;
        positive("height", self.height)?;
        positive("track_height", self.track_height)?;
        positive("time_scale", self.time_scale)?;
        if !self.ruler_height.is_finite() || self.ruler_height < 0.0 {
            return Err(TimelineError::InvalidConfig(format!(
                "ruler_height must not be negative, got {}",
                self.ruler_height
            )));
        }
        if self.tracks.is_empty() {
            return Err(TimelineError::InvalidConfig(
                "at least one track is required".to_string(),
            ));
        }
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(TimelineError::InvalidConfig(format!(
                "frame_rate must be positive, got {}",
                self.frame_rate
            )));
        }
        Ok(())
    }
}

/// RGBA colours used by the scene renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background: [u8; 4],
    pub ruler_background: [u8; 4],
    pub ruler_tick: [u8; 4],
    pub ruler_text: [u8; 4],
    pub track_video: [u8; 4],
    pub track_audio: [u8; 4],
    pub track_text: [u8; 4],
    pub track_graphics: [u8; 4],
    pub clip_video: [u8; 4],
    pub clip_audio: [u8; 4],
    pub clip_text: [u8; 4],
    pub clip_graphics: [u8; 4],
    pub clip_image: [u8; 4],
    pub clip_label: [u8; 4],
    pub accent: [u8; 4],
    pub playhead: [u8; 4],
    pub snap_guide: [u8; 4],
    pub tooltip_background: [u8; 4],
    pub tooltip_text: [u8; 4],
    pub waveform: [u8; 4],
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: [24, 24, 27, 255],
            ruler_background: [40, 40, 40, 255],
            ruler_tick: [150, 150, 150, 255],
            ruler_text: [230, 230, 230, 255],
            track_video: [36, 42, 56, 255],
            track_audio: [34, 50, 40, 255],
            track_text: [52, 44, 36, 255],
            track_graphics: [48, 36, 54, 255],
            clip_video: [100, 180, 255, 255],
            clip_audio: [180, 255, 100, 255],
            clip_text: [255, 200, 90, 255],
            clip_graphics: [210, 130, 255, 255],
            clip_image: [90, 220, 210, 255],
            clip_label: [10, 10, 10, 255],
            accent: [255, 180, 100, 255],
            playhead: [255, 60, 60, 255],
            snap_guide: [255, 230, 0, 255],
            tooltip_background: [20, 20, 20, 230],
            tooltip_text: [255, 255, 255, 255],
            waveform: [20, 60, 20, 200],
        }
    }
}

pub fn color32(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

impl Theme {
    pub fn track_color(&self, kind: TrackKind) -> Color32 {
        color32(match kind {
            TrackKind::Video => self.track_video,
            TrackKind::Audio => self.track_audio,
            TrackKind::Text => self.track_text,
            TrackKind::Graphics => self.track_graphics,
        })
    }

    pub fn clip_color(&self, kind: ClipKind) -> Color32 {
        color32(match kind {
            ClipKind::Video => self.clip_video,
            ClipKind::Audio => self.clip_audio,
            ClipKind::Text => self.clip_text,
            ClipKind::Graphics => self.clip_graphics,
            ClipKind::Image => self.clip_image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            TimelineConfig::from_json_str(r#"{ "time_scale": 120.0, "tracks": ["audio"] }"#)
                .unwrap();
        assert_eq!(config.time_scale, 120.0);
        assert_eq!(config.tracks, vec![TrackKind::Audio]);
        assert_eq!(config.track_height, 60.0);
        assert_eq!(config.snap_threshold, 15.0);
        assert!(config.snapping_enabled);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "track_height": 48.0, "snapping_enabled": false }}"#).unwrap();
        let config = TimelineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.track_height, 48.0);
        assert!(!config.snapping_enabled);
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = TimelineConfig::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        assert!(TimelineConfig::default().validate().is_ok());

        let config = TimelineConfig {
            time_scale: 0.0,
            ..TimelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(TimelineError::InvalidConfig(_))
        ));

        let config = TimelineConfig {
            tracks: Vec::new(),
            ..TimelineConfig::default()
        };
        assert!(config.validate().is_err());

        let config = TimelineConfig {
            width: f32::NAN,
            ..TimelineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
