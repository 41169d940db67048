//! Magnetic snapping for clip drags and trims.

use crate::types::timeline::ClipStore;

pub const DEFAULT_SNAP_THRESHOLD: f32 = 15.0;

/// What a snapped time landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Playhead,
    Origin,
    ClipStart,
    ClipEnd,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snap {
    pub time: f64,
    pub kind: SnapKind,
}

#[derive(Debug, Clone)]
pub struct SnappingEngine {
    pub enabled: bool,
    /// Snap distance in pixels, divided by the time scale when applied.
    threshold_px: f32,
}

impl SnappingEngine {
    pub fn new(enabled: bool, threshold_px: f32) -> Self {
        let mut engine = Self {
            enabled,
            threshold_px: DEFAULT_SNAP_THRESHOLD,
        };
        engine.set_threshold(threshold_px);
        engine
    }

    pub fn threshold(&self) -> f32 {
        self.threshold_px
    }

    /// Negative or non-finite values are clamped to zero, which disables
    /// snapping in practice.
    pub fn set_threshold(&mut self, pixels: f32) {
        self.threshold_px = if pixels.is_finite() {
            pixels.max(0.0)
        } else {
            0.0
        };
    }

    /// Threshold in seconds at the given scale.
    pub fn threshold_seconds(&self, time_scale: f32) -> f64 {
        self.threshold_px as f64 / time_scale as f64
    }

    /// Nearest snap target within the threshold, ignoring the edges of
    /// `exclude_clip`. Equal distances keep the first target found.
    pub fn snapped_time(
        &self,
        candidate: f64,
        exclude_clip: Option<&str>,
        store: &ClipStore,
        playhead: f64,
        time_scale: f32,
    ) -> Option<Snap> {
        if !self.enabled || time_scale <= 0.0 {
            return None;
        }
        let threshold = self.threshold_seconds(time_scale);

        let fixed = [
            Snap {
                time: playhead,
                kind: SnapKind::Playhead,
            },
            Snap {
                time: 0.0,
                kind: SnapKind::Origin,
            },
        ];
        let clip_edges = store
            .iter()
            .filter(|c| Some(c.id.as_str()) != exclude_clip)
            .flat_map(|c| {
                [
                    Snap {
                        time: c.start_time,
                        kind: SnapKind::ClipStart,
                    },
                    Snap {
                        time: c.end_time(),
                        kind: SnapKind::ClipEnd,
                    },
                ]
            });

        let mut best: Option<(Snap, f64)> = None;
        for target in fixed.into_iter().chain(clip_edges) {
            let distance = (candidate - target.time).abs();
            if distance >= threshold {
                continue;
            }
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((target, distance));
            }
        }
        best.map(|(snap, _)| snap)
    }
}

impl Default for SnappingEngine {
    fn default() -> Self {
        Self::new(true, DEFAULT_SNAP_THRESHOLD)
    }
}
