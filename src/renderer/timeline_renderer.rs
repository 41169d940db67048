use crate::ops::geometry::{CoordinateMapper, format_ruler_label};
use crate::renderer::thumbnails::ThumbnailCache;
use crate::types::config::{Theme, color32};
use crate::types::media::{Clip, ClipKind, parse_hex_color};
use crate::types::session::{ResizeEdge, SessionOverlay};
use crate::types::timeline::ClipStore;
use crate::types::track::TrackKind;
use eframe::egui;

const CLIP_CORNER_RADIUS: f32 = 4.0;
const MINOR_TICK: f32 = 6.0;
const MID_TICK: f32 = 10.0;
const MAJOR_TICK: f32 = 16.0;
const LABEL_MIN_WIDTH: f32 = 40.0;
const WAVEFORM_BAR_SPACING: f32 = 3.0;
const WAVEFORM_BAR_WIDTH: f32 = 2.0;
const MAX_WAVEFORM_BARS: usize = 4096;
const MAX_THUMBNAIL_TILES: usize = 2048;
const MAX_RULER_TICKS: usize = 4096;
const PLAYHEAD_HANDLE: f32 = 12.0;
const TOOLTIP_CHAR_WIDTH: f32 = 6.5;
const TOOLTIP_HEIGHT: f32 = 18.0;

/// Everything the renderer reads. The scene is a pure function of this.
pub struct SceneInput<'a> {
    pub store: &'a ClipStore,
    pub mapper: &'a CoordinateMapper,
    pub tracks: &'a [TrackKind],
    pub viewport: egui::Vec2,
    /// Left edge of the visible part of the canvas, in pixels.
    pub scroll_x: f32,
    pub playhead: f64,
    pub overlay: &'a SessionOverlay,
    pub thumbnails: &'a ThumbnailCache,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Fill {
        rect: egui::Rect,
        color: egui::Color32,
    },
    TrackBand {
        index: usize,
        kind: TrackKind,
        rect: egui::Rect,
        color: egui::Color32,
    },
    RulerTick {
        x: f32,
        height: f32,
        label: Option<String>,
    },
    ClipBody {
        clip_id: String,
        rect: egui::Rect,
        color: egui::Color32,
    },
    ThumbnailTile {
        clip_id: String,
        url: String,
        rect: egui::Rect,
        uv: egui::Rect,
    },
    Waveform {
        clip_id: String,
        bars: Vec<egui::Rect>,
        color: egui::Color32,
    },
    ClipLabel {
        clip_id: String,
        rect: egui::Rect,
        text: String,
    },
    EffectBadge {
        clip_id: String,
        pos: egui::Pos2,
        text: String,
    },
    TransitionMarker {
        clip_id: String,
        points: [egui::Pos2; 3],
    },
    LockBadge {
        clip_id: String,
        pos: egui::Pos2,
    },
    SelectionOutline {
        clip_id: String,
        rect: egui::Rect,
    },
    SnapGuide {
        x: f32,
    },
    Playhead {
        x: f32,
        handle: egui::Rect,
    },
    Tooltip {
        rect: egui::Rect,
        text: String,
    },
}

/// Retained visual tree of the timeline, in draw order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub size: egui::Vec2,
    pub ruler_height: f32,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn paint(
        &self,
        painter: &egui::Painter,
        origin: egui::Pos2,
        theme: &Theme,
        thumbnails: &ThumbnailCache,
    ) {
        let offset = origin.to_vec2();
        let height = self.size.y;
        for node in &self.nodes {
            match node {
                SceneNode::Fill { rect, color } | SceneNode::TrackBand { rect, color, .. } => {
                    painter.rect_filled(rect.translate(offset), 0.0, *color);
                }
                SceneNode::RulerTick { x, height, label } => {
                    let bottom = origin.y + self.ruler_height;
                    let x = origin.x + x;
                    painter.line_segment(
                        [egui::pos2(x, bottom - height), egui::pos2(x, bottom)],
                        egui::Stroke::new(1.0, color32(theme.ruler_tick)),
                    );
                    if let Some(label) = label {
                        painter.text(
                            egui::pos2(x + 3.0, origin.y + 2.0),
                            egui::Align2::LEFT_TOP,
                            label,
                            egui::FontId::proportional(11.0),
                            color32(theme.ruler_text),
                        );
                    }
                }
                SceneNode::ClipBody { rect, color, .. } => {
                    painter.rect_filled(rect.translate(offset), CLIP_CORNER_RADIUS, *color);
                    painter.rect_stroke(
                        rect.translate(offset),
                        CLIP_CORNER_RADIUS,
                        egui::Stroke::new(1.0, egui::Color32::from_black_alpha(50)),
                        egui::StrokeKind::Inside,
                    );
                }
                SceneNode::ThumbnailTile { url, rect, uv, .. } => {
                    // Uploaded lazily; skip until the texture exists.
                    if let Some(texture) = thumbnails.info(url).and_then(|info| info.texture) {
                        painter.image(texture, rect.translate(offset), *uv, egui::Color32::WHITE);
                    }
                }
                SceneNode::Waveform { bars, color, .. } => {
                    for bar in bars {
                        painter.rect_filled(bar.translate(offset), 0.0, *color);
                    }
                }
                SceneNode::ClipLabel { rect, text, .. } => {
                    let rect = rect.translate(offset);
                    painter.with_clip_rect(rect).text(
                        rect.left_center() + egui::vec2(6.0, 0.0),
                        egui::Align2::LEFT_CENTER,
                        text,
                        egui::FontId::proportional(12.0),
                        color32(theme.clip_label),
                    );
                }
                SceneNode::EffectBadge { pos, text, .. } => {
                    painter.text(
                        *pos + offset,
                        egui::Align2::RIGHT_TOP,
                        text,
                        egui::FontId::monospace(10.0),
                        color32(theme.clip_label),
                    );
                }
                SceneNode::TransitionMarker { points, .. } => {
                    painter.add(egui::Shape::convex_polygon(
                        points.iter().map(|p| *p + offset).collect(),
                        egui::Color32::from_white_alpha(90),
                        egui::Stroke::NONE,
                    ));
                }
                SceneNode::LockBadge { pos, .. } => {
                    painter.text(
                        *pos + offset,
                        egui::Align2::RIGHT_BOTTOM,
                        "\u{1F512}",
                        egui::FontId::proportional(10.0),
                        color32(theme.clip_label),
                    );
                }
                SceneNode::SelectionOutline { rect, .. } => {
                    painter.rect_stroke(
                        rect.translate(offset),
                        CLIP_CORNER_RADIUS,
                        egui::Stroke::new(2.0, color32(theme.accent)),
                        egui::StrokeKind::Outside,
                    );
                }
                SceneNode::SnapGuide { x } => {
                    let x = origin.x + x;
                    painter.line_segment(
                        [egui::pos2(x, origin.y), egui::pos2(x, origin.y + height)],
                        egui::Stroke::new(1.0, color32(theme.snap_guide)),
                    );
                }
                SceneNode::Playhead { x, handle } => {
                    let x = origin.x + x;
                    painter.line_segment(
                        [egui::pos2(x, origin.y), egui::pos2(x, origin.y + height)],
                        egui::Stroke::new(2.0, color32(theme.playhead)),
                    );
                    painter.rect_filled(
                        handle.translate(offset),
                        PLAYHEAD_HANDLE / 2.0,
                        color32(theme.playhead),
                    );
                }
                SceneNode::Tooltip { rect, text } => {
                    let rect = rect.translate(offset);
                    painter.rect_filled(rect, 3.0, color32(theme.tooltip_background));
                    painter.text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        text,
                        egui::FontId::proportional(11.0),
                        color32(theme.tooltip_text),
                    );
                }
            }
        }
    }
}

pub struct SceneRenderer {
    pub theme: Theme,
}

impl SceneRenderer {
    pub fn new(theme: Theme) -> Self {
        Self { theme }
    }

    /// Builds the whole scene from scratch.
    pub fn build(&self, input: &SceneInput) -> Scene {
        let mapper = input.mapper;
        let content_width = input
            .viewport
            .x
            .max(mapper.time_to_pixel(input.store.total_duration()));
        let content_height = input.viewport.y.max(mapper.content_height());
        let mut nodes = Vec::new();

        nodes.push(SceneNode::Fill {
            rect: egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(content_width, content_height),
            ),
            color: color32(self.theme.background),
        });

        for (index, kind) in input.tracks.iter().enumerate() {
            nodes.push(SceneNode::TrackBand {
                index,
                kind: *kind,
                rect: egui::Rect::from_min_size(
                    egui::pos2(0.0, mapper.track_top(index)),
                    egui::vec2(content_width, mapper.track_height),
                ),
                color: self.theme.track_color(*kind),
            });
        }

        let visible = egui::Rangef::new(
            input.scroll_x.max(0.0),
            (input.scroll_x.max(0.0) + input.viewport.x).min(content_width),
        );
        self.push_ruler(&mut nodes, mapper, content_width, visible);

        for clip in input.store.iter() {
            self.push_clip(&mut nodes, clip, input);
        }

        if let Some(snap_time) = input.overlay.snap_time {
            nodes.push(SceneNode::SnapGuide {
                x: mapper.time_to_pixel(snap_time),
            });
        }

        let playhead_x = mapper.time_to_pixel(input.playhead);
        nodes.push(SceneNode::Playhead {
            x: playhead_x,
            handle: egui::Rect::from_center_size(
                egui::pos2(playhead_x, (mapper.ruler_height / 2.0).max(PLAYHEAD_HANDLE / 2.0)),
                egui::vec2(PLAYHEAD_HANDLE, PLAYHEAD_HANDLE),
            ),
        });

        if let (Some(tooltip), Some(preview)) = (&input.overlay.tooltip, &input.overlay.preview) {
            let clip_rect =
                mapper.span_rect(preview.start_time, preview.duration, preview.track_index);
            let text = tooltip.text();
            let size = egui::vec2(
                text.chars().count() as f32 * TOOLTIP_CHAR_WIDTH + 8.0,
                TOOLTIP_HEIGHT,
            );
            let anchor_x = match tooltip.edge {
                ResizeEdge::Left => clip_rect.left(),
                ResizeEdge::Right => clip_rect.right() - size.x,
            };
            let min = egui::pos2(anchor_x.max(0.0), (clip_rect.top() - size.y - 2.0).max(0.0));
            nodes.push(SceneNode::Tooltip {
                rect: egui::Rect::from_min_size(min, size),
                text,
            });
        }

        Scene {
            size: egui::vec2(content_width, content_height),
            ruler_height: mapper.ruler_height,
            nodes,
        }
    }

    /// Ruler background spans the whole canvas; ticks only the visible part.
    fn push_ruler(
        &self,
        nodes: &mut Vec<SceneNode>,
        mapper: &CoordinateMapper,
        width: f32,
        visible: egui::Rangef,
    ) {
        nodes.push(SceneNode::Fill {
            rect: egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(width, mapper.ruler_height),
            ),
            color: color32(self.theme.ruler_background),
        });
        let first_second = mapper.pixel_to_time(visible.min).ceil().max(0.0) as u64;
        let last_second = mapper.pixel_to_time(visible.max).floor().max(0.0) as u64;
        if last_second < first_second {
            return;
        }
        for second in (first_second..=last_second).take(MAX_RULER_TICKS) {
            let (height, label) = if second % 10 == 0 {
                (MAJOR_TICK, Some(format_ruler_label(second)))
            } else if second % 5 == 0 {
                (MID_TICK, None)
            } else {
                (MINOR_TICK, None)
            };
            nodes.push(SceneNode::RulerTick {
                x: mapper.time_to_pixel(second as f64),
                height: height.min(mapper.ruler_height),
                label,
            });
        }
    }

    fn push_clip(&self, nodes: &mut Vec<SceneNode>, clip: &Clip, input: &SceneInput) {
        let mapper = input.mapper;
        let rect = match &input.overlay.preview {
            Some(preview) if preview.clip_id == clip.id => {
                mapper.span_rect(preview.start_time, preview.duration, preview.track_index)
            }
            _ => mapper.clip_rect(clip),
        };
        let id = clip.id.clone();

        let mut color = parse_hex_color(&clip.color)
            .map(color32)
            .unwrap_or_else(|| self.theme.clip_color(clip.kind));
        if let Some(opacity) = clip.opacity {
            color = color.gamma_multiply(opacity);
        }
        nodes.push(SceneNode::ClipBody {
            clip_id: id.clone(),
            rect,
            color,
        });

        if let Some(url) = &clip.thumbnail_url {
            if let Some(info) = input.thumbnails.info(url) {
                for (tile, uv) in thumbnail_tiles(rect, info.size) {
                    nodes.push(SceneNode::ThumbnailTile {
                        clip_id: id.clone(),
                        url: url.clone(),
                        rect: tile,
                        uv,
                    });
                }
            }
        }

        if clip.kind == ClipKind::Audio {
            nodes.push(SceneNode::Waveform {
                clip_id: id.clone(),
                bars: waveform_bars(rect, clip.duration, clip.volume.unwrap_or(1.0)),
                color: color32(self.theme.waveform),
            });
        }

        if let Some(transitions) = &clip.transitions {
            if let Some(t) = &transitions.transition_in {
                let w = mapper.time_to_pixel(t.duration).min(rect.width());
                nodes.push(SceneNode::TransitionMarker {
                    clip_id: id.clone(),
                    points: [
                        rect.left_top(),
                        rect.left_top() + egui::vec2(w, 0.0),
                        rect.left_bottom(),
                    ],
                });
            }
            if let Some(t) = &transitions.transition_out {
                let w = mapper.time_to_pixel(t.duration).min(rect.width());
                nodes.push(SceneNode::TransitionMarker {
                    clip_id: id.clone(),
                    points: [
                        rect.right_top() - egui::vec2(w, 0.0),
                        rect.right_top(),
                        rect.right_bottom(),
                    ],
                });
            }
        }

        if rect.width() > LABEL_MIN_WIDTH {
            nodes.push(SceneNode::ClipLabel {
                clip_id: id.clone(),
                rect,
                text: clip.title.clone(),
            });
        }

        if !clip.effects.is_empty() {
            nodes.push(SceneNode::EffectBadge {
                clip_id: id.clone(),
                pos: rect.right_top() + egui::vec2(-4.0, 2.0),
                text: format!("fx {}", clip.effects.len()),
            });
        }

        if clip.locked {
            nodes.push(SceneNode::LockBadge {
                clip_id: id.clone(),
                pos: rect.right_bottom() + egui::vec2(-4.0, -2.0),
            });
        }

        if clip.selected {
            nodes.push(SceneNode::SelectionOutline { clip_id: id, rect });
        }
    }
}

/// Decorative amplitude in `0.08..=1.0` for bar `sample` of a clip.
///
/// This is a fixed function of the inputs and carries no audio information.
pub fn pseudo_waveform(sample: usize, duration: f64) -> f32 {
    let t = sample as f64;
    let a = (t * 0.35 + duration).sin() * 0.5
        + (t * 0.11 * (1.0 + duration.fract())).sin() * 0.3
        + (t * 1.7).sin() * 0.2;
    (a.abs() as f32).clamp(0.08, 1.0)
}

fn waveform_bars(rect: egui::Rect, duration: f64, volume: f32) -> Vec<egui::Rect> {
    let spacing = WAVEFORM_BAR_SPACING.max(rect.width() / MAX_WAVEFORM_BARS as f32);
    let count = (rect.width() / spacing).floor().max(0.0) as usize;
    let half_height = rect.height() / 2.0 - 2.0;
    let center_y = rect.center().y;
    (0..count)
        .map(|i| {
            let h = (pseudo_waveform(i, duration) * volume * half_height).max(1.0);
            let x = rect.left() + i as f32 * spacing;
            egui::Rect::from_min_max(
                egui::pos2(x, center_y - h),
                egui::pos2((x + WAVEFORM_BAR_WIDTH).min(rect.right()), center_y + h),
            )
        })
        .collect()
}

/// Repeats a bitmap of `size` across `rect`, cropping the last tile via UVs.
fn thumbnail_tiles(rect: egui::Rect, size: [usize; 2]) -> Vec<(egui::Rect, egui::Rect)> {
    if size[0] == 0 || size[1] == 0 || rect.width() <= 0.0 {
        return Vec::new();
    }
    let tile_width = rect.height() * size[0] as f32 / size[1] as f32;
    if tile_width < 1.0 {
        return Vec::new();
    }
    let mut tiles = Vec::new();
    let mut x = rect.left();
    while x < rect.right() && tiles.len() < MAX_THUMBNAIL_TILES {
        let width = tile_width.min(rect.right() - x);
        tiles.push((
            egui::Rect::from_min_size(egui::pos2(x, rect.top()), egui::vec2(width, rect.height())),
            egui::Rect::from_min_max(egui::Pos2::ZERO, egui::pos2(width / tile_width, 1.0)),
        ));
        x += tile_width;
    }
    tiles
}

/// Node lookups for assertions.
#[cfg(test)]
impl Scene {
    pub fn clip_rect(&self, id: &str) -> Option<egui::Rect> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::ClipBody { clip_id, rect, .. } if clip_id == id => Some(*rect),
            _ => None,
        })
    }

    pub fn is_outlined(&self, id: &str) -> bool {
        self.nodes.iter().any(
            |node| matches!(node, SceneNode::SelectionOutline { clip_id, .. } if clip_id == id),
        )
    }

    pub fn ticks(&self) -> impl Iterator<Item = (f32, f32, Option<&str>)> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::RulerTick { x, height, label } => Some((*x, *height, label.as_deref())),
            _ => None,
        })
    }

    pub fn track_bands(&self) -> impl Iterator<Item = (usize, egui::Rect)> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::TrackBand { index, rect, .. } => Some((*index, *rect)),
            _ => None,
        })
    }

    pub fn thumbnail_tiles(&self, id: &str) -> Vec<(egui::Rect, egui::Rect)> {
        self.nodes
            .iter()
            .filter_map(|node| match node {
                SceneNode::ThumbnailTile {
                    clip_id, rect, uv, ..
                } if clip_id == id => Some((*rect, *uv)),
                _ => None,
            })
            .collect()
    }

    pub fn waveform_bars(&self, id: &str) -> Option<&[egui::Rect]> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Waveform { clip_id, bars, .. } if clip_id == id => Some(bars.as_slice()),
            _ => None,
        })
    }

    pub fn playhead_x(&self) -> Option<f32> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Playhead { x, .. } => Some(*x),
            _ => None,
        })
    }

    pub fn snap_guide_x(&self) -> Option<f32> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::SnapGuide { x } => Some(*x),
            _ => None,
        })
    }

    pub fn tooltip(&self) -> Option<(egui::Rect, &str)> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Tooltip { rect, text } => Some((*rect, text.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::thumbnails::FileResolver;
    use crate::types::media::{Transition, TransitionKind, Transitions};
    use crate::types::session::{ClipPreview, ResizeTooltip};
    use std::sync::Arc;

    struct Fixture {
        store: ClipStore,
        mapper: CoordinateMapper,
        tracks: Vec<TrackKind>,
        overlay: SessionOverlay,
        thumbnails: ThumbnailCache,
        playhead: f64,
        scroll_x: f32,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                store: ClipStore::new(3),
                mapper: CoordinateMapper::new(80.0, 60.0, 30.0, 3),
                tracks: vec![TrackKind::Video, TrackKind::Audio, TrackKind::Text],
                overlay: SessionOverlay::default(),
                thumbnails: ThumbnailCache::new(4, Arc::new(FileResolver)),
                playhead: 0.0,
                scroll_x: 0.0,
            }
        }

        fn build(&self) -> Scene {
            SceneRenderer::new(Theme::default()).build(&SceneInput {
                store: &self.store,
                mapper: &self.mapper,
                tracks: &self.tracks,
                viewport: egui::vec2(800.0, 300.0),
                scroll_x: self.scroll_x,
                playhead: self.playhead,
                overlay: &self.overlay,
                thumbnails: &self.thumbnails,
            })
        }
    }

    #[test]
    fn test_clip_rect_at_scale_80() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Video, 0, 0.0, 5.0));
        let rect = f.build().clip_rect("a").unwrap();
        assert_eq!(rect.min.x, 0.0);
        assert_eq!(rect.width(), 400.0);
        assert_eq!(rect.height(), 50.0);
    }

    #[test]
    fn test_doubling_scale_doubles_geometry() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.5, 2.0));
        f.store.add_clip(Clip::new("b", ClipKind::Text, 2, 4.0, 3.0));
        let before = f.build();
        f.mapper.set_time_scale(160.0);
        let after = f.build();
        for id in ["a", "b"] {
            let (r0, r1) = (before.clip_rect(id).unwrap(), after.clip_rect(id).unwrap());
            assert_eq!(r1.min.x, r0.min.x * 2.0);
            assert_eq!(r1.width(), r0.width() * 2.0);
        }
    }

    #[test]
    fn test_build_is_idempotent() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Audio, 1, 0.5, 3.0));
        f.store.select("a");
        f.playhead = 2.0;
        assert_eq!(f.build(), f.build());
    }

    #[test]
    fn test_ruler_ticks() {
        let f = Fixture::new();
        let scene = f.build();
        let ticks: Vec<_> = scene.ticks().collect();
        // 800px at 80px/s covers seconds 0..=10
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0], (0.0, MAJOR_TICK, Some("00:00")));
        assert_eq!(ticks[1], (80.0, MINOR_TICK, None));
        assert_eq!(ticks[5], (400.0, MID_TICK, None));
        assert_eq!(ticks[10], (800.0, MAJOR_TICK, Some("00:10")));
    }

    #[test]
    fn test_ruler_follows_scroll_on_long_timelines() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Video, 0, 60.0, 5.0));
        assert_eq!(f.build().size.x, 65.0 * 80.0);
        f.scroll_x = 55.0 * 80.0;
        let scene = f.build();
        let ticks: Vec<_> = scene.ticks().collect();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks[0].0, 55.0 * 80.0);
        let labels: Vec<_> = scene.ticks().filter_map(|(_, _, l)| l).collect();
        assert_eq!(labels, vec!["01:00"]);
    }

    #[test]
    fn test_far_clip_does_not_grow_the_ruler() {
        let mut f = Fixture::new();
        f.store
            .add_clip(Clip::new("far", ClipKind::Video, 0, 2_000_000.0, 1.0));
        let scene = f.build();
        assert_eq!(scene.size.x, 2_000_001.0 * 80.0);
        assert_eq!(scene.ticks().count(), 11);
        assert!(scene.nodes.len() < 32);

        f.scroll_x = scene.size.x - 800.0;
        let scene = f.build();
        let ticks: Vec<_> = scene.ticks().collect();
        assert_eq!(ticks.len(), 11);
        assert_eq!(ticks.last().unwrap().0, 2_000_001.0 * 80.0);

        f.scroll_x = 0.0;
        f.mapper.set_time_scale(1.0);
        f.store
            .add_clip(Clip::new("farther", ClipKind::Video, 0, 1e8, 1.0));
        assert!(f.build().ticks().count() <= MAX_RULER_TICKS);
    }

    #[test]
    fn test_one_band_per_track() {
        let f = Fixture::new();
        let bands: Vec<_> = f.build().track_bands().collect();
        assert_eq!(bands.len(), 3);
        assert_eq!(bands[1].1.min.y, 90.0);
        assert_eq!(bands[1].1.height(), 60.0);
    }

    #[test]
    fn test_selected_clip_gets_outline() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Video, 0, 0.0, 2.0));
        f.store.add_clip(Clip::new("b", ClipKind::Video, 1, 0.0, 2.0));
        f.store.select("b");
        let scene = f.build();
        assert!(scene.is_outlined("b"));
        assert!(!scene.is_outlined("a"));
    }

    #[test]
    fn test_audio_clips_get_deterministic_waveform() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Audio, 1, 0.0, 3.0));
        f.store.add_clip(Clip::new("v", ClipKind::Video, 0, 0.0, 3.0));
        let scene = f.build();
        let bars = scene.waveform_bars("a").unwrap();
        assert_eq!(bars.len(), (240.0 / WAVEFORM_BAR_SPACING) as usize);
        let rect = scene.clip_rect("a").unwrap();
        assert!(bars.iter().all(|b| rect.contains_rect(*b)));
        assert!(scene.waveform_bars("v").is_none());
        assert_eq!(pseudo_waveform(7, 3.0), pseudo_waveform(7, 3.0));
        assert!((0..500).all(|i| (0.08..=1.0).contains(&pseudo_waveform(i, 12.5))));
    }

    #[test]
    fn test_thumbnail_tiles_cover_clip_edge_to_edge() {
        let rect = egui::Rect::from_min_size(egui::pos2(10.0, 35.0), egui::vec2(250.0, 50.0));
        // 16:9 at 50px tall -> ~88.9px per tile
        let tiles = thumbnail_tiles(rect, [16, 9]);
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0].0.left(), 10.0);
        assert!((tiles.last().unwrap().0.right() - rect.right()).abs() < 1e-3);
        assert_eq!(tiles[0].1.max.x, 1.0);
        assert!(tiles[2].1.max.x < 1.0);
        assert!(thumbnail_tiles(rect, [0, 9]).is_empty());
    }

    #[test]
    fn test_missing_thumbnail_renders_without_tiles() {
        let mut f = Fixture::new();
        f.store
            .add_clip(Clip::new("a", ClipKind::Video, 0, 0.0, 2.0).with_thumbnail("/nope.png"));
        f.thumbnails.request("/nope.png");
        let scene = f.build();
        assert!(scene.clip_rect("a").is_some());
        assert!(scene.thumbnail_tiles("a").is_empty());
    }

    #[test]
    fn test_playhead_follows_position() {
        let mut f = Fixture::new();
        f.playhead = 2.5;
        assert_eq!(f.build().playhead_x(), Some(200.0));
    }

    #[test]
    fn test_overlay_drives_preview_snap_guide_and_tooltip() {
        let mut f = Fixture::new();
        f.store.add_clip(Clip::new("a", ClipKind::Video, 0, 2.0, 5.0));
        let scene = f.build();
        assert!(scene.snap_guide_x().is_none());
        assert!(scene.tooltip().is_none());

        f.overlay = SessionOverlay {
            preview: Some(ClipPreview {
                clip_id: "a".to_string(),
                start_time: 2.0,
                duration: 7.0,
                track_index: 0,
            }),
            snap_time: Some(3.0),
            tooltip: Some(ResizeTooltip {
                edge: ResizeEdge::Right,
                start_time: 2.0,
                duration: 7.0,
            }),
        };
        let scene = f.build();
        assert_eq!(scene.clip_rect("a").unwrap().width(), 560.0);
        assert_eq!(scene.snap_guide_x(), Some(240.0));
        let (rect, text) = scene.tooltip().unwrap();
        assert_eq!(text, "Start 2.00s \u{2022} Dur 7.00s");
        assert!((rect.right() - 9.0 * 80.0).abs() < 1e-3);
        // store untouched
        assert_eq!(f.store.get("a").unwrap().duration, 5.0);
    }

    #[test]
    fn test_indicators_for_effects_transitions_and_lock() {
        let mut f = Fixture::new();
        let mut clip = Clip::new("a", ClipKind::Graphics, 2, 0.0, 4.0);
        clip.effects = vec!["blur".into(), "glow".into()];
        clip.locked = true;
        clip.transitions = Some(Transitions {
            transition_in: Some(Transition {
                kind: TransitionKind::Fade,
                duration: 0.5,
            }),
            transition_out: None,
        });
        f.store.add_clip(clip);
        let scene = f.build();
        let badges: Vec<_> = scene
            .nodes
            .iter()
            .filter_map(|n| match n {
                SceneNode::EffectBadge { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(badges, vec!["fx 2"]);
        let markers = scene
            .nodes
            .iter()
            .filter(|n| matches!(n, SceneNode::TransitionMarker { .. }))
            .count();
        assert_eq!(markers, 1);
        assert!(
            scene
                .nodes
                .iter()
                .any(|n| matches!(n, SceneNode::LockBadge { .. }))
        );
    }

    #[test]
    fn test_clip_color_falls_back_to_kind() {
        let mut f = Fixture::new();
        f.store
            .add_clip(Clip::new("a", ClipKind::Video, 0, 0.0, 1.0).with_color("#102030"));
        f.store
            .add_clip(Clip::new("b", ClipKind::Video, 1, 0.0, 1.0).with_color("teal-ish"));
        let scene = f.build();
        let color_of = |id: &str| {
            scene.nodes.iter().find_map(|n| match n {
                SceneNode::ClipBody { clip_id, color, .. } if clip_id == id => Some(*color),
                _ => None,
            })
        };
        assert_eq!(color_of("a"), Some(egui::Color32::from_rgb(16, 32, 48)));
        assert_eq!(
            color_of("b"),
            Some(Theme::default().clip_color(ClipKind::Video))
        );
    }
}
