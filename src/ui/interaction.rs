use crate::ops::clip_ops::{duplicate_clip, moved_start, trim_left, trim_right};
use crate::ops::geometry::CoordinateMapper;
use crate::ops::snapping::SnappingEngine;
use crate::types::media::Clip;
use crate::types::session::{ClipPreview, ResizeEdge, ResizeTooltip, Session, SessionOverlay};
use crate::types::timeline::ClipStore;
use eframe::egui;
use log::debug;

/// Width of the grab zone at each end of a clip, in pixels.
pub const EDGE_HANDLE_WIDTH: f32 = 8.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
}

/// Pointer input in canvas coordinates (origin at the top-left of the ruler).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        pos: egui::Pos2,
        button: PointerButton,
        modifiers: Modifiers,
    },
    Move {
        pos: egui::Pos2,
    },
    Up {
        pos: egui::Pos2,
    },
    /// Button released after the pointer left the canvas.
    UpOutside {
        pos: egui::Pos2,
    },
}

/// What the host should hear about after a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    ClipSelected(Clip),
    ClipMoved {
        clip: Clip,
        new_start_time: f64,
        new_track_index: usize,
    },
    ClipResized {
        clip: Clip,
        new_duration: f64,
    },
    PlayheadMoved(f64),
    ContextMenu {
        clip: Option<Clip>,
        x: f32,
        y: f32,
    },
    ZoomChanged(f32),
}

/// Read/write view of the engine state a pointer event may touch.
pub struct InteractionContext<'a> {
    pub store: &'a mut ClipStore,
    pub mapper: &'a CoordinateMapper,
    pub snapping: &'a SnappingEngine,
    pub playhead: f64,
}

/// Pointer state machine: Idle, Dragging, Resizing or Scrubbing.
///
/// Store records are only written on pointer-up. Until then the session
/// lives in [`SessionOverlay`], which the renderer draws on top of the store.
#[derive(Debug, Clone)]
pub struct InteractionController {
    session: Option<Session>,
    overlay: SessionOverlay,
    frame_rate: f64,
    lock_blocks_interaction: bool,
}

impl InteractionController {
    pub fn new(frame_rate: f64, lock_blocks_interaction: bool) -> Self {
        Self {
            session: None,
            overlay: SessionOverlay::default(),
            frame_rate,
            lock_blocks_interaction,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn overlay(&self) -> &SessionOverlay {
        &self.overlay
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Drops a running session without committing it.
    pub fn cancel(&mut self) {
        self.session = None;
        self.overlay = SessionOverlay::default();
    }

    /// Forgets a session whose clip no longer exists.
    pub fn forget_clip(&mut self, id: &str) {
        if self.session.as_ref().and_then(Session::clip_id) == Some(id) {
            debug!("session on removed clip {id} dropped");
            self.cancel();
        }
    }

    pub fn handle(
        &mut self,
        event: PointerEvent,
        ctx: &mut InteractionContext,
    ) -> Vec<TimelineEvent> {
        match event {
            PointerEvent::Down {
                pos,
                button: PointerButton::Primary,
                modifiers,
            } => self.primary_down(pos, modifiers, ctx),
            PointerEvent::Down {
                pos,
                button: PointerButton::Secondary,
                ..
            } => self.secondary_down(pos, ctx),
            PointerEvent::Move { pos } => self.pointer_move(pos, ctx),
            PointerEvent::Up { .. } | PointerEvent::UpOutside { .. } => self.pointer_up(ctx),
        }
    }

    fn quantize(&self, time: f64) -> f64 {
        ((time.max(0.0) * self.frame_rate).round() / self.frame_rate).max(0.0)
    }

    fn primary_down(
        &mut self,
        pos: egui::Pos2,
        modifiers: Modifiers,
        ctx: &mut InteractionContext,
    ) -> Vec<TimelineEvent> {
        if self.session.is_some() {
            return Vec::new();
        }
        if pos.y < ctx.mapper.ruler_height {
            self.session = Some(Session::Scrubbing);
            let time = self.quantize(ctx.mapper.pixel_to_time(pos.x));
            debug!("scrubbing started at {time:.3}s");
            return vec![TimelineEvent::PlayheadMoved(time)];
        }

        let Some(hit) = ctx.store.clip_at(ctx.mapper, pos).cloned() else {
            ctx.store.clear_selection();
            return Vec::new();
        };

        let mut events = Vec::new();
        if let Some(selected) = ctx.store.select(&hit.id) {
            events.push(TimelineEvent::ClipSelected(selected.clone()));
        }
        if hit.locked && self.lock_blocks_interaction {
            debug!("clip {} is locked", hit.id);
            return events;
        }

        let rect = ctx.mapper.clip_rect(&hit);
        let edge = if pos.x - rect.left() <= EDGE_HANDLE_WIDTH {
            Some(ResizeEdge::Left)
        } else if rect.right() - pos.x <= EDGE_HANDLE_WIDTH {
            Some(ResizeEdge::Right)
        } else {
            None
        };

        let target = match edge {
            Some(edge) => {
                debug!("resizing {} from the {:?} edge", hit.id, edge);
                self.session = Some(Session::Resizing {
                    clip_id: hit.id.clone(),
                    edge,
                    origin: pos,
                    original_start_time: hit.start_time,
                    original_duration: hit.duration,
                });
                self.overlay.tooltip = Some(ResizeTooltip {
                    edge,
                    start_time: hit.start_time,
                    duration: hit.duration,
                });
                hit
            }
            None => {
                let target = if modifiers.alt {
                    let copy = duplicate_clip(&hit);
                    debug!("clip {} duplicated as {}", hit.id, copy.id);
                    ctx.store.add_clip(copy.clone());
                    if let Some(selected) = ctx.store.select(&copy.id) {
                        events.push(TimelineEvent::ClipSelected(selected.clone()));
                    }
                    copy
                } else {
                    hit
                };
                debug!("dragging {}", target.id);
                self.session = Some(Session::Dragging {
                    clip_id: target.id.clone(),
                    origin: pos,
                    original_start_time: target.start_time,
                    original_track: target.track_index,
                });
                target
            }
        };
        self.overlay.preview = Some(ClipPreview {
            clip_id: target.id,
            start_time: target.start_time,
            duration: target.duration,
            track_index: target.track_index,
        });
        events
    }

    fn secondary_down(
        &mut self,
        pos: egui::Pos2,
        ctx: &mut InteractionContext,
    ) -> Vec<TimelineEvent> {
        if self.session.is_some() {
            return Vec::new();
        }
        let hit = ctx.store.clip_at(ctx.mapper, pos).map(|c| c.id.clone());
        let mut events = Vec::new();
        let clip = match hit.and_then(|id| ctx.store.select(&id).cloned()) {
            Some(clip) => {
                events.push(TimelineEvent::ClipSelected(clip.clone()));
                Some(clip)
            }
            None => None,
        };
        events.push(TimelineEvent::ContextMenu {
            clip,
            x: pos.x,
            y: pos.y,
        });
        events
    }

    fn pointer_move(&mut self, pos: egui::Pos2, ctx: &mut InteractionContext) -> Vec<TimelineEvent> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let scale = ctx.mapper.time_scale();
        match session {
            Session::Scrubbing => {
                let time = self.quantize(ctx.mapper.pixel_to_time(pos.x));
                if time == ctx.playhead {
                    return Vec::new();
                }
                return vec![TimelineEvent::PlayheadMoved(time)];
            }
            Session::Dragging {
                clip_id,
                origin,
                original_start_time,
                ..
            } => {
                let Some(clip) = ctx.store.get(clip_id) else {
                    return Vec::new();
                };
                let delta = ctx.mapper.pixels_to_duration(pos.x - origin.x);
                let candidate = moved_start(*original_start_time, delta);
                let snap = ctx.snapping.snapped_time(
                    candidate,
                    Some(clip_id),
                    ctx.store,
                    ctx.playhead,
                    scale,
                );
                self.overlay.snap_time = snap.map(|s| s.time);
                self.overlay.preview = Some(ClipPreview {
                    clip_id: clip_id.clone(),
                    start_time: snap.map_or(candidate, |s| s.time),
                    duration: clip.duration,
                    track_index: ctx.mapper.point_to_time_track(pos).1,
                });
            }
            Session::Resizing {
                clip_id,
                edge,
                origin,
                original_start_time,
                original_duration,
            } => {
                let delta = ctx.mapper.pixels_to_duration(pos.x - origin.x);
                let Some(clip) = ctx.store.get(clip_id) else {
                    return Vec::new();
                };
                let (start_time, duration) = match edge {
                    ResizeEdge::Left => {
                        let candidate = moved_start(*original_start_time, delta);
                        let snap = ctx.snapping.snapped_time(
                            candidate,
                            Some(clip_id),
                            ctx.store,
                            ctx.playhead,
                            scale,
                        );
                        self.overlay.snap_time = snap.map(|s| s.time);
                        trim_left(
                            *original_start_time,
                            *original_duration,
                            snap.map_or(candidate, |s| s.time),
                        )
                    }
                    ResizeEdge::Right => (
                        *original_start_time,
                        trim_right(*original_duration, delta),
                    ),
                };
                self.overlay.tooltip = Some(ResizeTooltip {
                    edge: *edge,
                    start_time,
                    duration,
                });
                self.overlay.preview = Some(ClipPreview {
                    clip_id: clip_id.clone(),
                    start_time,
                    duration,
                    track_index: clip.track_index,
                });
            }
        }
        Vec::new()
    }

    fn pointer_up(&mut self, ctx: &mut InteractionContext) -> Vec<TimelineEvent> {
        let session = self.session.take();
        let overlay = std::mem::take(&mut self.overlay);
        let (Some(session), Some(preview)) = (session, overlay.preview) else {
            return Vec::new();
        };
        let Some(clip) = ctx
            .store
            .commit_geometry(
                &preview.clip_id,
                preview.start_time,
                preview.duration,
                preview.track_index,
            )
            .cloned()
        else {
            return Vec::new();
        };
        match session {
            Session::Dragging { .. } => {
                debug!(
                    "clip {} moved to {:.3}s on track {}",
                    clip.id, clip.start_time, clip.track_index
                );
                vec![TimelineEvent::ClipMoved {
                    new_start_time: clip.start_time,
                    new_track_index: clip.track_index,
                    clip,
                }]
            }
            Session::Resizing { .. } => {
                debug!(
                    "clip {} resized to {:.3}s at {:.3}s",
                    clip.id, clip.duration, clip.start_time
                );
                vec![TimelineEvent::ClipResized {
                    new_duration: clip.duration,
                    clip,
                }]
            }
            Session::Scrubbing => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::media::ClipKind;

    const SCALE: f32 = 80.0;

    struct Harness {
        store: ClipStore,
        mapper: CoordinateMapper,
        snapping: SnappingEngine,
        playhead: f64,
        controller: InteractionController,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                store: ClipStore::new(4),
                mapper: CoordinateMapper::new(SCALE, 60.0, 30.0, 4),
                snapping: SnappingEngine::default(),
                playhead: 20.0,
                controller: InteractionController::new(30.0, false),
            }
        }

        fn send(&mut self, event: PointerEvent) -> Vec<TimelineEvent> {
            let mut ctx = InteractionContext {
                store: &mut self.store,
                mapper: &self.mapper,
                snapping: &self.snapping,
                playhead: self.playhead,
            };
            let events = self.controller.handle(event, &mut ctx);
            for event in &events {
                if let TimelineEvent::PlayheadMoved(t) = event {
                    self.playhead = *t;
                }
            }
            events
        }

        fn down(&mut self, x: f32, y: f32) -> Vec<TimelineEvent> {
            self.send(PointerEvent::Down {
                pos: egui::pos2(x, y),
                button: PointerButton::Primary,
                modifiers: Modifiers::default(),
            })
        }

        fn drag(&mut self, from: (f32, f32), to: (f32, f32)) -> Vec<TimelineEvent> {
            self.down(from.0, from.1);
            self.send(PointerEvent::Move {
                pos: egui::pos2(to.0, to.1),
            });
            self.send(PointerEvent::Up {
                pos: egui::pos2(to.0, to.1),
            })
        }
    }

    // track 0 band spans y 30..90
    const TRACK0_Y: f32 = 60.0;
    const TRACK1_Y: f32 = 120.0;

    #[test]
    fn test_drag_snaps_to_neighbour_start() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 3.0, 2.0));
        h.store.add_clip(Clip::new("b", ClipKind::Video, 1, 8.0, 1.0));
        // grab b in the middle (8.5s) and move it left by 4.85s -> 3.15s
        let grab = 8.5 * SCALE;
        let events = h.drag((grab, TRACK1_Y), (grab - 388.0, TRACK1_Y));
        match events.as_slice() {
            [TimelineEvent::ClipMoved {
                clip,
                new_start_time,
                new_track_index,
            }] => {
                assert_eq!(clip.id, "b");
                assert_eq!(*new_start_time, 3.0);
                assert_eq!(*new_track_index, 1);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(h.store.get("b").unwrap().start_time, 3.0);
        assert!(h.controller.overlay().is_empty());
        assert!(h.controller.is_idle());
    }

    #[test]
    fn test_drag_moves_across_tracks_and_clamps() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        h.snapping.enabled = false;
        // far left and far below the last track
        h.drag((2.0 * SCALE, TRACK0_Y), (-500.0, 5000.0));
        let a = h.store.get("a").unwrap();
        assert_eq!(a.start_time, 0.0);
        assert_eq!(a.track_index, 3);
    }

    #[test]
    fn test_drag_is_visual_only_until_release() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        h.snapping.enabled = false;
        h.down(2.0 * SCALE, TRACK0_Y);
        let events = h.send(PointerEvent::Move {
            pos: egui::pos2(6.0 * SCALE, TRACK1_Y),
        });
        assert!(events.is_empty());
        assert_eq!(h.store.get("a").unwrap().start_time, 1.0);
        let preview = h.controller.overlay().preview.clone().unwrap();
        assert_eq!(preview.start_time, 5.0);
        assert_eq!(preview.track_index, 1);

        let events = h.send(PointerEvent::UpOutside {
            pos: egui::pos2(6.0 * SCALE, TRACK1_Y),
        });
        assert!(matches!(events[0], TimelineEvent::ClipMoved { .. }));
        assert_eq!(h.store.get("a").unwrap().start_time, 5.0);
    }

    #[test]
    fn test_snap_indicator_follows_snapping() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 3.0, 2.0));
        h.store.add_clip(Clip::new("b", ClipKind::Video, 1, 8.0, 1.0));
        h.down(8.5 * SCALE, TRACK1_Y);
        h.send(PointerEvent::Move {
            pos: egui::pos2(3.65 * SCALE, TRACK1_Y),
        });
        assert_eq!(h.controller.overlay().snap_time, Some(3.0));
        h.send(PointerEvent::Move {
            pos: egui::pos2(6.5 * SCALE, TRACK1_Y),
        });
        assert_eq!(h.controller.overlay().snap_time, None);
    }

    #[test]
    fn test_resize_right_edge() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("c", ClipKind::Video, 0, 2.0, 5.0));
        let right = 7.0 * SCALE - 2.0;
        h.down(right, TRACK0_Y);
        h.send(PointerEvent::Move {
            pos: egui::pos2(right + 2.0 * SCALE, TRACK0_Y),
        });
        let tooltip = h.controller.overlay().tooltip.clone().unwrap();
        assert_eq!(tooltip.text(), "Start 2.00s \u{2022} Dur 7.00s");
        let events = h.send(PointerEvent::Up {
            pos: egui::pos2(right + 2.0 * SCALE, TRACK0_Y),
        });
        match events.as_slice() {
            [TimelineEvent::ClipResized { clip, new_duration }] => {
                assert_eq!(clip.start_time, 2.0);
                assert_eq!(*new_duration, 7.0);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(h.controller.overlay().tooltip.is_none());
    }

    #[test]
    fn test_resize_left_edge_keeps_end() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("c", ClipKind::Video, 0, 2.0, 5.0));
        let left = 2.0 * SCALE + 2.0;
        h.drag((left, TRACK0_Y), (left + SCALE, TRACK0_Y));
        let c = h.store.get("c").unwrap();
        assert_eq!(c.start_time, 3.0);
        assert_eq!(c.duration, 4.0);
        assert_eq!(c.end_time(), 7.0);
    }

    #[test]
    fn test_resize_left_edge_snaps_start_and_keeps_end() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("n", ClipKind::Video, 1, 0.0, 3.1));
        h.store.add_clip(Clip::new("c", ClipKind::Video, 0, 2.0, 5.0));
        let left = 2.0 * SCALE + 2.0;
        h.down(left, TRACK0_Y);
        // 1s to the right lands at 3.0s, 8px from n's end
        h.send(PointerEvent::Move {
            pos: egui::pos2(left + SCALE, TRACK0_Y),
        });
        let overlay = h.controller.overlay();
        assert_eq!(overlay.snap_time, Some(3.1));
        let preview = overlay.preview.as_ref().unwrap();
        assert_eq!(preview.start_time, 3.1);
        assert!((preview.start_time + preview.duration - 7.0).abs() < 1e-9);
        assert_eq!(h.store.get("c").unwrap().start_time, 2.0);

        let events = h.send(PointerEvent::Up {
            pos: egui::pos2(left + SCALE, TRACK0_Y),
        });
        assert!(matches!(
            events.as_slice(),
            [TimelineEvent::ClipResized { clip, .. }] if clip.id == "c"
        ));
        let c = h.store.get("c").unwrap();
        assert_eq!(c.start_time, 3.1);
        assert!((c.end_time() - 7.0).abs() < 1e-9);
        assert!(h.controller.overlay().snap_time.is_none());

        // the playhead is a target too
        h.playhead = 4.45;
        h.store.add_clip(Clip::new("d", ClipKind::Video, 2, 5.0, 2.0));
        let left = 5.0 * SCALE + 2.0;
        h.down(left, 180.0);
        h.send(PointerEvent::Move {
            pos: egui::pos2(left - 40.0, 180.0),
        });
        assert_eq!(h.controller.overlay().snap_time, Some(4.45));
        h.send(PointerEvent::Up {
            pos: egui::pos2(left - 40.0, 180.0),
        });
        let d = h.store.get("d").unwrap();
        assert_eq!(d.start_time, 4.45);
        assert!((d.end_time() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_resize_never_below_minimum() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("c", ClipKind::Video, 0, 2.0, 5.0));
        let right = 7.0 * SCALE - 2.0;
        h.drag((right, TRACK0_Y), (0.0, TRACK0_Y));
        assert!((h.store.get("c").unwrap().duration - 0.1).abs() < 1e-9);

        h.store.add_clip(Clip::new("d", ClipKind::Video, 1, 2.0, 5.0));
        let left = 2.0 * SCALE + 2.0;
        h.drag((left, TRACK1_Y), (left + 50.0 * SCALE, TRACK1_Y));
        let d = h.store.get("d").unwrap();
        assert!((d.duration - 0.1).abs() < 1e-9);
        assert!((d.end_time() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_click_selects_and_empty_click_clears() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        let events = h.down(2.0 * SCALE, TRACK0_Y);
        assert!(matches!(&events[0], TimelineEvent::ClipSelected(c) if c.id == "a" && c.selected));
        h.send(PointerEvent::Up {
            pos: egui::pos2(2.0 * SCALE, TRACK0_Y),
        });
        assert_eq!(h.store.selected_id(), Some("a"));

        let events = h.down(9.0 * SCALE, TRACK0_Y);
        assert!(events.is_empty());
        assert_eq!(h.store.selected_id(), None);
    }

    #[test]
    fn test_alt_drag_duplicates() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        h.snapping.enabled = false;
        let events = h.send(PointerEvent::Down {
            pos: egui::pos2(2.0 * SCALE, TRACK0_Y),
            button: PointerButton::Primary,
            modifiers: Modifiers { alt: true },
        });
        assert_eq!(events.len(), 2);
        assert_eq!(h.store.len(), 2);
        let copy_id = h.store.selected_id().unwrap().to_string();
        assert_ne!(copy_id, "a");
        assert!((h.store.get(&copy_id).unwrap().start_time - 1.1).abs() < 1e-9);

        h.send(PointerEvent::Move {
            pos: egui::pos2(5.0 * SCALE, TRACK0_Y),
        });
        h.send(PointerEvent::Up {
            pos: egui::pos2(5.0 * SCALE, TRACK0_Y),
        });
        assert_eq!(h.store.get("a").unwrap().start_time, 1.0);
        assert!((h.store.get(&copy_id).unwrap().start_time - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_right_click_reports_context_menu() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        let events = h.send(PointerEvent::Down {
            pos: egui::pos2(2.0 * SCALE, TRACK0_Y),
            button: PointerButton::Secondary,
            modifiers: Modifiers::default(),
        });
        assert!(matches!(
            events.last(),
            Some(TimelineEvent::ContextMenu { clip: Some(c), x, .. }) if c.id == "a" && *x == 160.0
        ));
        assert!(h.controller.is_idle());

        let events = h.send(PointerEvent::Down {
            pos: egui::pos2(9.0 * SCALE, TRACK0_Y),
            button: PointerButton::Secondary,
            modifiers: Modifiers::default(),
        });
        assert_eq!(
            events,
            vec![TimelineEvent::ContextMenu {
                clip: None,
                x: 720.0,
                y: TRACK0_Y
            }]
        );
    }

    #[test]
    fn test_ruler_scrub_quantizes_to_frames() {
        let mut h = Harness::new();
        // 1.01s is not a frame boundary at 30fps
        let events = h.down(1.01 * SCALE, 10.0);
        assert_eq!(events, vec![TimelineEvent::PlayheadMoved(1.0)]);
        h.send(PointerEvent::Move {
            pos: egui::pos2(2.5 * SCALE, 10.0),
        });
        assert_eq!(h.playhead, 2.5);
        let events = h.send(PointerEvent::Up {
            pos: egui::pos2(2.5 * SCALE, 10.0),
        });
        assert!(events.is_empty());
        assert!(h.controller.is_idle());
    }

    #[test]
    fn test_locked_clip_gating_is_opt_in() {
        let mut h = Harness::new();
        let mut clip = Clip::new("a", ClipKind::Video, 0, 1.0, 2.0);
        clip.locked = true;
        h.store.add_clip(clip);
        h.snapping.enabled = false;
        h.drag((2.0 * SCALE, TRACK0_Y), (4.0 * SCALE, TRACK0_Y));
        assert_eq!(h.store.get("a").unwrap().start_time, 3.0);

        h.controller = InteractionController::new(30.0, true);
        let events = h.drag((4.0 * SCALE, TRACK0_Y), (6.0 * SCALE, TRACK0_Y));
        assert_eq!(events.len(), 0);
        assert_eq!(h.store.get("a").unwrap().start_time, 3.0);
        assert_eq!(h.store.selected_id(), Some("a"));
    }

    #[test]
    fn test_no_nested_sessions() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        h.down(2.0 * SCALE, TRACK0_Y);
        let first = h.controller.session().cloned();
        h.down(10.0, 10.0);
        assert_eq!(h.controller.session().cloned(), first);
    }

    #[test]
    fn test_forget_clip_cancels_session() {
        let mut h = Harness::new();
        h.store.add_clip(Clip::new("a", ClipKind::Video, 0, 1.0, 2.0));
        h.down(2.0 * SCALE, TRACK0_Y);
        h.store.remove_clip("a");
        h.controller.forget_clip("a");
        assert!(h.controller.is_idle());
        assert!(h.controller.overlay().is_empty());
    }
}
