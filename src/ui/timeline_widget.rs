use crate::error::TimelineError;
use crate::ops::geometry::CoordinateMapper;
use crate::ops::snapping::SnappingEngine;
use crate::renderer::thumbnails::{AssetResolver, FileResolver, ThumbnailCache};
use crate::renderer::time_player_bridge::TimelinePlayerBridge;
use crate::renderer::timeline_renderer::{Scene, SceneInput, SceneRenderer};
use crate::types::config::TimelineConfig;
use crate::types::media::Clip;
use crate::types::timeline::ClipStore;
use crate::ui::interaction::{
    InteractionContext, InteractionController, Modifiers, PointerButton, PointerEvent,
    TimelineEvent,
};
use eframe::egui;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

/// Host hooks. Every field is optional.
#[derive(Default)]
pub struct TimelineCallbacks {
    pub on_clip_select: Option<Box<dyn FnMut(&Clip)>>,
    pub on_clip_move: Option<Box<dyn FnMut(&Clip, f64, usize)>>,
    pub on_clip_resize: Option<Box<dyn FnMut(&Clip, f64)>>,
    pub on_playhead_move: Option<Box<dyn FnMut(f64)>>,
    pub on_zoom_change: Option<Box<dyn FnMut(f32)>>,
    pub on_context_menu: Option<Box<dyn FnMut(Option<&Clip>, f32, f32)>>,
}

impl TimelineCallbacks {
    fn dispatch(&mut self, event: &TimelineEvent) {
        match event {
            TimelineEvent::ClipSelected(clip) => {
                if let Some(cb) = &mut self.on_clip_select {
                    cb(clip);
                }
            }
            TimelineEvent::ClipMoved {
                clip,
                new_start_time,
                new_track_index,
            } => {
                if let Some(cb) = &mut self.on_clip_move {
                    cb(clip, *new_start_time, *new_track_index);
                }
            }
            TimelineEvent::ClipResized { clip, new_duration } => {
                if let Some(cb) = &mut self.on_clip_resize {
                    cb(clip, *new_duration);
                }
            }
            TimelineEvent::PlayheadMoved(time) => {
                if let Some(cb) = &mut self.on_playhead_move {
                    cb(*time);
                }
            }
            TimelineEvent::ContextMenu { clip, x, y } => {
                if let Some(cb) = &mut self.on_context_menu {
                    cb(clip.as_ref(), *x, *y);
                }
            }
            TimelineEvent::ZoomChanged(scale) => {
                if let Some(cb) = &mut self.on_zoom_change {
                    cb(*scale);
                }
            }
        }
    }
}

/// One timeline instance: clips, view state, pointer handling, playback and
/// the retained scene, behind the command surface a host editor drives.
pub struct TimelineEngine {
    config: TimelineConfig,
    store: ClipStore,
    mapper: CoordinateMapper,
    snapping: SnappingEngine,
    controller: InteractionController,
    player: TimelinePlayerBridge,
    renderer: SceneRenderer,
    thumbnails: ThumbnailCache,
    viewport: egui::Vec2,
    scroll_x: f32,
    scene: Scene,
    callbacks: TimelineCallbacks,
}

impl TimelineEngine {
    pub fn new(config: TimelineConfig, callbacks: TimelineCallbacks) -> Result<Self, TimelineError> {
        Self::with_resolver(config, callbacks, Arc::new(FileResolver))
    }

    pub fn with_resolver(
        config: TimelineConfig,
        callbacks: TimelineCallbacks,
        resolver: Arc<dyn AssetResolver>,
    ) -> Result<Self, TimelineError> {
        config.validate()?;
        let track_count = config.track_count();
        let mut engine = TimelineEngine {
            store: ClipStore::new(track_count),
            mapper: CoordinateMapper::new(
                config.time_scale,
                config.track_height,
                config.ruler_height,
                track_count,
            ),
            snapping: SnappingEngine::new(config.snapping_enabled, config.snap_threshold),
            controller: InteractionController::new(
                config.frame_rate,
                config.lock_blocks_interaction,
            ),
            player: TimelinePlayerBridge::new(),
            renderer: SceneRenderer::new(config.theme.clone()),
            thumbnails: ThumbnailCache::new(config.thumbnail_cache_size, resolver),
            viewport: egui::vec2(config.width, config.height),
            scroll_x: 0.0,
            scene: Scene::default(),
            callbacks,
            config,
        };
        engine.rebuild();
        info!(
            "timeline created: {} tracks, {}x{} at {} px/s",
            track_count,
            engine.viewport.x,
            engine.viewport.y,
            engine.mapper.time_scale()
        );
        Ok(engine)
    }

    /// Creates an engine for an eframe app. Fails when the app has no GPU
    /// surface to draw into.
    pub fn attach(
        cc: &eframe::CreationContext<'_>,
        config: TimelineConfig,
        callbacks: TimelineCallbacks,
    ) -> Result<Self, TimelineError> {
        if cc.gl.is_none() {
            return Err(TimelineError::NoRenderSurface);
        }
        Self::new(config, callbacks)
    }

    fn rebuild(&mut self) {
        let scene = self.renderer.build(&SceneInput {
            store: &self.store,
            mapper: &self.mapper,
            tracks: &self.config.tracks,
            viewport: self.viewport,
            scroll_x: self.scroll_x,
            playhead: self.player.position(),
            overlay: self.controller.overlay(),
            thumbnails: &self.thumbnails,
        });
        self.scene = scene;
    }

    fn request_thumbnail(&mut self, clip: &Clip) {
        if let Some(url) = &clip.thumbnail_url {
            self.thumbnails.request(url);
        }
    }

    pub fn add_clip(&mut self, clip: Clip) {
        self.request_thumbnail(&clip);
        self.store.add_clip(clip);
        self.rebuild();
    }

    pub fn remove_clip(&mut self, id: &str) {
        if self.store.remove_clip(id).is_some() {
            self.controller.forget_clip(id);
            self.rebuild();
        }
    }

    pub fn update_clip(&mut self, clip: Clip) {
        self.request_thumbnail(&clip);
        self.store.update_clip(clip);
        self.rebuild();
    }

    /// Moves the playhead without notifying the host.
    pub fn set_playhead_position(&mut self, time: f64) {
        self.player.seek(time);
        self.rebuild();
    }

    /// Returns the applied (clamped) scale.
    pub fn set_time_scale(&mut self, pixels_per_second: f32) -> f32 {
        let applied = self.mapper.set_time_scale(pixels_per_second);
        self.rebuild();
        self.callbacks
            .dispatch(&TimelineEvent::ZoomChanged(applied));
        applied
    }

    pub fn time_scale(&self) -> f32 {
        self.mapper.time_scale()
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) {
            debug!("ignoring non-finite viewport {width}x{height}");
            return;
        }
        self.viewport = egui::vec2(width.max(1.0), height.max(1.0));
        self.config.width = self.viewport.x;
        self.config.height = self.viewport.y;
        self.rebuild();
    }

    pub fn viewport(&self) -> egui::Vec2 {
        self.viewport
    }

    /// Tells the engine which part of the canvas is scrolled into view.
    pub fn set_scroll_offset(&mut self, x: f32) {
        let x = if x.is_finite() { x.max(0.0) } else { 0.0 };
        if x != self.scroll_x {
            self.scroll_x = x;
            self.rebuild();
        }
    }

    /// Clip under a canvas point.
    pub fn clip_at(&self, x: f32, y: f32) -> Option<&Clip> {
        self.store.clip_at(&self.mapper, egui::pos2(x, y))
    }

    pub fn get_clip(&self, id: &str) -> Option<&Clip> {
        self.store.get(id)
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.store.iter()
    }

    pub fn selected_clips(&self) -> Vec<&Clip> {
        self.store.selected_clips()
    }

    pub fn current_time(&self) -> f64 {
        self.player.position()
    }

    pub fn total_duration(&self) -> f64 {
        self.store.total_duration()
    }

    pub fn toggle_snapping(&mut self, enabled: bool) {
        self.snapping.enabled = enabled;
    }

    pub fn snapping_enabled(&self) -> bool {
        self.snapping.enabled
    }

    pub fn set_snap_threshold(&mut self, pixels: f32) {
        self.snapping.set_threshold(pixels);
    }

    pub fn snap_threshold(&self) -> f32 {
        self.snapping.threshold()
    }

    pub fn play(&mut self) {
        self.play_at(Instant::now());
    }

    pub fn play_at(&mut self, now: Instant) {
        let before = self.player.position();
        if self.player.start(now, self.store.total_duration()) {
            if self.player.position() != before {
                self.callbacks
                    .dispatch(&TimelineEvent::PlayheadMoved(self.player.position()));
            }
            self.rebuild();
        }
    }

    pub fn pause(&mut self) {
        self.player.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Drives time-based work: playback ticks and thumbnail loading.
    /// Returns true when the scene changed.
    pub fn update(&mut self, now: Instant) -> bool {
        self.thumbnails
            .sync(self.store.iter().filter_map(|c| c.thumbnail_url.as_deref()));
        let mut changed = self.thumbnails.poll();
        if let Some(position) = self.player.pump(now, self.store.total_duration()) {
            self.callbacks
                .dispatch(&TimelineEvent::PlayheadMoved(position));
            changed = true;
        }
        if changed {
            self.rebuild();
        }
        changed
    }

    /// Jumps to a fraction (0..=1) of the total duration.
    pub fn seek_overview(&mut self, fraction: f64) {
        if fraction.is_nan() {
            return;
        }
        let time = fraction.clamp(0.0, 1.0) * self.store.total_duration();
        self.player.seek(time);
        self.callbacks.dispatch(&TimelineEvent::PlayheadMoved(time));
        self.rebuild();
    }

    /// Feeds one pointer event (canvas coordinates) through the controller.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let mut ctx = InteractionContext {
            store: &mut self.store,
            mapper: &self.mapper,
            snapping: &self.snapping,
            playhead: self.player.position(),
        };
        let events = self.controller.handle(event, &mut ctx);
        for event in &events {
            if let TimelineEvent::PlayheadMoved(time) = event {
                self.player.seek(*time);
            }
            self.callbacks.dispatch(event);
        }
        self.rebuild();
    }

    pub fn is_interacting(&self) -> bool {
        !self.controller.is_idle()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Lays out, paints and feeds pointer input for one egui frame.
    pub fn show(&mut self, ui: &mut egui::Ui) -> egui::Response {
        self.update(Instant::now());
        self.thumbnails.upload(ui.ctx());

        let (rect, response) =
            ui.allocate_exact_size(self.scene.size, egui::Sense::click_and_drag());
        self.set_scroll_offset(ui.clip_rect().left() - rect.left());

        let (primary_pressed, secondary_pressed, released, moving, latest, alt) =
            ui.input(|i| {
                (
                    i.pointer.primary_pressed(),
                    i.pointer.secondary_pressed(),
                    i.pointer.primary_released(),
                    i.pointer.is_moving(),
                    i.pointer.latest_pos(),
                    i.modifiers.alt,
                )
            });
        if let Some(pointer) = latest {
            let pos = (pointer - rect.min).to_pos2();
            let modifiers = Modifiers { alt };
            if response.hovered() {
                if primary_pressed {
                    self.handle_pointer(PointerEvent::Down {
                        pos,
                        button: PointerButton::Primary,
                        modifiers,
                    });
                } else if secondary_pressed {
                    self.handle_pointer(PointerEvent::Down {
                        pos,
                        button: PointerButton::Secondary,
                        modifiers,
                    });
                }
            }
            if self.is_interacting() {
                if moving {
                    self.handle_pointer(PointerEvent::Move { pos });
                }
                if released {
                    let event = if rect.contains(pointer) {
                        PointerEvent::Up { pos }
                    } else {
                        PointerEvent::UpOutside { pos }
                    };
                    self.handle_pointer(event);
                }
            }
        }

        let painter = ui.painter_at(rect);
        self.scene
            .paint(&painter, rect.min, &self.renderer.theme, &self.thumbnails);

        if self.player.is_playing() || self.thumbnails.has_pending() {
            ui.ctx().request_repaint();
        }
        response
    }

    fn release(&mut self) {
        self.player.stop();
        self.controller.cancel();
        self.thumbnails.clear();
    }

    /// Stops playback and releases cached textures.
    pub fn destroy(mut self) {
        self.release();
        info!("timeline destroyed with {} clips", self.store.len());
    }
}
