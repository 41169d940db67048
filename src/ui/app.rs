use crate::error::TimelineError;
use crate::ops::geometry::format_time;
use crate::types::config::{TimelineConfig, color32};
use crate::types::media::{Clip, ClipKind, Transition, TransitionKind, Transitions};
use crate::ui::timeline_widget::{TimelineCallbacks, TimelineEngine};
use eframe::egui;
use std::cell::RefCell;
use std::rc::Rc;

const MAX_LOG_LINES: usize = 200;
const OVERVIEW_HEIGHT: f32 = 18.0;

/// What the timeline callbacks report back to the app between frames.
#[derive(Default)]
struct HostState {
    activity: Vec<String>,
    context_menu: Option<(Option<String>, egui::Pos2)>,
}

impl HostState {
    fn log(&mut self, line: String) {
        log::debug!("{line}");
        self.activity.push(line);
        if self.activity.len() > MAX_LOG_LINES {
            self.activity.remove(0);
        }
    }
}

enum Action {
    Select(String),
    Remove(String),
    PickThumbnail(String),
}

pub struct TimelineDemoApp {
    engine: TimelineEngine,
    host: Rc<RefCell<HostState>>,
    canvas_origin: egui::Pos2,
}

impl TimelineDemoApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: TimelineConfig) -> Result<Self, TimelineError> {
        let host = Rc::new(RefCell::new(HostState::default()));
        let mut engine = TimelineEngine::attach(cc, config, callbacks(&host))?;
        for clip in sample_clips() {
            engine.add_clip(clip);
        }
        Ok(Self {
            engine,
            host,
            canvas_origin: egui::Pos2::ZERO,
        })
    }

    fn transport_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("\u{23EE}").clicked() {
                self.engine.set_playhead_position(0.0);
            }
            let label = if self.engine.is_playing() { "Pause" } else { "Play" };
            if ui.button(label).clicked() {
                if self.engine.is_playing() {
                    self.engine.pause();
                } else {
                    self.engine.play();
                }
            }
            ui.monospace(format!(
                "{} / {}",
                format_time(self.engine.current_time()),
                format_time(self.engine.total_duration())
            ));
            ui.separator();

            let mut scale = self.engine.time_scale();
            if ui
                .add(
                    egui::Slider::new(&mut scale, 10.0..=400.0)
                        .logarithmic(true)
                        .text("px/s"),
                )
                .changed()
            {
                self.engine.set_time_scale(scale);
            }

            let mut snapping = self.engine.snapping_enabled();
            if ui.checkbox(&mut snapping, "Snap").changed() {
                self.engine.toggle_snapping(snapping);
            }
            let mut threshold = self.engine.snap_threshold();
            if ui
                .add(egui::DragValue::new(&mut threshold).range(0.0..=60.0).suffix(" px"))
                .changed()
            {
                self.engine.set_snap_threshold(threshold);
            }
        });
    }

    /// Thin strip showing the whole timeline; clicking seeks.
    fn overview(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(width, OVERVIEW_HEIGHT), egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let theme = &self.engine.config().theme;
        painter.rect_filled(rect, 2.0, color32(theme.ruler_background));

        let total = self.engine.total_duration();
        if total > 0.0 {
            let track_count = self.engine.config().track_count().max(1) as f32;
            let lane = rect.height() / track_count;
            let to_x = |t: f64| rect.left() + (t / total) as f32 * rect.width();
            for clip in self.engine.clips() {
                let top = rect.top() + clip.track_index as f32 * lane;
                let clip_rect = egui::Rect::from_min_max(
                    egui::pos2(to_x(clip.start_time), top),
                    egui::pos2(to_x(clip.end_time()), top + lane),
                );
                painter.rect_filled(clip_rect, 0.0, theme.clip_color(clip.kind));
            }
            let x = to_x(self.engine.current_time());
            painter.line_segment(
                [egui::pos2(x, rect.top()), egui::pos2(x, rect.bottom())],
                egui::Stroke::new(2.0, color32(theme.playhead)),
            );
        }

        if response.clicked() || response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.engine
                    .seek_overview(((pos.x - rect.left()) / rect.width()) as f64);
            }
        }
    }

    fn clip_table(&self, ui: &mut egui::Ui, actions: &mut Vec<Action>) {
        let tracks = &self.engine.config().tracks;
        egui_extras::TableBuilder::new(ui)
            .striped(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(egui_extras::Column::remainder()) // Title
            .column(egui_extras::Column::auto()) // Kind
            .column(egui_extras::Column::auto()) // Track
            .column(egui_extras::Column::auto()) // Start
            .column(egui_extras::Column::auto()) // Duration
            .column(egui_extras::Column::auto()) // Remove
            .header(20.0, |mut header| {
                for title in ["Title", "Kind", "Track", "Start", "Dur", ""] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for clip in self.engine.clips() {
                    body.row(22.0, |mut row| {
                        row.col(|ui| {
                            if ui.selectable_label(clip.selected, &clip.title).clicked() {
                                actions.push(Action::Select(clip.id.clone()));
                            }
                        });
                        row.col(|ui| {
                            ui.label(format!("{:?}", clip.kind));
                        });
                        row.col(|ui| {
                            let lane = tracks.get(clip.track_index).map_or("?", |k| k.label());
                            ui.label(format!("{} {lane}", clip.track_index));
                        });
                        row.col(|ui| {
                            ui.monospace(format!("{:.2}", clip.start_time));
                        });
                        row.col(|ui| {
                            ui.monospace(format!("{:.2}", clip.duration));
                        });
                        row.col(|ui| {
                            if ui.small_button("\u{2715}").clicked() {
                                actions.push(Action::Remove(clip.id.clone()));
                            }
                        });
                    });
                }
            });
    }

    fn context_menu(&mut self, ctx: &egui::Context, actions: &mut Vec<Action>) {
        let Some((clip_id, pos)) = self.host.borrow().context_menu.clone() else {
            return;
        };
        let mut close = false;
        egui::Area::new(egui::Id::new("timeline_context_menu"))
            .fixed_pos(self.canvas_origin + pos.to_vec2())
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| match &clip_id {
                    Some(id) => {
                        if ui.button("Set thumbnail\u{2026}").clicked() {
                            actions.push(Action::PickThumbnail(id.clone()));
                            close = true;
                        }
                        if ui.button("Remove").clicked() {
                            actions.push(Action::Remove(id.clone()));
                            close = true;
                        }
                    }
                    None => {
                        ui.label("No clip here");
                        if ui.button("Close").clicked() {
                            close = true;
                        }
                    }
                });
            });
        if close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.host.borrow_mut().context_menu = None;
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Select(id) => {
                if let Some(clip) = self.engine.get_clip(&id).cloned() {
                    self.engine.update_clip(Clip {
                        selected: true,
                        ..clip
                    });
                }
            }
            Action::Remove(id) => {
                self.engine.remove_clip(&id);
                self.host.borrow_mut().log(format!("removed {id}"));
            }
            Action::PickThumbnail(id) => {
                let Some(clip) = self.engine.get_clip(&id).cloned() else {
                    return;
                };
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Images", &["png", "jpg", "jpeg"])
                    .pick_file()
                {
                    let url = format!("file://{}", path.display());
                    self.host
                        .borrow_mut()
                        .log(format!("thumbnail for {id}: {url}"));
                    self.engine.update_clip(clip.with_thumbnail(url));
                }
            }
        }
    }
}

impl eframe::App for TimelineDemoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut actions = Vec::new();

        egui::TopBottomPanel::top("transport_panel").show(ctx, |ui| {
            self.transport_bar(ui);
            self.overview(ui);
        });

        egui::SidePanel::right("inspector_panel")
            .default_width(360.0)
            .show(ctx, |ui| {
                ui.heading("Clips");
                self.clip_table(ui, &mut actions);
                ui.separator();
                ui.heading("Activity");
                egui::ScrollArea::vertical()
                    .id_salt("activity_log")
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for line in &self.host.borrow().activity {
                            ui.monospace(line);
                        }
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            if available != self.engine.viewport() {
                self.engine.resize(available.x, available.y);
            }
            egui::ScrollArea::both()
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    let response = self.engine.show(ui);
                    self.canvas_origin = response.rect.min;
                });
        });

        self.context_menu(ctx, &mut actions);
        for action in actions {
            self.apply(action);
        }
    }
}

fn callbacks(host: &Rc<RefCell<HostState>>) -> TimelineCallbacks {
    let h = Rc::clone(host);
    let on_clip_select = Box::new(move |clip: &Clip| {
        h.borrow_mut().log(format!("selected {}", clip.title));
    });
    let h = Rc::clone(host);
    let on_clip_move = Box::new(move |clip: &Clip, start: f64, track: usize| {
        h.borrow_mut().log(format!(
            "moved {} to {} on track {track}",
            clip.title,
            format_time(start)
        ));
    });
    let h = Rc::clone(host);
    let on_clip_resize = Box::new(move |clip: &Clip, duration: f64| {
        h.borrow_mut().log(format!(
            "resized {} to {duration:.2}s from {}",
            clip.title,
            format_time(clip.start_time)
        ));
    });
    let h = Rc::clone(host);
    let on_zoom_change = Box::new(move |scale: f32| {
        h.borrow_mut().log(format!("zoom {scale:.0} px/s"));
    });
    let h = Rc::clone(host);
    let on_context_menu = Box::new(move |clip: Option<&Clip>, x: f32, y: f32| {
        let mut host = h.borrow_mut();
        host.context_menu = Some((clip.map(|c| c.id.clone()), egui::pos2(x, y)));
    });
    TimelineCallbacks {
        on_clip_select: Some(on_clip_select),
        on_clip_move: Some(on_clip_move),
        on_clip_resize: Some(on_clip_resize),
        on_playhead_move: None,
        on_zoom_change: Some(on_zoom_change),
        on_context_menu: Some(on_context_menu),
    }
}

fn sample_clips() -> Vec<Clip> {
    let mut intro = Clip::new("intro", ClipKind::Video, 0, 0.0, 6.0).with_title("Intro");
    intro.transitions = Some(Transitions {
        transition_in: Some(Transition {
            kind: TransitionKind::Fade,
            duration: 1.0,
        }),
        transition_out: None,
    });
    let mut interview = Clip::new("interview", ClipKind::Video, 0, 6.0, 12.0)
        .with_title("Interview")
        .with_color("#5a8dee");
    interview.effects = vec!["color-grade".to_string()];
    let broll = Clip::new("broll", ClipKind::Image, 1, 8.0, 4.0).with_title("B-roll still");
    let mut music = Clip::new("music", ClipKind::Audio, 2, 0.0, 18.0).with_title("Music bed");
    music.volume = Some(0.6);
    let voice = Clip::new("voice", ClipKind::Audio, 3, 6.5, 10.0).with_title("Voice-over");
    let mut title = Clip::new("title", ClipKind::Text, 4, 1.0, 4.0).with_title("Title card");
    title.locked = true;
    let mut lower_third =
        Clip::new("lower-third", ClipKind::Graphics, 5, 7.0, 5.0).with_title("Lower third");
    lower_third.opacity = Some(0.8);
    vec![intro, interview, broll, music, voice, title, lower_third]
}
