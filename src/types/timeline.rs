use crate::ops::clip_ops::normalize_clip;
use crate::ops::geometry::CoordinateMapper;
use crate::types::media::Clip;
use eframe::egui;
use log::debug;

/// In-memory clip records of one timeline, kept in insertion (draw) order,
/// plus the single selection slot.
#[derive(Debug, Clone, Default)]
pub struct ClipStore {
    clips: Vec<Clip>,
    selected: Option<String>,
    track_count: usize,
}

impl ClipStore {
    pub fn new(track_count: usize) -> Self {
        ClipStore {
            clips: Vec::new(),
            selected: None,
            track_count,
        }
    }

    pub fn track_count(&self) -> usize {
        self.track_count
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Clips in draw order; later entries are drawn on top.
    pub fn iter(&self) -> impl Iterator<Item = &Clip> {
        self.clips.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Inserts a clip. An existing clip with the same id is replaced in place.
    pub fn add_clip(&mut self, clip: Clip) {
        self.update_clip(clip);
    }

    /// Removes a clip; unknown ids are ignored.
    pub fn remove_clip(&mut self, id: &str) -> Option<Clip> {
        let index = self.position(id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Some(self.clips.remove(index))
    }

    /// Replaces the record with the same id, or appends it.
    ///
    /// Geometry is clamped into valid ranges. An incoming `selected: true`
    /// moves the selection to this clip; otherwise the selection slot wins.
    pub fn update_clip(&mut self, clip: Clip) {
        let mut clip = normalize_clip(clip, self.track_count);
        let wants_selection = clip.selected;
        clip.selected = self.selected.as_deref() == Some(clip.id.as_str());
        let id = clip.id.clone();
        match self.position(&id) {
            Some(index) => self.clips[index] = clip,
            None => {
                debug!("clip {id} inserted");
                self.clips.push(clip);
            }
        }
        if wants_selection {
            self.select(&id);
        }
    }

    /// Writes the outcome of a drag/resize back into a record.
    pub fn commit_geometry(
        &mut self,
        id: &str,
        start_time: f64,
        duration: f64,
        track_index: usize,
    ) -> Option<&Clip> {
        let index = self.position(id)?;
        let mut clip = self.clips[index].clone();
        clip.start_time = start_time;
        clip.duration = duration;
        clip.track_index = track_index;
        self.clips[index] = normalize_clip(clip, self.track_count);
        Some(&self.clips[index])
    }

    /// Topmost clip whose time span and track contain the point.
    pub fn clip_at(&self, mapper: &CoordinateMapper, pos: egui::Pos2) -> Option<&Clip> {
        let track = mapper.track_at_y(pos.y)?;
        let time = mapper.pixel_to_time(pos.x);
        self.clips
            .iter()
            .rev()
            .find(|c| c.track_index == track && c.contains_time(time))
    }

    /// Makes `id` the only selected clip. Returns the clip when it exists.
    pub fn select(&mut self, id: &str) -> Option<&Clip> {
        self.position(id)?;
        for clip in &mut self.clips {
            clip.selected = clip.id == id;
        }
        self.selected = Some(id.to_string());
        self.get(id)
    }

    /// Returns true when something was selected before.
    pub fn clear_selection(&mut self) -> bool {
        for clip in &mut self.clips {
            clip.selected = false;
        }
        self.selected.take().is_some()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_clips(&self) -> Vec<&Clip> {
        self.selected
            .as_deref()
            .and_then(|id| self.get(id))
            .into_iter()
            .collect()
    }

    /// Latest end time over all clips, 0 when empty.
    pub fn total_duration(&self) -> f64 {
        self.clips.iter().map(Clip::end_time).fold(0.0, f64::max)
    }
}
