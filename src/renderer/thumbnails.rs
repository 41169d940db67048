use crate::error::ThumbnailError;
use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use eframe::egui;
use log::{debug, warn};
use lru::LruCache;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use std::thread;

const FALLBACK_CACHE_SIZE: usize = 64;
/// Requests waiting for the decode thread. Beyond this `request` backs off
/// and `sync` asks again on a later frame.
const JOB_QUEUE: usize = 64;
/// Decoded images the UI thread has not picked up yet.
const RESULT_QUEUE: usize = 16;

/// Turns an opaque thumbnail url into encoded image bytes.
///
/// Hosts plug their own asset layer in here; the default reads local files.
pub trait AssetResolver: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ThumbnailError>;
}

/// Resolves `file://` urls and plain paths from the local filesystem.
#[derive(Debug, Default, Clone)]
pub struct FileResolver;

impl AssetResolver for FileResolver {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, ThumbnailError> {
        let path = url.strip_prefix("file://").unwrap_or(url);
        if path.contains("://") {
            return Err(ThumbnailError::Unresolved(url.to_string()));
        }
        Ok(std::fs::read(Path::new(path))?)
    }
}

enum Entry {
    Pending,
    Decoded(Arc<egui::ColorImage>),
    Uploaded(egui::TextureHandle),
    Failed,
}

/// What the renderer needs to tile a thumbnail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThumbnailInfo {
    pub size: [usize; 2],
    pub texture: Option<egui::TextureId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStatus {
    Pending,
    Ready,
    Failed,
}

type DecodeResult = (String, Result<egui::ColorImage, ThumbnailError>);

/// URL-keyed thumbnail cache. A single decode thread works through the
/// request queue; results are picked up by [`ThumbnailCache::poll`] on the UI
/// thread.
pub struct ThumbnailCache {
    entries: LruCache<String, Entry>,
    jobs: Sender<String>,
    results: Receiver<DecodeResult>,
}

impl ThumbnailCache {
    pub fn new(capacity: usize, resolver: Arc<dyn AssetResolver>) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .or(NonZeroUsize::new(FALLBACK_CACHE_SIZE))
            .unwrap_or(NonZeroUsize::MIN);
        let (jobs, job_rx) = bounded::<String>(JOB_QUEUE);
        let (result_tx, results) = bounded::<DecodeResult>(RESULT_QUEUE);
        let spawned = thread::Builder::new()
            .name("thumbnail-decode".into())
            .spawn(move || {
                // Ends when the cache drops either side of the queues.
                for url in job_rx.iter() {
                    let result = resolver.fetch(&url).and_then(|bytes| decode(&bytes));
                    if result_tx.send((url, result)).is_err() {
                        break;
                    }
                }
            });
        if let Err(err) = spawned {
            warn!("thumbnail decode thread failed to start: {err}");
        }
        Self {
            entries: LruCache::new(capacity),
            jobs,
            results,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    /// Starts loading `url` unless it is already known. Fire-and-forget; may
    /// evict the least recently used entry.
    pub fn request(&mut self, url: &str) {
        if self.entries.contains(url) {
            return;
        }
        match self.jobs.try_send(url.to_string()) {
            Ok(()) => {
                debug!("loading thumbnail {url}");
                self.entries.put(url.to_string(), Entry::Pending);
            }
            Err(TrySendError::Full(_)) => debug!("decode queue full, deferring {url}"),
            Err(TrySendError::Disconnected(_)) => {
                warn!("thumbnail {url} not loaded: decode thread is gone");
                self.entries.put(url.to_string(), Entry::Failed);
            }
        }
    }

    /// Brings the cache in line with the urls still on the timeline: drops
    /// entries no clip refers to, marks the rest as recently used, and asks
    /// for missing ones while there is free room. Never evicts a wanted entry.
    pub fn sync<'a>(&mut self, urls: impl IntoIterator<Item = &'a str>) {
        let mut wanted = Vec::new();
        let mut seen = HashSet::new();
        for url in urls {
            if seen.insert(url) {
                wanted.push(url);
            }
        }
        let stale: Vec<String> = self
            .entries
            .iter()
            .filter(|(url, _)| !seen.contains(url.as_str()))
            .map(|(url, _)| url.clone())
            .collect();
        for url in stale {
            debug!("dropping unused thumbnail {url}");
            self.entries.pop(&url);
        }
        for url in wanted {
            if self.entries.get(url).is_some() {
                continue;
            }
            if self.entries.len() < self.capacity() {
                self.request(url);
            }
        }
    }

    /// Collects finished decodes. Returns true when any entry changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        while let Ok((url, result)) = self.results.try_recv() {
            changed |= self.finish(url, result);
        }
        changed
    }

    /// Blocks until one pending decode arrives or the timeout passes.
    pub fn wait_one(&mut self, timeout: std::time::Duration) -> bool {
        match self.results.recv_timeout(timeout) {
            Ok((url, result)) => self.finish(url, result) | self.poll(),
            Err(_) => false,
        }
    }

    fn finish(&mut self, url: String, result: Result<egui::ColorImage, ThumbnailError>) -> bool {
        // Evicted while loading
        if !self.entries.contains(&url) {
            return false;
        }
        let entry = match result {
            Ok(image) => Entry::Decoded(Arc::new(image)),
            Err(err) => {
                warn!("thumbnail {url} failed to load: {err}");
                Entry::Failed
            }
        };
        self.entries.put(url, entry);
        true
    }

    /// Moves decoded images into GPU textures.
    pub fn upload(&mut self, ctx: &egui::Context) {
        let decoded: Vec<(String, Arc<egui::ColorImage>)> = self
            .entries
            .iter()
            .filter_map(|(url, entry)| match entry {
                Entry::Decoded(image) => Some((url.clone(), Arc::clone(image))),
                _ => None,
            })
            .collect();
        for (url, image) in decoded {
            let texture = ctx.load_texture(
                format!("timeline_thumbnail:{url}"),
                (*image).clone(),
                egui::TextureOptions::LINEAR,
            );
            self.entries.put(url, Entry::Uploaded(texture));
        }
    }

    pub fn status(&self, url: &str) -> Option<ThumbnailStatus> {
        self.entries.peek(url).map(|entry| match entry {
            Entry::Pending => ThumbnailStatus::Pending,
            Entry::Decoded(_) | Entry::Uploaded(_) => ThumbnailStatus::Ready,
            Entry::Failed => ThumbnailStatus::Failed,
        })
    }

    pub fn info(&self, url: &str) -> Option<ThumbnailInfo> {
        match self.entries.peek(url)? {
            Entry::Decoded(image) => Some(ThumbnailInfo {
                size: image.size,
                texture: None,
            }),
            Entry::Uploaded(texture) => Some(ThumbnailInfo {
                size: texture.size(),
                texture: Some(texture.id()),
            }),
            Entry::Pending | Entry::Failed => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, entry)| matches!(entry, Entry::Pending))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry; uploaded textures are freed with their handles.
    pub fn clear(&mut self) {
        self.entries.clear();
        while self.results.try_recv().is_ok() {}
    }
}

fn decode(bytes: &[u8]) -> Result<egui::ColorImage, ThumbnailError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> String {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([200, 10, 10, 255]))
            .save(&path)
            .unwrap();
        path.to_string_lossy().to_string()
    }

    fn cache() -> ThumbnailCache {
        ThumbnailCache::new(8, Arc::new(FileResolver))
    }

    fn settle(cache: &mut ThumbnailCache, url: &str) -> ThumbnailStatus {
        for _ in 0..50 {
            if cache.status(url) != Some(ThumbnailStatus::Pending) {
                break;
            }
            cache.wait_one(Duration::from_millis(100));
        }
        cache.status(url).unwrap()
    }

    #[test]
    fn test_loads_thumbnail_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let url = write_png(dir.path(), "thumb.png", 16, 9);
        let mut cache = cache();
        cache.request(&url);
        assert_eq!(settle(&mut cache, &url), ThumbnailStatus::Ready);
        let info = cache.info(&url).unwrap();
        assert_eq!(info.size, [16, 9]);
        assert!(info.texture.is_none());
    }

    #[test]
    fn test_file_url_prefix_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path(), "thumb.png", 4, 4);
        let url = format!("file://{path}");
        let mut cache = cache();
        cache.request(&url);
        assert_eq!(settle(&mut cache, &url), ThumbnailStatus::Ready);
    }

    #[test]
    fn test_missing_file_degrades_to_failed() {
        let mut cache = cache();
        cache.request("/no/such/thumb.png");
        assert_eq!(settle(&mut cache, "/no/such/thumb.png"), ThumbnailStatus::Failed);
        assert!(cache.info("/no/such/thumb.png").is_none());
    }

    #[test]
    fn test_garbage_bytes_degrade_to_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let url = path.to_string_lossy().to_string();
        let mut cache = cache();
        cache.request(&url);
        assert_eq!(settle(&mut cache, &url), ThumbnailStatus::Failed);
    }

    #[test]
    fn test_remote_urls_are_unresolved() {
        let err = FileResolver.fetch("https://cdn.example.com/a.png").unwrap_err();
        assert!(matches!(err, ThumbnailError::Unresolved(_)));
    }

    #[test]
    fn test_sync_reloads_evicted_thumbnail_once_there_is_room() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 8, 8);
        let b = write_png(dir.path(), "b.png", 8, 8);
        let mut cache = ThumbnailCache::new(1, Arc::new(FileResolver));
        cache.request(&a);
        assert_eq!(settle(&mut cache, &a), ThumbnailStatus::Ready);
        cache.request(&b);
        assert_eq!(settle(&mut cache, &b), ThumbnailStatus::Ready);
        assert!(cache.status(&a).is_none());

        // full: the wanted entry that is loaded stays put
        cache.sync([a.as_str(), b.as_str()]);
        assert!(cache.status(&a).is_none());
        assert_eq!(cache.status(&b), Some(ThumbnailStatus::Ready));

        // b no longer on the timeline frees the slot for a
        cache.sync([a.as_str()]);
        assert!(cache.status(&b).is_none());
        assert_eq!(settle(&mut cache, &a), ThumbnailStatus::Ready);
    }

    #[test]
    fn test_sync_promotes_wanted_entries() {
        let mut cache = ThumbnailCache::new(2, Arc::new(FileResolver));
        cache.request("/no/such/a.png");
        cache.request("/no/such/b.png");
        // a is touched last, so the next request evicts b
        cache.sync(["/no/such/b.png", "/no/such/a.png"]);
        cache.request("/no/such/c.png");
        assert!(cache.status("/no/such/a.png").is_some());
        assert!(cache.status("/no/such/b.png").is_none());
    }

    #[test]
    fn test_request_is_idempotent_and_clear_empties() {
        let mut cache = cache();
        cache.request("/no/such/a.png");
        cache.request("/no/such/a.png");
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert!(!cache.poll());
    }
}
