//! Scripted stand-ins for the model and video collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::detector::{
    DetectedInstance, LandmarkModel, ModelError, ModelLoader, RunningMode,
};
use crate::frame::{Frame, PixelFormat, RgbFrame};
use crate::landmarks::Category;
use crate::pipeline::{VideoError, VideoOpener, VideoSource};

pub fn solid_frame(width: u32, height: u32) -> RgbFrame {
    let data = vec![128; width as usize * height as usize * 3];
    Frame::new(width, height, PixelFormat::Rgb, data)
        .unwrap()
        .into_rgb()
}

type Script = Arc<dyn Fn(usize) -> Vec<DetectedInstance> + Send + Sync>;

#[derive(Default)]
pub struct LoaderStats {
    loads: AtomicUsize,
    releases: AtomicUsize,
    timestamps: Mutex<HashMap<Category, Vec<Option<u64>>>>,
}

impl LoaderStats {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    pub fn timestamps(&self, category: Category) -> Vec<Option<u64>> {
        self.timestamps
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self, category: Category) -> usize {
        self.timestamps(category).len()
    }
}

#[derive(Default)]
pub struct ScriptedLoader {
    scripts: HashMap<Category, Script>,
    failing: Vec<Category>,
    stats: Arc<LoaderStats>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script<F>(mut self, category: Category, script: F) -> Self
    where
        F: Fn(usize) -> Vec<DetectedInstance> + Send + Sync + 'static,
    {
        self.scripts.insert(category, Arc::new(script));
        self
    }

    pub fn failing(mut self, category: Category) -> Self {
        self.failing.push(category);
        self
    }

    pub fn stats(&self) -> Arc<LoaderStats> {
        Arc::clone(&self.stats)
    }
}

impl ModelLoader for ScriptedLoader {
    fn load(
        &self,
        category: Category,
        _mode: RunningMode,
    ) -> Result<Box<dyn LandmarkModel>, ModelError> {
        if self.failing.contains(&category) {
            return Err(format!("model file for {category} not found").into());
        }
        self.stats.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedModel {
            category,
            script: self.scripts.get(&category).cloned(),
            calls: 0,
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct ScriptedModel {
    category: Category,
    script: Option<Script>,
    calls: usize,
    stats: Arc<LoaderStats>,
}

impl LandmarkModel for ScriptedModel {
    fn detect(
        &mut self,
        _frame: &RgbFrame,
        timestamp_ms: Option<u64>,
    ) -> Result<Vec<DetectedInstance>, ModelError> {
        self.stats
            .timestamps
            .lock()
            .unwrap()
            .entry(self.category)
            .or_default()
            .push(timestamp_ms);

        let instances = match &self.script {
            Some(script) => script(self.calls),
            None => Vec::new(),
        };
        self.calls += 1;
        Ok(instances)
    }
}

impl Drop for ScriptedModel {
    fn drop(&mut self) {
        self.stats.releases.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct SyntheticVideo {
    frames: u64,
    fps: f64,
    fail_at: Option<u64>,
    next: u64,
    released: Arc<AtomicBool>,
}

impl SyntheticVideo {
    pub fn new(frames: u64, fps: f64) -> Self {
        Self {
            frames,
            fps,
            fail_at: None,
            next: 0,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn failing_at(mut self, frame_index: u64) -> Self {
        self.fail_at = Some(frame_index);
        self
    }

    pub fn released_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.released)
    }
}

impl VideoSource for SyntheticVideo {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        if self.released.load(Ordering::SeqCst) || self.next >= self.frames {
            return Ok(None);
        }
        if self.fail_at == Some(self.next) {
            return Err(VideoError::Decode {
                frame_index: self.next,
                reason: "corrupt packet".to_string(),
            });
        }

        let shade = (self.next % 256) as u8;
        self.next += 1;
        Ok(Frame::new(4, 4, PixelFormat::Bgr, vec![shade; 4 * 4 * 3]))
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct SyntheticOpener {
    videos: Mutex<HashMap<String, SyntheticVideo>>,
}

impl SyntheticOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, name: &str, video: SyntheticVideo) -> PathBuf {
        self.videos.lock().unwrap().insert(name.to_string(), video);
        PathBuf::from(name)
    }
}

impl VideoOpener for SyntheticOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.videos.lock().unwrap().remove(&name) {
            Some(video) => Ok(Box::new(video)),
            None => Err(VideoError::Open {
                path: path.to_path_buf(),
                reason: "invalid data found when processing input".to_string(),
            }),
        }
    }
}
