use std::sync::Arc;

use crate::frame::RgbFrame;
use crate::landmarks::{Category, LandmarkSet};

use super::handle::ModelHandle;
use super::model::ModelLoader;
use super::{first_instance, CategoryDetector, DetectorError, DetectorState, RunningMode};

pub struct FaceDetector {
    handle: ModelHandle,
}

impl FaceDetector {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            handle: ModelHandle::new(Category::Face, loader),
        }
    }
}

impl CategoryDetector for FaceDetector {
    fn category(&self) -> Category {
        Category::Face
    }

    fn state(&self) -> DetectorState {
        self.handle.state()
    }

    fn create(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        self.handle.create(mode)
    }

    fn extract(
        &mut self,
        frame: &RgbFrame,
        timestamp_ms: u64,
    ) -> Result<LandmarkSet, DetectorError> {
        let instances = self.handle.detect(frame, timestamp_ms)?;
        Ok(first_instance(Category::Face, &instances))
    }

    fn begin_video(&mut self) {
        self.handle.rewind();
    }

    fn close(&mut self) {
        self.handle.close();
    }
}
