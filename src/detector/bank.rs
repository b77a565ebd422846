use std::sync::Arc;

use crate::landmarks::{Category, CategorySet};

use super::model::ModelLoader;
use super::{
    CategoryDetector, DetectorError, FaceDetector, HandsDetector, PoseDetector, RunningMode,
};

#[derive(Default)]
pub struct DetectorBank {
    detectors: [Option<Box<dyn CategoryDetector>>; 3],
}

impl DetectorBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_categories(categories: CategorySet, loader: Arc<dyn ModelLoader>) -> Self {
        let mut bank = Self::new();
        for category in categories.iter() {
            let detector: Box<dyn CategoryDetector> = match category {
                Category::Face => Box::new(FaceDetector::new(Arc::clone(&loader))),
                Category::Hands => Box::new(HandsDetector::new(Arc::clone(&loader))),
                Category::Pose => Box::new(PoseDetector::new(Arc::clone(&loader))),
            };
            bank.insert(detector);
        }
        bank
    }

    pub fn insert(&mut self, detector: Box<dyn CategoryDetector>) {
        let slot = &mut self.detectors[detector.category().index()];
        if let Some(mut old) = slot.replace(detector) {
            old.close();
        }
    }

    pub fn get_mut(&mut self, category: Category) -> Option<&mut (dyn CategoryDetector + 'static)> {
        self.detectors[category.index()].as_deref_mut()
    }

    pub fn categories(&self) -> CategorySet {
        self.detectors
            .iter()
            .flatten()
            .map(|d| d.category())
            .collect()
    }

    /// Creates every detector in category order. On failure the ones
    /// already created are closed again before the error is returned.
    pub fn create_all(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        let mut failure = None;
        for detector in self.detectors.iter_mut().flatten() {
            if let Err(e) = detector.create(mode) {
                failure = Some(e);
                break;
            }
        }

        match failure {
            Some(e) => {
                self.close_all();
                Err(e)
            }
            None => Ok(()),
        }
    }

    pub fn begin_video(&mut self) {
        for detector in self.detectors.iter_mut().flatten() {
            detector.begin_video();
        }
    }

    pub fn close_all(&mut self) {
        for detector in self.detectors.iter_mut().flatten() {
            detector.close();
        }
    }
}

impl Drop for DetectorBank {
    fn drop(&mut self) {
        self.close_all();
    }
}
