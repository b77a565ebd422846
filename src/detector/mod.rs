mod bank;
mod face;
mod handle;
mod hands;
mod model;
mod onnx;
mod pose;

use serde::Deserialize;
use thiserror::Error;

use crate::frame::RgbFrame;
use crate::landmarks::{Category, LandmarkSet};

pub use bank::DetectorBank;
pub use face::FaceDetector;
pub use hands::HandsDetector;
pub use model::{DetectedInstance, Handedness, LandmarkModel, ModelError, ModelLoader};
pub use onnx::OnnxModelLoader;
pub use pose::PoseDetector;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunningMode {
    #[default]
    Video,
    SingleImage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Uninitialized,
    Ready,
    Closed,
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("{category} landmarker is not ready")]
    NotReady { category: Category },
    #[error("{category} landmarker was already created")]
    AlreadyCreated { category: Category },
    #[error("{category} landmarker got timestamp {current}ms after {previous}ms")]
    TimestampRegression {
        category: Category,
        previous: u64,
        current: u64,
    },
    #[error("failed to load {category} model: {reason}")]
    ModelLoad { category: Category, reason: String },
    #[error("{category} inference failed: {reason}")]
    Inference { category: Category, reason: String },
}

impl DetectorError {
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            DetectorError::NotReady { .. }
                | DetectorError::AlreadyCreated { .. }
                | DetectorError::TimestampRegression { .. }
        )
    }
}

/// Uniform lifecycle over one landmark category.
///
/// `extract` always yields a set of the category's fixed length: when the
/// model finds nothing the set is a placeholder, never an error.
pub trait CategoryDetector: Send {
    fn category(&self) -> Category;

    fn state(&self) -> DetectorState;

    fn create(&mut self, mode: RunningMode) -> Result<(), DetectorError>;

    fn extract(
        &mut self,
        frame: &RgbFrame,
        timestamp_ms: u64,
    ) -> Result<LandmarkSet, DetectorError>;

    fn begin_video(&mut self);

    fn close(&mut self);

    fn placeholder(&self) -> LandmarkSet {
        LandmarkSet::placeholder(self.category())
    }
}

fn first_instance(category: Category, instances: &[DetectedInstance]) -> LandmarkSet {
    let Some(first) = instances.first() else {
        return LandmarkSet::placeholder(category);
    };

    if instances.len() > 1 {
        tracing::trace!(category = %category, ignored = instances.len() - 1, "extra instances dropped");
    }

    LandmarkSet::resolved(category, &first.points).unwrap_or_else(|| {
        tracing::warn!(
            category = %category,
            expected = category.point_count(),
            got = first.points.len(),
            finite = crate::landmarks::all_finite(&first.points),
            "malformed detection, using placeholder"
        );
        LandmarkSet::placeholder(category)
    })
}
