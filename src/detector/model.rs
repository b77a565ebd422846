use crate::frame::RgbFrame;
use crate::landmarks::Category;

use super::RunningMode;

pub type ModelError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectedInstance {
    pub points: Vec<[f32; 3]>,
    pub handedness: Option<Handedness>,
}

impl DetectedInstance {
    pub fn new(points: Vec<[f32; 3]>) -> Self {
        Self {
            points,
            handedness: None,
        }
    }

    pub fn hand(handedness: Handedness, points: Vec<[f32; 3]>) -> Self {
        Self {
            points,
            handedness: Some(handedness),
        }
    }
}

pub trait LandmarkModel: Send {
    // `timestamp_ms` is `Some` in video mode and `None` for single images.
    fn detect(
        &mut self,
        frame: &RgbFrame,
        timestamp_ms: Option<u64>,
    ) -> Result<Vec<DetectedInstance>, ModelError>;
}

pub trait ModelLoader: Send + Sync {
    fn load(
        &self,
        category: Category,
        mode: RunningMode,
    ) -> Result<Box<dyn LandmarkModel>, ModelError>;
}
