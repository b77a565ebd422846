mod category;
mod record;

pub use category::{Category, CategorySet, FACE_POINTS, HANDS_POINTS, HAND_POINTS, POSE_POINTS};
pub use record::{all_finite, FrameRecord, LandmarkPoint, LandmarkSet, VideoLandmarks};
