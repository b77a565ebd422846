use std::sync::Arc;

use crate::frame::RgbFrame;
use crate::landmarks::{all_finite, Category, LandmarkSet, HAND_POINTS};

use super::handle::ModelHandle;
use super::model::{DetectedInstance, Handedness, ModelLoader};
use super::{CategoryDetector, DetectorError, DetectorState, RunningMode};

pub struct HandsDetector {
    handle: ModelHandle,
}

impl HandsDetector {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            handle: ModelHandle::new(Category::Hands, loader),
        }
    }
}

impl CategoryDetector for HandsDetector {
    fn category(&self) -> Category {
        Category::Hands
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
        Ok(resolve_hands(&instances))
    }

    fn begin_video(&mut self) {
        self.handle.rewind();
    }

    fn close(&mut self) {
        self.handle.close();
    }
}

// Anything not labelled left goes to the right block; the last instance per side wins.
fn resolve_hands(instances: &[DetectedInstance]) -> LandmarkSet {
    let mut left: Option<&[[f32; 3]]> = None;
    let mut right: Option<&[[f32; 3]]> = None;

    for instance in instances {
        if instance.points.len() != HAND_POINTS || !all_finite(&instance.points) {
            tracing::warn!(
                expected = HAND_POINTS,
                got = instance.points.len(),
                finite = all_finite(&instance.points),
                "malformed hand detection dropped"
            );
            continue;
        }

        match instance.handedness {
            Some(Handedness::Left) => left = Some(instance.points.as_slice()),
            _ => right = Some(instance.points.as_slice()),
        }
    }

    LandmarkSet::hands(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{solid_frame, ScriptedLoader};

    fn hand(side: Handedness, value: f32) -> DetectedInstance {
        DetectedInstance::hand(side, vec![[value, value, 0.0]; HAND_POINTS])
    }

    #[test]
    fn test_left_only() {
        let set = resolve_hands(&[hand(Handedness::Left, 0.3)]);
        assert_eq!(set.len(), 42);
        assert!(set.points()[..21].iter().all(|p| p.coords() == Some([0.3, 0.3, 0.0])));
        assert!(set.points()[21..].iter().all(|p| p.is_absent()));
    }

    #[test]
    fn test_right_only() {
        let set = resolve_hands(&[hand(Handedness::Right, 0.7)]);
        assert!(set.points()[..21].iter().all(|p| p.is_absent()));
        assert!(set.points()[21..].iter().all(|p| p.coords() == Some([0.7, 0.7, 0.0])));
    }

    #[test]
    fn test_blocks_ordered_regardless_of_report_order() {
        let set = resolve_hands(&[hand(Handedness::Right, 0.9), hand(Handedness::Left, 0.1)]);
        assert_eq!(set.points()[0].coords(), Some([0.1, 0.1, 0.0]));
        assert_eq!(set.points()[21].coords(), Some([0.9, 0.9, 0.0]));
    }

    #[test]
    fn test_same_side_last_wins() {
        let set = resolve_hands(&[hand(Handedness::Left, 0.1), hand(Handedness::Left, 0.2)]);
        assert!(set.points()[..21].iter().all(|p| p.coords() == Some([0.2, 0.2, 0.0])));
        assert!(set.points()[21..].iter().all(|p| p.is_absent()));
    }

    #[test]
    fn test_unlabelled_goes_right() {
        let unlabelled = DetectedInstance::new(vec![[0.5, 0.5, 0.0]; HAND_POINTS]);
        let set = resolve_hands(&[unlabelled]);
        assert!(set.points()[..21].iter().all(|p| p.is_absent()));
        assert!(set.points()[21..].iter().all(|p| !p.is_absent()));
    }

    #[test]
    fn test_nothing_detected() {
        let set = resolve_hands(&[]);
        assert_eq!(set.len(), 42);
        assert!(set.is_placeholder());
    }

    #[test]
    fn test_malformed_hand_does_not_overwrite() {
        let short = DetectedInstance::hand(Handedness::Left, vec![[0.0, 0.0, 0.0]; 5]);
        let set = resolve_hands(&[hand(Handedness::Left, 0.4), short]);
        assert!(set.points()[..21].iter().all(|p| p.coords() == Some([0.4, 0.4, 0.0])));
    }

    #[test]
    fn test_non_finite_hand_does_not_overwrite() {
        let mut points = vec![[0.6, 0.6, 0.0]; HAND_POINTS];
        points[3] = [0.6, f32::NAN, 0.0];
        let broken = DetectedInstance::hand(Handedness::Right, points);
        let set = resolve_hands(&[hand(Handedness::Right, 0.8), broken]);
        assert!(set.points()[..21].iter().all(|p| p.is_absent()));
        assert!(set.points()[21..].iter().all(|p| p.coords() == Some([0.8, 0.8, 0.0])));
    }

    #[test]
    fn test_extract_through_detector() {
        let loader = ScriptedLoader::new()
            .script(Category::Hands, |_| vec![hand(Handedness::Left, 0.25)]);
        let mut detector = HandsDetector::new(Arc::new(loader));
        detector.create(RunningMode::Video).unwrap();

        let set = detector.extract(&solid_frame(4, 4), 0).unwrap();
        assert_eq!(set.category(), Category::Hands);
        assert!(!set.points()[0].is_absent());
        assert!(set.points()[41].is_absent());
    }
}
