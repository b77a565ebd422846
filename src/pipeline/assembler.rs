use crate::detector::{DetectorBank, DetectorError};
use crate::frame::RgbFrame;
use crate::landmarks::{CategorySet, FrameRecord};

pub fn assemble_frame(
    categories: CategorySet,
    detectors: &mut DetectorBank,
    frame: &RgbFrame,
    timestamp_ms: u64,
) -> Result<FrameRecord, DetectorError> {
    let mut record = FrameRecord::with_capacity(categories.stride());

    for category in categories.iter() {
        let detector = detectors
            .get_mut(category)
            .ok_or(DetectorError::NotReady { category })?;
        let set = detector.extract(frame, timestamp_ms)?;
        debug_assert_eq!(set.len(), category.point_count());
        record.append(set);
    }

    Ok(record)
}
