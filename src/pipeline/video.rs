use std::path::Path;

use thiserror::Error;

use crate::detector::{DetectorBank, DetectorError};
use crate::landmarks::{CategorySet, VideoLandmarks};

use super::assembler::assemble_frame;
use super::source::{VideoError, VideoOpener, VideoSource};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Video(#[from] VideoError),
    #[error("frame {frame_index}: {source}")]
    Detector {
        frame_index: u64,
        #[source]
        source: DetectorError,
    },
}

pub fn frame_timestamp_ms(frame_index: u64, fps: f64) -> u64 {
    (frame_index as f64 / fps * 1000.0).round() as u64
}

pub struct VideoPipeline<'a> {
    categories: CategorySet,
    detectors: &'a mut DetectorBank,
}

impl<'a> VideoPipeline<'a> {
    pub fn new(categories: CategorySet, detectors: &'a mut DetectorBank) -> Self {
        Self {
            categories,
            detectors,
        }
    }

    pub fn run(
        &mut self,
        opener: &dyn VideoOpener,
        path: &Path,
    ) -> Result<VideoLandmarks, PipelineError> {
        let mut source = opener.open(path)?;
        let fps = source.frame_rate();
        let result = if fps.is_finite() && fps > 0.0 {
            self.process(source.as_mut())
        } else {
            Err(VideoError::InvalidFrameRate {
                path: path.to_path_buf(),
                fps,
            }
            .into())
        };
        source.release();
        result
    }

    pub(crate) fn process(&mut self, source: &mut dyn VideoSource) -> Result<VideoLandmarks, PipelineError> {
        let fps = source.frame_rate();
        let mut video = VideoLandmarks::new();
        let mut frame_index = 0u64;

        self.detectors.begin_video();

        while let Some(frame) = source.read_frame()? {
            let timestamp_ms = frame_timestamp_ms(frame_index, fps);
            let rgb = frame.into_rgb();

            let record = assemble_frame(self.categories, self.detectors, &rgb, timestamp_ms)
                .map_err(|source| PipelineError::Detector {
                    frame_index,
                    source,
                })?;
            tracing::trace!(frame = frame_index, timestamp_ms, points = record.len(), "frame assembled");

            video.push(record);
            frame_index += 1;
        }

        Ok(video)
    }
}
