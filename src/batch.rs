use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::config::BatchConfig;
use crate::detector::{DetectorBank, DetectorError, ModelLoader};
use crate::pipeline::{PipelineError, VideoOpener, VideoPipeline};
use crate::storage::{output_path, write_document, LandmarkDocument};

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no landmark categories enabled")]
    NoCategories,
    #[error("cannot list {path}: {source}")]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("landmarker unavailable: {0}")]
    Detector(#[from] DetectorError),
    #[error("aborted at {video}: {source}")]
    Fatal {
        video: PathBuf,
        #[source]
        source: DetectorError,
    },
}

#[derive(Debug, Clone)]
pub struct VideoFailure {
    pub video: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<VideoFailure>,
}

pub struct BatchRunner {
    config: BatchConfig,
    loader: Arc<dyn ModelLoader>,
    opener: Arc<dyn VideoOpener>,
}

impl BatchRunner {
    pub fn new(
        config: BatchConfig,
        loader: Arc<dyn ModelLoader>,
        opener: Arc<dyn VideoOpener>,
    ) -> Self {
        Self {
            config,
            loader,
            opener,
        }
    }

    pub fn list_videos(&self) -> Result<Vec<PathBuf>, BatchError> {
        let dir = &self.config.input_dir;
        let list_err = |source| BatchError::ListDir {
            path: dir.clone(),
            source,
        };

        let mut videos = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            if path.is_file() && self.config.accepts(&path) {
                videos.push(path);
            }
        }
        videos.sort();
        Ok(videos)
    }

    pub fn run(&self) -> Result<BatchReport, BatchError> {
        let categories = self.config.category_set();
        if categories.is_empty() {
            return Err(BatchError::NoCategories);
        }

        let videos = self.list_videos()?;
        tracing::info!(
            input = %self.config.input_dir.display(),
            videos = videos.len(),
            categories = %categories,
            "starting batch"
        );

        if let Err(e) = std::fs::create_dir_all(&self.config.output_dir) {
            tracing::warn!(
                output = %self.config.output_dir.display(),
                error = %e,
                "cannot create output folder"
            );
        }

        let mut detectors = DetectorBank::for_categories(categories, Arc::clone(&self.loader));
        detectors.create_all(self.config.mode)?;

        let mut report = BatchReport::default();
        for video in videos {
            let started = Instant::now();
            tracing::info!(video = %video.display(), "processing video");

            let landmarks = match VideoPipeline::new(categories, &mut detectors)
                .run(self.opener.as_ref(), &video)
            {
                Ok(landmarks) => landmarks,
                Err(PipelineError::Detector { source, .. }) if source.is_state_error() => {
                    return Err(BatchError::Fatal { video, source });
                }
                Err(e) => {
                    tracing::error!(video = %video.display(), error = %e, "failed to process video");
                    report.failed.push(VideoFailure {
                        video,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let frames = landmarks.frame_count();
            let output = output_path(&self.config.output_dir, &video);
            match write_document(&output, &LandmarkDocument::from(landmarks)) {
                Ok(()) => {
                    tracing::info!(
                        video = %video.display(),
                        output = %output.display(),
                        frames,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "landmarks written"
                    );
                    report.written.push(output);
                }
                Err(e) => {
                    tracing::error!(output = %output.display(), error = %e, "failed to write landmarks");
                    report.failed.push(VideoFailure {
                        video,
                        reason: e.to_string(),
                    });
                }
            }
        }

        detectors.close_all();
        tracing::info!(
            written = report.written.len(),
            failed = report.failed.len(),
            "batch finished"
        );

        Ok(report)
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}
