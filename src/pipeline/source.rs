use std::path::{Path, PathBuf};

use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use thiserror::Error;

use crate::frame::{Frame, PixelFormat};

#[derive(Debug, Error)]
pub enum VideoError {
    #[error("cannot open video {path}: {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("video {path} reports unusable frame rate {fps}")]
    InvalidFrameRate { path: PathBuf, fps: f64 },
    #[error("failed to decode frame {frame_index}: {reason}")]
    Decode { frame_index: u64, reason: String },
}

pub trait VideoSource {
    fn frame_rate(&self) -> f64;

    /// `Ok(None)` at end of stream.
    fn read_frame(&mut self) -> Result<Option<Frame>, VideoError>;

    fn release(&mut self);
}

pub trait VideoOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError>;
}

pub struct OpenCvVideo {
    capture: VideoCapture,
    frame: Mat,
    fps: f64,
    frame_index: u64,
    released: bool,
}

impl OpenCvVideo {
    pub fn open(path: &Path) -> Result<Self, VideoError> {
        let open_err = |reason: String| VideoError::Open {
            path: path.to_path_buf(),
            reason,
        };

        let capture = VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)
            .map_err(|e| open_err(e.to_string()))?;
        if !capture.is_opened().map_err(|e| open_err(e.to_string()))? {
            return Err(open_err("no decoder could read the file".to_string()));
        }

        let fps = capture
            .get(videoio::CAP_PROP_FPS)
            .map_err(|e| open_err(e.to_string()))?;

        Ok(Self {
            capture,
            frame: Mat::default(),
            fps,
            frame_index: 0,
            released: false,
        })
    }

    fn to_frame(&self) -> opencv::Result<Frame> {
        let width = self.frame.cols() as u32;
        let height = self.frame.rows() as u32;
        // Rows of a decoded Mat may be padded.
        let data = if self.frame.is_continuous() {
            self.frame.data_bytes()?.to_vec()
        } else {
            self.frame.try_clone()?.data_bytes()?.to_vec()
        };
        Frame::new(width, height, PixelFormat::Bgr, data).ok_or_else(|| {
            opencv::Error::new(
                opencv::core::StsBadSize,
                format!("expected 8-bit 3-channel frame, got type {}", self.frame.typ()),
            )
        })
    }
}

impl VideoSource for OpenCvVideo {
    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, VideoError> {
        if self.released {
            return Ok(None);
        }

        let frame_index = self.frame_index;
        let decode_err = |e: opencv::Error| VideoError::Decode {
            frame_index,
            reason: e.to_string(),
        };

        let grabbed = self.capture.read(&mut self.frame).map_err(decode_err)?;
        if !grabbed || self.frame.empty() {
            return Ok(None);
        }

        let frame = self.to_frame().map_err(decode_err)?;
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.capture.release() {
            tracing::warn!(error = %e, "failed to release video capture");
        }
    }
}

impl Drop for OpenCvVideo {
    fn drop(&mut self) {
        self.release();
    }
}

pub struct OpenCvOpener;

impl VideoOpener for OpenCvOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn VideoSource>, VideoError> {
        Ok(Box::new(OpenCvVideo::open(path)?))
    }
}
