use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::landmarks::{LandmarkPoint, VideoLandmarks};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{points} points do not divide into frames of {stride}")]
    StrideMismatch { points: usize, stride: usize },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkDocument {
    pub landmarks_data_list: Vec<LandmarkPoint>,
}

impl LandmarkDocument {
    pub fn point_count(&self) -> usize {
        self.landmarks_data_list.len()
    }

    pub fn frames(&self, stride: usize) -> Result<Vec<&[LandmarkPoint]>, OutputError> {
        let points = self.landmarks_data_list.len();
        if stride == 0 || points % stride != 0 {
            return Err(OutputError::StrideMismatch { points, stride });
        }
        Ok(self.landmarks_data_list.chunks(stride).collect())
    }
}

impl From<VideoLandmarks> for LandmarkDocument {
    fn from(video: VideoLandmarks) -> Self {
        Self {
            landmarks_data_list: video.into_flat(),
        }
    }
}

pub fn output_path(output_dir: &Path, video_path: &Path) -> PathBuf {
    let mut name = video_path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| "video".into());
    name.push(".json");
    output_dir.join(name)
}

/// Writes to a sibling temp file first so a failed write never leaves a
/// truncated document behind.
pub fn write_document(path: &Path, document: &LandmarkDocument) -> Result<(), OutputError> {
    let temp = temp_path_for(path);

    let result = (|| -> Result<(), OutputError> {
        let mut writer = BufWriter::new(File::create(&temp)?);
        serde_json::to_writer_pretty(&mut writer, document)?;
        writer.flush()?;
        std::fs::rename(&temp, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = std::fs::remove_file(&temp);
    }
    result
}

pub fn read_document(path: &Path) -> Result<LandmarkDocument, OutputError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut temp = path.to_path_buf();
    temp.set_extension("json.tmp");
    temp
}
