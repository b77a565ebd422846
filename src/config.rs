use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::detector::RunningMode;
use crate::landmarks::{Category, CategorySet};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no landmark categories enabled")]
    NoCategories,
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

fn default_extensions() -> Vec<String> {
    vec!["mp4".into(), "avi".into(), "mov".into()]
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub mode: RunningMode,
    // Case-insensitive; an empty list accepts every file.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl BatchConfig {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            categories: default_categories(),
            mode: RunningMode::default(),
            extensions: default_extensions(),
        }
    }

    pub fn category_set(&self) -> CategorySet {
        self.categories.iter().copied().collect()
    }

    pub fn accepts(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}

fn default_face_model() -> PathBuf {
    PathBuf::from("models/face_landmark.onnx")
}

fn default_hands_model() -> PathBuf {
    PathBuf::from("models/hand_landmark.onnx")
}

fn default_pose_model() -> PathBuf {
    PathBuf::from("models/pose_landmark_lite.onnx")
}

fn default_min_presence() -> f32 {
    0.5
}

fn default_intra_threads() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_face_model")]
    pub face: PathBuf,
    #[serde(default = "default_hands_model")]
    pub hands: PathBuf,
    #[serde(default = "default_pose_model")]
    pub pose: PathBuf,
    #[serde(default = "default_min_presence")]
    pub min_presence: f32,
    #[serde(default = "default_intra_threads")]
    pub intra_threads: usize,
}

impl ModelsConfig {
    pub fn path_for(&self, category: Category) -> &Path {
        match category {
            Category::Face => &self.face,
            Category::Hands => &self.hands,
            Category::Pose => &self.pose,
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            face: default_face_model(),
            hands: default_hands_model(),
            pose: default_pose_model(),
            min_presence: default_min_presence(),
            intra_threads: default_intra_threads(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub batch: BatchConfig,
    #[serde(default)]
    pub models: ModelsConfig,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;

        if config.batch.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::parse(
            r#"
            [batch]
            input_dir = "videos"
            output_dir = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.batch.category_set(), CategorySet::all());
        assert_eq!(config.batch.mode, RunningMode::Video);
        assert_eq!(config.models.min_presence, 0.5);
        assert_eq!(
            config.models.path_for(Category::Hands),
            Path::new("models/hand_landmark.onnx")
        );
    }

    #[test]
    fn test_explicit_categories_and_mode() {
        let config = Config::parse(
            r#"
            [batch]
            input_dir = "videos"
            output_dir = "json"
            categories = ["pose", "hands"]
            mode = "single-image"

            [models]
            pose = "models/pose_landmark_full.onnx"
            "#,
        )
        .unwrap();

        let set = config.batch.category_set();
        assert!(!set.contains(Category::Face));
        assert_eq!(set.stride(), 75);
        assert_eq!(config.batch.mode, RunningMode::SingleImage);
        assert_eq!(config.models.pose, PathBuf::from("models/pose_landmark_full.onnx"));
    }

    #[test]
    fn test_empty_categories_rejected() {
        let err = Config::parse(
            r#"
            [batch]
            input_dir = "videos"
            output_dir = "json"
            categories = []
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::NoCategories));
    }

    #[test]
    fn test_extension_filter() {
        let batch = BatchConfig::new("in", "out");
        assert!(batch.accepts(Path::new("a/clip.MP4")));
        assert!(batch.accepts(Path::new("clip.mov")));
        assert!(!batch.accepts(Path::new("clip.json")));
        assert!(!batch.accepts(Path::new("README")));

        let any = BatchConfig {
            extensions: Vec::new(),
            ..BatchConfig::new("in", "out")
        };
        assert!(any.accepts(Path::new("README")));
    }
}
