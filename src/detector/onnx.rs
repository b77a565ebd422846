use ndarray::Array4;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::TensorRef;

use crate::config::ModelsConfig;
use crate::frame::RgbFrame;
use crate::landmarks::Category;

use super::model::{DetectedInstance, Handedness, LandmarkModel, ModelError, ModelLoader};
use super::RunningMode;

// Outputs by position: landmarks, presence, then handedness for hand models.
#[derive(Debug, Clone, Copy)]
struct ModelLayout {
    input_size: usize,
    values_per_point: usize,
    raw_points: usize,
    kept_points: usize,
    presence_is_logit: bool,
    has_handedness: bool,
}

const FACE_LAYOUT: ModelLayout = ModelLayout {
    input_size: 192,
    values_per_point: 3,
    raw_points: 468,
    kept_points: 468,
    presence_is_logit: true,
    has_handedness: false,
};

const HAND_LAYOUT: ModelLayout = ModelLayout {
    input_size: 224,
    values_per_point: 3,
    raw_points: 21,
    kept_points: 21,
    presence_is_logit: false,
    has_handedness: true,
};

// 33 body points followed by 6 auxiliary ones; each point carries
// visibility and presence after x, y, z.
const POSE_LAYOUT: ModelLayout = ModelLayout {
    input_size: 256,
    values_per_point: 5,
    raw_points: 39,
    kept_points: 33,
    presence_is_logit: false,
    has_handedness: false,
};

impl ModelLayout {
    fn output_count(&self) -> usize {
        if self.has_handedness {
            3
        } else {
            2
        }
    }

    fn check_outputs(&self, available: usize) -> Result<(), ModelError> {
        if available < self.output_count() {
            return Err(format!(
                "model has {} outputs, expected at least {}",
                available,
                self.output_count()
            )
            .into());
        }
        Ok(())
    }
}

fn layout_for(category: Category) -> ModelLayout {
    match category {
        Category::Face => FACE_LAYOUT,
        Category::Hands => HAND_LAYOUT,
        Category::Pose => POSE_LAYOUT,
    }
}

pub struct OnnxModelLoader {
    config: ModelsConfig,
}

impl OnnxModelLoader {
    pub fn new(config: ModelsConfig) -> Self {
        Self { config }
    }
}

impl ModelLoader for OnnxModelLoader {
    fn load(
        &self,
        category: Category,
        mode: RunningMode,
    ) -> Result<Box<dyn LandmarkModel>, ModelError> {
        let path = self.config.path_for(category);
        let model_path = path.to_string_lossy();
        tracing::debug!(category = %category, path = %model_path, mode = ?mode, "loading model");

        let mut builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)?
            .with_intra_threads(self.config.intra_threads)
            .map_err(ort::Error::<()>::from)?;

        let mut session = if model_path.starts_with("http://") || model_path.starts_with("https://") {
            builder.commit_from_url(&*model_path)?
        } else {
            builder.commit_from_file(path)?
        };

        // A wrong model should fail here rather than on the first frame.
        let layout = layout_for(category);
        let blank = Array4::<f32>::zeros((1, 3, layout.input_size, layout.input_size));
        let tensor_ref = TensorRef::from_array_view(blank.view())?.into_dyn();
        let outputs = session.run(ort::inputs![tensor_ref])?;
        layout.check_outputs(outputs.len())?;
        drop(outputs);

        Ok(Box::new(OnnxLandmarkModel {
            session,
            layout,
            min_presence: self.config.min_presence,
        }))
    }
}

struct OnnxLandmarkModel {
    session: Session,
    layout: ModelLayout,
    min_presence: f32,
}

impl LandmarkModel for OnnxLandmarkModel {
    // Each frame is scored independently, so the timestamp is not needed.
    fn detect(
        &mut self,
        frame: &RgbFrame,
        _timestamp_ms: Option<u64>,
    ) -> Result<Vec<DetectedInstance>, ModelError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Ok(Vec::new());
        }

        let layout = self.layout;
        let min_presence = self.min_presence;
        let input = preprocess(frame, layout.input_size)?;

        let tensor_ref = TensorRef::from_array_view(input.view())?.into_dyn();
        let outputs = self.session.run(ort::inputs![tensor_ref])?;
        layout.check_outputs(outputs.len())?;

        let (_, presence) = outputs[1].try_extract_tensor::<f32>()?;
        let presence = presence.first().copied().ok_or("empty presence output")?;
        let presence = if layout.presence_is_logit {
            sigmoid(presence)
        } else {
            presence
        };
        if presence < min_presence {
            return Ok(Vec::new());
        }

        let (_, coords) = outputs[0].try_extract_tensor::<f32>()?;
        let points = decode_points(coords, &layout)?;

        let handedness = if layout.has_handedness {
            let (_, score) = outputs[2].try_extract_tensor::<f32>()?;
            let score = score.first().copied().ok_or("empty handedness output")?;
            Some(if score > 0.5 {
                Handedness::Right
            } else {
                Handedness::Left
            })
        } else {
            None
        };

        Ok(vec![DetectedInstance { points, handedness }])
    }
}

fn preprocess(frame: &RgbFrame, input_size: usize) -> Result<Array4<f32>, ModelError> {
    use opencv::core::{Mat, Size};
    use opencv::imgproc;
    use opencv::prelude::*;

    let mat = Mat::from_slice(frame.data())?;
    let mat = mat.reshape(3, frame.height() as i32)?;

    let mut resized = Mat::default();
    imgproc::resize(
        &mat,
        &mut resized,
        Size::new(input_size as i32, input_size as i32),
        0.0,
        0.0,
        imgproc::INTER_LINEAR,
    )?;

    let data = resized.data_bytes()?;
    if data.len() < input_size * input_size * 3 {
        return Err("Frame data too small".into());
    }

    let mut tensor = Array4::<f32>::zeros((1, 3, input_size, input_size));
    for y in 0..input_size {
        for x in 0..input_size {
            let idx = (y * input_size + x) * 3;
            tensor[[0, 0, y, x]] = data[idx] as f32 / 255.0;
            tensor[[0, 1, y, x]] = data[idx + 1] as f32 / 255.0;
            tensor[[0, 2, y, x]] = data[idx + 2] as f32 / 255.0;
        }
    }

    Ok(tensor)
}

fn decode_points(coords: &[f32], layout: &ModelLayout) -> Result<Vec<[f32; 3]>, ModelError> {
    let needed = layout.raw_points * layout.values_per_point;
    if coords.len() < needed {
        return Err(format!(
            "landmark output has {} values, expected {}",
            coords.len(),
            needed
        )
        .into());
    }

    let scale = layout.input_size as f32;
    Ok((0..layout.kept_points)
        .map(|i| {
            let base = i * layout.values_per_point;
            [
                coords[base] / scale,
                coords[base + 1] / scale,
                coords[base + 2] / scale,
            ]
        })
        .collect())
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
