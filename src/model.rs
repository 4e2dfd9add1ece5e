use std::{collections::BTreeMap, path::Path};

use crate::{
    annotation::{Detection, NormalizedBox},
    config::DetectorConfig,
    errors::{AutoAnnotateError, Result},
    letterbox::Letterbox,
    traits::ObjectDetector,
};
use image::{DynamicImage, RgbImage};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

/// Input size used when the model declares a dynamic spatial axis.
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// YOLO detection model (v8 style head) running on ONNX Runtime.
pub struct YoloModel {
    pub input_width: u32,
    pub input_height: u32,
    config: DetectorConfig,
    input_name: String,
    output_name: String,
    session: Mutex<Session>,
}

impl YoloModel {
    pub fn new(model_path: &Path, config: &DetectorConfig) -> Result<Self> {
        let mut session = SessionBuilder::new()
            .map_err(|e| AutoAnnotateError::model("session builder init", e.to_string()))?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(config.device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(config.device_id)
                    .build(),
            ])
            .map_err(|e| AutoAnnotateError::model("execution provider setup", e.to_string()))?
            .with_memory_pattern(true)
            .map_err(|e| AutoAnnotateError::model("memory pattern setup", e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| {
                AutoAnnotateError::model(
                    format!("model load: {}", model_path.display()),
                    e.to_string(),
                )
            })?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| AutoAnnotateError::validation("model inputs", "are empty"))?;
        let input_name = input.name.clone();
        let shape = input.input_type.tensor_shape().ok_or_else(|| {
            AutoAnnotateError::validation(format!("model input `{}`", input_name), "is not a tensor")
        })?;
        let (input_width, input_height) = input_dims(shape);
        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| AutoAnnotateError::validation("model outputs", "are empty"))?;

        log::debug!(
            "loaded {} (input `{}` {}x{}, output `{}`)",
            model_path.display(),
            input_name,
            input_width,
            input_height,
            output_name
        );

        // warm up
        let data = Array4::<f32>::zeros((1, 3, input_height as usize, input_width as usize));
        session
            .run(ort::inputs![input_name.as_str() => TensorRef::from_array_view(&data)
                .map_err(|e| AutoAnnotateError::model("warm-up tensor creation", e))?])
            .map_err(|e| AutoAnnotateError::model("warm-up run", e))?;

        Ok(Self {
            input_width,
            input_height,
            config: *config,
            input_name,
            output_name,
            session: Mutex::new(session),
        })
    }

    /// Raw model output for an NCHW tensor.
    pub fn predict(&self, tensor: &Array4<f32>) -> Result<ArrayD<f32>> {
        let mut session = self.session.lock();
        let outputs = session.run(
            ort::inputs![self.input_name.as_str() => TensorRef::from_array_view(tensor)?],
        )?;
        let output = outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_owned();
        Ok(output)
    }
}

impl ObjectDetector for YoloModel {
    fn detect(&self, img: &DynamicImage, confidence: f32) -> Result<Vec<Detection>> {
        let rgb = img.to_rgb8();
        let letterbox = Letterbox::fit(rgb.dimensions(), (self.input_width, self.input_height));
        let tensor = preprocess(&rgb, &letterbox);
        let output = self.predict(&tensor)?;
        postprocess(output.view(), confidence, &letterbox, &self.config)
    }

    fn input_size(&self) -> (u32, u32) {
        (self.input_width, self.input_height)
    }
}

/// `(width, height)` of an NCHW input shape; dynamic axes fall back to the default size.
fn input_dims(shape: &[i64]) -> (u32, u32) {
    let dim = |axis: usize| match shape.get(axis) {
        Some(&d) if d > 0 => d as u32,
        _ => DEFAULT_INPUT_SIZE,
    };
    (dim(3), dim(2))
}

/// Letterboxes the image and converts it to a `[1, 3, height, width]` RGB tensor in `[0, 1]`.
pub fn preprocess(image: &RgbImage, letterbox: &Letterbox) -> Array4<f32> {
    let canvas = letterbox.apply(image);
    canvas
        .as_ndarray3()
        .slice_move(s![NewAxis, .., .., ..])
        .mapv(|v| f32::from(v) / 255.0)
        .as_standard_layout()
        .into_owned()
}

/// Detection candidate in source image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub class_id: u32,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Candidate {
    fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn iou(&self, other: &Self) -> f32 {
        let w = (self.x2.min(other.x2) - self.x1.max(other.x1)).max(0.0);
        let h = (self.y2.min(other.y2) - self.y1.max(other.y1)).max(0.0);
        let intersection = w * h;
        let union = self.area() + other.area() - intersection;
        if union <= 0.0 {
            0.0
        } else {
            intersection / union
        }
    }
}

/// Decodes a `[1, 4 + classes, anchors]` output (or its transpose) into
/// normalized detections.
///
/// Keeps anchors whose best class score is strictly above `confidence`, runs
/// per-class NMS and returns at most `max_detections` boxes, highest score first.
pub fn postprocess(
    output: ArrayViewD<f32>,
    confidence: f32,
    letterbox: &Letterbox,
    config: &DetectorConfig,
) -> Result<Vec<Detection>> {
    let output = output.into_dimensionality::<Ix3>()?;
    let (_, d1, d2) = output.dim();
    // anchors always outnumber attributes for real heads
    let output = if d1 <= d2 {
        output.index_axis_move(Axis(0), 0)
    } else {
        output.index_axis_move(Axis(0), 0).reversed_axes()
    };
    let (attributes, anchors) = output.dim();
    if attributes <= 4 {
        return Err(AutoAnnotateError::validation(
            "model output",
            format!("has {} attributes per anchor, expected at least 5", attributes),
        ));
    }

    let mut candidates = Vec::new();
    for i in 0..anchors {
        let column = output.column(i);
        let (best_class, score) = column
            .slice(s![4..])
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (class, score)| {
                if score > best.1 {
                    (class, score)
                } else {
                    best
                }
            });
        if score <= confidence {
            continue;
        }

        let (cx, cy, w, h) = (column[0], column[1], column[2], column[3]);
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);
        candidates.push(Candidate {
            class_id: best_class as u32,
            confidence: score,
            x1,
            y1,
            x2,
            y2,
        });
    }

    let mut kept = nms(candidates, config.iou_threshold);
    // equal scores keep class order so the written files are reproducible
    kept.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(a.class_id.cmp(&b.class_id))
    });
    kept.truncate(config.max_detections);

    Ok(kept
        .into_iter()
        .map(|c| Detection {
            class_id: c.class_id,
            confidence: c.confidence,
            bbox: NormalizedBox::from_corners(
                c.x1,
                c.y1,
                c.x2,
                c.y2,
                letterbox.src_width,
                letterbox.src_height,
            ),
        })
        .collect())
}

/// Per-class non-maximum suppression.
pub fn nms(candidates: Vec<Candidate>, iou_threshold: f32) -> Vec<Candidate> {
    let mut class_groups: BTreeMap<u32, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        class_groups
            .entry(candidate.class_id)
            .or_default()
            .push(candidate);
    }

    let mut kept = Vec::new();
    for mut group in class_groups.into_values() {
        group.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        let mut suppressed = vec![false; group.len()];
        for i in 0..group.len() {
            if suppressed[i] {
                continue;
            }
            kept.push(group[i]);
            for j in (i + 1)..group.len() {
                if !suppressed[j] && group[i].iou(&group[j]) > iou_threshold {
                    suppressed[j] = true;
                }
            }
        }
    }
    kept
}
