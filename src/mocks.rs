use crate::annotation::Detection;
use crate::errors::{AutoAnnotateError, Result};
use crate::traits::ObjectDetector;
use image::DynamicImage;
use parking_lot::Mutex;

/// Detector returning a fixed set of boxes, for tests without a model file.
///
/// Every confidence threshold it is called with is recorded.
#[derive(Debug, Default)]
pub struct MockDetector {
    pub detections: Vec<Detection>,
    pub input_size: (u32, u32),
    pub fail_on_call: Option<usize>,
    thresholds: Mutex<Vec<f32>>,
}

impl MockDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            input_size: (640, 640),
            fail_on_call: None,
            thresholds: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Makes the `n`-th call (zero based) fail.
    pub fn failing_on(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn seen_thresholds(&self) -> Vec<f32> {
        self.thresholds.lock().clone()
    }
}

impl ObjectDetector for MockDetector {
    fn detect(&self, _img: &DynamicImage, confidence: f32) -> Result<Vec<Detection>> {
        let mut thresholds = self.thresholds.lock();
        let call = thresholds.len();
        thresholds.push(confidence);

        if self.fail_on_call == Some(call) {
            return Err(AutoAnnotateError::model(
                "mock inference",
                format!("call {} configured to fail", call),
            ));
        }

        Ok(self
            .detections
            .iter()
            .filter(|d| d.confidence > confidence)
            .cloned()
            .collect())
    }

    fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}
