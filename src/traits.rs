use crate::annotation::Detection;
use crate::errors::Result;
use image::DynamicImage;

/// Object detection model abstraction.
///
/// The annotator depends on this trait rather than on the ONNX session so the
/// directory loop can be exercised without a model file.
pub trait ObjectDetector: Send + Sync {
    /// Detects objects in `img`, keeping boxes scored above `confidence`.
    ///
    /// Boxes are returned normalized to the image size.
    fn detect(&self, img: &DynamicImage, confidence: f32) -> Result<Vec<Detection>>;

    /// `(width, height)` of the input the model expects, in pixels.
    fn input_size(&self) -> (u32, u32);
}
