pub mod annotation;
pub mod config;
pub mod errors;
pub mod form;
pub mod letterbox;
pub mod logging;
pub mod model;
pub mod progress;
pub mod traits;
pub mod worker;

#[cfg(feature = "gui")]
pub mod gui;

pub mod mocks;

use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub use annotation::{annotation_path, format_label_line, Detection, NormalizedBox};
pub use config::{Config, DetectorConfig};
pub use errors::{AutoAnnotateError, Result};
pub use form::{FormError, RunForm};
pub use model::YoloModel;
pub use progress::{AnnotationEvent, RunStatus};
pub use traits::ObjectDetector;
pub use worker::{drain_messages, spawn_worker, WorkerMessage};

/// Extensions picked up from the input folder. Matching is case-sensitive.
pub const IMAGE_EXTENSIONS: [&str; 3] = [".png", ".jpg", ".jpeg"];

/// Runs a detector over every image of a folder and writes one label file per image.
pub struct Annotator<D: ObjectDetector> {
    detector: D,
    config: Config,
}

impl<D: ObjectDetector> Annotator<D> {
    pub const fn new(detector: D, config: Config) -> Self {
        Self { detector, config }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn detector(&self) -> &D {
        &self.detector
    }

    pub fn process_directory(&self) -> Result<usize> {
        self.process_directory_with_progress(|_| {})
    }

    /// Processes the input folder, reporting each step to `on_event`.
    ///
    /// The first failure aborts the run; annotation files written before it are kept.
    pub fn process_directory_with_progress<F>(&self, mut on_event: F) -> Result<usize>
    where
        F: FnMut(AnnotationEvent),
    {
        let output_path = &self.config.output_dir;
        fs::create_dir_all(output_path).map_err(|e| {
            AutoAnnotateError::file_system(output_path, "output directory creation", e)
        })?;

        let image_files = self.collect_image_files(&self.config.input_dir)?;
        let total = image_files.len();
        if total == 0 {
            log::warn!("no images found in {}", self.config.input_dir.display());
        }
        on_event(AnnotationEvent::Started { total });

        for (index, input_file) in image_files.iter().enumerate() {
            let detections = self.process_single_image(input_file)?;
            let file_name = input_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            on_event(AnnotationEvent::Processed {
                index,
                total,
                file_name,
                detections,
            });
        }

        on_event(AnnotationEvent::Finished { processed: total });
        Ok(total)
    }

    /// Files directly inside `input_path` with a supported extension, sorted by name.
    pub fn collect_image_files(&self, input_path: &Path) -> Result<Vec<PathBuf>> {
        if !input_path.is_dir() {
            return Err(AutoAnnotateError::file_system(
                input_path,
                "input directory lookup",
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "input directory does not exist",
                ),
            ));
        }

        let mut image_files = Vec::new();
        for entry in WalkDir::new(input_path)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input_path).to_path_buf();
                AutoAnnotateError::file_system(path, "directory listing", e.into())
            })?;
            let path = entry.path();
            // `Path::is_file` follows symlinks, so linked images are picked up
            if path.is_file() && self.is_supported_image_format(path) {
                image_files.push(path.to_path_buf());
            }
        }

        Ok(image_files)
    }

    pub fn is_supported_image_format(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext)))
    }

    /// Annotates one image and returns the number of boxes written.
    pub fn process_single_image(&self, input_file: &Path) -> Result<usize> {
        let img = image::open(input_file).map_err(|e| AutoAnnotateError::ImageProcessing {
            path: input_file.display().to_string(),
            operation: "image load".to_string(),
            source: Box::new(e),
        })?;

        let detections = self
            .detector
            .detect(&img, self.config.confidence)
            .map_err(|e| AutoAnnotateError::ImageProcessing {
                path: input_file.display().to_string(),
                operation: "object detection".to_string(),
                source: Box::new(e),
            })?;

        let output_file = annotation_path(&self.config.output_dir, input_file);
        annotation::write_annotation_file(&output_file, &detections)?;

        log::info!(
            "Processed {} ({} boxes)",
            input_file.display(),
            detections.len()
        );
        Ok(detections.len())
    }
}

impl Annotator<YoloModel> {
    /// Loads the ONNX model named by `config` and builds an annotator around it.
    pub fn with_onnx_model(config: Config) -> Result<Self> {
        let model = YoloModel::new(&config.model_path, &config.detector_config())?;
        Ok(Self::new(model, config))
    }
}
