use clap::Parser;
use std::path::PathBuf;

use crate::errors::{AutoAnnotateError, Result};

pub const DEFAULT_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_IOU: f32 = 0.7;
pub const DEFAULT_MAX_DETECTIONS: usize = 300;

#[derive(Parser, Clone, Debug)]
#[command(version, about = "Auto-annotate images using a YOLO ONNX model", long_about = None)]
pub struct Config {
    /// Path to the YOLO detection model (.onnx)
    #[arg(short, long = "model")]
    pub model_path: PathBuf,

    /// Path to the input image folder
    #[arg(short, long = "input")]
    pub input_dir: PathBuf,

    /// Path to the output annotation folder
    #[arg(short, long = "output")]
    pub output_dir: PathBuf,

    /// Confidence threshold
    #[arg(short, long = "conf", default_value_t = DEFAULT_CONFIDENCE, value_parser = check_unit_interval)]
    pub confidence: f32,

    /// IoU threshold used by non-maximum suppression
    #[arg(long = "iou", default_value_t = DEFAULT_IOU, value_parser = check_unit_interval)]
    pub iou_threshold: f32,

    /// Maximum number of boxes written per image
    #[arg(long = "max-det", default_value_t = DEFAULT_MAX_DETECTIONS)]
    pub max_detections: usize,

    #[arg(short, long, default_value_t = 0)]
    pub device_id: i32,
}

impl Config {
    /// Minimal run configuration with detector defaults, as the GUI builds it.
    pub fn new(
        model_path: impl Into<PathBuf>,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        confidence: f32,
    ) -> Self {
        Self {
            model_path: model_path.into(),
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            confidence,
            iou_threshold: DEFAULT_IOU,
            max_detections: DEFAULT_MAX_DETECTIONS,
            device_id: 0,
        }
    }

    /// Checks that the model file and the input folder exist before a run.
    pub fn validate(&self) -> Result<()> {
        if !self.model_path.is_file() {
            return Err(AutoAnnotateError::validation(
                format!("model path {}", self.model_path.display()),
                "does not exist",
            ));
        }
        if !self.input_dir.is_dir() {
            return Err(AutoAnnotateError::validation(
                format!("input directory {}", self.input_dir.display()),
                "does not exist",
            ));
        }
        Ok(())
    }

    pub const fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
            device_id: self.device_id,
        }
    }
}

/// Settings the detector needs beyond the per-call confidence threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub device_id: i32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            iou_threshold: DEFAULT_IOU,
            max_detections: DEFAULT_MAX_DETECTIONS,
            device_id: 0,
        }
    }
}

fn check_unit_interval(s: &str) -> std::result::Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("`{}` is not a number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("{} is out of range. Expected a value in [0, 1]", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = Config::try_parse_from([
            "auto-annotate",
            "--model",
            "yolov8n.onnx",
            "--input",
            "images",
            "--output",
            "labels",
        ])
        .unwrap();

        assert_eq!(config.model_path, PathBuf::from("yolov8n.onnx"));
        assert_eq!(config.input_dir, PathBuf::from("images"));
        assert_eq!(config.output_dir, PathBuf::from("labels"));
        assert_eq!(config.confidence, 0.25);
        assert_eq!(config.detector_config(), DetectorConfig::default());
    }

    #[test]
    fn test_parse_conf() {
        let config = Config::try_parse_from([
            "auto-annotate",
            "-m",
            "m.onnx",
            "-i",
            "in",
            "-o",
            "out",
            "--conf",
            "0.6",
        ])
        .unwrap();
        assert_eq!(config.confidence, 0.6);
    }

    #[test]
    fn test_required_arguments() {
        assert!(Config::try_parse_from(["auto-annotate", "--model", "m.onnx"]).is_err());
    }

    #[test]
    fn test_validate_paths() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let model = temp_dir.path().join("model.onnx");
        std::fs::write(&model, b"").unwrap();

        let config = Config::new(&model, temp_dir.path(), temp_dir.path().join("out"), 0.25);
        assert!(config.validate().is_ok());

        let config = Config::new(
            temp_dir.path().join("absent.onnx"),
            temp_dir.path(),
            "out",
            0.25,
        );
        assert!(matches!(
            config.validate(),
            Err(AutoAnnotateError::Validation { .. })
        ));

        let config = Config::new(&model, temp_dir.path().join("absent"), "out", 0.25);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, AutoAnnotateError::Validation { .. }));
        assert!(err.to_string().contains("input directory"));
    }

    #[test]
    fn test_conf_out_of_range() {
        assert!(check_unit_interval("1.5").is_err());
        assert!(check_unit_interval("abc").is_err());
        assert_eq!(check_unit_interval("0"), Ok(0.0));
        assert_eq!(check_unit_interval("1"), Ok(1.0));
    }
}
