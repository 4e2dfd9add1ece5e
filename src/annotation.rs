//! Normalized label records and the per-image annotation text file.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::errors::{AutoAnnotateError, Result};

/// Box as fractions of the image size, center based.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f32,
    pub y_center: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedBox {
    pub const fn new(x_center: f32, y_center: f32, width: f32, height: f32) -> Self {
        Self {
            x_center,
            y_center,
            width,
            height,
        }
    }

    /// Builds a normalized box from pixel corners of an image of the given size.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32, img_width: u32, img_height: u32) -> Self {
        let (w, h) = (img_width as f32, img_height as f32);
        Self {
            x_center: (x1 + x2) / 2.0 / w,
            y_center: (y1 + y2) / 2.0 / h,
            width: (x2 - x1) / w,
            height: (y2 - y1) / h,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub class_id: u32,
    pub confidence: f32,
    pub bbox: NormalizedBox,
}

/// `<class_id> <x_center> <y_center> <width> <height>` with four decimals.
pub fn format_label_line(detection: &Detection) -> String {
    let b = &detection.bbox;
    format!(
        "{} {:.4} {:.4} {:.4} {:.4}",
        detection.class_id, b.x_center, b.y_center, b.width, b.height
    )
}

/// `<output_dir>/<stem>.txt` for an input image path.
pub fn annotation_path(output_dir: &Path, image_path: &Path) -> PathBuf {
    let stem = image_path
        .file_stem()
        .or_else(|| image_path.file_name())
        .unwrap_or_default();
    let mut file_name = stem.to_os_string();
    file_name.push(".txt");
    output_dir.join(file_name)
}

/// Writes one line per detection, truncating any previous file.
pub fn write_annotation_file(path: &Path, detections: &[Detection]) -> Result<()> {
    let to_err = |e| AutoAnnotateError::file_system(path, "annotation write", e);

    let file = File::create(path).map_err(to_err)?;
    let mut writer = BufWriter::new(file);
    for detection in detections {
        writeln!(writer, "{}", format_label_line(detection)).map_err(to_err)?;
    }
    writer.flush().map_err(to_err)
}
