use std::path::PathBuf;
use thiserror::Error;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Structured error types for the annotation pipeline.
///
/// Each variant carries the context of its domain (filesystem, image decoding,
/// model inference) so callers can report what failed without parsing strings.
/// `Validation` covers inputs rejected before any work starts: run paths that
/// do not exist and model files whose inputs or outputs do not fit a YOLO head.
/// The source is `Send + Sync` so errors can cross the GUI worker thread and
/// be lifted into `anyhow` by the binaries.
#[derive(Error, Debug)]
pub enum AutoAnnotateError {
    #[error("Filesystem error: {operation} failed for {path:?}")]
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Image processing error: {operation} failed (file: {path})")]
    ImageProcessing {
        path: String,
        operation: String,
        #[source]
        source: BoxedError,
    },

    #[error("Model error: {operation} failed")]
    Model {
        operation: String,
        #[source]
        source: BoxedError,
    },

    #[error("Validation error: {field} {reason}")]
    Validation { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, AutoAnnotateError>;

impl AutoAnnotateError {
    pub(crate) fn model(operation: impl Into<String>, source: impl Into<BoxedError>) -> Self {
        Self::Model {
            operation: operation.into(),
            source: source.into(),
        }
    }

    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

/// Fallback for I/O errors raised without path context.
///
/// Call sites that know the path build `AutoAnnotateError::FileSystem` directly.
impl From<std::io::Error> for AutoAnnotateError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("unknown"),
            operation: "unknown".to_string(),
            source: err,
        }
    }
}

impl From<ort::Error> for AutoAnnotateError {
    fn from(err: ort::Error) -> Self {
        Self::model("ort operation", err)
    }
}

/// Shape errors only arise while reshaping inference tensors, so they are
/// reported as model errors.
impl From<ndarray::ShapeError> for AutoAnnotateError {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::model("tensor shape conversion", err)
    }
}
