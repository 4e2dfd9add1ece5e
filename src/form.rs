use std::fmt;

use crate::config::{Config, DEFAULT_CONFIDENCE};

/// Parameters collected by the desktop shell before a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunForm {
    pub model_path: String,
    pub input_dir: String,
    pub output_dir: String,
    pub confidence: f32,
}

impl Default for RunForm {
    fn default() -> Self {
        Self {
            model_path: String::new(),
            input_dir: String::new(),
            output_dir: String::new(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    MissingField,
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField => f.write_str("Please fill in all fields."),
        }
    }
}

impl std::error::Error for FormError {}

impl RunForm {
    pub fn validate(&self) -> Result<Config, FormError> {
        let fields = [&self.model_path, &self.input_dir, &self.output_dir];
        if fields.iter().any(|f| f.trim().is_empty()) {
            return Err(FormError::MissingField);
        }

        Ok(Config::new(
            self.model_path.trim(),
            self.input_dir.trim(),
            self.output_dir.trim(),
            self.confidence.clamp(0.0, 1.0),
        ))
    }
}
