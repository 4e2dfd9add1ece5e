//! Progress events emitted by the annotation loop and the status model the
//! desktop shell renders from them.

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationEvent {
    Started {
        total: usize,
    },
    Processed {
        index: usize,
        total: usize,
        file_name: String,
        detections: usize,
    },
    Finished {
        processed: usize,
    },
}

/// Progress bar fraction and status line of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatus {
    pub progress: f32,
    pub message: String,
    pub running: bool,
}

impl RunStatus {
    pub fn start(&mut self) {
        self.progress = 0.0;
        self.message = "Starting annotation...".to_string();
        self.running = true;
    }

    pub fn apply(&mut self, event: &AnnotationEvent) {
        match event {
            AnnotationEvent::Started { .. } => {
                self.progress = 0.0;
                self.running = true;
            }
            AnnotationEvent::Processed {
                index,
                total,
                file_name,
                ..
            } => {
                let done = index + 1;
                self.progress = done as f32 / (*total).max(1) as f32;
                self.message = format!("Processed {}/{}: {}", done, total, file_name);
            }
            AnnotationEvent::Finished { .. } => {
                self.running = false;
                self.message = "Annotation completed!".to_string();
            }
        }
    }

    /// Stops the run and surfaces the error text.
    pub fn fail(&mut self, message: impl std::fmt::Display) {
        self.running = false;
        self.message = format!("Error: {}", message);
    }

    /// Shows a message without touching progress, used for rejected forms.
    pub fn notice(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }
}
