use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use auto_annotate_rs::{logging, AnnotationEvent, Annotator, Config, ObjectDetector};

fn main() -> Result<()> {
    // hidden until the run starts; logging already draws around it
    let progress_bar = ProgressBar::hidden();
    logging::init_with_progress(&progress_bar).context("Failed to initialize logging")?;

    let config = Config::parse();
    config.validate()?;

    let annotator = Annotator::with_onnx_model(config)
        .context("Failed to load the detection model")?;
    let (width, height) = annotator.detector().input_size();
    log::debug!(
        "model input size {}x{}, confidence threshold {}",
        width,
        height,
        annotator.config().confidence
    );

    progress_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec} {eta})",
        )?
        .progress_chars("#>-"),
    );

    let processed = annotator.process_directory_with_progress(|event| match event {
        AnnotationEvent::Started { total } => {
            progress_bar.set_length(total as u64);
            progress_bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        }
        AnnotationEvent::Processed { .. } => progress_bar.inc(1),
        AnnotationEvent::Finished { .. } => progress_bar.finish(),
    })?;

    log::info!(
        "wrote {} annotation files to {}",
        processed,
        annotator.config().output_dir.display()
    );

    Ok(())
}
