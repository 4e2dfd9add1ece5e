use std::fs;
use std::path::Path;
use tempfile::TempDir;

use auto_annotate_rs::{
    mocks::MockDetector, AnnotationEvent, Annotator, AutoAnnotateError, Config, Detection,
    NormalizedBox,
};

fn write_image(path: &Path) {
    image::DynamicImage::new_rgb8(16, 12).save(path).unwrap();
}

fn setup(names: &[&str]) -> (TempDir, Config) {
    let temp_dir = TempDir::new().unwrap();
    let input_dir = temp_dir.path().join("input");
    fs::create_dir_all(&input_dir).unwrap();
    for name in names {
        write_image(&input_dir.join(name));
    }
    let config = Config::new(
        "dummy.onnx",
        input_dir,
        temp_dir.path().join("labels/nested"),
        0.25,
    );
    (temp_dir, config)
}

fn single_box() -> Detection {
    Detection {
        class_id: 2,
        confidence: 0.9,
        bbox: NormalizedBox::new(0.5, 0.5, 0.2, 0.3),
    }
}

#[test]
fn test_zero_detections_write_empty_files() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&["a.png", "b.jpg", "c.jpeg"]);
    let output_dir = config.output_dir.clone();

    let processed = Annotator::new(MockDetector::empty(), config).process_directory()?;

    assert_eq!(processed, 3);
    for stem in ["a", "b", "c"] {
        let content = fs::read_to_string(output_dir.join(format!("{}.txt", stem)))?;
        assert!(content.is_empty(), "{} should be empty", stem);
    }
    Ok(())
}

#[test]
fn test_single_box_line() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&["dog.png"]);
    let output_dir = config.output_dir.clone();

    Annotator::new(MockDetector::new(vec![single_box()]), config).process_directory()?;

    assert_eq!(
        fs::read_to_string(output_dir.join("dog.txt"))?,
        "2 0.5000 0.5000 0.2000 0.3000\n"
    );
    Ok(())
}

#[test]
fn test_non_images_ignored() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&["photo.png"]);
    fs::write(config.input_dir.join("readme.txt"), "not an image")?;
    fs::write(config.input_dir.join("upper.PNG"), "skipped, case sensitive")?;
    let output_dir = config.output_dir.clone();

    let processed = Annotator::new(MockDetector::empty(), config).process_directory()?;

    assert_eq!(processed, 1);
    let mut written: Vec<_> = fs::read_dir(&output_dir)?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["photo.txt".to_string()]);
    Ok(())
}

#[test]
fn test_rerun_overwrites() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&["scene.jpg"]);
    let output_dir = config.output_dir.clone();

    Annotator::new(MockDetector::new(vec![single_box(), single_box()]), config.clone())
        .process_directory()?;
    assert_eq!(fs::read_to_string(output_dir.join("scene.txt"))?.lines().count(), 2);

    Annotator::new(MockDetector::empty(), config).process_directory()?;
    assert_eq!(fs::read_to_string(output_dir.join("scene.txt"))?, "");
    Ok(())
}

#[test]
fn test_threshold_passed_through() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, mut config) = setup(&["a.png", "b.png"]);
    config.confidence = 0.95;
    let output_dir = config.output_dir.clone();

    let annotator = Annotator::new(MockDetector::new(vec![single_box()]), config);
    annotator.process_directory()?;

    assert_eq!(annotator.detector().seen_thresholds(), vec![0.95, 0.95]);
    assert_eq!(fs::read_to_string(output_dir.join("a.txt"))?, "");
    Ok(())
}

#[test]
fn test_progress_events() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&["x.png", "y.png"]);

    let mut events = Vec::new();
    Annotator::new(MockDetector::new(vec![single_box()]), config)
        .process_directory_with_progress(|event| events.push(event))?;

    assert_eq!(
        events,
        vec![
            AnnotationEvent::Started { total: 2 },
            AnnotationEvent::Processed {
                index: 0,
                total: 2,
                file_name: "x.png".to_string(),
                detections: 1,
            },
            AnnotationEvent::Processed {
                index: 1,
                total: 2,
                file_name: "y.png".to_string(),
                detections: 1,
            },
            AnnotationEvent::Finished { processed: 2 },
        ]
    );
    Ok(())
}

#[test]
fn test_failure_keeps_earlier_files() {
    let (_temp_dir, config) = setup(&["1.png", "2.png", "3.png"]);
    let output_dir = config.output_dir.clone();

    let result = Annotator::new(MockDetector::empty().failing_on(1), config).process_directory();

    assert!(matches!(result, Err(AutoAnnotateError::ImageProcessing { .. })));
    assert!(output_dir.join("1.txt").exists());
    assert!(!output_dir.join("2.txt").exists());
    assert!(!output_dir.join("3.txt").exists());
}

#[test]
fn test_unreadable_image_aborts() {
    let (_temp_dir, config) = setup(&[]);
    fs::write(config.input_dir.join("broken.jpg"), b"not a jpeg").unwrap();

    let result = Annotator::new(MockDetector::empty(), config).process_directory();

    match result {
        Err(AutoAnnotateError::ImageProcessing { path, .. }) => assert!(path.ends_with("broken.jpg")),
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_empty_folder_creates_output_dir() -> auto_annotate_rs::Result<()> {
    let (_temp_dir, config) = setup(&[]);
    let output_dir = config.output_dir.clone();

    let processed = Annotator::new(MockDetector::empty(), config).process_directory()?;

    assert_eq!(processed, 0);
    assert!(output_dir.is_dir());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinked_images_are_annotated() -> auto_annotate_rs::Result<()> {
    use std::os::unix::fs::symlink;

    let (temp_dir, config) = setup(&["plain.png"]);
    let store = temp_dir.path().join("store");
    fs::create_dir_all(store.join("album.png"))?;
    write_image(&store.join("original.png"));
    symlink(store.join("original.png"), config.input_dir.join("linked.png"))?;
    // a linked folder with an image-like name is still not a file
    symlink(store.join("album.png"), config.input_dir.join("folder.png"))?;
    let output_dir = config.output_dir.clone();

    let processed = Annotator::new(MockDetector::new(vec![single_box()]), config)
        .process_directory()?;

    assert_eq!(processed, 2);
    assert_eq!(
        fs::read_to_string(output_dir.join("linked.txt"))?,
        "2 0.5000 0.5000 0.2000 0.3000\n"
    );
    assert!(output_dir.join("plain.txt").exists());
    assert!(!output_dir.join("folder.txt").exists());
    Ok(())
}
