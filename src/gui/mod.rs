mod app;

pub use app::AutoAnnotateApp;

pub const WINDOW_TITLE: &str = "Auto-Annotation Tool";
pub const WINDOW_SIZE: [f32; 2] = [700.0, 600.0];

/// Opens the desktop window and blocks until it is closed.
pub fn run() -> eframe::Result {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| Ok(Box::new(AutoAnnotateApp::default()))),
    )
}
