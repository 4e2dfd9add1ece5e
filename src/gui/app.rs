use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};

use crate::{drain_messages, spawn_worker, RunForm, RunStatus, WorkerMessage, YoloModel};

#[derive(Default)]
pub struct AutoAnnotateApp {
    form: RunForm,
    status: RunStatus,
    progress_receiver: Option<Receiver<WorkerMessage>>,
}

impl AutoAnnotateApp {
    fn start_annotation(&mut self, ctx: &egui::Context) {
        let config = match self.form.validate() {
            Ok(config) => config,
            Err(e) => {
                self.status.notice(e.to_string());
                return;
            }
        };

        let (tx, rx) = channel();
        self.progress_receiver = Some(rx);
        self.status.start();

        let ctx = ctx.clone();
        spawn_worker(
            config,
            |config| YoloModel::new(&config.model_path, &config.detector_config()),
            tx,
            move || ctx.request_repaint(),
        );
    }

    fn poll_worker(&mut self) {
        let Some(rx) = &self.progress_receiver else {
            return;
        };

        if !drain_messages(&mut self.status, rx) {
            self.progress_receiver = None;
        }
    }

    fn path_row(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut String,
        pick: impl FnOnce() -> Option<PathBuf>,
    ) {
        ui.label(label);
        ui.add(egui::TextEdit::singleline(value).desired_width(360.0));
        if ui.button("Browse").clicked() {
            if let Some(path) = pick() {
                *value = path.display().to_string();
            }
        }
        ui.end_row();
    }
}

impl eframe::App for AutoAnnotateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_worker();

        egui::CentralPanel::default().show(ctx, |ui| {
            let running = self.status.running;

            ui.add_enabled_ui(!running, |ui| {
                egui::Grid::new("run_form")
                    .num_columns(3)
                    .spacing([10.0, 10.0])
                    .show(ui, |ui| {
                        Self::path_row(ui, "Model:", &mut self.form.model_path, || {
                            rfd::FileDialog::new()
                                .add_filter("ONNX models", &["onnx"])
                                .pick_file()
                        });
                        Self::path_row(ui, "Input Folder:", &mut self.form.input_dir, || {
                            rfd::FileDialog::new().pick_folder()
                        });
                        Self::path_row(ui, "Output Folder:", &mut self.form.output_dir, || {
                            rfd::FileDialog::new().pick_folder()
                        });

                        ui.label("Confidence Threshold:");
                        ui.add(
                            egui::Slider::new(&mut self.form.confidence, 0.0..=1.0)
                                .step_by(0.01)
                                .fixed_decimals(2),
                        );
                        ui.end_row();
                    });
            });

            ui.add_space(20.0);
            ui.vertical_centered(|ui| {
                if ui
                    .add_enabled(!running, egui::Button::new("Start Auto-Annotation"))
                    .clicked()
                {
                    self.start_annotation(ctx);
                }

                ui.add_space(10.0);
                ui.add(
                    egui::ProgressBar::new(self.status.progress)
                        .desired_width(400.0)
                        .show_percentage(),
                );
                ui.add_space(5.0);
                ui.label(self.status.message.as_str());
            });
        });
    }
}
