// src/gui/mod.rs
pub mod panels;
pub mod theme;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crossbeam_channel::Sender;
use eframe::egui;
use egui::RichText;

use crate::config::AppConfig;
use crate::hierarchy::{split_layers, LayerEntry};
use crate::inference::UploadRequest;
use crate::labels;
use crate::playback::{CursorTracker, PlaybackSource, TransportClock};
use crate::response::InferenceResult;
use crate::session::{Generation, Session};
use theme::GradientTheme;

// Main Application GUI - handles rendering and user interaction
pub struct ScopeApp {
    /// Shared state between the inference worker and GUI threads
    session: Arc<Mutex<Session>>,

    /// Upload requests to the worker (local to the GUI thread)
    upload_tx: Sender<UploadRequest>,

    /// User settings, persisted on exit
    config: AppConfig,

    /// Transport timeline for the current result's waveform
    transport: Option<TransportClock>,

    /// Cursor tracker following the transport
    tracker: CursorTracker,

    /// Generation whose result the transport/tracker are attached to
    attached_generation: Option<Generation>,

    /// Performance tracking
    last_frame_time: Instant,
    frame_times: Vec<f32>,
}

impl ScopeApp {
    pub fn new(
        session: Arc<Mutex<Session>>,
        upload_tx: Sender<UploadRequest>,
        config: AppConfig,
    ) -> Self {
        Self {
            session,
            upload_tx,
            config,
            transport: None,
            tracker: CursorTracker::new(),
            attached_generation: None,
            last_frame_time: Instant::now(),
            frame_times: Vec::with_capacity(60),
        }
    }

    /// Open the file dialog and, if a file was picked, start a new upload.
    /// Beginning supersedes any in-flight request: the session clears its
    /// result/error immediately and hands us a fresh generation.
    fn pick_and_upload(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("WAV audio", &["wav"])
            .pick_file()
        else {
            return;
        };

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let generation = match self.session.lock() {
            Ok(mut session) => session.begin(&file_name),
            Err(_) => return,
        };

        tracing::info!("[GUI] Uploading {:?} (gen {})", file_name, generation);
        let request = UploadRequest {
            generation,
            file_name,
            path,
        };
        if self.upload_tx.send(request).is_err() {
            tracing::error!("[GUI] Inference worker is gone");
            if let Ok(mut session) = self.session.lock() {
                session.fail(generation, "inference worker is not running".into());
            }
        }
    }

    /// Keep the transport and cursor in sync with the session: a new result
    /// gets a fresh transport sized to its waveform, anything else detaches
    /// the tracker (which drops its subscription).
    fn sync_playback(&mut self, generation: Generation, result: Option<&InferenceResult>) {
        match result {
            Some(result) if self.attached_generation != Some(generation) => {
                let clock = TransportClock::new(result.waveform.duration.max(0.0));
                self.tracker.attach(&clock);
                self.transport = Some(clock);
                self.attached_generation = Some(generation);
            }
            Some(_) => {}
            None => {
                if self.attached_generation.is_some() {
                    self.tracker.detach();
                    self.transport = None;
                    self.attached_generation = None;
                }
            }
        }
    }

    fn track_fps(&mut self) -> f32 {
        let now = Instant::now();
        let frame_time = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        // Rolling buffer of frame times
        self.frame_times.push(frame_time);
        if self.frame_times.len() > 60 {
            self.frame_times.remove(0);
        }
        let avg = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        1.0 / avg.max(1e-6)
    }

    // ==================== Sections ====================

    fn draw_header(&mut self, ui: &mut egui::Ui, analyzing: bool, file_name: Option<&str>) {
        ui.vertical_centered(|ui| {
            ui.add_space(12.0);
            ui.label(
                RichText::new("CNN Audio Visualizer")
                    .size(30.0)
                    .color(theme::HEADING_TEXT),
            );
            ui.label(
                RichText::new("Upload a WAV file to see the model's predictions and feature maps")
                    .size(15.0)
                    .color(theme::BODY_TEXT),
            );
            ui.add_space(10.0);

            let label = if analyzing { "Analyzing..." } else { "Choose file" };
            let button =
                egui::Button::new(RichText::new(label).size(14.0)).min_size(egui::vec2(130.0, 32.0));
            if ui.add_enabled(!analyzing, button).clicked() {
                self.pick_and_upload();
            }

            if let Some(name) = file_name {
                ui.add_space(6.0);
                ui.label(RichText::new(name).size(12.0).color(theme::BODY_TEXT));
            }
            ui.add_space(8.0);
        });
    }

    fn draw_error_card(&self, ui: &mut egui::Ui, error: &str) {
        egui::Frame::none()
            .fill(theme::ERROR_BACKGROUND)
            .stroke(egui::Stroke::new(1.0, theme::ERROR_BORDER))
            .rounding(6.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(format!("Error: {}", error))
                        .size(14.0)
                        .color(theme::ERROR_TEXT),
                );
            });
    }

    fn draw_predictions(&self, ui: &mut egui::Ui, result: &InferenceResult) {
        card(ui, "Top Predictions", |ui| {
            for (rank, pred) in result.predictions.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new(format!(
                            "{} {}",
                            labels::emoji_for(&pred.class_name),
                            labels::display_name(&pred.class_name)
                        ))
                        .size(16.0)
                        .color(theme::BODY_TEXT),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let pct = format!("{:.1}%", pred.confidence * 100.0);
                        let text = if rank == 0 {
                            RichText::new(pct).strong().color(theme::HEADING_TEXT)
                        } else {
                            RichText::new(pct).color(theme::FAINT_TEXT)
                        };
                        ui.label(text);
                    });
                });
                ui.add(
                    egui::ProgressBar::new(pred.confidence.clamp(0.0, 1.0))
                        .desired_height(6.0)
                        .fill(theme::TRACE_STROKE),
                );
                ui.add_space(6.0);
            }
        });
    }

    fn draw_signal_row(&mut self, ui: &mut egui::Ui, result: &InferenceResult) {
        let gradient = GradientTheme::find(&self.config.theme_name);
        let panel_height = self.config.panel_height;
        let scale_fraction = self.config.trace_scale_fraction;

        ui.columns(2, |columns| {
            card(&mut columns[0], "Input Spectrogram", |ui| {
                let size = egui::vec2(ui.available_width(), panel_height);
                let (response, painter) = ui.allocate_painter(size, egui::Sense::hover());
                panels::draw_feature_map(
                    &painter,
                    response.rect,
                    &result.input_spectrogram,
                    &gradient,
                );
                caption(ui, &result.input_spectrogram.shape_label());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let (r, p) =
                        ui.allocate_painter(egui::vec2(140.0, 14.0), egui::Sense::hover());
                    panels::draw_color_scale(&p, r.rect, &gradient);
                });
            });

            card(&mut columns[1], "Audio Waveform", |ui| {
                let size = egui::vec2(ui.available_width(), panel_height);
                let (response, painter) = ui.allocate_painter(size, egui::Sense::click());

                // Click to seek on the timeline
                if response.clicked() {
                    if let (Some(pos), Some(transport)) =
                        (response.interact_pointer_pos(), self.transport.as_ref())
                    {
                        let ratio = ((pos.x - response.rect.left()) / response.rect.width())
                            .clamp(0.0, 1.0);
                        transport.seek(ratio * transport.duration());
                        transport.tick();
                        self.tracker.poll();
                    }
                }

                panels::draw_waveform(
                    &painter,
                    response.rect,
                    &result.waveform,
                    scale_fraction,
                    Some(self.tracker.ratio()),
                );
                caption(
                    ui,
                    &format!(
                        "{}s * {}Hz",
                        result.waveform.duration, result.waveform.sample_rate
                    ),
                );

                ui.horizontal(|ui| {
                    if let Some(transport) = &self.transport {
                        let symbol = if transport.is_playing() { "⏸" } else { "▶" };
                        if ui.button(symbol).clicked() {
                            transport.toggle();
                        }
                        ui.label(
                            RichText::new(format!(
                                "{:.1}s / {:.1}s",
                                self.tracker.current_time(),
                                transport.duration()
                            ))
                            .size(12.0)
                            .color(theme::FAINT_TEXT),
                        );
                    }
                });
            });
        });
    }

    fn draw_layer_grid(&self, ui: &mut egui::Ui, result: &InferenceResult) {
        let gradient = GradientTheme::find(&self.config.theme_name);
        // Derived fresh from the immutable result every frame; never cached
        let hierarchy = split_layers(&result.visualization);
        if hierarchy.is_empty() {
            return;
        }

        card(ui, "Convolutional Layer Outputs", |ui| {
            const COLUMNS: usize = 5;
            let map_width = ((ui.available_width() - 60.0) / COLUMNS as f32).max(80.0);
            let map_size = egui::vec2(map_width, 110.0);

            for row in hierarchy.main.chunks(COLUMNS) {
                ui.horizontal_top(|ui| {
                    for &(name, tensor) in row {
                        ui.vertical(|ui| {
                            ui.set_width(map_size.x);
                            ui.label(RichText::new(name).strong().color(theme::BODY_TEXT));
                            let (response, painter) =
                                ui.allocate_painter(map_size, egui::Sense::hover());
                            panels::draw_feature_map(&painter, response.rect, tensor, &gradient);
                            caption(ui, &tensor.shape_label());

                            // Sorted view; the split itself stays in wire order
                            let internals = hierarchy.sorted_internals(name);
                            self.draw_internals(ui, &internals, name, map_size.x, &gradient);
                        });
                    }
                });
                ui.add_space(10.0);
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let (r, p) = ui.allocate_painter(egui::vec2(140.0, 14.0), egui::Sense::hover());
                panels::draw_color_scale(&p, r.rect, &gradient);
            });
        });
    }

    fn draw_internals(
        &self,
        ui: &mut egui::Ui,
        internals: &[LayerEntry<'_>],
        parent: &str,
        width: f32,
        gradient: &GradientTheme,
    ) {
        if internals.is_empty() {
            return;
        }

        egui::Frame::none()
            .fill(theme::PAGE_BACKGROUND)
            .stroke(egui::Stroke::new(1.0, theme::CARD_BORDER))
            .rounding(4.0)
            .inner_margin(4.0)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt(parent.to_string())
                    .max_height(180.0)
                    .show(ui, |ui| {
                        for (full_name, tensor) in internals {
                            let short = full_name
                                .strip_prefix(parent)
                                .and_then(|s| s.strip_prefix('.'))
                                .unwrap_or(full_name);
                            caption(ui, short);
                            let (response, painter) = ui.allocate_painter(
                                egui::vec2((width - 16.0).max(40.0), 48.0),
                                egui::Sense::hover(),
                            );
                            panels::draw_feature_map(&painter, response.rect, tensor, gradient);
                            ui.add_space(4.0);
                        }
                    });
            });
    }

    fn draw_settings_strip(&mut self, ui: &mut egui::Ui, fps: f32) {
        ui.horizontal(|ui| {
            ui.label(RichText::new("Theme:").size(12.0).color(theme::FAINT_TEXT));
            egui::ComboBox::from_id_salt("gradient_theme")
                .selected_text(self.config.theme_name.clone())
                .show_ui(ui, |ui| {
                    for t in GradientTheme::all() {
                        ui.selectable_value(
                            &mut self.config.theme_name,
                            t.name.to_string(),
                            t.name,
                        );
                    }
                });

            ui.checkbox(
                &mut self.config.show_stats,
                RichText::new("stats").size(12.0),
            );
            if self.config.show_stats {
                ui.label(
                    RichText::new(format!("{:.0} fps", fps))
                        .size(12.0)
                        .color(theme::FAINT_TEXT),
                );
            }
        });
    }
}

impl eframe::App for ScopeApp {
    // Called by eframe periodically and on exit
    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if let Err(e) = self.config.save() {
            tracing::warn!("[GUI] Could not save settings: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let fps = self.track_fps();

        // Snapshot the session under one short lock; rendering works on the
        // clone so the worker never waits on a paint.
        let (generation, analyzing, file_name, error, result) = match self.session.lock() {
            Ok(session) => (
                session.current_generation(),
                session.is_analyzing(),
                session.file_name().map(|s| s.to_string()),
                session.error().map(|s| s.to_string()),
                session.result().cloned(),
            ),
            Err(_) => return,
        };

        self.sync_playback(generation, result.as_ref());

        // Drive the cursor: the transport publishes position events on tick,
        // the tracker drains them.
        if let Some(transport) = &self.transport {
            transport.tick();
            self.tracker.poll();
            if transport.is_playing() {
                ctx.request_repaint();
            }
        }
        if analyzing {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Track window size for the settings file
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_size = [rect.width(), rect.height()];
        }

        egui::CentralPanel::default()
            .frame(
                egui::Frame::default()
                    .fill(theme::PAGE_BACKGROUND)
                    .inner_margin(24.0),
            )
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.draw_header(ui, analyzing, file_name.as_deref());

                    if let Some(error) = &error {
                        self.draw_error_card(ui, error);
                        ui.add_space(12.0);
                    }

                    if let Some(result) = &result {
                        self.draw_predictions(ui, result);
                        ui.add_space(12.0);
                        self.draw_signal_row(ui, result);
                        ui.add_space(12.0);
                        self.draw_layer_grid(ui, result);
                        ui.add_space(12.0);
                    }

                    self.draw_settings_strip(ui, fps);
                });
            });
    }
}

// ==================== Small helpers ====================

/// A titled card frame, the page's one repeating container.
fn card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(theme::CARD_BACKGROUND)
        .stroke(egui::Stroke::new(1.0, theme::CARD_BORDER))
        .rounding(8.0)
        .inner_margin(14.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(title)
                    .size(17.0)
                    .strong()
                    .color(theme::HEADING_TEXT),
            );
            ui.add_space(8.0);
            add_contents(ui);
        });
}

fn caption(ui: &mut egui::Ui, text: &str) {
    ui.label(RichText::new(text).size(11.0).color(theme::FAINT_TEXT));
}
