use crate::audio_stream::AudioStream;
use crate::config::{APP_VERSION, MonitorConfig};
use crate::history::{EventLog, SignalHistory};
use eframe::egui;
use log::debug;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct AppState {
    config: MonitorConfig,
    signal_history: Arc<Mutex<SignalHistory>>,
    event_log: Arc<Mutex<EventLog>>,
    // Dropped when the window closes, releasing the capture device
    _audio_stream: AudioStream,
    device_name: String,
}

impl AppState {
    pub fn new(
        config: MonitorConfig,
        audio_stream: AudioStream,
        signal_history: Arc<Mutex<SignalHistory>>,
        event_log: Arc<Mutex<EventLog>>,
    ) -> Self {
        debug!("Initializing GUI state...");
        let device_name = audio_stream.device_name().to_string();

        Self {
            config,
            signal_history,
            event_log,
            _audio_stream: audio_stream,
            device_name,
        }
    }

    fn render_chart(&self, ui: &mut egui::Ui, history: &SignalHistory) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("Underlying Audio Data").strong());
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(100, 200, 255), "RMS");
                ui.colored_label(egui::Color32::from_rgb(255, 120, 120), "EMA baseline");
                ui.colored_label(egui::Color32::from_rgb(80, 200, 80), "trigger floor");
            });

            let desired_height = 160.0;
            let (response, painter) = ui.allocate_painter(
                egui::vec2(ui.available_width(), desired_height),
                egui::Sense::hover(),
            );

            let rect = response.rect;
            painter.rect_filled(rect, 0.0, egui::Color32::from_gray(20));

            let capacity = self.config.graph_history_length.max(1) as f32;
            let ylimit = self.config.graph_ylimit;

            let to_pos = |i: usize, value: f32| {
                let x = rect.left() + (i as f32 / capacity) * rect.width();
                let y = rect.bottom() - (value / ylimit).clamp(0.0, 1.0) * rect.height();
                egui::pos2(x, y)
            };

            // Horizontal marker for the absolute trigger floor
            let floor_y =
                rect.bottom() - (self.config.min_trigger_rms / ylimit).clamp(0.0, 1.0) * rect.height();
            painter.line_segment(
                [
                    egui::pos2(rect.left(), floor_y),
                    egui::pos2(rect.right(), floor_y),
                ],
                egui::Stroke::new(0.5, egui::Color32::from_rgb(80, 200, 80)),
            );

            let series: [(&VecDeque<f32>, egui::Color32); 2] = [
                (history.rms(), egui::Color32::from_rgb(100, 200, 255)),
                (history.ema(), egui::Color32::from_rgb(255, 120, 120)),
            ];

            for (values, color) in series {
                if values.len() > 1 {
                    let points: Vec<egui::Pos2> = values
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| to_pos(i, v))
                        .collect();
                    painter.add(egui::Shape::line(points, egui::Stroke::new(1.5, color)));
                }
            }
        });
    }

    fn render_event_log(&self, ui: &mut egui::Ui, log: &EventLog) {
        ui.label(egui::RichText::new("Loud Noise Message Event Log").strong());
        ui.group(|ui| {
            ui.set_min_height(140.0);
            ui.set_width(ui.available_width());
            if log.is_empty() {
                ui.colored_label(egui::Color32::GRAY, "No loud noises yet");
            } else {
                for entry in log.entries() {
                    ui.label(entry.display_line());
                }
            }
        });
    }
}

impl eframe::App for AppState {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Snapshot the shared state once per repaint; never mutate it here
        let history = self.signal_history.lock().unwrap().clone();
        let log = self.event_log.lock().unwrap().clone();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(format!("Loud Noise Monitor {APP_VERSION}"));
            ui.separator();

            ui.group(|ui| {
                ui.horizontal(|ui| {
                    ui.label("Input device:");
                    ui.strong(&self.device_name);
                });
                if history.is_ready() {
                    ui.colored_label(egui::Color32::GREEN, "Monitoring");
                } else {
                    ui.colored_label(egui::Color32::YELLOW, "Warming up baseline");
                }
            });

            ui.separator();
            self.render_chart(ui, &history);

            if let Some((rms, ema)) = history.latest() {
                ui.horizontal(|ui| {
                    ui.label("RMS:");
                    ui.strong(format!("{rms:.4}"));
                    ui.separator();
                    ui.label("EMA:");
                    ui.strong(format!("{ema:.4}"));
                });
            }

            ui.separator();
            self.render_event_log(ui, &log);
        });

        // Redraw on the block cadence; the audio callback never waits on us
        ctx.request_repaint_after(Duration::from_secs_f32(self.config.sample_duration));
    }
}
