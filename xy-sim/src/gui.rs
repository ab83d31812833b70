//! egui UI: lattice view, temperature and size controls, color wheel and
//! the magnetization-vs-temperature curve.

use std::f32::consts::TAU;
use std::time::Duration;

use crossbeam_channel::Receiver;
use eframe::egui;
use egui_plot::{Corner, Legend, Line, MarkerShape, Plot, PlotPoints, Points, VLine};
use log::{debug, warn};
use xy_lattice_sim::prelude::*;

// ─── Colors ──────────────────────────────────────────────────────────────────

const FOREST_GREEN: egui::Color32 = egui::Color32::from_rgb(86, 166, 96);
const DIM: egui::Color32 = egui::Color32::from_rgb(160, 160, 150);
const GOLD_EG: egui::Color32 = egui::Color32::from_rgb(212, 175, 55);
const HEADING_CLR: egui::Color32 = egui::Color32::from_rgb(220, 218, 210);
const LABEL_CLR: egui::Color32 = egui::Color32::from_rgb(230, 228, 218);

/// Approximate BKT crossover temperature, drawn as a reference line.
const T_BKT: f64 = 0.89;

// ─── Visuals ─────────────────────────────────────────────────────────────────

fn forest_visuals() -> egui::Visuals {
    let mut vis = egui::Visuals::dark();
    vis.panel_fill = egui::Color32::from_rgb(24, 30, 24);
    vis.window_fill = egui::Color32::from_rgb(28, 34, 28);
    vis.extreme_bg_color = egui::Color32::from_rgb(20, 24, 20);
    vis.faint_bg_color = egui::Color32::from_rgb(34, 44, 34);
    vis.widgets.inactive.bg_fill = egui::Color32::from_rgb(50, 65, 50);
    vis.widgets.hovered.bg_fill = egui::Color32::from_rgb(65, 90, 65);
    vis.widgets.active.bg_fill = FOREST_GREEN;
    vis.override_text_color = Some(LABEL_CLR);
    vis
}

fn dim_label(ui: &mut egui::Ui, text: &str) {
    ui.colored_label(DIM, text);
}

fn section_heading(ui: &mut egui::Ui, text: &str) {
    ui.add_space(4.0);
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(3.0, 16.0), egui::Sense::hover());
        ui.painter().rect_filled(rect, 1.0, GOLD_EG);
        ui.add_space(4.0);
        ui.colored_label(HEADING_CLR, egui::RichText::new(text).strong().size(14.0));
    });
    ui.separator();
}

fn spin_color(angle: f64) -> egui::Color32 {
    let [r, g, b] = angle_to_color(angle);
    egui::Color32::from_rgb(r, g, b)
}

/// Hue ring showing which color each spin angle maps to. Angle 0 points
/// right and increases counter-clockwise.
fn draw_color_wheel(painter: &egui::Painter, center: egui::Pos2, r_outer: f32, r_inner: f32) {
    let segs = 90_usize;
    let mut mesh = egui::Mesh::default();
    for s in 0..segs {
        let a0 = TAU * s as f32 / segs as f32;
        let a1 = TAU * (s + 1) as f32 / segs as f32;
        let color = spin_color(((a0 + a1) * 0.5) as f64);
        let dir0 = egui::vec2(a0.cos(), -a0.sin());
        let dir1 = egui::vec2(a1.cos(), -a1.sin());

        let base = mesh.vertices.len() as u32;
        mesh.colored_vertex(center + dir0 * r_inner, color);
        mesh.colored_vertex(center + dir0 * r_outer, color);
        mesh.colored_vertex(center + dir1 * r_outer, color);
        mesh.colored_vertex(center + dir1 * r_inner, color);
        mesh.add_triangle(base, base + 1, base + 2);
        mesh.add_triangle(base, base + 2, base + 3);
    }
    painter.add(egui::Shape::mesh(mesh));

    for (label, angle) in [("0", 0.0_f32), ("\u{03c0}/2", TAU / 4.0), ("\u{03c0}", TAU / 2.0), ("3\u{03c0}/2", 0.75 * TAU)] {
        let dir = egui::vec2(angle.cos(), -angle.sin());
        painter.text(
            center + dir * (r_outer + 10.0),
            egui::Align2::CENTER_CENTER,
            label,
            egui::FontId::monospace(10.0),
            DIM,
        );
    }
}

/// Fold one worker report into the UI state. The worker's run state wins
/// over the last button press.
fn absorb_report(playing: &mut bool, curve: &mut MagnetizationCurve, report: &FrameReport) {
    // Only animation frames feed the curve; single steps are not samples.
    if report.running {
        curve.record(beta_to_temperature(report.beta), report.magnetization);
    }
    if *playing != report.running {
        debug!("worker running={}, controls showed {}", report.running, *playing);
        *playing = report.running;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  App state
// ═══════════════════════════════════════════════════════════════════════════════

pub struct XyApp {
    // Controls
    temperature: f64,
    size: LatticeSize,
    playing: bool,
    // Results
    last_report: Option<FrameReport>,
    curve: MagnetizationCurve,
    // Visualization
    frames: Receiver<PixelBuffer>,
    texture: Option<egui::TextureHandle>,
    // Worker
    worker: SimWorker,
}

impl XyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: EngineConfig) -> Self {
        cc.egui_ctx.set_visuals(forest_visuals());

        let mut style = (*cc.egui_ctx.style()).clone();
        style.text_styles.insert(egui::TextStyle::Heading, egui::FontId::proportional(17.0));
        style.text_styles.insert(egui::TextStyle::Body, egui::FontId::proportional(14.0));
        style.text_styles.insert(egui::TextStyle::Small, egui::FontId::proportional(12.0));
        style.text_styles.insert(egui::TextStyle::Monospace, egui::FontId::monospace(13.0));
        style.text_styles.insert(egui::TextStyle::Button, egui::FontId::proportional(14.0));
        cc.egui_ctx.set_style(style);

        let (w, h) = EngineConfig::VIEWPORT;
        let ctx = cc.egui_ctx.clone();
        let (surface, frames) = ChannelSurface::new(w, h);
        let surface = surface.with_waker(move || ctx.request_repaint());

        let size = config.size;
        let temperature = beta_to_temperature(config.beta);
        let worker = SimWorker::spawn(config);
        worker.send(vec![Instruction::Handoff(SurfaceHandoff::new(surface, size))]);

        Self {
            temperature,
            size,
            playing: false,
            last_report: None,
            curve: MagnetizationCurve::new(),
            frames,
            texture: None,
            worker,
        }
    }

    fn send_temperature(&mut self) {
        match Property::beta(temperature_to_beta(self.temperature)) {
            Ok(property) => self.worker.send(vec![Instruction::SetProperty(property)]),
            Err(err) => warn!("temperature {} not sent: {}", self.temperature, err),
        }
    }

    fn send_resize(&mut self, size: LatticeSize) {
        self.size = size;
        self.playing = false;
        self.worker.send(vec![
            Instruction::Invoke(Method::Resize(size)),
            Instruction::Invoke(Method::InitializeData),
            Instruction::Invoke(Method::Render),
        ]);
    }

    fn toggle_play(&mut self) {
        self.playing = !self.playing;
        let method = if self.playing { Method::Play } else { Method::Pause };
        self.worker.send(vec![Instruction::Invoke(method)]);
    }

    fn step(&mut self) {
        self.playing = false;
        self.worker.send(vec![
            Instruction::Invoke(Method::Pause),
            Instruction::Invoke(Method::Step),
            Instruction::Invoke(Method::Render),
        ]);
    }

    fn reset(&mut self) {
        self.playing = false;
        self.worker.send(vec![Instruction::Invoke(Method::Reset)]);
    }

    /// Upload the newest pending frame; older ones are skipped.
    fn poll_frames(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.frames.try_iter().last() else {
            return;
        };
        let image = egui::ColorImage::from_rgba_unmultiplied([frame.width(), frame.height()], frame.as_bytes());
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("lattice", image, egui::TextureOptions::NEAREST));
            }
        }
    }

    fn poll_reports(&mut self) {
        while let Some(report) = self.worker.try_recv() {
            absorb_report(&mut self.playing, &mut self.curve, &report);
            self.last_report = Some(report);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Frame update
// ═══════════════════════════════════════════════════════════════════════════════

impl eframe::App for XyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Spacebar toggles play/pause
        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            self.toggle_play();
        }

        self.poll_frames(ctx);
        self.poll_reports();

        // ═════ LEFT PANEL: Controls ═════
        egui::SidePanel::left("controls")
            .min_width(240.0)
            .max_width(300.0)
            .show(ctx, |ui| {
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    ui.colored_label(GOLD_EG, egui::RichText::new("PARAXIOM").strong().size(14.0));
                    ui.colored_label(DIM, egui::RichText::new("Technologies").size(12.0));
                });
                ui.add_space(2.0);
                ui.colored_label(GOLD_EG, egui::RichText::new("XY MODEL SIMULATOR").strong().size(13.0));
                dim_label(ui, "Planar spins, Metropolis dynamics");
                ui.add_space(4.0);

                ui.horizontal(|ui| {
                    let (label, color) = if self.playing {
                        ("STOP", GOLD_EG)
                    } else {
                        ("START", FOREST_GREEN)
                    };
                    if ui.add(egui::Button::new(egui::RichText::new(label).strong().color(color))).clicked() {
                        self.toggle_play();
                    }
                    if ui.button("STEP").clicked() {
                        self.step();
                    }
                    if ui.button("RESET").clicked() {
                        self.reset();
                    }
                });
                ui.colored_label(
                    egui::Color32::from_rgb(110, 110, 105),
                    egui::RichText::new("(Space toggles start/stop)").size(11.0),
                );

                section_heading(ui, "TEMPERATURE");
                dim_label(ui, "k_B T / J. Zero is a pure quench.");
                let slider = egui::Slider::new(&mut self.temperature, 0.0..=MAX_TEMPERATURE)
                    .step_by(TEMPERATURE_STEP)
                    .fixed_decimals(2);
                if ui.add(slider).changed() {
                    self.send_temperature();
                }
                let beta = temperature_to_beta(self.temperature);
                if beta.is_infinite() {
                    dim_label(ui, "\u{03b2} = \u{221e}");
                } else {
                    dim_label(ui, &format!("\u{03b2} = {:.3}", beta));
                }

                section_heading(ui, "LATTICE SIZE");
                dim_label(ui, "Resizing stops the animation and redraws a random field.");
                let mut idx = self.size.index();
                let slider = egui::Slider::new(&mut idx, 0..=LatticeSize::ALL.len() - 1)
                    .show_value(false);
                if ui.add(slider).changed() {
                    if let Some(size) = LatticeSize::from_index(idx) {
                        self.send_resize(size);
                    }
                }
                ui.label(format!("N = {}  ({} spins)", self.size, self.size.side() * self.size.side()));

                section_heading(ui, "SPIN ANGLE \u{2192} HUE");
                let (rect, _) = ui.allocate_exact_size(egui::vec2(200.0, 160.0), egui::Sense::hover());
                draw_color_wheel(ui.painter(), rect.center(), 55.0, 35.0);
            });

        // ═════ RIGHT PANEL: Order parameter ═════
        egui::SidePanel::right("order")
            .min_width(320.0)
            .show(ctx, |ui| {
                section_heading(ui, "ORDER PARAMETER");
                match &self.last_report {
                    Some(report) => {
                        ui.label(format!("sweeps      {}", report.sweeps));
                        ui.label(format!("\u{27e8}m\u{27e9}         {:.4}", report.magnetization));
                        ui.label(format!("acceptance  {:.3}", report.acceptance_ratio));
                    }
                    None => dim_label(ui, "No sweeps yet."),
                }

                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    dim_label(ui, "Running average per 0.01 of T, while animating.");
                    if ui.small_button("clear").clicked() {
                        self.curve.clear();
                    }
                });

                let temperature = self.temperature;
                let points = self.curve.points();
                Plot::new("magnetization_curve")
                    .x_axis_label("k_B T / J")
                    .y_axis_label("\u{27e8}m\u{27e9}")
                    .include_x(0.0)
                    .include_x(MAX_TEMPERATURE)
                    .include_y(0.0)
                    .include_y(1.0)
                    .legend(Legend::default().position(Corner::RightTop))
                    .label_formatter(|_, value| format!("T = {:.2}\nm = {:.4}", value.x, value.y))
                    .show(ui, |plot_ui| {
                        let line: PlotPoints = points.iter().copied().collect();
                        plot_ui.line(Line::new(line).color(FOREST_GREEN).width(1.5).name("\u{27e8}m\u{27e9}(T)"));
                        plot_ui.points(
                            Points::new(PlotPoints::from(points))
                                .color(FOREST_GREEN)
                                .shape(MarkerShape::Circle)
                                .radius(2.5),
                        );
                        plot_ui.vline(VLine::new(temperature).color(egui::Color32::WHITE).width(1.5).name("Current T"));
                        plot_ui.vline(
                            VLine::new(T_BKT)
                                .color(egui::Color32::from_rgba_unmultiplied(212, 175, 55, 120))
                                .width(1.0)
                                .name("T_BKT \u{2248} 0.89"),
                        );
                    });
            });

        // ═════ CENTER: Lattice ═════
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| match &self.texture {
                Some(texture) => {
                    let (w, h) = EngineConfig::VIEWPORT;
                    let sized = egui::load::SizedTexture::new(texture.id(), egui::vec2(w as f32, h as f32));
                    ui.add(egui::Image::from_texture(sized));
                }
                None => {
                    ui.spinner();
                }
            });
        });

        // Status badge (bottom-right)
        let (st, sc) = if self.playing {
            ("RUNNING", FOREST_GREEN)
        } else {
            ("STOPPED", GOLD_EG)
        };
        let frame = egui::Frame {
            fill: egui::Color32::from_rgba_unmultiplied(22, 28, 22, 230),
            corner_radius: egui::CornerRadius::from(6),
            inner_margin: egui::Margin::same(10),
            stroke: egui::Stroke::new(2.0, sc),
            ..Default::default()
        };
        egui::Window::new("status")
            .title_bar(false)
            .resizable(false)
            .movable(false)
            .frame(frame)
            .anchor(egui::Align2::RIGHT_BOTTOM, [-10.0, -10.0])
            .show(ctx, |ui| {
                ui.colored_label(sc, egui::RichText::new(st).strong().size(15.0));
                ui.label(format!("N={}  T={:.2}", self.size, self.temperature));
            });

        // New frames wake the UI through the surface; this only keeps the
        // report panel fresh if a wake-up is missed.
        if self.playing {
            ctx.request_repaint_after(Duration::from_millis(250));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(sweeps: u64, running: bool) -> FrameReport {
        FrameReport {
            sweeps,
            magnetization: 0.5,
            acceptance_ratio: 0.4,
            beta: 2.0,
            running,
        }
    }

    #[test]
    fn test_worker_stop_clears_playing() {
        let mut playing = true;
        let mut curve = MagnetizationCurve::new();
        absorb_report(&mut playing, &mut curve, &report(7, false));
        assert!(!playing, "controls still show running after the worker stopped");
        assert!(curve.points().is_empty());
    }

    #[test]
    fn test_running_reports_feed_curve() {
        let mut playing = false;
        let mut curve = MagnetizationCurve::new();
        absorb_report(&mut playing, &mut curve, &report(1, true));
        absorb_report(&mut playing, &mut curve, &report(2, true));
        assert!(playing);
        let bucket = MagnetizationCurve::bucket(0.5).expect("T = 0.5 has a bucket");
        assert_eq!(curve.samples(bucket), 2);
    }
}
