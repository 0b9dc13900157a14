use eframe::egui;
use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use egui_plot::{Line, Plot, PlotPoints};
use nalgebra::Vector2;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nbody_sandbox::physics::constants::{AU, DAY, EARTH_MASS, JUPITER_MASS, SOLAR_MASS};
use nbody_sandbox::scenario::Preset;
use nbody_sandbox::sim::body::Color;
use nbody_sandbox::sim::editor::{Interaction, ARROW_SCALE, MIN_ARROW_LENGTH};
use nbody_sandbox::sim::FrameCadence;
use nbody_sandbox::{BodyId, Camera, CameraPolicy, Editor, Mode, SimulationState};

const WARPS: [f64; 9] = [0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 50.0, 100.0, 1000.0];
const MAX_TRAIL_POINTS: usize = 2000;
const MAX_SPEED_SAMPLES: usize = 10_000;

fn main() -> eframe::Result {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let mut app = SandboxApp::default();
    app.load_preset(Preset::SolarSystem);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1400.0, 900.0]),
        ..Default::default()
    };
    eframe::run_native("N-Body Sandbox", options, Box::new(|_| Ok(Box::new(app))))
}

#[derive(Default)]
struct SandboxApp {
    sim: SimulationState,
    camera: Camera,
    editor: Editor,
    cadence: FrameCadence,
    status: String,
    /// `[elapsed days, speed km/s]` of the selected body during playback.
    speed_history: Vec<[f64; 2]>,
    // Body editor text fields, refreshed when the selection changes
    edit_target: Option<BodyId>,
    name_buf: String,
    mass_buf: String,
    speed_buf: String,
}

fn color32(c: &Color) -> Color32 {
    c.rgb()
        .map(|[r, g, b]| Color32::from_rgb(r, g, b))
        .unwrap_or(Color32::WHITE)
}

/// Append a plot sample, skipping repeats while paused and dropping the
/// oldest half once `MAX_SPEED_SAMPLES` is reached.
fn push_sample(history: &mut Vec<[f64; 2]>, sample: [f64; 2]) {
    if history.last() == Some(&sample) {
        return;
    }
    if history.len() >= MAX_SPEED_SAMPLES {
        history.drain(..MAX_SPEED_SAMPLES / 2);
    }
    history.push(sample);
}

/// Marker radius in pixels from a log-mass scale.
fn marker_radius(mass: f64) -> f32 {
    let scale = (mass / 1e24).log10();
    ((scale * 50.0).max(100.0).sqrt() * 0.6) as f32
}

// ---------------------------------------------------------------------------
// World <-> screen mapping
// ---------------------------------------------------------------------------

struct View {
    rect: Rect,
    center: Vector2<f64>,
    px_per_m: f64,
}

impl View {
    fn new(rect: Rect, camera: &Camera) -> Self {
        let half = f64::from(rect.width().min(rect.height())) * 0.5;
        Self {
            rect,
            center: camera.center(),
            px_per_m: half / camera.zoom(),
        }
    }

    fn to_screen(&self, p: &Vector2<f64>) -> Pos2 {
        let d = (p - self.center) * self.px_per_m;
        self.rect.center() + Vec2::new(d.x as f32, -d.y as f32)
    }

    fn to_world(&self, p: Pos2) -> Vector2<f64> {
        let d = p - self.rect.center();
        self.center + Vector2::new(f64::from(d.x), -f64::from(d.y)) / self.px_per_m
    }

    fn world_delta(&self, d: Vec2) -> Vector2<f64> {
        Vector2::new(f64::from(d.x), -f64::from(d.y)) / self.px_per_m
    }

    fn world_vec(&self, v: &Vector2<f64>) -> Vec2 {
        let s = v * self.px_per_m;
        Vec2::new(s.x as f32, -s.y as f32)
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

impl SandboxApp {
    fn report<T>(&mut self, result: nbody_sandbox::Result<T>) -> Option<T> {
        match result {
            Ok(v) => Some(v),
            Err(e) => {
                self.status = e.to_string();
                None
            }
        }
    }

    fn load_preset(&mut self, preset: Preset) {
        let loaded = preset.scenario().load_into(&mut self.sim);
        if self.report(loaded).is_some() {
            self.status = format!("Loaded {}", preset.title());
        }
        self.editor.reset();
        self.camera.reset_view();
        self.speed_history.clear();
    }

    fn start(&mut self) {
        let entered = self.sim.enter_playback();
        if self.report(entered).is_some() {
            self.editor.reset();
            self.speed_history.clear();
            self.status.clear();
        }
    }

    fn stop(&mut self) {
        self.sim.exit_playback();
        self.editor.reset();
    }

    fn refresh_edit_buffers(&mut self) {
        let selected = self.sim.selected_id();
        if selected == self.edit_target {
            return;
        }
        self.edit_target = selected;
        if let Some(b) = self.sim.selected() {
            self.name_buf = b.name.clone();
            self.mass_buf = format!("{:.4e}", b.mass());
            self.speed_buf = format!("{:.1}", b.speed());
        }
    }

    fn tick(&mut self) {
        if self.sim.mode() != Mode::Playback {
            return;
        }
        if self.sim.is_running() {
            let advanced = self.sim.advance_frame();
            if self.report(advanced).is_none() {
                if let Err(e) = self.sim.pause() {
                    tracing::warn!("cannot pause after failed frame: {e}");
                }
            }
        }
        self.camera.update(self.sim.bodies());

        if let Some(b) = self.sim.selected() {
            let sample = [self.sim.elapsed_time() / DAY, b.speed() / 1000.0];
            push_sample(&mut self.speed_history, sample);
        }
    }

    // -----------------------------------------------------------------------
    // Panels
    // -----------------------------------------------------------------------

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Simulation");
        ui.label(format!("Mode: {}", self.sim.mode()));
        ui.label(format!("Elapsed: {}", self.sim.elapsed_display()));

        ui.horizontal(|ui| match self.sim.mode() {
            Mode::Authoring => {
                if ui.button("▶ Start").clicked() {
                    self.start();
                }
            }
            Mode::Playback => {
                let label = if self.sim.is_running() { "⏸ Pause" } else { "▶ Resume" };
                if ui.button(label).clicked() {
                    let toggled = self.sim.toggle_running();
                    self.report(toggled);
                }
                if ui.button("⏹ Stop").clicked() {
                    self.stop();
                }
            }
        });

        let mut warp = self.sim.time_warp();
        egui::ComboBox::from_label("Time warp")
            .selected_text(format!("{warp}x"))
            .show_ui(ui, |ui| {
                for w in WARPS {
                    ui.selectable_value(&mut warp, w, format!("{w}x"));
                }
            });
        if warp != self.sim.time_warp() {
            let set = self.sim.set_time_warp(warp);
            self.report(set);
        }

        ui.separator();
        ui.heading("Presets");
        for p in Preset::ALL {
            if ui.button(p.title()).on_hover_text(p.description()).clicked() {
                self.load_preset(p);
            }
        }
        if ui.button("Clear all").clicked() {
            self.sim.clear_all();
            self.editor.reset();
            self.speed_history.clear();
        }

        ui.separator();
        ui.heading("Camera");
        ui.horizontal(|ui| {
            if ui.button("Zoom in").clicked() {
                self.camera.zoom_in();
            }
            if ui.button("Zoom out").clicked() {
                self.camera.zoom_out();
            }
            if ui.button("Reset").clicked() {
                self.camera.reset_view();
            }
        });
        let policy = self.camera.policy();
        if ui
            .selectable_label(policy == CameraPolicy::FollowCog, "Auto CoG")
            .clicked()
        {
            self.camera.toggle_follow_cog();
        }
        if ui
            .selectable_label(policy == CameraPolicy::FitAll, "Capture all")
            .clicked()
        {
            self.camera.toggle_fit_all();
        }
        let focused = matches!(policy, CameraPolicy::FocusBody(_));
        if ui.selectable_label(focused, "Focus selected").clicked() {
            match (focused, self.sim.selected_id()) {
                (true, _) => self.camera.set_policy(CameraPolicy::Manual),
                (false, Some(id)) => self.camera.focus(id),
                (false, None) => self.status = "Select a body to focus on".into(),
            }
        }

        ui.separator();
        if self.sim.mode() == Mode::Authoring {
            self.body_editor(ui);
        }

        if !self.status.is_empty() {
            ui.separator();
            ui.colored_label(Color32::LIGHT_RED, &self.status);
        }
    }

    fn body_editor(&mut self, ui: &mut egui::Ui) {
        self.refresh_edit_buffers();
        let Some(id) = self.edit_target else {
            ui.label("Click empty space to add a body, or a body to edit it.");
            return;
        };

        ui.heading("Body");
        ui.horizontal(|ui| {
            ui.label("Name");
            if ui.text_edit_singleline(&mut self.name_buf).changed() {
                let renamed = self.sim.rename_body(id, self.name_buf.clone());
                self.report(renamed);
            }
        });

        ui.horizontal(|ui| {
            ui.label("Mass (kg)");
            ui.text_edit_singleline(&mut self.mass_buf);
        });
        ui.horizontal(|ui| {
            for (label, mass) in [("Earth", EARTH_MASS), ("Jupiter", JUPITER_MASS), ("Sun", SOLAR_MASS)] {
                if ui.button(label).clicked() {
                    self.mass_buf = format!("{mass:.4e}");
                }
            }
        });
        if ui.button("Apply mass").clicked() {
            match self.mass_buf.trim().parse::<f64>() {
                Ok(m) => {
                    let set = self.sim.set_body_mass(id, m);
                    self.report(set);
                }
                Err(_) => self.status = format!("'{}' is not a number", self.mass_buf),
            }
        }

        ui.horizontal(|ui| {
            ui.label("Speed (m/s)");
            ui.text_edit_singleline(&mut self.speed_buf);
        });
        if ui.button("Apply speed").clicked() {
            match self.speed_buf.trim().parse::<f64>() {
                Ok(s) => {
                    let set = self.sim.set_body_speed(id, s);
                    self.report(set);
                }
                Err(_) => self.status = format!("'{}' is not a number", self.speed_buf),
            }
        }

        let editing = matches!(
            self.editor.interaction(&self.sim),
            Interaction::EditingVelocity(_) | Interaction::DraggingArrow(_)
        );
        let arrow_label = if editing { "Done editing arrow" } else { "Edit velocity arrow" };
        if ui.button(arrow_label).clicked() {
            let toggled = self.editor.toggle_velocity_edit(&self.sim);
            self.report(toggled);
        }

        ui.separator();
        ui.label("Auto orbit");
        let target = self
            .editor
            .orbit_target(&self.sim)
            .and_then(|t| self.sim.body(t))
            .map(|b| b.name.clone());
        let picking = matches!(
            self.editor.interaction(&self.sim),
            Interaction::PickingOrbitTarget(_)
        );
        ui.label(match (target, picking) {
            (_, true) => "Click a body...".to_string(),
            (Some(name), false) => format!("Target: {name}"),
            (None, false) => "No target selected".to_string(),
        });
        ui.horizontal(|ui| {
            if ui.button("Pick target").clicked() {
                let started = self.editor.start_picking_orbit_target(&self.sim);
                self.report(started);
            }
            ui.checkbox(&mut self.editor.clockwise, "Clockwise");
        });
        if ui.button("Apply orbit").clicked() {
            let applied = self.editor.apply_orbit(&mut self.sim);
            if let Some(v) = self.report(applied) {
                self.speed_buf = format!("{:.1}", v.norm());
            }
        }

        ui.separator();
        if ui.button("Delete body").clicked() {
            let removed = self.sim.remove_body(id);
            self.report(removed);
        }
    }

    fn speed_plot(&self, ui: &mut egui::Ui) {
        let title = match self.sim.selected() {
            Some(b) => format!("Speed of {} (km/s)", b.name),
            None => "Select a body before starting to plot its speed".to_string(),
        };
        ui.label(title);
        let points: PlotPoints = self.speed_history.iter().copied().collect();
        Plot::new("speed")
            .height(ui.available_height())
            .x_axis_label("Elapsed (days)")
            .show(ui, |plot_ui| {
                plot_ui.line(Line::new("Speed", points));
            });
    }

    // -----------------------------------------------------------------------
    // Canvas
    // -----------------------------------------------------------------------

    fn canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let view = View::new(response.rect, &self.camera);
        painter.rect_filled(response.rect, 0.0, Color32::from_rgb(8, 8, 16));

        let pointer = ui.input(|i| i.pointer.interact_pos());
        let (pressed, released, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.smooth_scroll_delta.y,
            )
        });

        // Input
        if response.hovered() && scroll.abs() > 1.0 {
            if scroll > 0.0 {
                self.camera.zoom_in();
            } else {
                self.camera.zoom_out();
            }
        }
        match self.sim.mode() {
            Mode::Playback => {
                if response.dragged() {
                    self.camera.pan(-view.world_delta(response.drag_delta()));
                }
            }
            Mode::Authoring => {
                if let Some(p) = pointer.filter(|p| response.rect.contains(*p)) {
                    if pressed {
                        let outcome = self.editor.press(&mut self.sim, view.to_world(p));
                        self.report(outcome);
                    }
                    if released {
                        let set = self.editor.release(&mut self.sim, view.to_world(p));
                        if let Some(Some(v)) = self.report(set) {
                            self.speed_buf = format!("{:.1}", v.norm());
                        }
                    }
                }
            }
        }

        // Trails
        for (body, trail) in self.sim.bodies().iter().zip(self.sim.trajectories()) {
            if trail.len() < 2 {
                continue;
            }
            let stride = (trail.len() / MAX_TRAIL_POINTS).max(1);
            let mut points: Vec<Pos2> = trail.iter().step_by(stride).map(|p| view.to_screen(p)).collect();
            points.push(view.to_screen(&body.position()));
            painter.add(egui::Shape::line(
                points,
                Stroke::new(1.0, color32(&body.color).gamma_multiply(0.4)),
            ));
        }

        // Bodies
        let authoring = self.sim.mode() == Mode::Authoring;
        let selected = self.sim.selected_id();
        for body in self.sim.bodies() {
            let pos = view.to_screen(&body.position());
            let mut r = marker_radius(body.mass());
            if authoring && selected == Some(body.id()) {
                r *= 1.2;
                painter.circle_stroke(
                    pos,
                    (0.15 * AU * view.px_per_m) as f32,
                    Stroke::new(2.0, Color32::WHITE),
                );
            }
            painter.circle_filled(pos, r, color32(&body.color));
            painter.circle_stroke(pos, r, Stroke::new(1.0, Color32::WHITE));
            painter.text(
                pos - Vec2::new(0.0, r + 4.0),
                Align2::CENTER_BOTTOM,
                &body.name,
                FontId::proportional(12.0),
                Color32::WHITE,
            );
        }

        // Velocity arrows
        if authoring {
            let interaction = self.editor.interaction(&self.sim);
            let preview = pointer.and_then(|p| self.editor.arrow_preview(&self.sim, view.to_world(p)));
            if let Some((start, velocity)) = preview {
                let tip = start + velocity / ARROW_SCALE;
                let origin = view.to_screen(&start);
                painter.arrow(origin, view.world_vec(&(tip - start)), Stroke::new(3.0, Color32::YELLOW));
                painter.text(
                    view.to_screen(&(start + (tip - start) * 0.6)),
                    Align2::CENTER_BOTTOM,
                    format!("{:.0} m/s", velocity.norm()),
                    FontId::proportional(13.0),
                    Color32::YELLOW,
                );
            } else if let Some(b) = self.sim.selected() {
                let arrow = b.velocity() / ARROW_SCALE;
                if arrow.norm() > MIN_ARROW_LENGTH {
                    let editing = matches!(interaction, Interaction::EditingVelocity(_));
                    let (color, width) = if editing {
                        (Color32::YELLOW, 3.0)
                    } else {
                        (Color32::from_rgb(0, 200, 220), 2.0)
                    };
                    painter.arrow(
                        view.to_screen(&b.position()),
                        view.world_vec(&arrow),
                        Stroke::new(width, color),
                    );
                }
            }
        }
    }
}

impl eframe::App for SandboxApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tick();

        egui::SidePanel::left("controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.controls(ui));
            });

        egui::TopBottomPanel::bottom("speed")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| self.speed_plot(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.canvas(ui));

        ctx.request_repaint_after(self.cadence.interval(self.sim.is_running()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_history_is_bounded() {
        let mut history = Vec::new();
        for i in 0..3 * MAX_SPEED_SAMPLES {
            push_sample(&mut history, [i as f64, 1.0]);
        }
        assert!(history.len() <= MAX_SPEED_SAMPLES, "len {}", history.len());
        assert_eq!(history.last(), Some(&[(3 * MAX_SPEED_SAMPLES - 1) as f64, 1.0]), "newest sample kept");
    }

    #[test]
    fn repeated_sample_is_skipped() {
        let mut history = Vec::new();
        push_sample(&mut history, [1.0, 2.0]);
        push_sample(&mut history, [1.0, 2.0]);
        assert_eq!(history.len(), 1);
    }
}
