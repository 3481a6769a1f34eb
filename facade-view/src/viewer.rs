//! Interactive facade generator built with eframe/egui.
//!
//! This module defines [`FacadeViewer`], which owns a [`FacadePipeline`]
//! and implements [`eframe::App`] to steer the particle simulation, edit the
//! profile curve and inspect the draped, displaced and reconstructed facade.

use eframe::App;
use facade_core::{
    FacadeConfig, FacadePipeline, Rect,
    config::CellMode,
    simulator::FieldKind,
};
use glam::{Quat, Vec2, Vec3};
use rand::rng;
use tracing::warn;

/// What the central panel shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawMode {
    /// Particles, attractors and cells in the plane.
    Field,
    /// Displaced surface loops as polylines.
    Outline,
    /// Reconstructed mesh as shaded triangles.
    Mesh,
}

/// Orthographic orbit camera for the 3-D draw modes.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Orbit {
    yaw: f32,
    pitch: f32,
}

impl Orbit {
    fn rotation(&self) -> Quat {
        Quat::from_rotation_x(self.pitch) * Quat::from_rotation_y(self.yaw)
    }

    /// Projects `p` into the screen, returning the position and a depth where
    /// larger values are farther from the viewer.
    fn project(&self, p: Vec3, scale: f32, center: egui::Pos2) -> (egui::Pos2, f32) {
        let q = self.rotation() * p;
        (egui::pos2(center.x + q.x * scale, center.y + q.y * scale), q.z)
    }

    fn rotate_by(&mut self, delta: egui::Vec2) {
        self.yaw += delta.x * 0.01;
        self.pitch = (self.pitch - delta.y * 0.01).clamp(-1.5, 1.5);
    }
}

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `pipeline` - Simulator, profile curve and every stage output.
/// - `rng` - Random source for new attractors and particles.
/// - `running` - Whether the simulation advances every frame.
/// - `draw_mode` - Current view of the central panel.
/// - `show_fields` / `show_cells` - 2-D overlays.
/// - `zoom` / `pan` - 2-D camera.
/// - `orbit` - 3-D camera.
/// - `last_error` - Message from the last failed stage, shown in the status bar.
pub struct FacadeViewer {
    pipeline: FacadePipeline,
    rng: rand::rngs::ThreadRng,

    running: bool,
    draw_mode: DrawMode,
    show_fields: bool,
    show_cells: bool,

    zoom: f32,
    pan: egui::Vec2,
    orbit: Orbit,

    last_error: Option<String>,
}

impl FacadeViewer {
    /// Creates a viewer over a 500x500 field with an empty simulation and
    /// the default three-point profile curve.
    pub fn new() -> Self {
        let pipeline = FacadePipeline::new(
            Rect::new(0.0, 0.0, 500.0, 500.0),
            Rect::new(0.0, 0.0, 120.0, 400.0),
            FacadeConfig::default(),
        );
        Self {
            pipeline,
            rng: rng(),
            running: true,
            draw_mode: DrawMode::Field,
            show_fields: true,
            show_cells: true,
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            orbit: Orbit {
                yaw: 0.6,
                pitch: -0.3,
            },
            last_error: None,
        }
    }

    /// Removes every particle and attractor and drops all stage outputs.
    fn clear(&mut self) {
        self.pipeline.clear();
        self.last_error = None;
    }

    /// Advances the simulation one step and, when cells or outlines are on
    /// screen, rebuilds the downstream chain from the new particle
    /// positions. The mesh view keeps its mesh until asked to rebuild.
    fn step_once(&mut self) {
        self.pipeline.step();
        let live = match self.draw_mode {
            DrawMode::Field => self.show_cells,
            DrawMode::Outline => true,
            DrawMode::Mesh => false,
        };
        if live {
            self.rebuild_surface();
        }
    }

    /// Tessellates, drapes and displaces from the current particle field.
    fn rebuild_surface(&mut self) {
        self.pipeline.recompute_tessellation();
        self.refresh_surface();
    }

    /// Drapes and displaces again from the current cells.
    fn refresh_surface(&mut self) {
        if self.pipeline.cells().is_none() {
            return;
        }
        let result = self.pipeline.refresh_from_surface().map(|_| ());
        self.record(result);
        if self.draw_mode == DrawMode::Mesh && self.last_error.is_none() {
            let result = self.pipeline.reconstruct().map(|_| ());
            self.record(result);
        }
    }

    /// Voxelizes the displaced surface, building it first if needed.
    fn reconstruct(&mut self) {
        if self.pipeline.displaced().is_none() {
            self.pipeline.recompute_tessellation();
            let result = self.pipeline.refresh_from_surface().map(|_| ());
            self.record(result);
            if self.last_error.is_some() {
                return;
            }
        }
        let result = self.pipeline.reconstruct().map(|_| ());
        self.record(result);
    }

    fn record(&mut self, result: Result<(), facade_core::FacadeError>) {
        self.last_error = match result {
            Ok(()) => None,
            Err(err) => {
                warn!(%err, "pipeline stage failed");
                Some(err.to_string())
            }
        };
    }

    /// Converts a field position to screen-space.
    ///
    /// The field center maps to the center of `rect`; `zoom` scales around
    /// it and `pan` shifts the result. Field and screen share the same
    /// downward y axis.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let c = rect.center();
        let local = p - self.pipeline.world().center();
        egui::pos2(
            c.x + local.x * self.zoom + self.pan.x,
            c.y + local.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`FacadeViewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let c = rect.center();
        let x = (p.x - c.x - self.pan.x) / self.zoom;
        let y = (p.y - c.y - self.pan.y) / self.zoom;
        self.pipeline.world().center() + Vec2::new(x, y)
    }

    /// Labeled slider over `range`.
    fn labeled_slider<T: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut T,
        range: std::ops::RangeInclusive<T>,
    ) -> egui::Response {
        ui.add(egui::Slider::new(value, range).text(label))
    }

    /// Builds the top panel (run controls, content buttons, draw mode).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }
                if ui.button("Step").clicked() {
                    self.step_once();
                }
                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                if ui.button("Add attractor").clicked() {
                    self.pipeline.add_attractor(&mut self.rng);
                }
                if ui.button("Add particles").clicked() {
                    self.pipeline.add_particles(&mut self.rng);
                }

                ui.separator();
                ui.selectable_value(&mut self.draw_mode, DrawMode::Field, "2D");
                ui.selectable_value(&mut self.draw_mode, DrawMode::Outline, "3D outline");
                if ui
                    .selectable_value(&mut self.draw_mode, DrawMode::Mesh, "3D mesh")
                    .clicked()
                    && self.pipeline.mesh().is_none()
                {
                    self.reconstruct();
                }
            });
        });
    }

    /// Builds the bottom status bar (counts per stage, last error).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(mesh) = self.pipeline.mesh() {
                    ui.label(format!(
                        "mesh = {} verts / {} tris",
                        mesh.vertex_count(),
                        mesh.face_count()
                    ));
                }
                ui.label(format!(
                    "cells = {}",
                    self.pipeline.cells().map_or(0, <[_]>::len)
                ));
                ui.separator();
                let sim = self.pipeline.simulator();
                ui.label(format!(
                    "particles = {} ({} in a field)",
                    sim.particles().len(),
                    sim.affected_particles()
                ));
                ui.label(format!("attractors = {}", sim.attractors().len()));
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }
            });
        });
    }

    /// Builds the right-hand panel with simulation, surface and voxel
    /// parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Simulation");
                let cfg = self.pipeline.simulator().config().clone();

                let mut drag = self.pipeline.simulator().drag();
                if Self::labeled_slider(ui, "drag", &mut drag, cfg.drag_range.clone()).changed() {
                    self.pipeline.simulator_mut().set_drag(drag);
                }

                let mut separation = self.pipeline.simulator().separation();
                if Self::labeled_slider(ui, "separation", &mut separation, cfg.separation_range)
                    .changed()
                {
                    self.pipeline.simulator_mut().set_separation(separation);
                }

                ui.separator();
                ui.label("Selected attractor");
                match self.pipeline.simulator().selected_attractor().map(|a| a.radius()) {
                    Some(mut radius) => {
                        if Self::labeled_slider(ui, "radius", &mut radius, cfg.attractor_radius)
                            .changed()
                        {
                            self.pipeline.simulator_mut().set_selected_radius(radius);
                        }
                        if ui.button("Remove").clicked() {
                            self.pipeline.simulator_mut().remove_selected_attractor();
                        }
                    }
                    None => {
                        ui.weak("right-click an attractor");
                    }
                }

                ui.separator();
                ui.heading("Cells");
                ui.checkbox(&mut self.show_fields, "show force fields");
                ui.checkbox(&mut self.show_cells, "show cells");
                let mut mode = self.pipeline.cell_mode();
                ui.horizontal(|ui| {
                    ui.radio_value(&mut mode, CellMode::Region, "regions");
                    ui.radio_value(&mut mode, CellMode::Triangle, "triangles");
                });
                if mode != self.pipeline.cell_mode() {
                    self.pipeline.set_cell_mode(mode);
                    self.rebuild_surface();
                }

                ui.separator();
                ui.heading("Surface");
                let mut strength = self.pipeline.displacement_strength();
                if Self::labeled_slider(ui, "displacement", &mut strength, 0.0..=100.0).changed() {
                    self.pipeline.set_displacement_strength(strength);
                    self.refresh_surface();
                }
                if ui.button("Rebuild surface").clicked() {
                    self.rebuild_surface();
                }

                ui.separator();
                ui.heading("Voxels");
                let range = self.pipeline.voxel_config().resolution_range.clone();
                let mut res = self.pipeline.voxel_resolution();
                let response = Self::labeled_slider(ui, "resolution", &mut res, range);
                if response.changed() {
                    self.pipeline.set_voxel_resolution(res);
                }
                let released = response.drag_stopped() || (response.changed() && !response.dragged());
                if ui.button("Reconstruct").clicked()
                    || (released && self.draw_mode == DrawMode::Mesh)
                {
                    self.reconstruct();
                }
            });
    }

    /// Builds the left-hand profile curve editor.
    ///
    /// Left click picks a control point or adds one; dragging moves it. The
    /// surface is redraped when the button is released.
    fn ui_curve_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("curve_panel")
            .resizable(false)
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.heading("Profile");
                if ui.button("Reset curve").clicked() {
                    self.pipeline.curve_mut().reset();
                    self.refresh_surface();
                }

                let edit = self.pipeline.curve().edit_bounds();
                let avail = ui.available_size();
                let scale = (avail.x / edit.width()).min(avail.y / edit.height()).max(0.01);
                let (response, painter) = ui.allocate_painter(
                    egui::vec2(edit.width() * scale, edit.height() * scale),
                    egui::Sense::click_and_drag(),
                );
                let rect = response.rect;
                let to_screen = |p: Vec2| {
                    let l = (p - edit.min) * scale;
                    egui::pos2(rect.min.x + l.x, rect.min.y + l.y)
                };
                let to_curve =
                    |p: egui::Pos2| edit.min + Vec2::new(p.x - rect.min.x, p.y - rect.min.y) / scale;

                painter.rect_filled(rect, 0.0, egui::Color32::from_gray(24));
                let grid = self.pipeline.curve().config().grid_size.max(1.0);
                let grid_stroke = egui::Stroke::new(0.5, egui::Color32::from_gray(48));
                let mut x = edit.min.x;
                while x <= edit.max.x {
                    painter.line_segment(
                        [to_screen(Vec2::new(x, edit.min.y)), to_screen(Vec2::new(x, edit.max.y))],
                        grid_stroke,
                    );
                    x += grid;
                }
                let mut y = edit.min.y;
                while y <= edit.max.y {
                    painter.line_segment(
                        [to_screen(Vec2::new(edit.min.x, y)), to_screen(Vec2::new(edit.max.x, y))],
                        grid_stroke,
                    );
                    y += grid;
                }

                let pointer = response.interact_pointer_pos().map(to_curve);
                if let Some(pos) = pointer {
                    if response.drag_started() || response.clicked() {
                        self.pipeline.curve_mut().press(pos);
                    }
                    if response.dragged() {
                        self.pipeline.curve_mut().drag(pos);
                    }
                }
                if response.drag_stopped() || response.clicked() {
                    self.pipeline.curve_mut().release();
                    self.refresh_surface();
                }

                let curve = self.pipeline.curve();
                if let Ok(samples) = curve.sample(curve.config().resolution) {
                    let pts: Vec<egui::Pos2> = samples.iter().map(|&p| to_screen(p)).collect();
                    painter.add(egui::Shape::line(
                        pts,
                        egui::Stroke::new(1.5, egui::Color32::LIGHT_BLUE),
                    ));
                }
                for (i, &p) in curve.points().iter().enumerate() {
                    let color = if curve.selected() == Some(i) {
                        egui::Color32::YELLOW
                    } else {
                        egui::Color32::WHITE
                    };
                    painter.circle_filled(to_screen(p), 3.5, color);
                }
            });
    }

    /// Draws particles, force fields and cells.
    fn draw_field(&self, painter: &egui::Painter, rect: egui::Rect) {
        let world = self.pipeline.world();
        let corners: Vec<egui::Pos2> = world
            .corners()
            .iter()
            .map(|&c| self.world_to_screen(c, rect))
            .collect();
        painter.add(egui::Shape::closed_line(
            corners,
            egui::Stroke::new(1.0, egui::Color32::GRAY),
        ));

        if self.show_cells
            && let Some(cells) = self.pipeline.cells()
        {
            let stroke = egui::Stroke::new(0.75, egui::Color32::from_rgb(120, 160, 120));
            for cell in cells {
                let pts: Vec<egui::Pos2> = cell
                    .vertices
                    .iter()
                    .map(|&v| self.world_to_screen(v, rect))
                    .collect();
                painter.add(egui::Shape::closed_line(pts, stroke));
            }
        }

        let sim = self.pipeline.simulator();
        if self.show_fields {
            for (i, a) in sim.attractors().iter().enumerate() {
                let color = if sim.selected_id() == Some(i) {
                    egui::Color32::YELLOW
                } else {
                    egui::Color32::from_rgb(200, 120, 60)
                };
                painter.circle_stroke(
                    self.world_to_screen(a.center, rect),
                    a.radius() * self.zoom,
                    egui::Stroke::new(1.0, color),
                );
            }
            let repulsion = sim
                .force_fields()
                .filter(|(kind, _)| *kind == FieldKind::ParticleRepulsion)
                .map(|(_, f)| f.radius)
                .next()
                .unwrap_or(0.0);
            let faint = egui::Stroke::new(0.5, egui::Color32::from_gray(60));
            for p in sim.particles() {
                painter.circle_stroke(self.world_to_screen(p.pos, rect), repulsion * self.zoom, faint);
            }
        }

        for p in sim.particles() {
            painter.circle_filled(
                self.world_to_screen(p.pos, rect),
                2.0,
                egui::Color32::LIGHT_BLUE,
            );
        }
    }

    /// Draws displaced surface loops through the orbit camera.
    fn draw_outline(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(surface) = self.pipeline.displaced() else {
            return;
        };
        if surface.bounds.is_empty() {
            return;
        }
        let center = surface.bounds.center();
        let scale = fit_scale(surface.bounds.size(), rect) * self.zoom;
        let stroke = egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN);
        for l in &surface.loops {
            let pts: Vec<egui::Pos2> = l
                .iter()
                .map(|&p| self.orbit.project(p - center, scale, rect.center()).0)
                .collect();
            painter.add(egui::Shape::line(pts, stroke));
        }
    }

    /// Draws the reconstructed mesh as back-to-front sorted, flat shaded
    /// triangles.
    fn draw_mesh(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(mesh) = self.pipeline.mesh() else {
            return;
        };
        let mut extent = Vec3::ZERO;
        for v in &mesh.vertices {
            extent = extent.max(v.abs());
        }
        let scale = fit_scale(extent * 2.0, rect) * self.zoom;
        let rot = self.orbit.rotation();
        let light = Vec3::new(-0.3, -0.5, -1.0).normalize();

        let mut tris: Vec<([egui::Pos2; 3], f32, egui::Color32)> = mesh
            .triangles()
            .filter_map(|[a, b, c]| {
                let n = rot * (b - a).cross(c - a).normalize_or_zero();
                // facing away from the viewer
                if n.z > 0.0 {
                    return None;
                }
                let shade = (0.25 + 0.75 * n.dot(light).max(0.0)) * 255.0;
                let (pa, da) = self.orbit.project(a, scale, rect.center());
                let (pb, db) = self.orbit.project(b, scale, rect.center());
                let (pc, dc) = self.orbit.project(c, scale, rect.center());
                Some(([pa, pb, pc], da + db + dc, egui::Color32::from_gray(shade as u8)))
            })
            .collect();
        tris.sort_by(|x, y| y.1.total_cmp(&x.1));

        let mut out = egui::Mesh::default();
        for (pts, _, color) in tris {
            let base = out.vertices.len() as u32;
            for p in pts {
                out.colored_vertex(p, color);
            }
            out.add_triangle(base, base + 1, base + 2);
        }
        painter.add(egui::Shape::mesh(out));
    }

    /// Builds the central panel and handles camera and attractor input.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);
            let pointer_world = response
                .interact_pointer_pos()
                .map(|p| self.screen_to_world(p, rect));

            match self.draw_mode {
                DrawMode::Field => {
                    if response.dragged_by(egui::PointerButton::Primary) {
                        self.pan += response.drag_delta();
                    }
                    if let Some(pos) = pointer_world {
                        let sim = self.pipeline.simulator_mut();
                        if response.drag_started_by(egui::PointerButton::Secondary)
                            || response.secondary_clicked()
                        {
                            sim.select_attractor_near(pos);
                        } else if response.dragged_by(egui::PointerButton::Secondary) {
                            sim.move_selected_attractor(pos);
                        }
                    }
                }
                DrawMode::Outline | DrawMode::Mesh => {
                    if response.dragged() {
                        self.orbit.rotate_by(response.drag_delta());
                    }
                }
            }

            if ctx.input(|i| i.key_pressed(egui::Key::Delete)) {
                self.pipeline.simulator_mut().remove_selected_attractor();
            }

            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 && response.hovered() {
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);
            }

            match self.draw_mode {
                DrawMode::Field => self.draw_field(&painter, rect),
                DrawMode::Outline => self.draw_outline(&painter, rect),
                DrawMode::Mesh => self.draw_mesh(&painter, rect),
            }

            if self.running {
                self.step_once();
                ctx.request_repaint();
            }
        });
    }
}

impl Default for FacadeViewer {
    fn default() -> Self {
        Self::new()
    }
}

/// Screen pixels per world unit so a box of `size` fills most of `rect`.
fn fit_scale(size: Vec3, rect: egui::Rect) -> f32 {
    let longest = size.max_element();
    if longest <= 0.0 {
        return 1.0;
    }
    0.8 * rect.width().min(rect.height()) / longest
}

impl App for FacadeViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_curve_panel(ctx);
        self.ui_central_panel(ctx);
    }
}
