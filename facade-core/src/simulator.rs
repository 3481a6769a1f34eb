//! Constrained 2-D particle simulation driving the facade pattern.
//!
//! Attractors gather loose clusters of particles; every particle repels its
//! neighbours within the separation radius. The resulting spatial density
//! becomes the density of cells in the tessellation.

use glam::Vec2;
use rand::Rng;
use tracing::{debug, trace};

use crate::{
    attractor::{Attractor, ForceField},
    bounds::Rect,
    config::{SimConfig, clamp_to},
    force_buffer::ForceBuffer,
    particle::Particle,
    phases,
    types::AttractorId,
};

/// Which entity a force field belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Attractor,
    ParticleRepulsion,
}

/// Handle to the selected attractor plus where it was grabbed.
#[derive(Clone, Copy, Debug)]
struct Selection {
    id: AttractorId,
    grab_offset: Vec2,
}

/// Owns particles and attractors and advances them one step per tick.
///
/// ### Fields
/// - `bounds` - World bounds; no particle ever leaves them.
/// - `particles` - All particles, each with its own repulsion field.
/// - `attractors` - User-placed attractors in insertion order.
/// - `selection` - Optional handle into `attractors`.
/// - `acc` - Scratch force buffer reused between steps.
#[derive(Debug)]
pub struct Simulator {
    bounds: Rect,
    cfg: SimConfig,
    particles: Vec<Particle>,
    attractors: Vec<Attractor>,
    selection: Option<Selection>,
    acc: ForceBuffer,
}

impl Simulator {
    /// Creates an empty simulation inside `bounds`.
    ///
    /// Drag and separation from `cfg` are clamped into their ranges.
    pub fn new(bounds: Rect, mut cfg: SimConfig) -> Self {
        cfg.drag = clamp_to(cfg.drag, &cfg.drag_range);
        cfg.separation = clamp_to(cfg.separation, &cfg.separation_range);
        Self {
            bounds,
            cfg,
            particles: Vec::new(),
            attractors: Vec::new(),
            selection: None,
            acc: ForceBuffer::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_positions(&self) -> Vec<Vec2> {
        self.particles.iter().map(|p| p.pos).collect()
    }

    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    pub fn drag(&self) -> f32 {
        self.cfg.drag
    }

    pub fn separation(&self) -> f32 {
        self.cfg.separation
    }

    /// Number of particles seeded around an attractor of `radius`.
    ///
    /// Linear interpolation between the configured particle counts over the
    /// configured radius range, truncated. Radii outside the range are
    /// clamped first, so the count never leaves the configured bounds.
    pub fn particle_count_for_radius(&self, radius: f32) -> usize {
        let (r0, r1) = (
            *self.cfg.attractor_radius.start(),
            *self.cfg.attractor_radius.end(),
        );
        let (n0, n1) = (
            *self.cfg.attractor_particles.start() as f32,
            *self.cfg.attractor_particles.end() as f32,
        );
        let t = if r1 > r0 {
            ((radius - r0) / (r1 - r0)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        (n0 + (n1 - n0) * t) as usize
    }

    /// Places a new attractor at a random position and seeds particles
    /// around it. The new attractor becomes the selection.
    ///
    /// ### Parameters
    /// - `rng` - Source for position, radius, and particle placement.
    ///
    /// ### Returns
    /// The id of the new attractor.
    pub fn add_attractor(&mut self, rng: &mut impl Rng) -> AttractorId {
        let radius = rng.random_range(self.cfg.attractor_radius.clone());
        let center = random_point_in(&self.bounds, rng);
        let attractor = Attractor::new(center, radius, self.cfg.attractor_strength);

        let count = self.particle_count_for_radius(radius);
        for _ in 0..count {
            let pos = attractor.random_point(rng);
            self.push_particle(pos);
        }

        let id = self.attractors.len();
        self.attractors.push(attractor);
        self.selection = Some(Selection {
            id,
            grab_offset: Vec2::ZERO,
        });
        debug!(id, radius, count, "added attractor");
        id
    }

    /// Adds `count` particles at uniformly random positions.
    pub fn add_particles(&mut self, count: usize, rng: &mut impl Rng) {
        for _ in 0..count {
            let pos = random_point_in(&self.bounds, rng);
            self.push_particle(pos);
        }
    }

    fn push_particle(&mut self, pos: Vec2) {
        let field = ForceField::new(self.cfg.separation, self.cfg.repulsion_strength);
        self.particles
            .push(Particle::at_rest(self.bounds.clamp(pos), field));
    }

    /// Advances the simulation by one step.
    pub fn update(&mut self) {
        phases::attraction_phase(&self.particles, &self.attractors, &mut self.acc);
        phases::repulsion_phase(&self.particles, &mut self.acc);
        phases::integration_phase(&mut self.particles, &self.acc, self.cfg.drag, &self.bounds);
        trace!(
            particles = self.particles.len(),
            affected = self.acc.affected_count(),
            "simulation step"
        );
    }

    /// Particles that at least one field acted on during the last step.
    pub fn affected_particles(&self) -> usize {
        self.acc.affected_count()
    }

    pub fn set_drag(&mut self, drag: f32) {
        self.cfg.drag = clamp_to(drag, &self.cfg.drag_range);
    }

    /// Sets the repulsion radius of every particle field. Attractor radii
    /// are left untouched.
    pub fn set_separation(&mut self, separation: f32) {
        let s = clamp_to(separation, &self.cfg.separation_range);
        self.cfg.separation = s;
        for p in &mut self.particles {
            p.repulsion.radius = s;
        }
    }

    /// Every active force field, attractors first.
    pub fn force_fields(&self) -> impl Iterator<Item = (FieldKind, ForceField)> + '_ {
        let attractors = self
            .attractors
            .iter()
            .map(|a| (FieldKind::Attractor, a.field));
        let particles = self
            .particles
            .iter()
            .map(|p| (FieldKind::ParticleRepulsion, p.repulsion));
        attractors.chain(particles)
    }

    /// Selects the first attractor (in insertion order) whose disc contains
    /// `pos`. Clears the selection if none does.
    pub fn select_attractor_near(&mut self, pos: Vec2) -> Option<AttractorId> {
        self.selection = self
            .attractors
            .iter()
            .position(|a| a.contains(pos))
            .map(|id| Selection {
                id,
                grab_offset: pos - self.attractors[id].center,
            });
        self.selected_id()
    }

    /// Moves the selected attractor so it stays under the pointer at `pos`,
    /// preserving the offset from when it was grabbed.
    pub fn move_selected_attractor(&mut self, pos: Vec2) {
        if let Some(sel) = self.selection
            && let Some(a) = self.attractors.get_mut(sel.id)
        {
            a.center = pos - sel.grab_offset;
        }
    }

    pub fn deselect_attractor(&mut self) {
        self.selection = None;
    }

    pub fn selected_id(&self) -> Option<AttractorId> {
        self.selection.map(|s| s.id)
    }

    pub fn selected_attractor(&self) -> Option<&Attractor> {
        self.selection.and_then(|s| self.attractors.get(s.id))
    }

    /// Changes the radius of the selected attractor, clamped to the
    /// configured radius range.
    pub fn set_selected_radius(&mut self, radius: f32) {
        let r = clamp_to(radius, &self.cfg.attractor_radius);
        if let Some(sel) = self.selection
            && let Some(a) = self.attractors.get_mut(sel.id)
        {
            a.field.radius = r;
        }
    }

    /// Removes the selected attractor and clears the selection. Particles
    /// seeded by it stay in the simulation.
    pub fn remove_selected_attractor(&mut self) -> Option<Attractor> {
        let sel = self.selection.take()?;
        (sel.id < self.attractors.len()).then(|| self.attractors.remove(sel.id))
    }

    /// Removes all particles, attractors, and the selection.
    pub fn clear(&mut self) {
        self.selection = None;
        self.particles.clear();
        self.attractors.clear();
        self.acc = ForceBuffer::default();
    }
}

fn random_point_in(bounds: &Rect, rng: &mut impl Rng) -> Vec2 {
    Vec2::new(
        rng.random_range(bounds.min.x..=bounds.max.x),
        rng.random_range(bounds.min.y..=bounds.max.y),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn sim() -> Simulator {
        Simulator::new(Rect::new(0.0, 0.0, 640.0, 360.0), SimConfig::default())
    }

    #[test]
    fn add_attractor_seeds_particle_count_for_its_radius() {
        let mut s = sim();
        let mut rng = StdRng::seed_from_u64(42);

        let id = s.add_attractor(&mut rng);

        assert_eq!(id, 0);
        assert_eq!(s.attractors().len(), 1);
        let radius = s.attractors()[0].radius();
        assert!((50.0..=200.0).contains(&radius));
        let expected = s.particle_count_for_radius(radius);
        assert_eq!(s.particles().len(), expected);
        assert!((10..=60).contains(&expected));
        assert_eq!(s.selected_id(), Some(0));
    }

    #[test]
    fn add_attractor_is_deterministic_for_a_seed() {
        let mut a = sim();
        let mut b = sim();
        a.add_attractor(&mut StdRng::seed_from_u64(9));
        b.add_attractor(&mut StdRng::seed_from_u64(9));
        assert_eq!(a.particle_positions(), b.particle_positions());
        assert_eq!(a.attractors()[0].center, b.attractors()[0].center);
    }

    #[test]
    fn particle_count_grows_with_radius() {
        let s = sim();
        assert_eq!(s.particle_count_for_radius(50.0), 10);
        assert_eq!(s.particle_count_for_radius(125.0), 35);
        assert_eq!(s.particle_count_for_radius(200.0), 60);
        assert_eq!(s.particle_count_for_radius(1000.0), 60);
        let mut last = 0;
        for r in (50..=200).step_by(5) {
            let n = s.particle_count_for_radius(r as f32);
            assert!(n >= last);
            last = n;
        }
    }

    #[test]
    fn particles_stay_in_bounds_after_updates() {
        let mut rng = StdRng::seed_from_u64(3);
        for (drag, separation) in [(0.0, 50.0), (0.03, 20.0), (0.1, 0.0)] {
            let mut s = sim();
            s.set_drag(drag);
            s.set_separation(separation);
            for _ in 0..3 {
                s.add_attractor(&mut rng);
            }
            s.add_particles(40, &mut rng);

            for _ in 0..60 {
                s.update();
                let b = s.bounds();
                for p in s.particles() {
                    assert!(b.contains(p.pos), "{:?} left {:?}", p.pos, b);
                }
            }
        }
    }

    #[test]
    fn set_separation_only_touches_particle_fields() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut s = sim();
        s.add_attractor(&mut rng);
        s.add_attractor(&mut rng);
        s.add_particles(10, &mut rng);

        let before: Vec<ForceField> = s
            .force_fields()
            .filter(|(k, _)| *k == FieldKind::Attractor)
            .map(|(_, f)| f)
            .collect();

        s.set_separation(33.0);

        let after: Vec<ForceField> = s
            .force_fields()
            .filter(|(k, _)| *k == FieldKind::Attractor)
            .map(|(_, f)| f)
            .collect();
        assert_eq!(before, after);
        assert!(
            s.force_fields()
                .filter(|(k, _)| *k == FieldKind::ParticleRepulsion)
                .all(|(_, f)| f.radius == 33.0)
        );
    }

    #[test]
    fn update_reports_particles_under_a_field() {
        let mut s = sim();
        assert_eq!(s.affected_particles(), 0);
        s.attractors.push(Attractor::new(Vec2::new(100.0, 100.0), 60.0, 0.5));
        s.push_particle(Vec2::new(120.0, 100.0));
        s.push_particle(Vec2::new(500.0, 300.0));

        s.update();

        assert_eq!(s.affected_particles(), 1);
    }

    #[test]
    fn separation_and_drag_are_clamped() {
        let mut s = sim();
        s.set_separation(500.0);
        assert_eq!(s.separation(), 50.0);
        s.set_drag(-1.0);
        assert_eq!(s.drag(), 0.0);
    }

    #[test]
    fn selection_picks_first_containing_attractor() {
        let mut s = sim();
        s.attractors.push(Attractor::new(Vec2::new(100.0, 100.0), 60.0, 0.5));
        s.attractors.push(Attractor::new(Vec2::new(120.0, 100.0), 60.0, 0.5));

        assert_eq!(s.select_attractor_near(Vec2::new(110.0, 100.0)), Some(0));
        assert_eq!(s.select_attractor_near(Vec2::new(175.0, 100.0)), Some(1));
        assert_eq!(s.select_attractor_near(Vec2::new(600.0, 300.0)), None);
        assert!(s.selected_attractor().is_none());
    }

    #[test]
    fn move_selected_attractor_keeps_grab_offset() {
        let mut s = sim();
        s.attractors.push(Attractor::new(Vec2::new(100.0, 100.0), 60.0, 0.5));
        s.select_attractor_near(Vec2::new(110.0, 95.0));

        s.move_selected_attractor(Vec2::new(210.0, 195.0));

        assert_eq!(s.attractors()[0].center, Vec2::new(200.0, 200.0));
    }

    #[test]
    fn removing_selected_attractor_clears_selection() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut s = sim();
        s.add_attractor(&mut rng);
        s.add_attractor(&mut rng);
        let particles = s.particles().len();

        let removed = s.remove_selected_attractor();

        assert!(removed.is_some());
        assert_eq!(s.attractors().len(), 1);
        assert_eq!(s.particles().len(), particles);
        assert!(s.selected_id().is_none());
        assert!(s.remove_selected_attractor().is_none());
    }

    #[test]
    fn set_selected_radius_is_clamped_and_scoped() {
        let mut s = sim();
        s.attractors.push(Attractor::new(Vec2::new(100.0, 100.0), 60.0, 0.5));
        s.attractors.push(Attractor::new(Vec2::new(400.0, 100.0), 60.0, 0.5));
        s.select_attractor_near(Vec2::new(400.0, 100.0));

        s.set_selected_radius(10.0);

        assert_eq!(s.attractors()[0].radius(), 60.0);
        assert_eq!(s.attractors()[1].radius(), 50.0);
    }

    #[test]
    fn clear_removes_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut s = sim();
        s.add_attractor(&mut rng);
        s.add_particles(20, &mut rng);
        s.update();

        s.clear();

        assert!(s.particles().is_empty());
        assert!(s.attractors().is_empty());
        assert!(s.selected_id().is_none());
        assert_eq!(s.force_fields().count(), 0);
        // stepping an empty system is a no-op
        s.update();
    }
}
