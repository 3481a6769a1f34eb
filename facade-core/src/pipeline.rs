//! Stage orchestration: simulation to reconstructed mesh.
//!
//! Every `recompute_*` call consumes the latest output of the stage before
//! it and drops the outputs after it, so no stage ever holds results derived
//! from an older upstream input.

use rand::Rng;
use tracing::debug;

use crate::{
    bounds::Rect,
    config::{CellMode, FacadeConfig, TessellationConfig, VoxelConfig, clamp_to},
    curve::ProfileCurve,
    displacement::{DisplacedSurface, Displacement, NoiseDisplacement, displace},
    error::FacadeError,
    mesh::Mesh,
    reconstruct::reconstruct,
    simulator::Simulator,
    surface::{Profile, SurfaceLoop, drape},
    tessellate::{Cell, tessellate},
};

/// Owns the stateful parts of the system and the latest result of each
/// stage.
pub struct FacadePipeline {
    simulator: Simulator,
    curve: ProfileCurve,
    displacement: Box<dyn Displacement>,
    tessellation: TessellationConfig,
    voxel: VoxelConfig,
    cells: Option<Vec<Cell>>,
    surface: Option<Vec<SurfaceLoop>>,
    displaced: Option<DisplacedSurface>,
    mesh: Option<Mesh>,
}

impl FacadePipeline {
    /// ### Parameters
    /// - `world`: bounds of the particle field.
    /// - `curve_bounds`: editing area of the profile curve.
    /// - `cfg`: stage configs; displacement uses coherent noise.
    pub fn new(world: Rect, curve_bounds: Rect, cfg: FacadeConfig) -> Self {
        let mut voxel = cfg.voxel;
        voxel.resolution = clamp_to(voxel.resolution, &voxel.resolution_range);
        Self {
            simulator: Simulator::new(world, cfg.sim),
            curve: ProfileCurve::new(curve_bounds, cfg.curve),
            displacement: Box::new(NoiseDisplacement::new(cfg.noise)),
            tessellation: cfg.tessellation,
            voxel,
            cells: None,
            surface: None,
            displaced: None,
            mesh: None,
        }
    }

    /// Swaps in a different displacement strategy.
    pub fn with_displacement(mut self, displacement: Box<dyn Displacement>) -> Self {
        self.displacement = displacement;
        self.invalidate_displaced();
        self
    }

    pub fn world(&self) -> Rect {
        self.simulator.bounds()
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    pub fn curve(&self) -> &ProfileCurve {
        &self.curve
    }

    /// Mutable curve access. Call [`Self::recompute_surface`] after editing.
    pub fn curve_mut(&mut self) -> &mut ProfileCurve {
        &mut self.curve
    }

    pub fn cells(&self) -> Option<&[Cell]> {
        self.cells.as_deref()
    }

    pub fn surface(&self) -> Option<&[SurfaceLoop]> {
        self.surface.as_deref()
    }

    pub fn displaced(&self) -> Option<&DisplacedSurface> {
        self.displaced.as_ref()
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn cell_mode(&self) -> CellMode {
        self.tessellation.mode
    }

    pub fn set_cell_mode(&mut self, mode: CellMode) {
        if self.tessellation.mode != mode {
            self.tessellation.mode = mode;
            self.invalidate_cells();
        }
    }

    pub fn displacement_strength(&self) -> f32 {
        self.displacement.strength()
    }

    /// Clamped by the displacement strategy.
    pub fn set_displacement_strength(&mut self, strength: f32) {
        self.displacement.set_strength(strength);
        self.invalidate_displaced();
    }

    pub fn voxel_resolution(&self) -> usize {
        self.voxel.resolution
    }

    pub fn voxel_config(&self) -> &VoxelConfig {
        &self.voxel
    }

    pub fn set_voxel_resolution(&mut self, resolution: usize) {
        self.voxel.resolution = clamp_to(resolution, &self.voxel.resolution_range);
        self.mesh = None;
    }

    /// Advances the simulation by one step.
    pub fn step(&mut self) {
        self.simulator.update();
    }

    pub fn add_attractor(&mut self, rng: &mut impl Rng) {
        self.simulator.add_attractor(rng);
    }

    pub fn add_particles(&mut self, rng: &mut impl Rng) {
        let n = self.simulator.config().particle_batch;
        self.simulator.add_particles(n, rng);
    }

    /// Removes all particles and attractors and drops every stage output.
    pub fn clear(&mut self) {
        self.simulator.clear();
        self.invalidate_cells();
    }

    /// Tessellates the current particle positions.
    pub fn recompute_tessellation(&mut self) -> &[Cell] {
        let cells = tessellate(
            &self.simulator.particle_positions(),
            &self.simulator.bounds(),
            &self.tessellation,
        );
        self.invalidate_cells();
        self.cells.insert(cells).as_slice()
    }

    /// Drapes the latest cells over the profile curve.
    ///
    /// ### Returns
    /// `MissingTessellation` before the first tessellation, or a curve error
    /// when the curve cannot be sampled.
    pub fn recompute_surface(&mut self) -> Result<&[SurfaceLoop], FacadeError> {
        let cells = self.cells.as_deref().ok_or(FacadeError::MissingTessellation)?;
        let profile = Profile::from_curve(&self.curve)?;
        let loops = drape(cells, &profile, &self.simulator.bounds());
        self.invalidate_surface();
        Ok(self.surface.insert(loops).as_slice())
    }

    /// Displaces the latest surface with the current strategy.
    pub fn recompute_displaced(&mut self) -> Result<&DisplacedSurface, FacadeError> {
        let loops = self.surface.as_deref().ok_or(FacadeError::MissingSurface)?;
        let displaced = displace(loops, self.displacement.as_ref());
        debug!(
            loops = displaced.loops.len(),
            strength = self.displacement.strength(),
            "displaced surface"
        );
        self.mesh = None;
        Ok(&*self.displaced.insert(displaced))
    }

    /// Drapes and displaces again, e.g. after a curve edit.
    pub fn refresh_from_surface(&mut self) -> Result<&DisplacedSurface, FacadeError> {
        self.recompute_surface()?;
        self.recompute_displaced()
    }

    /// Voxelizes the latest displaced surface into a mesh.
    pub fn reconstruct(&mut self) -> Result<&Mesh, FacadeError> {
        let displaced = self
            .displaced
            .as_ref()
            .ok_or(FacadeError::MissingDisplacedSurface)?;
        let mesh = reconstruct(displaced, &self.voxel)?;
        Ok(&*self.mesh.insert(mesh))
    }

    fn invalidate_cells(&mut self) {
        self.cells = None;
        self.invalidate_surface();
    }

    fn invalidate_surface(&mut self) {
        self.surface = None;
        self.invalidate_displaced();
    }

    fn invalidate_displaced(&mut self) {
        self.displaced = None;
        self.mesh = None;
    }
}

impl std::fmt::Debug for FacadePipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacadePipeline")
            .field("simulator", &self.simulator)
            .field("curve", &self.curve)
            .field("strength", &self.displacement.strength())
            .field("voxel", &self.voxel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ReconstructError, surface::SurfaceVertex};
    use rand::{SeedableRng, rngs::StdRng};

    struct Fixed(f32);

    impl Displacement for Fixed {
        fn displacement_at(&self, _v: &SurfaceVertex) -> f32 {
            self.0
        }
        fn strength(&self) -> f32 {
            self.0
        }
        fn set_strength(&mut self, strength: f32) {
            self.0 = strength;
        }
    }

    fn pipeline() -> FacadePipeline {
        let cfg = FacadeConfig {
            voxel: VoxelConfig {
                resolution: 32,
                ..VoxelConfig::default()
            },
            ..FacadeConfig::default()
        };
        FacadePipeline::new(
            Rect::new(0.0, 0.0, 500.0, 500.0),
            Rect::new(100.0, 0.0, 100.0, 400.0),
            cfg,
        )
    }

    fn settled(seed: u64) -> FacadePipeline {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut p = pipeline();
        p.add_attractor(&mut rng);
        p.add_particles(&mut rng);
        for _ in 0..30 {
            p.step();
        }
        p
    }

    #[test]
    fn stages_fail_fast_without_inputs() {
        let mut p = pipeline();
        assert_eq!(p.recompute_surface().unwrap_err(), FacadeError::MissingTessellation);
        assert_eq!(p.recompute_displaced().unwrap_err(), FacadeError::MissingSurface);
        assert_eq!(p.reconstruct().unwrap_err(), FacadeError::MissingDisplacedSurface);
    }

    #[test]
    fn full_chain_produces_closed_mesh() {
        let mut p = settled(11);
        p.set_displacement_strength(20.0);

        let cells = p.recompute_tessellation().len();
        assert!(cells > 0);
        let loops = p.recompute_surface().unwrap().len();
        assert_eq!(loops, cells);
        let displaced = p.recompute_displaced().unwrap();
        assert_eq!(displaced.loops.len(), cells);
        assert!(!displaced.bounds.is_empty());

        let mesh = p.reconstruct().unwrap();
        assert!(!mesh.is_empty());
        assert_eq!(mesh.boundary_edge_count(), 0);
    }

    #[test]
    fn upstream_recompute_drops_downstream_outputs() {
        let mut p = settled(3);
        p.recompute_tessellation();
        p.refresh_from_surface().unwrap();
        assert!(p.displaced().is_some());

        p.recompute_tessellation();
        assert!(p.cells().is_some());
        assert!(p.surface().is_none());
        assert!(p.displaced().is_none());
        assert!(p.mesh().is_none());
    }

    #[test]
    fn strength_and_resolution_are_clamped() {
        let mut p = pipeline();
        p.set_displacement_strength(1_000.0);
        assert_eq!(p.displacement_strength(), 100.0);
        p.set_voxel_resolution(4);
        assert_eq!(p.voxel_resolution(), 32);
        p.set_voxel_resolution(4_000);
        assert_eq!(p.voxel_resolution(), 192);
    }

    #[test]
    fn displacement_strategy_is_pluggable() {
        let mut p = settled(5).with_displacement(Box::new(Fixed(4.0)));
        p.recompute_tessellation();
        p.recompute_surface().unwrap();
        let base: Vec<_> = p.surface().unwrap()[0]
            .vertices
            .iter()
            .map(|v| v.displaced(4.0))
            .collect();
        let displaced = p.recompute_displaced().unwrap();
        assert_eq!(displaced.loops[0], base);
    }

    #[test]
    fn empty_field_cannot_be_reconstructed() {
        let mut p = pipeline();
        assert!(p.recompute_tessellation().is_empty());
        p.refresh_from_surface().unwrap();
        assert_eq!(
            p.reconstruct().unwrap_err(),
            FacadeError::Reconstruct(ReconstructError::EmptyVolume)
        );
    }

    #[test]
    fn changing_cell_mode_invalidates_cells() {
        let mut p = settled(8);
        p.recompute_tessellation();
        p.set_cell_mode(CellMode::Triangle);
        assert!(p.cells().is_none());
        assert!(!p.recompute_tessellation().is_empty());
        assert_eq!(p.cell_mode(), CellMode::Triangle);
    }
}
