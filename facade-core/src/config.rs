//! Tunables for every pipeline stage.
//!
//! Each component takes its config by value in its constructor, so stages
//! stay pure functions of their inputs and can be tested in isolation.

use std::ops::RangeInclusive;

/// Parameters of the particle simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Velocity damping per step, `0.0` keeps all momentum.
    pub drag: f32,
    pub drag_range: RangeInclusive<f32>,
    /// Repulsion radius between ordinary particles.
    pub separation: f32,
    pub separation_range: RangeInclusive<f32>,
    /// Strength of each particle's own field (negative repels).
    pub repulsion_strength: f32,
    /// Strength of user-placed attractors.
    pub attractor_strength: f32,
    /// Radius range new attractors are sampled from.
    pub attractor_radius: RangeInclusive<f32>,
    /// Particle counts seeded for the smallest/largest attractor radius.
    pub attractor_particles: RangeInclusive<u32>,
    /// Particle count for one "add particles" action.
    pub particle_batch: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            drag: 0.03,
            drag_range: 0.0..=0.1,
            separation: 20.0,
            separation_range: 0.0..=50.0,
            repulsion_strength: -1.2,
            attractor_strength: 0.5,
            attractor_radius: 50.0..=200.0,
            attractor_particles: 10..=60,
            particle_batch: 50,
        }
    }
}

/// Which polygons the tessellator emits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellMode {
    /// Voronoi regions around each particle.
    #[default]
    Region,
    /// Delaunay triangles between particles.
    Triangle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TessellationConfig {
    pub mode: CellMode,
    /// Scale of the synthetic boundary ring relative to the world bounds.
    pub boundary_scale: f32,
    /// Spacing between synthetic boundary points.
    pub boundary_spacing: f32,
    /// Consecutive clipped vertices closer than this are merged.
    pub merge_tolerance: f32,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            mode: CellMode::Region,
            boundary_scale: 1.05,
            boundary_spacing: 50.0,
            merge_tolerance: 1e-3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveConfig {
    /// Pick radius around control points.
    pub snap_distance: f32,
    /// Spacing of the editor's background grid.
    pub grid_size: f32,
    /// Spline samples per control-point segment.
    pub resolution: usize,
    /// Arclength spacing of the decimated polyline.
    pub decimate_step: f32,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            snap_distance: 10.0,
            grid_size: 20.0,
            resolution: 20,
            decimate_step: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoiseConfig {
    /// Factor applied to surface coordinates before sampling noise.
    pub scale: f64,
    pub seed: u32,
    pub strength: f32,
    pub strength_range: RangeInclusive<f32>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            scale: 0.005,
            seed: 0,
            strength: 0.0,
            strength_range: 0.0..=100.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoxelConfig {
    /// Sample count along the longest axis of the bounding volume.
    pub resolution: usize,
    pub resolution_range: RangeInclusive<usize>,
    /// Input bounds are this much larger than the tight bounding volume.
    pub input_padding: f32,
    /// Brush radius in voxels.
    pub brush_radius: f32,
    /// Peak density written at the brush center.
    pub brush_density: f32,
    /// World distance between brush stamps along a segment.
    pub sweep_step: f32,
    /// Iso value, as a fraction of the density range.
    pub iso_threshold: f32,
    pub smooth_iterations: usize,
}

impl Default for VoxelConfig {
    fn default() -> Self {
        Self {
            resolution: 128,
            resolution_range: 32..=192,
            input_padding: 1.1,
            brush_radius: 2.0,
            brush_density: 1.0,
            sweep_step: 1.0,
            iso_threshold: 0.66,
            smooth_iterations: 2,
        }
    }
}

/// Every stage's config in one place.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FacadeConfig {
    pub sim: SimConfig,
    pub tessellation: TessellationConfig,
    pub curve: CurveConfig,
    pub noise: NoiseConfig,
    pub voxel: VoxelConfig,
}

/// Clamps `v` into an inclusive range.
pub(crate) fn clamp_to<T: PartialOrd + Copy>(v: T, range: &RangeInclusive<T>) -> T {
    if v < *range.start() {
        *range.start()
    } else if v > *range.end() {
        *range.end()
    } else {
        v
    }
}
