//! Volumetric reconstruction: displaced surface to smoothed, watertight mesh.

use glam::Vec3;
use tracing::info;

use crate::{
    bounds::Aabb,
    config::{VoxelConfig, clamp_to},
    displacement::DisplacedSurface,
    error::ReconstructError,
    mesh::Mesh,
    voxel::{SphereBrush, VoxelGrid},
};

/// Grid region for a surface's bounding box.
///
/// Flat axes are widened so the grid never collapses, the box is scaled by
/// the configured padding, and a margin of one brush plus one voxel keeps
/// strokes off the shell.
pub fn input_bounds(bounds: &Aabb, cfg: &VoxelConfig, resolution: usize) -> Aabb {
    let extent = bounds.extent();
    let floor = (extent.max_element() * 0.05).max(1.0);
    let padded = extent.max(Vec3::splat(floor)) * cfg.input_padding;
    let voxel = 2.0 * padded.max_element() / resolution as f32;
    let margin = (cfg.brush_radius + 1.0) * voxel;
    Aabb::from_center_extent(bounds.center(), padded + Vec3::splat(margin))
}

/// Runs the full reconstruction.
///
/// ### Parameters
/// - `surface`: displaced loops and their bounding box.
/// - `cfg`: grid resolution, brush, threshold and smoothing passes. The
///   resolution is clamped into its configured range.
///
/// ### Returns
/// A closed mesh centered at the origin, or
/// [`ReconstructError::EmptyVolume`] when the surface has no vertices.
pub fn reconstruct(surface: &DisplacedSurface, cfg: &VoxelConfig) -> Result<Mesh, ReconstructError> {
    if surface.is_empty() || surface.bounds.is_empty() {
        return Err(ReconstructError::EmptyVolume);
    }

    let resolution = clamp_to(cfg.resolution, &cfg.resolution_range);
    let mut grid = VoxelGrid::new(input_bounds(&surface.bounds, cfg, resolution), resolution);
    let brush = SphereBrush::new(cfg.brush_radius, cfg.brush_density);
    grid.rasterize(surface.segments(), &brush, cfg.sweep_step);

    let dims = grid.dims();
    let mut mesh = grid
        .close()
        .extract_surface(cfg.iso_threshold * cfg.brush_density);
    mesh.center_at_origin();
    mesh.smooth(cfg.smooth_iterations);

    info!(
        resolution,
        dims = ?dims,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "reconstructed mesh"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(radius: f32, z: f32, n: usize) -> Vec<Vec3> {
        (0..=n)
            .map(|i| {
                let a = i as f32 / n as f32 * std::f32::consts::TAU;
                Vec3::new(radius * a.cos(), radius * a.sin(), z)
            })
            .collect()
    }

    fn surface(loops: Vec<Vec<Vec3>>) -> DisplacedSurface {
        let mut bounds = Aabb::empty();
        for p in loops.iter().flatten() {
            bounds.grow(*p);
        }
        DisplacedSurface { loops, bounds }
    }

    fn small_cfg() -> VoxelConfig {
        VoxelConfig {
            resolution: 40,
            ..VoxelConfig::default()
        }
    }

    #[test]
    fn empty_surface_is_rejected() {
        let err = reconstruct(&DisplacedSurface::default(), &small_cfg()).unwrap_err();
        assert_eq!(err, ReconstructError::EmptyVolume);
    }

    #[test]
    fn ring_reconstructs_to_closed_centered_mesh() {
        let s = surface(vec![ring(50.0, 10.0, 48)]);
        // smoothing may drift the centroid slightly
        let cfg = VoxelConfig {
            smooth_iterations: 0,
            ..small_cfg()
        };
        let mesh = reconstruct(&s, &cfg).unwrap();

        assert!(!mesh.is_empty());
        assert_eq!(mesh.boundary_edge_count(), 0);
        assert!(mesh.centroid().unwrap().length() < 1e-2);
    }

    #[test]
    fn input_bounds_contain_surface_with_margin() {
        let b = Aabb {
            min: Vec3::new(0.0, 0.0, 5.0),
            max: Vec3::new(100.0, 50.0, 5.0),
        };
        let cfg = VoxelConfig::default();
        let ib = input_bounds(&b, &cfg, 128);
        assert!(ib.contains(b.min) && ib.contains(b.max));
        assert!(ib.size().z > 0.0);
        assert!(ib.size().x > 100.0 * cfg.input_padding);
    }

    #[test]
    fn flat_single_segment_still_reconstructs() {
        let s = surface(vec![vec![Vec3::ZERO, Vec3::new(80.0, 0.0, 0.0)]]);
        let mesh = reconstruct(&s, &small_cfg()).unwrap();
        assert!(!mesh.is_empty());
        assert_eq!(mesh.boundary_edge_count(), 0);
    }
}
