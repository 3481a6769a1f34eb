//! Dense scalar grid that line geometry is rasterized into.
//!
//! A [`VoxelGrid`] accepts brush strokes. Calling [`VoxelGrid::close`]
//! forces its outer shell to [`OUTSIDE`] and yields a [`ClosedVoxelGrid`],
//! the only grid type surface extraction accepts.

use glam::{UVec3, Vec3};

use crate::bounds::Aabb;

/// Density value for empty space.
pub const OUTSIDE: f32 = 0.0;

/// Fewest samples along any axis. Leaves at least two interior layers once
/// the shell is closed.
pub const MIN_AXIS_SAMPLES: u32 = 4;

/// Spherical brush with a smooth falloff, sized in voxels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereBrush {
    pub radius: f32,
    pub density: f32,
}

impl SphereBrush {
    pub fn new(radius: f32, density: f32) -> Self {
        Self {
            radius: radius.max(f32::EPSILON),
            density,
        }
    }

    /// Density written at `dist` voxels from the brush center.
    #[inline]
    pub fn value_at(&self, dist: f32) -> f32 {
        let t = dist / self.radius;
        if t >= 1.0 {
            OUTSIDE
        } else {
            self.density * (1.0 - t * t)
        }
    }
}

#[derive(Clone, Debug)]
pub struct VoxelGrid {
    dims: UVec3,
    bounds: Aabb,
    spacing: Vec3,
    data: Vec<f32>,
}

impl VoxelGrid {
    /// Creates an empty grid over `bounds`.
    ///
    /// ### Parameters
    /// - `bounds`: world region covered by the grid; must not be empty.
    /// - `resolution`: sample count along the longest axis. Shorter axes get
    ///   a proportional share so voxels stay close to cubic.
    pub fn new(bounds: Aabb, resolution: usize) -> Self {
        let size = bounds.size();
        let longest = size.max_element();
        let axis = |len: f32| {
            let n = if longest > 0.0 {
                (len / longest * resolution as f32) as u32
            } else {
                0
            };
            n.max(MIN_AXIS_SAMPLES)
        };
        let dims = UVec3::new(axis(size.x), axis(size.y), axis(size.z));

        let raw = size / (dims - UVec3::ONE).as_vec3();
        let spacing = Vec3::select(raw.cmpgt(Vec3::ZERO), raw, Vec3::ONE);

        Self {
            dims,
            bounds,
            spacing,
            data: vec![OUTSIDE; (dims.x * dims.y * dims.z) as usize],
        }
    }

    /// Samples per axis.
    pub fn dims(&self) -> UVec3 {
        self.dims
    }

    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    /// World distance between neighbouring samples on each axis.
    pub fn spacing(&self) -> Vec3 {
        self.spacing
    }

    #[inline]
    fn index(&self, x: u32, y: u32, z: u32) -> usize {
        ((z * self.dims.y + y) * self.dims.x + x) as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32, z: u32) -> f32 {
        self.data[self.index(x, y, z)]
    }

    #[cfg(test)]
    fn max_value(&self) -> f32 {
        self.data.iter().copied().fold(OUTSIDE, f32::max)
    }

    /// World position to fractional grid coordinates.
    #[inline]
    pub fn to_grid(&self, p: Vec3) -> Vec3 {
        (p - self.bounds.min) / self.spacing
    }

    /// Fractional grid coordinates to world position.
    #[inline]
    pub fn to_world(&self, g: Vec3) -> Vec3 {
        self.bounds.min + g * self.spacing
    }

    /// Stamps `brush` at world position `center`. A sample only changes when
    /// the brush value is larger than what it already holds.
    pub fn stamp(&mut self, center: Vec3, brush: &SphereBrush) {
        let g = self.to_grid(center);
        let upper = (self.dims - UVec3::ONE).as_vec3();
        let lo = (g - Vec3::splat(brush.radius)).ceil().max(Vec3::ZERO);
        let hi = (g + Vec3::splat(brush.radius)).floor().min(upper);
        if lo.cmpgt(hi).any() {
            return;
        }
        let (lo, hi) = (lo.as_uvec3(), hi.as_uvec3());

        for z in lo.z..=hi.z {
            for y in lo.y..=hi.y {
                for x in lo.x..=hi.x {
                    let d = (Vec3::new(x as f32, y as f32, z as f32) - g).length();
                    let v = brush.value_at(d);
                    let i = self.index(x, y, z);
                    if v > self.data[i] {
                        self.data[i] = v;
                    }
                }
            }
        }
    }

    /// Sweeps `brush` from `a` to `b`, stamping every `step` world units.
    ///
    /// The step is capped at the smallest voxel spacing so a stroke never
    /// skips a sample.
    pub fn sweep(&mut self, a: Vec3, b: Vec3, brush: &SphereBrush, step: f32) {
        let step = step.min(self.spacing.min_element()).max(f32::EPSILON);
        let n = ((b - a).length() / step).ceil().max(1.0) as usize;
        for i in 0..=n {
            self.stamp(a.lerp(b, i as f32 / n as f32), brush);
        }
    }

    /// Sweeps the brush along every segment.
    pub fn rasterize<I>(&mut self, segments: I, brush: &SphereBrush, step: f32)
    where
        I: IntoIterator<Item = (Vec3, Vec3)>,
    {
        for (a, b) in segments {
            self.sweep(a, b, brush, step);
        }
    }

    /// Forces every sample on the grid's outer shell to [`OUTSIDE`].
    pub fn close(mut self) -> ClosedVoxelGrid {
        let last = self.dims - UVec3::ONE;
        for z in 0..self.dims.z {
            for y in 0..self.dims.y {
                for x in 0..self.dims.x {
                    let on_shell = x == 0
                        || y == 0
                        || z == 0
                        || x == last.x
                        || y == last.y
                        || z == last.z;
                    if on_shell {
                        let i = self.index(x, y, z);
                        self.data[i] = OUTSIDE;
                    }
                }
            }
        }
        ClosedVoxelGrid(self)
    }
}

/// A grid whose outer shell holds [`OUTSIDE`]. Read-only.
#[derive(Clone, Debug)]
pub struct ClosedVoxelGrid(VoxelGrid);

impl ClosedVoxelGrid {
    pub fn grid(&self) -> &VoxelGrid {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube(half: f32) -> Aabb {
        Aabb::from_center_extent(Vec3::ZERO, Vec3::splat(half))
    }

    #[test]
    fn resolution_follows_aspect_ratio() {
        let b = Aabb::from_center_extent(Vec3::ZERO, Vec3::new(100.0, 50.0, 25.0));
        let g = VoxelGrid::new(b, 64);
        assert_eq!(g.dims(), UVec3::new(64, 32, 16));
    }

    #[test]
    fn flat_axis_gets_minimum_samples() {
        let b = Aabb::from_center_extent(Vec3::ZERO, Vec3::new(100.0, 100.0, 0.0));
        let g = VoxelGrid::new(b, 32);
        assert_eq!(g.dims().z, MIN_AXIS_SAMPLES);
        assert!(g.spacing().z > 0.0);
    }

    #[test]
    fn grid_and_world_coordinates_roundtrip() {
        let g = VoxelGrid::new(cube(10.0), 21);
        let p = Vec3::new(-3.0, 4.5, 9.0);
        assert!((g.to_world(g.to_grid(p)) - p).length() < 1e-4);
        assert!((g.to_grid(Vec3::splat(-10.0))).length() < 1e-5);
    }

    #[test]
    fn stamping_uses_peak_combine() {
        let mut g = VoxelGrid::new(cube(10.0), 21);
        g.stamp(Vec3::ZERO, &SphereBrush::new(3.0, 1.0));
        assert_eq!(g.get(10, 10, 10), 1.0);

        // weaker brush at the same spot must not lower the value
        g.stamp(Vec3::ZERO, &SphereBrush::new(3.0, 0.25));
        assert_eq!(g.get(10, 10, 10), 1.0);
        assert_eq!(g.max_value(), 1.0);
    }

    #[test]
    fn sweep_fills_between_endpoints() {
        let mut g = VoxelGrid::new(cube(10.0), 21);
        g.sweep(
            Vec3::new(-6.0, 0.0, 0.0),
            Vec3::new(6.0, 0.0, 0.0),
            &SphereBrush::new(1.5, 1.0),
            5.0,
        );
        for x in 4..=16 {
            assert!(g.get(x, 10, 10) > 0.5, "gap at x={x}");
        }
        assert_eq!(g.get(10, 14, 10), OUTSIDE);
    }

    #[test]
    fn close_clears_the_shell() {
        let mut g = VoxelGrid::new(cube(4.0), 9);
        g.stamp(Vec3::new(-4.0, -4.0, -4.0), &SphereBrush::new(3.0, 1.0));
        g.stamp(Vec3::ZERO, &SphereBrush::new(2.0, 1.0));
        let closed = g.close();
        let g = closed.grid();
        assert_eq!(g.get(0, 0, 0), OUTSIDE);
        assert_eq!(g.get(0, 4, 4), OUTSIDE);
        assert_eq!(g.get(8, 4, 4), OUTSIDE);
        assert!(g.get(1, 1, 1) > 0.0);
        assert_eq!(g.get(4, 4, 4), 1.0);
    }

    #[test]
    fn brush_outside_grid_is_ignored() {
        let mut g = VoxelGrid::new(cube(4.0), 9);
        g.stamp(Vec3::splat(100.0), &SphereBrush::new(2.0, 1.0));
        assert_eq!(g.max_value(), OUTSIDE);
    }
}
