//! Iso-surface extraction with surface nets.
//!
//! Every cell whose corners straddle the threshold gets one vertex, placed
//! at the mean of its edge crossings. Every sample edge that crosses the
//! threshold emits a quad joining the four cells around it. On a closed grid
//! all crossing edges are interior, so the output has no boundary edges.

use glam::{UVec3, Vec3};
use tracing::debug;

use crate::{mesh::Mesh, voxel::ClosedVoxelGrid};

const NO_VERTEX: u32 = u32::MAX;

#[inline]
fn corner_offset(i: usize) -> UVec3 {
    UVec3::new((i & 1) as u32, ((i >> 1) & 1) as u32, ((i >> 2) & 1) as u32)
}

/// Corner pairs of the twelve cube edges.
fn cube_edges() -> impl Iterator<Item = (usize, usize)> {
    (0..8).flat_map(|i| {
        [1, 2, 4]
            .into_iter()
            .filter(move |bit| i & bit == 0)
            .map(move |bit| (i, i | bit))
    })
}

impl ClosedVoxelGrid {
    /// Extracts the surface where the field equals `threshold`. Samples
    /// above the threshold are inside.
    pub fn extract_surface(&self, threshold: f32) -> Mesh {
        let g = self.grid();
        let dims = g.dims();
        let cells = dims - UVec3::ONE;
        let cell_index = |c: UVec3| ((c.z * cells.y + c.y) * cells.x + c.x) as usize;

        let mut cell_vertex = vec![NO_VERTEX; (cells.x * cells.y * cells.z) as usize];
        let mut vertices = Vec::new();

        for z in 0..cells.z {
            for y in 0..cells.y {
                for x in 0..cells.x {
                    let base = UVec3::new(x, y, z);
                    let values: [f32; 8] = std::array::from_fn(|i| {
                        let p = base + corner_offset(i);
                        g.get(p.x, p.y, p.z)
                    });
                    let inside = values.iter().filter(|&&v| v > threshold).count();
                    if inside == 0 || inside == 8 {
                        continue;
                    }

                    let mut sum = Vec3::ZERO;
                    let mut crossings = 0;
                    for (a, b) in cube_edges() {
                        let (va, vb) = (values[a], values[b]);
                        if (va > threshold) != (vb > threshold) {
                            let t = (threshold - va) / (vb - va);
                            let pa = corner_offset(a).as_vec3();
                            let pb = corner_offset(b).as_vec3();
                            sum += pa.lerp(pb, t);
                            crossings += 1;
                        }
                    }
                    let local = sum / crossings as f32;

                    cell_vertex[cell_index(base)] = vertices.len() as u32;
                    vertices.push(g.to_world(base.as_vec3() + local));
                }
            }
        }

        // (axis, b, c) with b x c = axis, so the quad winds around +axis.
        let axes = [
            (UVec3::X, UVec3::Y, UVec3::Z),
            (UVec3::Y, UVec3::Z, UVec3::X),
            (UVec3::Z, UVec3::X, UVec3::Y),
        ];
        let mut faces = Vec::new();

        for z in 0..dims.z {
            for y in 0..dims.y {
                for x in 0..dims.x {
                    let p0 = UVec3::new(x, y, z);
                    let s0 = g.get(p0.x, p0.y, p0.z) > threshold;

                    for &(a, b, c) in &axes {
                        // the edge and the four cells around it must exist
                        if p0.dot(a) >= cells.dot(a)
                            || p0.dot(b) == 0
                            || p0.dot(b) >= cells.dot(b)
                            || p0.dot(c) == 0
                            || p0.dot(c) >= cells.dot(c)
                        {
                            continue;
                        }
                        let p1 = p0 + a;
                        let s1 = g.get(p1.x, p1.y, p1.z) > threshold;
                        if s0 == s1 {
                            continue;
                        }
                        let quad = [p0 - b - c, p0 - c, p0, p0 - b]
                            .map(|cell| cell_vertex[cell_index(cell)]);
                        if quad.contains(&NO_VERTEX) {
                            continue;
                        }
                        let [q0, q1, q2, q3] = if s0 {
                            quad
                        } else {
                            [quad[3], quad[2], quad[1], quad[0]]
                        };
                        faces.push([q0, q1, q2]);
                        faces.push([q0, q2, q3]);
                    }
                }
            }
        }

        debug!(
            vertices = vertices.len(),
            faces = faces.len(),
            threshold,
            "extracted iso-surface"
        );
        Mesh::new(vertices, faces)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bounds::Aabb,
        voxel::{SphereBrush, VoxelGrid},
    };

    fn grid(half: f32, res: usize) -> VoxelGrid {
        VoxelGrid::new(Aabb::from_center_extent(Vec3::ZERO, Vec3::splat(half)), res)
    }

    #[test]
    fn twelve_cube_edges() {
        let edges: Vec<_> = cube_edges().collect();
        assert_eq!(edges.len(), 12);
        for (a, b) in edges {
            assert_eq!((a ^ b).count_ones(), 1);
        }
    }

    #[test]
    fn blob_is_watertight_and_outward() {
        let mut g = grid(10.0, 21);
        g.stamp(Vec3::ZERO, &SphereBrush::new(6.0, 1.0));
        let mesh = g.close().extract_surface(0.66);

        assert!(!mesh.is_empty());
        assert_eq!(mesh.boundary_edge_count(), 0);

        let c = mesh.centroid().unwrap();
        for (v, n) in mesh.vertices.iter().zip(mesh.vertex_normals()) {
            assert!(n.dot(*v - c) > 0.0);
        }
    }

    #[test]
    fn geometry_clipped_by_the_shell_stays_closed() {
        let mut g = grid(10.0, 21);
        g.sweep(
            Vec3::new(-15.0, 0.0, 0.0),
            Vec3::new(15.0, 3.0, -2.0),
            &SphereBrush::new(3.0, 1.0),
            1.0,
        );
        let mesh = g.close().extract_surface(0.5);
        assert!(!mesh.is_empty());
        assert_eq!(mesh.boundary_edge_count(), 0);
    }

    #[test]
    fn empty_grid_yields_empty_mesh() {
        let mesh = grid(5.0, 11).close().extract_surface(0.66);
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
    }

    #[test]
    fn vertices_stay_inside_grid_bounds() {
        let mut g = grid(10.0, 21);
        g.stamp(Vec3::new(2.0, -3.0, 1.0), &SphereBrush::new(4.0, 1.0));
        let closed = g.close();
        let bounds = *closed.grid().bounds();
        let mesh = closed.extract_surface(0.66);
        assert!(mesh.vertices.iter().all(|v| bounds.contains(*v)));
    }
}
