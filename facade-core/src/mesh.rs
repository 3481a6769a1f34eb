//! Indexed triangle mesh produced by volumetric reconstruction.

use std::collections::HashMap;

use glam::Vec3;

/// Triangle mesh with shared vertices. Faces index into `vertices`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Mean of all vertex positions, `None` for a mesh without vertices.
    pub fn centroid(&self) -> Option<Vec3> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum: Vec3 = self.vertices.iter().copied().sum();
        Some(sum / self.vertices.len() as f32)
    }

    /// Translates the mesh so its vertex centroid sits at the origin.
    pub fn center_at_origin(&mut self) {
        if let Some(c) = self.centroid() {
            for v in &mut self.vertices {
                *v -= c;
            }
        }
    }

    /// Triangle corner positions, one entry per face.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.faces.iter().map(|f| {
            [
                self.vertices[f[0] as usize],
                self.vertices[f[1] as usize],
                self.vertices[f[2] as usize],
            ]
        })
    }

    /// Unnormalized face normal; its length is twice the face area.
    fn face_normal(&self, face: &[u32; 3]) -> Vec3 {
        let [a, b, c] = face.map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    /// Per-vertex normals, the area-weighted mean of incident face normals.
    ///
    /// Vertices that belong to no face get a zero normal.
    pub fn vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for face in &self.faces {
            let n = self.face_normal(face);
            for &i in face {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        normals
    }

    /// Number of undirected edges used by exactly one face.
    ///
    /// A closed mesh returns zero.
    pub fn boundary_edge_count(&self) -> usize {
        let mut counts: HashMap<(u32, u32), usize> = HashMap::new();
        for face in &self.faces {
            for i in 0..3 {
                let a = face[i];
                let b = face[(i + 1) % 3];
                let edge = if a < b { (a, b) } else { (b, a) };
                *counts.entry(edge).or_insert(0) += 1;
            }
        }
        counts.values().filter(|&&c| c == 1).count()
    }

    /// Sorted first-ring neighbours of every vertex.
    fn neighbors(&self) -> Vec<Vec<u32>> {
        let mut out = vec![Vec::new(); self.vertices.len()];
        for face in &self.faces {
            for i in 0..3 {
                let v = face[i] as usize;
                out[v].push(face[(i + 1) % 3]);
                out[v].push(face[(i + 2) % 3]);
            }
        }
        for n in &mut out {
            n.sort_unstable();
            n.dedup();
        }
        out
    }

    /// Laplacian smoothing.
    ///
    /// Each pass replaces every vertex by the mean of itself and its
    /// first-ring neighbours. Only positions change; faces and counts stay
    /// as they are.
    ///
    /// ### Parameters
    /// - `iterations`: number of passes; `0` leaves the mesh untouched.
    pub fn smooth(&mut self, iterations: usize) {
        if iterations == 0 || self.faces.is_empty() {
            return;
        }
        let neighbors = self.neighbors();
        let mut next = self.vertices.clone();

        for _ in 0..iterations {
            for (i, ring) in neighbors.iter().enumerate() {
                if ring.is_empty() {
                    next[i] = self.vertices[i];
                    continue;
                }
                let sum: Vec3 = ring
                    .iter()
                    .map(|&n| self.vertices[n as usize])
                    .fold(self.vertices[i], |acc, p| acc + p);
                next[i] = sum / (ring.len() + 1) as f32;
            }
            std::mem::swap(&mut self.vertices, &mut next);
        }
    }
}
