//! Draping 2-D tessellation cells over the profile curve.
//!
//! The relative x position of a cell vertex picks a point on the curve; the
//! curve supplies depth (X and Z) and the vertex's own y becomes height (Y).

use glam::{Vec2, Vec3};
use tracing::{debug, warn};

use crate::{bounds::Rect, curve::ProfileCurve, error::CurveError, tessellate::Cell};

/// A surface point with its normal and its position in the source field.
///
/// Values are fixed at construction; displacement derives new positions
/// instead of changing a vertex.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceVertex {
    position: Vec3,
    normal: Vec3,
    rel_pos: Vec2,
}

impl SurfaceVertex {
    pub fn new(position: Vec3, normal: Vec3, rel_pos: Vec2) -> Self {
        Self {
            position,
            normal,
            rel_pos,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Position inside the world bounds, `[0,1]` on both axes.
    pub fn rel_pos(&self) -> Vec2 {
        self.rel_pos
    }

    /// Point `amount` units along the normal from this vertex.
    #[inline]
    pub fn displaced(&self, amount: f32) -> Vec3 {
        self.position + self.normal * amount
    }
}

/// Closed 3-D polyline built from one cell; the first vertex is repeated
/// at the end.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceLoop {
    pub vertices: Vec<SurfaceVertex>,
}

impl SurfaceLoop {
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.vertices
            .windows(2)
            .map(|w| (w[0].position(), w[1].position()))
    }
}

/// Densely sampled profile curve, centered on its bounding-rectangle center.
#[derive(Clone, Debug)]
pub struct Profile {
    samples: Vec<Vec2>,
    centroid: Vec2,
}

impl Profile {
    /// Samples `curve` at its configured resolution.
    pub fn from_curve(curve: &ProfileCurve) -> Result<Self, CurveError> {
        let samples = curve.sample(curve.config().resolution)?;
        Self::from_samples(samples).ok_or(CurveError::TooFewPoints {
            required: 1,
            actual: 0,
        })
    }

    /// Returns `None` for an empty sample list.
    pub fn from_samples(samples: Vec<Vec2>) -> Option<Self> {
        let centroid = Rect::bounding(&samples)?.center();
        Some(Self { samples, centroid })
    }

    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    pub fn centroid(&self) -> Vec2 {
        self.centroid
    }

    /// Index of the sample for relative position `rel_x`. `1.0` maps to the
    /// last sample.
    pub fn index_for(&self, rel_x: f32) -> usize {
        let last = self.samples.len() - 1;
        ((rel_x.clamp(0.0, 1.0) * last as f32).floor() as usize).min(last)
    }

    /// Unit tangent (the perpendicular of the local curve direction) at
    /// sample `i`, zero if the curve has no length there.
    pub fn tangent_at(&self, i: usize) -> Vec2 {
        let s = &self.samples;
        let mut dir = s[i] - s[i.saturating_sub(1)];
        if dir == Vec2::ZERO && i + 1 < s.len() {
            dir = s[i + 1] - s[i];
        }
        dir.perp().normalize_or_zero()
    }

    /// Maps a point of the 2-D field onto the curve.
    pub fn map_vertex(&self, v: Vec2, world: &Rect) -> SurfaceVertex {
        let rel_pos = world.relative(v);
        let i = self.index_for(rel_pos.x);
        let tangent = self.tangent_at(i);
        let t = self.samples[i] - self.centroid;
        let position = Vec3::new(t.y, v.y - world.center().y, t.x);
        let normal = Vec3::new(tangent.y, 0.0, tangent.x);
        SurfaceVertex::new(position, normal, rel_pos)
    }
}

/// Builds one closed surface loop per cell.
///
/// ### Parameters
/// - `cells` - Clipped tessellation cells.
/// - `profile` - Sampled profile curve.
/// - `world` - World bounds the cells were clipped to.
pub fn drape(cells: &[Cell], profile: &Profile, world: &Rect) -> Vec<SurfaceLoop> {
    let loops: Vec<SurfaceLoop> = cells
        .iter()
        .filter_map(|cell| {
            let mut vertices: Vec<SurfaceVertex> = cell
                .vertices
                .iter()
                .map(|&v| profile.map_vertex(v, world))
                .collect();
            let first = *vertices.first()?;
            vertices.push(first);
            Some(SurfaceLoop { vertices })
        })
        .collect();

    if profile.samples.len() < 2 {
        warn!("profile curve has no length; surface normals are zero");
    }
    debug!(
        loops = loops.len(),
        samples = profile.samples.len(),
        "draped cells over profile"
    );
    loops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CurveConfig;

    fn world() -> Rect {
        Rect::new(0.0, 0.0, 400.0, 200.0)
    }

    fn square_cell(x: f32, y: f32, s: f32) -> Cell {
        Cell {
            vertices: vec![
                Vec2::new(x, y),
                Vec2::new(x + s, y),
                Vec2::new(x + s, y + s),
                Vec2::new(x, y + s),
            ],
        }
    }

    fn profile() -> Profile {
        let curve = ProfileCurve::new(Rect::new(500.0, 0.0, 100.0, 400.0), CurveConfig::default());
        Profile::from_curve(&curve).unwrap()
    }

    #[test]
    fn straight_profile_maps_coordinates() {
        // vertical line x = 10 from y = 0 to y = 100
        let samples: Vec<Vec2> = (0..=100).map(|i| Vec2::new(10.0, i as f32)).collect();
        let p = Profile::from_samples(samples).unwrap();
        assert_eq!(p.centroid(), Vec2::new(10.0, 50.0));

        let v = p.map_vertex(Vec2::new(200.0, 50.0), &world());

        assert_eq!(v.rel_pos(), Vec2::new(0.5, 0.25));
        // index 50 -> sample (10, 50), centered (0, 0)
        assert_eq!(v.position(), Vec3::new(0.0, -50.0, 0.0));
        // direction (0, 1), perpendicular (-1, 0)
        assert_eq!(v.normal(), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn right_edge_maps_to_last_sample_and_left_edge_has_a_normal() {
        let p = profile();
        let last = p.samples().len() - 1;
        assert_eq!(p.index_for(1.0), last);
        assert_eq!(p.index_for(0.0), 0);
        assert!((p.tangent_at(0).length() - 1.0).abs() < 1e-5);

        let v = p.map_vertex(Vec2::new(400.0, 0.0), &world());
        let t = p.samples()[last] - p.centroid();
        assert_eq!(v.position(), Vec3::new(t.y, -100.0, t.x));
    }

    #[test]
    fn drape_closes_every_loop_with_unit_normals() {
        let cells = vec![square_cell(0.0, 0.0, 50.0), square_cell(300.0, 120.0, 80.0)];
        let loops = drape(&cells, &profile(), &world());

        assert_eq!(loops.len(), 2);
        for (l, c) in loops.iter().zip(&cells) {
            assert_eq!(l.vertices.len(), c.vertices.len() + 1);
            assert_eq!(l.vertices.first(), l.vertices.last());
            for v in &l.vertices {
                assert!((v.normal().length() - 1.0).abs() < 1e-5);
                assert_eq!(v.normal().y, 0.0);
                let r = v.rel_pos();
                assert!((0.0..=1.0).contains(&r.x) && (0.0..=1.0).contains(&r.y));
            }
            assert_eq!(l.segments().count(), c.vertices.len());
        }
    }

    #[test]
    fn draped_tessellation_keeps_rel_pos_in_unit_square() {
        use crate::{config::TessellationConfig, tessellate::tessellate};
        use rand::{Rng, SeedableRng, rngs::StdRng};

        let w = world();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let points: Vec<Vec2> = (0..60)
                .map(|_| {
                    Vec2::new(
                        rng.random_range(w.min.x..=w.max.x),
                        rng.random_range(w.min.y..=w.max.y),
                    )
                })
                .collect();
            let cells = tessellate(&points, &w, &TessellationConfig::default());
            for l in drape(&cells, &profile(), &w) {
                for v in &l.vertices {
                    let r = v.rel_pos();
                    assert!(
                        (0.0..=1.0).contains(&r.x) && (0.0..=1.0).contains(&r.y),
                        "seed {seed}: rel_pos {r:?} outside unit square"
                    );
                }
            }
        }
    }

    #[test]
    fn drape_is_a_pure_function_of_its_inputs() {
        let cells = vec![square_cell(10.0, 10.0, 30.0), square_cell(200.0, 50.0, 60.0)];
        let a = drape(&cells, &profile(), &world());
        let b = drape(&cells, &profile(), &world());
        assert_eq!(a, b);
        for (la, lb) in a.iter().zip(&b) {
            for (va, vb) in la.vertices.iter().zip(&lb.vertices) {
                assert_eq!(va.position().to_array().map(f32::to_bits), vb.position().to_array().map(f32::to_bits));
            }
        }
    }

    #[test]
    fn displaced_does_not_touch_the_vertex() {
        let v = SurfaceVertex::new(Vec3::new(1.0, 2.0, 3.0), Vec3::X, Vec2::ZERO);
        let a = v.displaced(5.0);
        let b = v.displaced(-2.0);
        assert_eq!(a, Vec3::new(6.0, 2.0, 3.0));
        assert_eq!(b, Vec3::new(-1.0, 2.0, 3.0));
        assert_eq!(v.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn empty_samples_give_no_profile() {
        assert!(Profile::from_samples(Vec::new()).is_none());
    }
}
