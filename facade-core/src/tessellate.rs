//! Planar partition of the particle cloud into clipped cells.
//!
//! A ring of synthetic points just outside the world bounds is added to the
//! particles so that every real site ends up with a finite Voronoi region.
//! Each region (or Delaunay triangle) is then clipped back to the bounds.

use glam::Vec2;
use spade::{DelaunayTriangulation, Point2, Triangulation};
use tracing::{debug, warn};

use crate::{
    bounds::Rect,
    clip::ConvexClipper,
    config::{CellMode, TessellationConfig},
};

/// Closed polygon of at least three vertices, all inside the world bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub vertices: Vec<Vec2>,
}

type Delaunay = DelaunayTriangulation<Point2<f64>>;

/// Computes clipped cells for `points` inside `bounds`.
///
/// ### Parameters
/// - `points` - Particle positions.
/// - `bounds` - World bounds; also the clip region.
/// - `cfg` - Cell mode and boundary ring settings.
///
/// ### Returns
/// A fresh list of cells. Degenerate polygons (fewer than three vertices
/// after clipping) are left out.
pub fn tessellate(points: &[Vec2], bounds: &Rect, cfg: &TessellationConfig) -> Vec<Cell> {
    let ring = bounds
        .scaled(cfg.boundary_scale)
        .outline_points(cfg.boundary_spacing);
    let triangulation = triangulate(points.iter().chain(ring.iter()).copied());
    let clipper = ConvexClipper::from_rect(bounds, cfg.merge_tolerance);

    let polygons = match cfg.mode {
        CellMode::Region => voronoi_regions(&triangulation),
        CellMode::Triangle => delaunay_triangles(&triangulation),
    };

    let total = polygons.len();
    let cells: Vec<Cell> = polygons
        .iter()
        .filter_map(|poly| clipper.clip(poly))
        .map(|vertices| Cell { vertices })
        .collect();

    debug!(
        mode = ?cfg.mode,
        sites = points.len(),
        cells = cells.len(),
        discarded = total - cells.len(),
        "tessellated particle field"
    );
    cells
}

fn triangulate(points: impl Iterator<Item = Vec2>) -> Delaunay {
    let mut t = Delaunay::new();
    for p in points {
        if let Err(err) = t.insert(Point2::new(f64::from(p.x), f64::from(p.y))) {
            warn!(?p, ?err, "skipping point the triangulation rejected");
        }
    }
    t
}

#[inline]
fn to_vec2(p: Point2<f64>) -> Vec2 {
    Vec2::new(p.x as f32, p.y as f32)
}

fn delaunay_triangles(t: &Delaunay) -> Vec<Vec<Vec2>> {
    t.inner_faces()
        .map(|face| {
            face.vertices()
                .iter()
                .map(|v| to_vec2(v.position()))
                .collect()
        })
        .collect()
}

/// Voronoi region of every site whose surrounding triangles are all finite.
///
/// Region vertices are the circumcenters of the site's triangles, ordered
/// counter-clockwise around the site.
fn voronoi_regions(t: &Delaunay) -> Vec<Vec<Vec2>> {
    let mut regions = Vec::new();
    'sites: for vertex in t.vertices() {
        let site = vertex.position();
        let mut corners: Vec<Point2<f64>> = Vec::new();
        for edge in vertex.out_edges() {
            let Some(face) = edge.face().as_inner() else {
                continue 'sites;
            };
            let [a, b, c] = face.vertices().map(|v| v.position());
            match circumcenter(a, b, c) {
                Some(cc) => corners.push(cc),
                None => continue 'sites,
            }
        }
        if corners.len() < 3 {
            continue;
        }
        corners.sort_by(|p, q| {
            let ap = (p.y - site.y).atan2(p.x - site.x);
            let aq = (q.y - site.y).atan2(q.x - site.x);
            ap.total_cmp(&aq)
        });
        regions.push(corners.into_iter().map(to_vec2).collect());
    }
    regions
}

fn circumcenter(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Option<Point2<f64>> {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-10 {
        return None;
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    Some(Point2::new(ux, uy))
}
