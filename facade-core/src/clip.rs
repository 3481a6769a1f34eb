//! Sutherland–Hodgman polygon clipping against a convex region.

use glam::Vec2;

use crate::bounds::Rect;

/// Clips polygons against a single convex region.
///
/// The clip region is stored as a counter-clockwise loop of edges. Output
/// polygons keep the vertex order (winding) of their input.
#[derive(Clone, Debug)]
pub struct ConvexClipper {
    edges: Vec<(Vec2, Vec2)>,
    merge_tolerance: f32,
}

impl ConvexClipper {
    /// Builds a clipper from the vertices of a convex polygon in either
    /// winding.
    pub fn new(region: &[Vec2], merge_tolerance: f32) -> Self {
        let mut pts = region.to_vec();
        if signed_area(&pts) < 0.0 {
            pts.reverse();
        }
        let edges = (0..pts.len())
            .map(|i| (pts[i], pts[(i + 1) % pts.len()]))
            .collect();
        Self {
            edges,
            merge_tolerance,
        }
    }

    pub fn from_rect(rect: &Rect, merge_tolerance: f32) -> Self {
        Self::new(&rect.corners(), merge_tolerance)
    }

    /// Clips `poly` to the region.
    ///
    /// Consecutive vertices closer than the merge tolerance are collapsed.
    /// Returns `None` when fewer than three vertices survive.
    pub fn clip(&self, poly: &[Vec2]) -> Option<Vec<Vec2>> {
        let mut output = poly.to_vec();
        for &(a, b) in &self.edges {
            if output.is_empty() {
                break;
            }
            let input = std::mem::take(&mut output);
            let mut prev = input[input.len() - 1];
            for &cur in &input {
                let cur_in = is_inside(a, b, cur);
                let prev_in = is_inside(a, b, prev);
                if cur_in {
                    if !prev_in {
                        output.push(intersect(prev, cur, a, b));
                    }
                    output.push(cur);
                } else if prev_in {
                    output.push(intersect(prev, cur, a, b));
                }
                prev = cur;
            }
        }

        let merged = dedupe_consecutive(output, self.merge_tolerance);
        (merged.len() >= 3).then_some(merged)
    }
}

/// Twice the signed area; positive for counter-clockwise loops.
pub fn signed_area(poly: &[Vec2]) -> f32 {
    (0..poly.len())
        .map(|i| poly[i].perp_dot(poly[(i + 1) % poly.len()]))
        .sum()
}

#[inline]
fn is_inside(a: Vec2, b: Vec2, p: Vec2) -> bool {
    (b - a).perp_dot(p - a) >= 0.0
}

#[inline]
fn intersect(p: Vec2, q: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    let denom = edge.perp_dot(q - p);
    if denom.abs() <= f32::EPSILON {
        return p;
    }
    let t = edge.perp_dot(a - p) / denom;
    // rounding can push t just outside the segment
    p + (q - p) * t.clamp(0.0, 1.0)
}

fn dedupe_consecutive(poly: Vec<Vec2>, tolerance: f32) -> Vec<Vec2> {
    let t2 = tolerance * tolerance;
    let mut out: Vec<Vec2> = Vec::with_capacity(poly.len());
    for p in poly {
        if out.last().is_none_or(|q| q.distance_squared(p) > t2) {
            out.push(p);
        }
    }
    while out.len() > 1 && out[0].distance_squared(out[out.len() - 1]) <= t2 {
        out.pop();
    }
    out
}
