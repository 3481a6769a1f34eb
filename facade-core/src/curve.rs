//! Editable profile curve for the facade cross-section.

use glam::Vec2;

use crate::{bounds::Rect, config::CurveConfig, error::CurveError};

/// Minimum number of control points before the curve can be sampled.
pub const MIN_POINTS: usize = 3;

/// Interpolating spline through user-placed control points.
///
/// Every control point is kept inside `edit_bounds`. The sampled polyline is
/// recomputed on each call; nothing is cached.
#[derive(Clone, Debug)]
pub struct ProfileCurve {
    points: Vec<Vec2>,
    edit_bounds: Rect,
    cfg: CurveConfig,
    selected: Option<usize>,
}

impl ProfileCurve {
    /// Creates a curve in its default three-point shape.
    pub fn new(edit_bounds: Rect, cfg: CurveConfig) -> Self {
        let mut curve = Self {
            points: Vec::with_capacity(8),
            edit_bounds,
            cfg,
            selected: None,
        };
        curve.reset();
        curve
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn edit_bounds(&self) -> Rect {
        self.edit_bounds
    }

    pub fn config(&self) -> &CurveConfig {
        &self.cfg
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Replaces all points with an arc bulging toward the left edge of the
    /// edit bounds.
    pub fn reset(&mut self) {
        let c = self.edit_bounds.center();
        let w = self.edit_bounds.width();
        let h = self.edit_bounds.height();
        self.points.clear();
        self.points.push(c - Vec2::new(0.0, h / 4.0));
        self.points.push(c - Vec2::new(w / 2.0, 0.0));
        self.points.push(c + Vec2::new(0.0, h / 4.0));
        self.selected = None;
    }

    /// Appends a control point, clamped into the edit bounds.
    pub fn add_point(&mut self, p: Vec2) -> usize {
        self.points.push(self.edit_bounds.clamp(p));
        self.points.len() - 1
    }

    /// Moves point `index` to `pos`, clamped. Returns `false` for an unknown
    /// index.
    pub fn move_point(&mut self, index: usize, pos: Vec2) -> bool {
        let clamped = self.edit_bounds.clamp(pos);
        match self.points.get_mut(index) {
            Some(p) => {
                *p = clamped;
                true
            }
            None => false,
        }
    }

    /// Index of the first control point within snap distance of `pos`.
    pub fn point_near(&self, pos: Vec2) -> Option<usize> {
        self.points
            .iter()
            .position(|p| p.distance(pos) < self.cfg.snap_distance)
    }

    /// Selects the control point under `pos`, or adds one there when `pos`
    /// is inside the edit bounds.
    ///
    /// ### Returns
    /// `true` if a point was hit or created.
    pub fn press(&mut self, pos: Vec2) -> bool {
        if !self.edit_bounds.contains(pos) {
            return false;
        }
        let index = match self.point_near(pos) {
            Some(i) => i,
            None => self.add_point(pos),
        };
        self.selected = Some(index);
        true
    }

    /// Moves the selected point, if any. Returns whether the curve changed.
    pub fn drag(&mut self, pos: Vec2) -> bool {
        match self.selected {
            Some(i) => self.move_point(i, pos),
            None => false,
        }
    }

    pub fn release(&mut self) {
        self.selected = None;
    }

    /// Spline polyline with `resolution` samples per segment.
    pub fn spline(&self, resolution: usize) -> Result<Vec<Vec2>, CurveError> {
        if self.points.len() < MIN_POINTS {
            return Err(CurveError::TooFewPoints {
                required: MIN_POINTS,
                actual: self.points.len(),
            });
        }
        Ok(catmull_rom(&self.points, resolution.max(1)))
    }

    /// Dense polyline approximation resampled at the configured arclength
    /// step.
    pub fn sample(&self, resolution: usize) -> Result<Vec<Vec2>, CurveError> {
        let dense = self.spline(resolution)?;
        Ok(decimate(&dense, self.cfg.decimate_step))
    }
}

/// Uniform Catmull-Rom spline through `pts`, end points repeated as their
/// own neighbours.
fn catmull_rom(pts: &[Vec2], resolution: usize) -> Vec<Vec2> {
    let n = pts.len();
    let at = |i: isize| pts[i.clamp(0, n as isize - 1) as usize];
    let mut out = Vec::with_capacity((n - 1) * resolution + 1);
    for seg in 0..n - 1 {
        let i = seg as isize;
        let (p0, p1, p2, p3) = (at(i - 1), at(i), at(i + 1), at(i + 2));
        for k in 0..resolution {
            let t = k as f32 / resolution as f32;
            let t2 = t * t;
            let t3 = t2 * t;
            out.push(
                0.5 * ((2.0 * p1)
                    + (p2 - p0) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (3.0 * p1 - p0 - 3.0 * p2 + p3) * t3),
            );
        }
    }
    out.push(pts[n - 1]);
    out
}

/// Resamples a polyline so consecutive points are `step` apart along its
/// length. The first and last input vertices are always kept.
pub fn decimate(points: &[Vec2], step: f32) -> Vec<Vec2> {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return Vec::new();
    };
    if step <= 0.0 {
        return points.to_vec();
    }

    let mut out = vec![first];
    // distance travelled since the last emitted point
    let mut carry = 0.0;
    for w in points.windows(2) {
        let (a, b) = (w[0], w[1]);
        let len = a.distance(b);
        if len <= 0.0 {
            continue;
        }
        let mut d = step - carry;
        while d <= len {
            out.push(a.lerp(b, d / len));
            d += step;
        }
        carry = len - (d - step);
    }
    if out.last().is_some_and(|p| p.distance(last) > step * 1e-3) {
        out.push(last);
    }
    out
}
