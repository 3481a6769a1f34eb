//! Axis-aligned bounding shapes shared by the pipeline stages.

use glam::{Vec2, Vec3};

/// Axis-aligned 2-D rectangle, closed on all sides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Builds a rectangle from its top-left corner and its size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Smallest rectangle containing every point, or `None` for an empty input.
    pub fn bounding(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self { min, max })
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Copy of this rectangle scaled by `factor` around its center.
    pub fn scaled(&self, factor: f32) -> Self {
        let c = self.center();
        let half = self.size() * 0.5 * factor;
        Self {
            min: c - half,
            max: c + half,
        }
    }

    /// Position of `p` relative to this rectangle, `(0,0)` at `min` and
    /// `(1,1)` at `max`, clamped to `[0,1]`. Degenerate axes map to `0`.
    pub fn relative(&self, p: Vec2) -> Vec2 {
        let size = self.size();
        let rel = |v: f32, lo: f32, extent: f32| {
            if extent > 0.0 {
                ((v - lo) / extent).clamp(0.0, 1.0)
            } else {
                0.0
            }
        };
        Vec2::new(
            rel(p.x, self.min.x, size.x),
            rel(p.y, self.min.y, size.y),
        )
    }

    /// Corners in counter-clockwise order (for a y-up frame).
    pub fn corners(&self) -> [Vec2; 4] {
        [
            self.min,
            Vec2::new(self.max.x, self.min.y),
            self.max,
            Vec2::new(self.min.x, self.max.y),
        ]
    }

    /// Points spaced roughly `spacing` apart along the closed outline,
    /// starting at `min`. Each side gets at least one point.
    pub fn outline_points(&self, spacing: f32) -> Vec<Vec2> {
        let corners = self.corners();
        let mut out = Vec::new();
        for i in 0..corners.len() {
            let a = corners[i];
            let b = corners[(i + 1) % corners.len()];
            let len = a.distance(b);
            let steps = if spacing > 0.0 {
                ((len / spacing).ceil() as usize).max(1)
            } else {
                1
            };
            for s in 0..steps {
                out.push(a.lerp(b, s as f32 / steps as f32));
            }
        }
        out
    }
}

/// Axis-aligned 3-D box. Starts empty and grows to contain points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self {
            min: center - extent,
            max: center + extent,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn grow(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half size along each axis; zero for an empty box.
    pub fn extent(&self) -> Vec3 {
        if self.is_empty() {
            Vec3::ZERO
        } else {
            (self.max - self.min) * 0.5
        }
    }

    pub fn size(&self) -> Vec3 {
        self.extent() * 2.0
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}
