use glam::Vec2;
use rand::Rng;

/// Radial force field: pulls (positive strength) or pushes (negative
/// strength) particles inside its radius toward or away from its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceField {
    pub radius: f32,
    pub strength: f32,
}

impl ForceField {
    pub fn new(radius: f32, strength: f32) -> Self {
        Self { radius, strength }
    }

    /// Force this field, centered at `center`, exerts on a particle at `pos`.
    ///
    /// The magnitude falls off with squared distance, from `strength` at the
    /// center to zero at the rim. A particle exactly at the center gets no
    /// force.
    #[inline]
    pub fn force_on(&self, center: Vec2, pos: Vec2) -> Vec2 {
        let delta = center - pos;
        let d2 = delta.length_squared();
        let r2 = self.radius * self.radius;
        if d2 < r2 {
            delta.normalize_or_zero() * (1.0 - d2 / r2) * self.strength
        } else {
            Vec2::ZERO
        }
    }

    pub fn contains(&self, center: Vec2, pos: Vec2) -> bool {
        center.distance_squared(pos) <= self.radius * self.radius
    }
}

#[derive(Clone, Debug)]
pub struct Attractor {
    pub center: Vec2,
    pub field: ForceField,
}

impl Attractor {
    pub fn new(center: Vec2, radius: f32, strength: f32) -> Self {
        Self {
            center,
            field: ForceField::new(radius, strength),
        }
    }

    pub fn radius(&self) -> f32 {
        self.field.radius
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.field.contains(self.center, pos)
    }

    /// Uniformly distributed point inside the attractor's disc.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        let theta = rng.random_range(0.0..std::f32::consts::TAU);
        let r = self.field.radius * rng.random::<f32>().sqrt();
        self.center + Vec2::from_angle(theta) * r
    }
}
