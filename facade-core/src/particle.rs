use crate::attractor::ForceField;
use crate::bounds::Rect;
use glam::Vec2;

/// A Verlet particle: velocity is implicit in `pos - prev`.
#[derive(Clone, Debug)]
pub struct Particle {
    pub pos: Vec2,
    pub prev: Vec2,
    /// Repulsion field carried around by the particle.
    pub repulsion: ForceField,
}

impl Particle {
    pub fn at_rest(pos: Vec2, repulsion: ForceField) -> Self {
        Self {
            pos,
            prev: pos,
            repulsion,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.pos - self.prev
    }

    /// Advances one Verlet step with the accumulated `force`, damping the
    /// carried velocity by `drag`, then clamps into `bounds`.
    ///
    /// The clamped position becomes the new reference, so a particle pushed
    /// into a wall loses the velocity component into it.
    #[inline]
    pub fn integrate(&mut self, force: Vec2, drag: f32, bounds: &Rect) {
        let next = self.pos + self.velocity() * (1.0 - drag) + force;
        self.prev = bounds.clamp(self.pos);
        self.pos = bounds.clamp(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_keeps_momentum_without_drag() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut p = Particle::at_rest(Vec2::new(10.0, 10.0), ForceField::new(5.0, -1.0));
        p.prev = Vec2::new(9.0, 10.0);

        p.integrate(Vec2::ZERO, 0.0, &bounds);
        assert_eq!(p.pos, Vec2::new(11.0, 10.0));

        p.integrate(Vec2::new(0.0, 2.0), 0.0, &bounds);
        assert_eq!(p.pos, Vec2::new(12.0, 12.0));
    }

    #[test]
    fn integrate_clamps_into_bounds() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        let mut p = Particle::at_rest(Vec2::new(99.0, 1.0), ForceField::new(5.0, -1.0));
        p.integrate(Vec2::new(50.0, -50.0), 0.03, &bounds);
        assert_eq!(p.pos, Vec2::new(100.0, 0.0));
    }
}
