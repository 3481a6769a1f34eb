//! Phases of one simulation step.
//!
//! A step runs:
//! 1. [`attraction_phase`]: every attractor pulls on the particles inside
//!    its radius, accumulating forces in a [`ForceBuffer`].
//! 2. [`repulsion_phase`]: every particle's own field pushes away the
//!    particles inside its separation radius.
//! 3. [`integration_phase`]: each particle takes a damped Verlet step with
//!    its accumulated force and is clamped back into the world bounds.

use crate::{
    attractor::Attractor, bounds::Rect, force_buffer::ForceBuffer, particle::Particle,
};

/// Accumulates the pull of each attractor onto nearby particles.
///
/// The buffer is resized (and cleared) to `particles.len()` here, so this
/// phase must run first in a step.
///
/// ### Parameters
/// - `particles` - Current particle state, read only.
/// - `attractors` - User-placed attractors.
/// - `acc` - Scratch buffer receiving one force per particle.
pub fn attraction_phase(particles: &[Particle], attractors: &[Attractor], acc: &mut ForceBuffer) {
    acc.ensure_len(particles.len());

    for a in attractors {
        for (id, p) in particles.iter().enumerate() {
            acc.add(id, a.field.force_on(a.center, p.pos));
        }
    }
}

/// Accumulates pairwise repulsion between particles.
///
/// Each particle carries its own field, so the push from `i` onto `j` uses
/// `i`'s radius and strength. A particle never acts on itself.
pub fn repulsion_phase(particles: &[Particle], acc: &mut ForceBuffer) {
    for (i, src) in particles.iter().enumerate() {
        for (j, p) in particles.iter().enumerate() {
            if i != j {
                acc.add(j, src.repulsion.force_on(src.pos, p.pos));
            }
        }
    }
}

/// Integrates every particle and clamps it into `bounds`.
///
/// Particles that received no force still coast on their velocity.
pub fn integration_phase(particles: &mut [Particle], acc: &ForceBuffer, drag: f32, bounds: &Rect) {
    for (id, p) in particles.iter_mut().enumerate() {
        p.integrate(acc.force(id), drag, bounds);
    }
}
