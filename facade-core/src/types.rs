/// Identifier for a particle in a [`crate::simulator::Simulator`].
///
/// This is an index into the simulator's particle list and is only
/// meaningful until the next [`crate::simulator::Simulator::clear`].
pub type ParticleId = usize;

/// Identifier for an attractor in a [`crate::simulator::Simulator`].
///
/// Removing an attractor shifts the ids of all attractors after it.
pub type AttractorId = usize;
