use crate::types::ParticleId;
use glam::Vec2;

/// A temporary buffer that accumulates forces per particle during one
/// simulation step.
///
/// For each `ParticleId`, this buffer stores:
///
/// - The sum of all forces applied this step.
/// - The number of fields that contributed.
///
/// Forces are gathered from every field first and applied afterwards, so
/// the order in which fields are visited cannot bias the result.
#[derive(Debug, Default)]
pub struct ForceBuffer {
    /// Accumulated force for each particle.
    force: Vec<Vec2>,
    /// Number of contributing fields for each particle.
    count: Vec<u32>,
}

impl ForceBuffer {
    /// Creates a new [`ForceBuffer`] with `len` zeroed entries.
    pub fn with_len(len: usize) -> Self {
        Self {
            force: vec![Vec2::ZERO; len],
            count: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.force.len()
    }

    pub fn is_empty(&self) -> bool {
        self.force.is_empty()
    }

    /// Resizes the buffer to `len` and clears every entry.
    ///
    /// ### Parameters
    /// - `len` - Desired number of particle slots.
    pub fn ensure_len(&mut self, len: usize) {
        if self.force.len() != len {
            self.force.resize(len, Vec2::ZERO);
            self.count.resize(len, 0);
        }
        self.clear();
    }

    /// Zeroes all accumulated forces and counts, keeping the length.
    pub fn clear(&mut self) {
        self.force.fill(Vec2::ZERO);
        self.count.fill(0);
    }

    /// Adds one force contribution for the given particle. Zero forces are
    /// not counted.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds.
    #[inline]
    pub fn add(&mut self, id: ParticleId, force: Vec2) {
        if force != Vec2::ZERO {
            self.force[id] += force;
            self.count[id] += 1;
        }
    }

    /// Total force accumulated for `id` this step.
    #[inline]
    pub fn force(&self, id: ParticleId) -> Vec2 {
        self.force[id]
    }

    /// Number of particles that received at least one contribution.
    pub fn affected_count(&self) -> usize {
        self.count.iter().filter(|&&c| c > 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf = ForceBuffer::with_len(4);
        assert_eq!(buf.len(), 4);
        for id in 0..4 {
            assert_eq!(buf.force(id), Vec2::ZERO);
        }
        assert_eq!(buf.affected_count(), 0);
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf = ForceBuffer::with_len(2);
        buf.add(1, Vec2::new(1.0, 0.0));

        buf.ensure_len(2);
        assert_eq!(buf.affected_count(), 0);

        buf.ensure_len(5);
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.count.len(), 5);

        buf.ensure_len(0);
        assert!(buf.is_empty());
    }

    #[test]
    fn add_sums_contributions_and_skips_zero() {
        let mut buf = ForceBuffer::with_len(2);
        buf.add(0, Vec2::new(1.0, 0.0));
        buf.add(0, Vec2::new(0.5, 2.0));
        buf.add(1, Vec2::ZERO);

        assert_eq!(buf.force(0), Vec2::new(1.5, 2.0));
        assert_eq!(buf.count, vec![2, 0]);
        assert_eq!(buf.affected_count(), 1);
    }
}
