//! Pluggable displacement of surface vertices along their normals.

use glam::Vec3;
use noise::{NoiseFn, OpenSimplex};

use crate::{
    bounds::Aabb,
    config::{NoiseConfig, clamp_to},
    surface::{SurfaceLoop, SurfaceVertex},
};

/// Computes how far a surface vertex moves along its normal.
pub trait Displacement {
    /// Signed displacement for `v`. Must not depend on anything but `v` and
    /// the strategy's own settings.
    fn displacement_at(&self, v: &SurfaceVertex) -> f32;

    fn strength(&self) -> f32;

    fn set_strength(&mut self, strength: f32);
}

/// Coherent-noise displacement sampled in the surface's XY plane.
///
/// The noise value is scaled by the strength and taken as an absolute value,
/// so this variant only ever pushes vertices outward.
#[derive(Clone)]
pub struct NoiseDisplacement {
    noise: OpenSimplex,
    cfg: NoiseConfig,
}

impl NoiseDisplacement {
    pub fn new(mut cfg: NoiseConfig) -> Self {
        cfg.strength = clamp_to(cfg.strength, &cfg.strength_range);
        Self {
            noise: OpenSimplex::new(cfg.seed),
            cfg,
        }
    }

    pub fn config(&self) -> &NoiseConfig {
        &self.cfg
    }
}

impl Default for NoiseDisplacement {
    fn default() -> Self {
        Self::new(NoiseConfig::default())
    }
}

impl std::fmt::Debug for NoiseDisplacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseDisplacement")
            .field("cfg", &self.cfg)
            .finish_non_exhaustive()
    }
}

impl Displacement for NoiseDisplacement {
    fn displacement_at(&self, v: &SurfaceVertex) -> f32 {
        let p = v.position();
        let n = self.noise.get([
            f64::from(p.x) * self.cfg.scale,
            f64::from(p.y) * self.cfg.scale,
        ]);
        (n as f32 * self.cfg.strength).abs()
    }

    fn strength(&self) -> f32 {
        self.cfg.strength
    }

    fn set_strength(&mut self, strength: f32) {
        self.cfg.strength = clamp_to(strength, &self.cfg.strength_range);
    }
}

/// Displaced copy of a surface plus the box enclosing it.
#[derive(Clone, Debug, Default)]
pub struct DisplacedSurface {
    pub loops: Vec<Vec<Vec3>>,
    pub bounds: Aabb,
}

impl DisplacedSurface {
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.loops
            .iter()
            .flat_map(|l| l.windows(2).map(|w| (w[0], w[1])))
    }

    pub fn vertex_count(&self) -> usize {
        self.loops.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }
}

/// Applies `strategy` to every vertex of every loop. The input loops are
/// left untouched.
pub fn displace(loops: &[SurfaceLoop], strategy: &dyn Displacement) -> DisplacedSurface {
    let mut bounds = Aabb::empty();
    let loops = loops
        .iter()
        .map(|l| {
            l.vertices
                .iter()
                .map(|v| {
                    let p = v.displaced(strategy.displacement_at(v));
                    bounds.grow(p);
                    p
                })
                .collect()
        })
        .collect();
    DisplacedSurface { loops, bounds }
}
