//! Error types for the facade pipeline.
//!
//! Degenerate geometry is never an error: stages skip it and log. Errors are
//! reserved for callers asking for a stage before its inputs exist.

use thiserror::Error;

/// Errors raised by [`crate::curve::ProfileCurve`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// The curve cannot be sampled yet.
    #[error("profile curve needs at least {required} control points, has {actual}")]
    TooFewPoints {
        /// Minimum number of control points.
        required: usize,
        /// Current number of control points.
        actual: usize,
    },
}

/// Errors raised by volumetric reconstruction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconstructError {
    /// The displaced surface holds no vertices, so there is no volume to fill.
    #[error("displaced surface is empty; nothing to voxelize")]
    EmptyVolume,
}

/// Errors raised by [`crate::pipeline::FacadePipeline`] when a stage runs
/// before its upstream output exists.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FacadeError {
    #[error("no tessellation computed yet")]
    MissingTessellation,

    #[error("no 3D surface computed yet")]
    MissingSurface,

    #[error("no displaced surface computed yet")]
    MissingDisplacedSurface,

    #[error("profile curve is not ready: {0}")]
    Curve(#[from] CurveError),

    #[error("reconstruction failed: {0}")]
    Reconstruct(#[from] ReconstructError),
}
