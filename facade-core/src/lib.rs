//! Core of the facade generator: particle field to volumetric facade mesh.
//!
//! Main components:
//! - [`simulator`]: particles, attractors and the per-step force phases
//!   ([`attractor`], [`particle`], [`force_buffer`], [`phases`]).
//! - [`tessellate`]: Voronoi regions or Delaunay triangles of the particle
//!   field, clipped to the world bounds by [`clip`].
//! - [`curve`]: editable profile curve and its sampled polyline.
//! - [`surface`]: drapes 2-D cells over the profile into 3-D loops.
//! - [`displacement`]: pluggable displacement along surface normals.
//! - [`voxel`], [`isosurface`], [`mesh`], [`reconstruct`]: rasterization,
//!   surface nets extraction and Laplacian smoothing.
//! - [`pipeline`]: owns the stateful parts and the output of each stage.
//! - [`bounds`], [`config`], [`error`], [`types`]: shared building blocks.

pub mod attractor;
pub mod bounds;
pub mod clip;
pub mod config;
pub mod curve;
pub mod displacement;
pub mod error;
pub mod force_buffer;
pub mod isosurface;
pub mod mesh;
pub mod particle;
pub mod phases;
pub mod pipeline;
pub mod reconstruct;
pub mod simulator;
pub mod surface;
pub mod tessellate;
pub mod types;
pub mod voxel;

pub use bounds::{Aabb, Rect};
pub use config::FacadeConfig;
pub use error::{CurveError, FacadeError, ReconstructError};
pub use mesh::Mesh;
pub use pipeline::FacadePipeline;
