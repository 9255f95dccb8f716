//! lumen renderer - CPU Monte Carlo path tracing.
//!
//! The core pipeline: a scheduler enumerates pixels over a bounded
//! worker pool, each pixel draws jittered camera rays from its own
//! deterministic random stream, and the recursive tracer follows each
//! ray through emission, absorption, reflection and transmission.
//! Scene authoring, image encoding and argument handling live outside
//! this crate; the contract here is a filled [`ColorBuffer`].

mod buffer;
mod camera;
mod material;
mod renderer;
mod rng;
mod shape;
mod tracer;

pub use buffer::{ColorBuffer, BYTES_PER_PIXEL};
pub use camera::Camera;
pub use material::{Color, Material};
pub use renderer::{RenderConfig, RenderError, Renderer};
pub use rng::{pcg_hash, Rng};
pub use shape::{HitRecord, Scene, Shape, Sphere};
pub use tracer::{trace, Sky, ROOT_MIN};

/// Re-export math types used across the public API
pub use lumen_math::{Interval, Ray, Vec3};
