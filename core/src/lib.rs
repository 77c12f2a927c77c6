//! Detection model and overlay-rendering core for the drone parking monitor.
//!
//! The modules keep the rendering logic pure: detection geometry comes in
//! from the analysis backend, composited overlays come out as plain raster
//! images. HTTP and GUI concerns live in the workspace binaries.

pub mod detection;
pub mod math;
pub mod prelude;
pub mod render;
pub mod telemetry;

pub use prelude::{RenderError, RenderResult};
