//! Equicube converts a full-sphere equirectangular panorama into the six
//! faces of a cube map.
//!
//! # Pipeline overview
//!
//! 1. **Decode**: [`SourceImage::open`] loads the panorama (8-bit RGB or
//!    RGBA; anything else is rejected before projection starts).
//! 2. **Project**: [`project_cubemap`] inverse-maps every destination pixel
//!    of every face to a unit direction, converts it to longitude/latitude
//!    and copies the nearest source pixel.
//! 3. **Save**: the caller encodes the six [`FaceImage`]s however it likes
//!    (the bundled CLI writes `<prefix>_<face>.png`).
//!
//! Two interchangeable backends implement the identical clamped-truncation
//! sampling rule: [`CpuProjector`] is the single-threaded reference, and
//! `GpuProjector` (feature `gpu`) dispatches the same math as a wgpu compute
//! kernel. For a given source image and face size the two produce
//! byte-identical output.
#![forbid(unsafe_code)]

pub mod error;
pub mod face;
pub mod mapping;
pub mod projector;
pub mod projector_cpu;
#[cfg(feature = "gpu")]
pub mod projector_gpu;
pub mod raster;
pub mod testcard;

pub use error::{EquicubeError, EquicubeResult};
pub use face::Face;
pub use projector::{
    CubeFaces, ProjectorBackend, ProjectorKind, create_projector, project_cubemap,
};
pub use projector_cpu::CpuProjector;
#[cfg(feature = "gpu")]
pub use projector_gpu::GpuProjector;
pub use raster::{Channels, FaceImage, SourceImage};
pub use testcard::testcard;
