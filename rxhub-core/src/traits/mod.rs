//! Collaborator traits
//!
//! These traits define the interface between the scheduling logic and the
//! board's output hardware.

pub mod pixel;
pub mod relay;

#[cfg(test)]
pub(crate) mod mock;

pub use pixel::PixelBuffer;
pub use relay::{RelayError, RelayOutput};
