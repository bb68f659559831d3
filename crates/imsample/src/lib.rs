//! Umbrella crate for the `imsample` workspace.
//!
//! Re-exports the image model, the spatial masks and the full sampler.

pub use ims_core::*;
pub use ims_full::*;
pub use ims_mask::*;
