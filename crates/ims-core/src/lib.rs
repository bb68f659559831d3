//! Foundational primitives for image samplers.
//!
//! ## Memory Layout
//! Images are dense `D`-dimensional arrays with axis 0 contiguous in memory.
//! Regions are half-open index boxes; iterating a region visits indices with
//! axis 0 varying fastest, which is the scan order used everywhere a region
//! is decomposed.
//!
//! ## Geometry
//! Every image carries an [`ImageGeometry`]: origin, per-axis spacing and a
//! direction matrix. The physical point of index `i` is
//! `origin + direction * (spacing .* i)`.
//!
//! ## Samples
//! An [`ImageSample`] pairs a physical point with the pixel value promoted
//! to `f64`.

mod error;
mod geom;
mod image;
mod region;
mod sample;

pub use error::Error;
pub use geom::{
    AffineTransform, Matrix, Point, Vector, identity_matrix, invert_matrix, mat_mul, mat_vec,
};
pub use image::{Image, ImageGeometry};
pub use region::{ImageRegion, Index, RegionIter};
pub use sample::{ImageSample, ImageSampleContainer};
