//! Spatial masks for image samplers.
//!
//! A mask is a read-only inside/outside predicate over world coordinates.
//! Each mask lives in its own object space and carries an object-to-world
//! affine placement whose inverse is computed once, when the mask is built.
//! Testing `world_to_object(p)` in object space is equivalent to testing `p`
//! in world space, and lets samplers hoist the inverse out of their loops.
//!
//! Masks may report their world-space extent. Samplers use it to skip
//! pixels that are certainly outside; the extent must therefore contain
//! every point the mask accepts.

mod bbox;
mod box_mask;
mod image_mask;
mod placement;
mod predicate;

pub use bbox::BoundingBox;
pub use box_mask::BoxMask;
pub use image_mask::BinaryImageMask;
pub use placement::MaskPlacement;
pub use predicate::PredicateMask;

use ims_core::{AffineTransform, Point};

/// World-space extent of the points a mask accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskExtent<const D: usize> {
    /// No useful bound is known.
    Unbounded,
    /// The mask accepts nothing.
    Empty,
    Bounded(BoundingBox<D>),
}

pub trait SpatialMask<const D: usize>: Sync {
    fn is_inside_in_object_space(&self, p: &Point<D>) -> bool;

    fn placement(&self) -> &MaskPlacement<D>;

    fn object_to_world(&self) -> &AffineTransform<D> {
        self.placement().object_to_world()
    }

    fn world_to_object(&self) -> &AffineTransform<D> {
        self.placement().world_to_object()
    }

    fn is_inside_in_world_space(&self, p: &Point<D>) -> bool {
        self.is_inside_in_object_space(&self.world_to_object().transform_point(p))
    }

    fn world_extent(&self) -> MaskExtent<D> {
        MaskExtent::Unbounded
    }
}
