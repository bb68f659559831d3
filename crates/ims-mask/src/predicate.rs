use ims_core::{AffineTransform, Error, Point};

use crate::{MaskExtent, MaskPlacement, SpatialMask};

/// Mask backed by a closure evaluated in object space.
pub struct PredicateMask<F, const D: usize> {
    predicate: F,
    placement: MaskPlacement<D>,
    extent: MaskExtent<D>,
}

impl<F, const D: usize> PredicateMask<F, D>
where
    F: Fn(&Point<D>) -> bool + Sync,
{
    pub fn new(predicate: F) -> Self {
        Self {
            predicate,
            placement: MaskPlacement::identity(),
            extent: MaskExtent::Unbounded,
        }
    }

    pub fn with_object_to_world(
        predicate: F,
        object_to_world: AffineTransform<D>,
    ) -> Result<Self, Error> {
        Ok(Self {
            predicate,
            placement: MaskPlacement::new(object_to_world)?,
            extent: MaskExtent::Unbounded,
        })
    }

    /// Declares a world-space extent. It must contain every accepted point.
    pub fn with_extent(mut self, extent: MaskExtent<D>) -> Self {
        self.extent = extent;
        self
    }
}

impl<F, const D: usize> SpatialMask<D> for PredicateMask<F, D>
where
    F: Fn(&Point<D>) -> bool + Sync,
{
    fn is_inside_in_object_space(&self, p: &Point<D>) -> bool {
        (self.predicate)(p)
    }

    fn placement(&self) -> &MaskPlacement<D> {
        &self.placement
    }

    fn world_extent(&self) -> MaskExtent<D> {
        self.extent
    }
}
