use ims_core::{AffineTransform, Error, Point};

use crate::{BoundingBox, MaskExtent, MaskPlacement, SpatialMask};

/// Closed box in object space.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxMask<const D: usize> {
    object_box: BoundingBox<D>,
    placement: MaskPlacement<D>,
    world_box: BoundingBox<D>,
}

impl<const D: usize> BoxMask<D> {
    /// Box with identity placement, so object space is world space.
    pub fn new(min: Point<D>, max: Point<D>) -> Self {
        let object_box = BoundingBox::from_corners(min, max);
        Self {
            object_box,
            placement: MaskPlacement::identity(),
            world_box: object_box,
        }
    }

    pub fn with_object_to_world(
        min: Point<D>,
        max: Point<D>,
        object_to_world: AffineTransform<D>,
    ) -> Result<Self, Error> {
        let object_box = BoundingBox::from_corners(min, max);
        let placement = MaskPlacement::new(object_to_world)?;
        let world_box = object_box.transformed(placement.object_to_world());
        Ok(Self {
            object_box,
            placement,
            world_box,
        })
    }

    pub fn object_box(&self) -> &BoundingBox<D> {
        &self.object_box
    }
}

impl<const D: usize> SpatialMask<D> for BoxMask<D> {
    fn is_inside_in_object_space(&self, p: &Point<D>) -> bool {
        self.object_box.contains(p)
    }

    fn placement(&self) -> &MaskPlacement<D> {
        &self.placement
    }

    fn world_extent(&self) -> MaskExtent<D> {
        MaskExtent::Bounded(self.world_box)
    }
}

#[cfg(test)]
mod tests {
    use ims_core::{AffineTransform, Point, Vector};

    use super::BoxMask;
    use crate::{MaskExtent, SpatialMask};

    #[test]
    fn identity_box_tests_world_points_directly() {
        let mask = BoxMask::new(Point::new([2.0, 2.0]), Point::new([3.0, 3.0]));

        assert!(mask.is_inside_in_world_space(&Point::new([2.0, 2.0])));
        assert!(mask.is_inside_in_world_space(&Point::new([3.0, 2.5])));
        assert!(!mask.is_inside_in_world_space(&Point::new([1.9, 2.5])));
        assert!(!mask.is_inside_in_world_space(&Point::new([2.5, 3.1])));
    }

    #[test]
    fn placed_box_agrees_in_both_spaces() {
        let shift = AffineTransform::translation(Vector::new([10.0, -5.0]));
        let (min, max) = (Point::new([0.0, 0.0]), Point::new([1.0, 2.0]));
        let mask =
            BoxMask::with_object_to_world(min, max, shift).expect("translation is invertible");

        let world = Point::new([10.5, -4.0]);
        assert!(mask.is_inside_in_world_space(&world));
        assert!(mask.is_inside_in_object_space(&mask.world_to_object().transform_point(&world)));
        assert!(!mask.is_inside_in_world_space(&Point::new([0.5, 1.0])));

        match mask.world_extent() {
            MaskExtent::Bounded(b) => {
                assert_eq!(b.min, Point::new([10.0, -5.0]));
                assert_eq!(b.max, Point::new([11.0, -3.0]));
            }
            other => panic!("unexpected extent {other:?}"),
        }
    }
}
