use ims_core::{AffineTransform, Error};

/// Object-to-world transform paired with its cached inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPlacement<const D: usize> {
    object_to_world: AffineTransform<D>,
    world_to_object: AffineTransform<D>,
}

impl<const D: usize> MaskPlacement<D> {
    pub fn new(object_to_world: AffineTransform<D>) -> Result<Self, Error> {
        let world_to_object = object_to_world.inverse()?;
        Ok(Self {
            object_to_world,
            world_to_object,
        })
    }

    pub fn identity() -> Self {
        Self {
            object_to_world: AffineTransform::identity(),
            world_to_object: AffineTransform::identity(),
        }
    }

    pub fn object_to_world(&self) -> &AffineTransform<D> {
        &self.object_to_world
    }

    pub fn world_to_object(&self) -> &AffineTransform<D> {
        &self.world_to_object
    }
}

impl<const D: usize> Default for MaskPlacement<D> {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use ims_core::{AffineTransform, Error, Point, Vector};

    use super::MaskPlacement;

    #[test]
    fn inverse_is_cached_at_construction() {
        let t = AffineTransform::translation(Vector::new([2.0, -3.0]));
        let placement = MaskPlacement::new(t).expect("translation is invertible");

        let p = Point::new([1.0, 1.0]);
        let q = placement.object_to_world().transform_point(&p);
        assert_eq!(q, Point::new([3.0, -2.0]));
        assert_eq!(placement.world_to_object().transform_point(&q), p);
    }

    #[test]
    fn singular_placement_is_rejected() {
        let t = AffineTransform::new([[1.0, 0.0], [0.0, 0.0]], Vector::zero());
        assert_eq!(MaskPlacement::new(t), Err(Error::SingularTransform));
    }
}
