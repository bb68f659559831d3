use ims_core::{AffineTransform, Error, Image, Point};

use crate::{BoundingBox, MaskExtent, MaskPlacement, SpatialMask};

/// Mask defined by a `u8` image in object space.
///
/// A point is inside when the nearest pixel (continuous index rounded half
/// up) lies in the image and is `> 0`. The mask image's own geometry maps
/// object space to its index space.
#[derive(Debug, Clone)]
pub struct BinaryImageMask<const D: usize> {
    image: Image<u8, D>,
    placement: MaskPlacement<D>,
    extent: MaskExtent<D>,
}

impl<const D: usize> BinaryImageMask<D> {
    pub fn new(image: Image<u8, D>) -> Self {
        let placement = MaskPlacement::identity();
        let extent = compute_world_extent(&image, &placement);
        Self {
            image,
            placement,
            extent,
        }
    }

    pub fn with_object_to_world(
        image: Image<u8, D>,
        object_to_world: AffineTransform<D>,
    ) -> Result<Self, Error> {
        let placement = MaskPlacement::new(object_to_world)?;
        let extent = compute_world_extent(&image, &placement);
        Ok(Self {
            image,
            placement,
            extent,
        })
    }

    pub fn image(&self) -> &Image<u8, D> {
        &self.image
    }

    fn nearest_index(&self, p: &Point<D>) -> Option<[usize; D]> {
        let c = self.image.geometry().physical_point_to_continuous_index(p);
        let size = self.image.size();
        let mut idx = [0usize; D];
        for d in 0..D {
            let r = (c[d] + 0.5).floor();
            if !(r >= 0.0 && r < size[d] as f64) {
                return None;
            }
            idx[d] = r as usize;
        }
        Some(idx)
    }
}

impl<const D: usize> SpatialMask<D> for BinaryImageMask<D> {
    fn is_inside_in_object_space(&self, p: &Point<D>) -> bool {
        self.nearest_index(p)
            .and_then(|idx| self.image.get(&idx))
            .is_some_and(|&v| v > 0)
    }

    fn placement(&self) -> &MaskPlacement<D> {
        &self.placement
    }

    fn world_extent(&self) -> MaskExtent<D> {
        self.extent
    }
}

fn compute_world_extent<const D: usize>(
    image: &Image<u8, D>,
    placement: &MaskPlacement<D>,
) -> MaskExtent<D> {
    let mut lo = [usize::MAX; D];
    let mut hi = [0usize; D];
    let mut any = false;
    for idx in image.largest_region().iter() {
        if image.get(&idx).is_some_and(|&v| v > 0) {
            any = true;
            for d in 0..D {
                lo[d] = lo[d].min(idx[d]);
                hi[d] = hi[d].max(idx[d]);
            }
        }
    }
    if !any {
        return MaskExtent::Empty;
    }

    // Rounding assigns each pixel the half-open cell [i - 0.5, i + 0.5).
    let cell_box = BoundingBox::from_corners(
        Point::new(lo.map(|i| i as f64 - 0.5)),
        Point::new(hi.map(|i| i as f64 + 0.5)),
    );
    let geometry = image.geometry();
    let object_box = BoundingBox::enclosing(
        cell_box
            .corners()
            .map(|c| geometry.continuous_index_to_physical_point(&c.coords)),
    )
    .unwrap_or(cell_box);

    MaskExtent::Bounded(object_box.transformed(placement.object_to_world()))
}

#[cfg(test)]
mod tests {
    use ims_core::{AffineTransform, Image, ImageGeometry, Point, Vector};

    use super::BinaryImageMask;
    use crate::{MaskExtent, SpatialMask};

    fn block_mask() -> Image<u8, 2> {
        // 5x6, nonzero at x in 2..=3, y in 2..=3.
        Image::from_fn([5, 6], |[x, y]| {
            if (2..=3).contains(&x) && (2..=3).contains(&y) {
                255
            } else {
                0
            }
        })
        .expect("valid mask image")
    }

    #[test]
    fn nearest_pixel_decides() {
        let mask = BinaryImageMask::new(block_mask());

        assert!(mask.is_inside_in_world_space(&Point::new([2.0, 2.0])));
        assert!(mask.is_inside_in_world_space(&Point::new([3.4, 3.4])));
        assert!(mask.is_inside_in_world_space(&Point::new([1.5, 2.0])));
        assert!(!mask.is_inside_in_world_space(&Point::new([1.49, 2.0])));
        assert!(!mask.is_inside_in_world_space(&Point::new([3.5, 2.0])));
        assert!(!mask.is_inside_in_world_space(&Point::new([-10.0, 2.0])));
    }

    #[test]
    fn extent_covers_nonzero_cells() {
        let mask = BinaryImageMask::new(block_mask());
        match mask.world_extent() {
            MaskExtent::Bounded(b) => {
                assert_eq!(b.min, Point::new([1.5, 1.5]));
                assert_eq!(b.max, Point::new([3.5, 3.5]));
            }
            other => panic!("unexpected extent {other:?}"),
        }
    }

    #[test]
    fn all_zero_mask_is_empty() {
        let mask = BinaryImageMask::new(Image::new_fill([4, 4], 0u8).expect("valid mask image"));
        assert_eq!(mask.world_extent(), MaskExtent::Empty);
        assert!(!mask.is_inside_in_world_space(&Point::new([1.0, 1.0])));
    }

    #[test]
    fn geometry_and_placement_compose() {
        let geometry = ImageGeometry::from_origin_spacing(Point::new([100.0, 0.0]), [2.0, 2.0])
            .expect("valid geometry");
        let image = block_mask().with_geometry(geometry);
        let shift = AffineTransform::translation(Vector::new([0.0, 50.0]));
        let mask = BinaryImageMask::with_object_to_world(image, shift).expect("invertible");

        // Pixel (2, 2) sits at object (104, 4), world (104, 54).
        assert!(mask.is_inside_in_world_space(&Point::new([104.0, 54.0])));
        assert!(!mask.is_inside_in_world_space(&Point::new([104.0, 4.0])));
        assert!(mask.is_inside_in_object_space(&Point::new([104.0, 4.0])));
    }
}
