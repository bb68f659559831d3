use ims_core::{AffineTransform, Image, ImageSample, Point};
use ims_mask::SpatialMask;

use crate::partition::WorkUnit;

/// Fills `unit` with one sample per pixel of its sub-region whose physical
/// point passes `accept`, in scan order, and records how many were written.
///
/// Points are computed from the pixel index directly, never accumulated
/// along a line, so a pixel gets bit-identical coordinates whichever unit
/// it falls into.
pub fn fill_work_unit<T, F, const D: usize>(
    unit: &mut WorkUnit<'_, D>,
    image: &Image<T, D>,
    accept: F,
) where
    T: Copy + Into<f64>,
    F: Fn(&Point<D>) -> bool,
{
    let geometry = image.geometry();
    let line_len = unit.region.size[0];
    let mut line_starts = unit.region;
    line_starts.size[0] = 1;

    let mut cursor = 0usize;
    for start in line_starts.iter() {
        let line = image.line(&start, line_len);
        let mut index = start;
        for (k, &px) in line.iter().enumerate() {
            index[0] = start[0] + k;
            let point = geometry.index_to_physical_point(&index);
            if accept(&point) {
                unit.samples[cursor] = ImageSample::new(point, px.into());
                cursor += 1;
            }
        }
    }

    unit.num_samples = cursor;
}

/// Unmasked fill: every pixel is recorded.
pub fn fill_work_unit_unmasked<T, const D: usize>(unit: &mut WorkUnit<'_, D>, image: &Image<T, D>)
where
    T: Copy + Into<f64>,
{
    fill_work_unit(unit, image, |_| true);
    debug_assert_eq!(unit.num_samples, unit.samples.len());
}

/// Masked fill. `world_to_object` is the mask's cached inverse placement;
/// testing in object space avoids re-deriving it per pixel.
pub fn fill_work_unit_masked<T, const D: usize>(
    unit: &mut WorkUnit<'_, D>,
    image: &Image<T, D>,
    mask: &dyn SpatialMask<D>,
    world_to_object: &AffineTransform<D>,
) where
    T: Copy + Into<f64>,
{
    fill_work_unit(unit, image, |p| {
        mask.is_inside_in_object_space(&world_to_object.transform_point(p))
    });
}

#[cfg(test)]
mod tests {
    use ims_core::{Image, ImageGeometry, ImageRegion, ImageSample, Point};
    use ims_mask::{BoxMask, SpatialMask};

    use super::{fill_work_unit_masked, fill_work_unit_unmasked};
    use crate::partition::WorkUnit;

    #[test]
    fn unmasked_unit_records_every_pixel_in_scan_order() {
        let image = Image::from_fn([4, 3], |[x, y]| (x + 4 * y) as u16).expect("valid image");
        let region = ImageRegion::new([1, 1], [2, 2]);
        let mut buffer = vec![ImageSample::default(); 4];
        let mut unit = WorkUnit::new(region, 0, &mut buffer);

        fill_work_unit_unmasked(&mut unit, &image);

        assert_eq!(unit.num_samples(), 4);
        let values: Vec<f64> = unit.written().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![5.0, 6.0, 9.0, 10.0]);
        assert_eq!(unit.written()[1].point, Point::new([2.0, 1.0]));
    }

    #[test]
    fn points_follow_image_geometry() {
        let geometry = ImageGeometry::new(
            Point::new([-1.0, 4.0]),
            [0.5, 2.0],
            [[0.0, 1.0], [1.0, 0.0]],
        )
        .expect("valid geometry");
        let image = Image::new_fill([3, 2], 7.5f32)
            .expect("valid image")
            .with_geometry(geometry.clone());
        let region = image.largest_region();
        let mut buffer = vec![ImageSample::default(); 6];
        let mut unit = WorkUnit::new(region, 0, &mut buffer);

        fill_work_unit_unmasked(&mut unit, &image);

        for (sample, idx) in unit.written().iter().zip(region.iter()) {
            assert_eq!(sample.point, geometry.index_to_physical_point(&idx));
            assert_eq!(sample.value, 7.5);
        }
    }

    #[test]
    fn masked_unit_keeps_inside_prefix_only() {
        let image = Image::from_fn([5, 6], |[x, y]| (x + 5 * y) as i32).expect("valid image");
        let mask = BoxMask::new(Point::new([2.0, 2.0]), Point::new([3.0, 3.0]));
        let region = image.largest_region();
        let mut buffer = vec![ImageSample::default(); 30];
        let mut unit = WorkUnit::new(region, 0, &mut buffer);

        fill_work_unit_masked(&mut unit, &image, &mask, mask.world_to_object());

        assert_eq!(unit.num_samples(), 4);
        assert_eq!(unit.capacity(), 30);
        let values: Vec<f64> = unit.written().iter().map(|s| s.value).collect();
        assert_eq!(values, vec![12.0, 13.0, 17.0, 18.0]);
    }
}
