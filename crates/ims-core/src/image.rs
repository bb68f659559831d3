use crate::geom::{Matrix, Point, identity_matrix, invert_matrix, mat_vec};
use crate::region::{ImageRegion, Index};
use crate::Error;

/// Physical placement of the pixel grid.
///
/// The physical point of index `i` is `origin + direction * (spacing .* i)`.
/// Both directions of the mapping are precomputed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGeometry<const D: usize> {
    origin: Point<D>,
    spacing: [f64; D],
    direction: Matrix<D>,
    index_to_physical: Matrix<D>,
    physical_to_index: Matrix<D>,
}

impl<const D: usize> ImageGeometry<D> {
    pub fn new(origin: Point<D>, spacing: [f64; D], direction: Matrix<D>) -> Result<Self, Error> {
        if spacing.iter().any(|s| !s.is_finite() || *s <= 0.0)
            || origin.coords.iter().any(|o| !o.is_finite())
        {
            return Err(Error::InvalidGeometry);
        }

        let index_to_physical: Matrix<D> =
            core::array::from_fn(|r| core::array::from_fn(|c| direction[r][c] * spacing[c]));
        let physical_to_index = invert_matrix(&index_to_physical).ok_or(Error::InvalidGeometry)?;

        Ok(Self {
            origin,
            spacing,
            direction,
            index_to_physical,
            physical_to_index,
        })
    }

    /// Unit spacing, zero origin, identity direction.
    pub fn identity() -> Self {
        Self {
            origin: Point::origin(),
            spacing: [1.0; D],
            direction: identity_matrix(),
            index_to_physical: identity_matrix(),
            physical_to_index: identity_matrix(),
        }
    }

    pub fn from_origin_spacing(origin: Point<D>, spacing: [f64; D]) -> Result<Self, Error> {
        Self::new(origin, spacing, identity_matrix())
    }

    pub fn origin(&self) -> &Point<D> {
        &self.origin
    }

    pub fn spacing(&self) -> &[f64; D] {
        &self.spacing
    }

    pub fn direction(&self) -> &Matrix<D> {
        &self.direction
    }

    pub fn index_to_physical_point(&self, index: &Index<D>) -> Point<D> {
        self.continuous_index_to_physical_point(&index.map(|i| i as f64))
    }

    pub fn continuous_index_to_physical_point(&self, cindex: &[f64; D]) -> Point<D> {
        let offset = mat_vec(&self.index_to_physical, cindex);
        Point {
            coords: core::array::from_fn(|d| self.origin.coords[d] + offset[d]),
        }
    }

    pub fn physical_point_to_continuous_index(&self, p: &Point<D>) -> [f64; D] {
        let rel: [f64; D] = core::array::from_fn(|d| p.coords[d] - self.origin.coords[d]);
        mat_vec(&self.physical_to_index, &rel)
    }
}

impl<const D: usize> Default for ImageGeometry<D> {
    fn default() -> Self {
        Self::identity()
    }
}

/// Dense `D`-dimensional image. Axis 0 is contiguous in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T, const D: usize> {
    size: [usize; D],
    strides: [usize; D],
    geometry: ImageGeometry<D>,
    data: Vec<T>,
}

impl<T, const D: usize> Image<T, D> {
    pub fn from_vec(size: [usize; D], data: Vec<T>) -> Result<Self, Error> {
        let expected = ImageRegion::from_size(size).checked_num_pixels()?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            size,
            strides: strides_for(&size),
            geometry: ImageGeometry::identity(),
            data,
        })
    }

    /// Builds an image by evaluating `f` at every index in scan order.
    pub fn from_fn(size: [usize; D], mut f: impl FnMut(Index<D>) -> T) -> Result<Self, Error> {
        let region = ImageRegion::from_size(size);
        let len = region.checked_num_pixels()?;
        let mut data = Vec::with_capacity(len);
        data.extend(region.iter().map(&mut f));
        Self::from_vec(size, data)
    }

    pub fn with_geometry(mut self, geometry: ImageGeometry<D>) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn set_geometry(&mut self, geometry: ImageGeometry<D>) {
        self.geometry = geometry;
    }

    pub fn size(&self) -> &[usize; D] {
        &self.size
    }

    pub fn geometry(&self) -> &ImageGeometry<D> {
        &self.geometry
    }

    pub fn num_pixels(&self) -> usize {
        self.data.len()
    }

    /// Region covering every pixel.
    pub fn largest_region(&self) -> ImageRegion<D> {
        ImageRegion::from_size(self.size)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn get(&self, index: &Index<D>) -> Option<&T> {
        if (0..D).any(|d| index[d] >= self.size[d]) {
            return None;
        }
        self.data.get(self.offset_of(index))
    }

    pub fn get_mut(&mut self, index: &Index<D>) -> Option<&mut T> {
        if (0..D).any(|d| index[d] >= self.size[d]) {
            return None;
        }
        let offset = self.offset_of(index);
        self.data.get_mut(offset)
    }

    /// Contiguous run of `len` pixels starting at `start` along axis 0.
    ///
    /// # Panics
    /// Panics if the run leaves the image.
    pub fn line(&self, start: &Index<D>, len: usize) -> &[T] {
        assert!(
            D > 0 && (0..D).all(|d| start[d] < self.size[d]) && start[0] + len <= self.size[0],
            "line out of bounds"
        );
        let offset = self.offset_of(start);
        &self.data[offset..offset + len]
    }

    pub fn index_to_physical_point(&self, index: &Index<D>) -> Point<D> {
        self.geometry.index_to_physical_point(index)
    }

    fn offset_of(&self, index: &Index<D>) -> usize {
        index
            .iter()
            .zip(self.strides.iter())
            .map(|(i, s)| i * s)
            .sum()
    }
}

impl<T: Clone, const D: usize> Image<T, D> {
    pub fn new_fill(size: [usize; D], value: T) -> Result<Self, Error> {
        let len = ImageRegion::from_size(size).checked_num_pixels()?;
        Self::from_vec(size, vec![value; len])
    }
}

fn strides_for<const D: usize>(size: &[usize; D]) -> [usize; D] {
    let mut strides = [0usize; D];
    let mut acc = 1usize;
    for d in 0..D {
        strides[d] = acc;
        acc = acc.saturating_mul(size[d]);
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::{Image, ImageGeometry};
    use crate::Error;
    use crate::geom::Point;

    #[test]
    fn indexing_is_axis0_contiguous() {
        let img = Image::from_vec([3, 2], vec![1u8, 2, 3, 4, 5, 6]).expect("valid image");

        assert_eq!(img.get(&[0, 0]), Some(&1));
        assert_eq!(img.get(&[2, 0]), Some(&3));
        assert_eq!(img.get(&[0, 1]), Some(&4));
        assert_eq!(img.get(&[2, 1]), Some(&6));
        assert_eq!(img.get(&[3, 1]), None);
        assert_eq!(img.line(&[1, 1], 2), &[5, 6]);
    }

    #[test]
    fn from_vec_rejects_wrong_length() {
        let err = Image::from_vec([4, 4], vec![0u16; 15]).expect_err("length mismatch");
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 16,
                actual: 15
            }
        );
    }

    #[test]
    fn from_fn_fills_in_scan_order() {
        let img = Image::from_fn([2, 2, 2], |[x, y, z]| (x + 10 * y + 100 * z) as i32)
            .expect("valid image");
        assert_eq!(img.data(), &[0, 1, 10, 11, 100, 101, 110, 111]);
        assert_eq!(img.get(&[1, 0, 1]), Some(&101));
    }

    #[test]
    fn geometry_maps_index_to_physical_and_back() {
        let direction = [[0.0, -1.0], [1.0, 0.0]];
        let geom = ImageGeometry::new(Point::new([10.0, 20.0]), [2.0, 0.5], direction)
            .expect("valid geometry");

        let p = geom.index_to_physical_point(&[3, 4]);
        // direction * (6, 2) = (-2, 6)
        assert!((p.coords[0] - 8.0).abs() < 1e-12);
        assert!((p.coords[1] - 26.0).abs() < 1e-12);

        let c = geom.physical_point_to_continuous_index(&p);
        assert!((c[0] - 3.0).abs() < 1e-12);
        assert!((c[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn geometry_rejects_bad_spacing_and_direction() {
        let origin = Point::new([0.0, 0.0]);
        assert_eq!(
            ImageGeometry::from_origin_spacing(origin, [1.0, 0.0]),
            Err(Error::InvalidGeometry)
        );
        assert_eq!(
            ImageGeometry::from_origin_spacing(origin, [f64::NAN, 1.0]),
            Err(Error::InvalidGeometry)
        );
        assert_eq!(
            ImageGeometry::new(origin, [1.0, 1.0], [[1.0, 1.0], [1.0, 1.0]]),
            Err(Error::InvalidGeometry)
        );
    }
}
