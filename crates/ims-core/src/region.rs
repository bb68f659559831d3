use crate::Error;

pub type Index<const D: usize> = [usize; D];

/// Rectangular index range `[index, index + size)` along every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageRegion<const D: usize> {
    pub index: Index<D>,
    pub size: [usize; D],
}

impl<const D: usize> ImageRegion<D> {
    pub const fn new(index: Index<D>, size: [usize; D]) -> Self {
        Self { index, size }
    }

    pub const fn from_size(size: [usize; D]) -> Self {
        Self {
            index: [0; D],
            size,
        }
    }

    /// Total pixel count, or `None` if it does not fit in `usize`.
    pub fn num_pixels(&self) -> Option<usize> {
        self.size
            .iter()
            .try_fold(1usize, |acc, &s| acc.checked_mul(s))
    }

    pub fn checked_num_pixels(&self) -> Result<usize, Error> {
        self.num_pixels().ok_or(Error::SizeOverflow)
    }

    pub fn is_empty(&self) -> bool {
        self.size.contains(&0)
    }

    /// Exclusive upper corner, saturating.
    pub fn upper(&self) -> Index<D> {
        core::array::from_fn(|d| self.index[d].saturating_add(self.size[d]))
    }

    pub fn contains_index(&self, idx: &Index<D>) -> bool {
        (0..D).all(|d| idx[d] >= self.index[d] && idx[d] - self.index[d] < self.size[d])
    }

    /// True when `self` lies entirely inside `outer`. Empty regions are inside
    /// any region.
    pub fn is_inside(&self, outer: &ImageRegion<D>) -> bool {
        if self.is_empty() {
            return true;
        }
        (0..D).all(|d| {
            self.index[d] >= outer.index[d]
                && self.index[d]
                    .checked_add(self.size[d])
                    .is_some_and(|end| end <= outer.index[d].saturating_add(outer.size[d]))
        })
    }

    /// Intersection with `other`, or `None` when the overlap is empty.
    pub fn crop(&self, other: &ImageRegion<D>) -> Option<ImageRegion<D>> {
        let a_hi = self.upper();
        let b_hi = other.upper();
        let mut out = ImageRegion::from_size([0; D]);
        for d in 0..D {
            let lo = self.index[d].max(other.index[d]);
            let hi = a_hi[d].min(b_hi[d]);
            if hi <= lo {
                return None;
            }
            out.index[d] = lo;
            out.size[d] = hi - lo;
        }
        Some(out)
    }

    /// Scan-order iterator: axis 0 varies fastest.
    pub fn iter(&self) -> RegionIter<D> {
        RegionIter {
            region: *self,
            current: self.index,
            done: self.is_empty(),
        }
    }
}

impl<const D: usize> IntoIterator for &ImageRegion<D> {
    type Item = Index<D>;
    type IntoIter = RegionIter<D>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct RegionIter<const D: usize> {
    region: ImageRegion<D>,
    current: Index<D>,
    done: bool,
}

impl<const D: usize> Iterator for RegionIter<D> {
    type Item = Index<D>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let out = self.current;

        let mut axis = 0;
        loop {
            if axis == D {
                self.done = true;
                break;
            }
            self.current[axis] += 1;
            if self.current[axis] - self.region.index[axis] < self.region.size[axis] {
                break;
            }
            self.current[axis] = self.region.index[axis];
            axis += 1;
        }

        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::ImageRegion;
    use crate::Error;

    #[test]
    fn scan_order_is_axis0_fastest() {
        let region = ImageRegion::new([1, 2], [3, 2]);
        let visited: Vec<[usize; 2]> = region.iter().collect();
        assert_eq!(
            visited,
            vec![[1, 2], [2, 2], [3, 2], [1, 3], [2, 3], [3, 3]]
        );
    }

    #[test]
    fn scan_3d_visits_every_index_once() {
        let region = ImageRegion::new([0, 1, 2], [2, 3, 4]);
        let visited: Vec<[usize; 3]> = region.iter().collect();
        assert_eq!(visited.len(), 24);
        assert_eq!(visited[0], [0, 1, 2]);
        assert_eq!(visited[1], [1, 1, 2]);
        assert_eq!(visited[2], [0, 2, 2]);
        assert_eq!(visited[23], [1, 3, 5]);
        assert!(visited.iter().all(|idx| region.contains_index(idx)));
    }

    #[test]
    fn empty_region_yields_nothing() {
        let region = ImageRegion::new([3, 3], [0, 5]);
        assert!(region.is_empty());
        assert_eq!(region.num_pixels(), Some(0));
        assert_eq!(region.iter().count(), 0);
    }

    #[test]
    fn pixel_count_overflow_is_reported() {
        let region = ImageRegion::from_size([usize::MAX, 2]);
        assert_eq!(region.num_pixels(), None);
        assert_eq!(region.checked_num_pixels(), Err(Error::SizeOverflow));
    }

    #[test]
    fn crop_and_inside() {
        let image = ImageRegion::from_size([10, 8]);
        let a = ImageRegion::new([6, 2], [6, 3]);
        assert!(!a.is_inside(&image));

        let cropped = a.crop(&image).expect("overlap");
        assert_eq!(cropped, ImageRegion::new([6, 2], [4, 3]));
        assert!(cropped.is_inside(&image));

        let far = ImageRegion::new([20, 0], [2, 2]);
        assert_eq!(far.crop(&image), None);
    }
}
