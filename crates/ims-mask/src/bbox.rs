use ims_core::{AffineTransform, Point};

/// Closed axis-aligned box `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox<const D: usize> {
    pub min: Point<D>,
    pub max: Point<D>,
}

impl<const D: usize> BoundingBox<D> {
    /// Box spanning both corners, whatever their order.
    pub fn from_corners(a: Point<D>, b: Point<D>) -> Self {
        Self {
            min: Point::new(core::array::from_fn(|d| a.coords[d].min(b.coords[d]))),
            max: Point::new(core::array::from_fn(|d| a.coords[d].max(b.coords[d]))),
        }
    }

    /// Smallest box containing every point. `None` for an empty input.
    pub fn enclosing(points: impl IntoIterator<Item = Point<D>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Point::new(core::array::from_fn(|d| acc.min.coords[d].min(p.coords[d]))),
                max: Point::new(core::array::from_fn(|d| acc.max.coords[d].max(p.coords[d]))),
            },
        ))
    }

    pub fn contains(&self, p: &Point<D>) -> bool {
        (0..D).all(|d| p.coords[d] >= self.min.coords[d] && p.coords[d] <= self.max.coords[d])
    }

    /// All `2^D` corners. Bit `d` of the corner number selects `max` on axis `d`.
    pub fn corners(&self) -> impl Iterator<Item = Point<D>> + '_ {
        (0..1usize << D).map(move |bits| {
            Point::new(core::array::from_fn(|d| {
                if bits & (1 << d) != 0 {
                    self.max.coords[d]
                } else {
                    self.min.coords[d]
                }
            }))
        })
    }

    /// Axis-aligned box around the image of this box under `t`.
    pub fn transformed(&self, t: &AffineTransform<D>) -> Self {
        Self::enclosing(self.corners().map(|c| t.transform_point(&c))).unwrap_or(*self)
    }
}
