use crate::geom::Point;

/// One observation taken from an image: where it was taken and what the
/// pixel held, promoted to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSample<const D: usize> {
    pub point: Point<D>,
    pub value: f64,
}

impl<const D: usize> ImageSample<D> {
    pub const fn new(point: Point<D>, value: f64) -> Self {
        Self { point, value }
    }
}

impl<const D: usize> Default for ImageSample<D> {
    fn default() -> Self {
        Self {
            point: Point::origin(),
            value: 0.0,
        }
    }
}

/// Samples in scan order, as produced by a sampler.
pub type ImageSampleContainer<const D: usize> = Vec<ImageSample<D>>;
