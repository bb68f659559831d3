use ims_core::{ImageRegion, ImageSample};

/// Splits `region` into at most `requested` pieces along its slowest axis.
///
/// The split axis is the highest axis with size `> 1`. With
/// `per_piece = ceil(range / requested)` every piece gets `per_piece`
/// slices of that axis except the last, which takes the remainder, so fewer
/// pieces than requested may come out. Pieces are ordered along the axis;
/// concatenating their scan orders gives the scan order of `region`.
///
/// An empty region yields no pieces. `requested == 0` is treated as 1.
pub fn split_region<const D: usize>(
    region: &ImageRegion<D>,
    requested: usize,
) -> Vec<ImageRegion<D>> {
    if region.is_empty() {
        return Vec::new();
    }

    let requested = requested.max(1);
    let Some(axis) = (0..D).rev().find(|&d| region.size[d] > 1) else {
        return vec![*region];
    };

    let range = region.size[axis];
    let per_piece = range.div_ceil(requested);
    let pieces = range.div_ceil(per_piece);

    (0..pieces)
        .map(|i| {
            let start = i * per_piece;
            let mut sub = *region;
            sub.index[axis] += start;
            sub.size[axis] = per_piece.min(range - start);
            sub
        })
        .collect()
}

/// One slice of the sampling domain with its reserved output range.
///
/// `samples` is the unit's exclusive window into the shared output buffer,
/// starting at `offset` and as long as the sub-region's pixel count.
#[derive(Debug)]
pub struct WorkUnit<'a, const D: usize> {
    pub(crate) region: ImageRegion<D>,
    pub(crate) offset: usize,
    pub(crate) samples: &'a mut [ImageSample<D>],
    pub(crate) num_samples: usize,
}

/// What the merge stage needs to know about a finished work unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTally {
    pub offset: usize,
    pub capacity: usize,
    pub num_samples: usize,
}

impl<'a, const D: usize> WorkUnit<'a, D> {
    pub fn new(region: ImageRegion<D>, offset: usize, samples: &'a mut [ImageSample<D>]) -> Self {
        debug_assert_eq!(region.num_pixels(), Some(samples.len()));
        Self {
            region,
            offset,
            samples,
            num_samples: 0,
        }
    }

    pub fn region(&self) -> &ImageRegion<D> {
        &self.region
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    /// Samples written so far, in scan order.
    pub fn written(&self) -> &[ImageSample<D>] {
        &self.samples[..self.num_samples]
    }

    pub fn tally(&self) -> UnitTally {
        UnitTally {
            offset: self.offset,
            capacity: self.samples.len(),
            num_samples: self.num_samples,
        }
    }
}

/// Partitions `region` into work units over `samples`.
///
/// The effective unit count is `min(requested, max_concurrency)`. Base
/// offsets are the running sum of the unmasked pixel counts of the
/// preceding units, so every unit owns enough room whatever a mask later
/// rejects.
///
/// # Panics
/// Panics if `samples.len()` differs from the pixel count of `region`.
pub fn generate_work_units<'a, const D: usize>(
    region: &ImageRegion<D>,
    requested: usize,
    max_concurrency: usize,
    samples: &'a mut [ImageSample<D>],
) -> Vec<WorkUnit<'a, D>> {
    assert_eq!(
        region.num_pixels(),
        Some(samples.len()),
        "sample buffer must match the region pixel count"
    );

    let subregions = split_region(region, requested.min(max_concurrency.max(1)));
    let mut units = Vec::with_capacity(subregions.len());
    let mut rest = samples;
    let mut offset = 0usize;

    for subregion in subregions {
        let len = subregion.size.iter().product::<usize>();
        let (head, tail) = core::mem::take(&mut rest).split_at_mut(len);
        units.push(WorkUnit::new(subregion, offset, head));
        rest = tail;
        offset += len;
    }

    debug_assert!(rest.is_empty());
    units
}
