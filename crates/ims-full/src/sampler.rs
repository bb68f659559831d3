use ims_core::{
    Error, Image, ImageGeometry, ImageRegion, ImageSample, ImageSampleContainer, Point,
};
use ims_mask::{MaskExtent, SpatialMask};

use crate::compact::compact_samples;
use crate::dispatch::{Dispatcher, RayonDispatcher, available_concurrency};
use crate::partition::{UnitTally, WorkUnit, generate_work_units};
use crate::producer::{fill_work_unit_masked, fill_work_unit_unmasked};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullSamplerConfig {
    /// Split the domain into work units and run them through the dispatcher.
    pub use_multi_thread: bool,
    /// Requested unit count; capped by the dispatcher's concurrency.
    pub number_of_work_units: usize,
    /// Skip pixels outside the mask's reported world extent.
    pub crop_to_mask: bool,
}

impl Default for FullSamplerConfig {
    fn default() -> Self {
        Self {
            use_multi_thread: true,
            number_of_work_units: available_concurrency(),
            crop_to_mask: true,
        }
    }
}

/// Samples every pixel of a region, optionally restricted by a mask.
///
/// Output order is the region's scan order and does not depend on the
/// execution mode, the unit count or the dispatcher.
#[derive(Debug, Clone)]
pub struct ImageFullSampler<P = RayonDispatcher> {
    config: FullSamplerConfig,
    dispatcher: P,
}

impl ImageFullSampler<RayonDispatcher> {
    /// Sampler backed by a dedicated `rayon` pool sized to the hardware.
    pub fn with_rayon(config: FullSamplerConfig) -> Result<Self, Error> {
        Ok(Self::new(config, RayonDispatcher::new(available_concurrency())?))
    }
}

impl<P: Dispatcher> ImageFullSampler<P> {
    pub fn new(config: FullSamplerConfig, dispatcher: P) -> Self {
        Self { config, dispatcher }
    }

    pub fn config(&self) -> &FullSamplerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: FullSamplerConfig) {
        self.config = config;
    }

    pub fn dispatcher(&self) -> &P {
        &self.dispatcher
    }

    /// Samples `region` (the whole image when `None`) of `image`.
    pub fn sample<T, const D: usize>(
        &self,
        image: &Image<T, D>,
        region: Option<ImageRegion<D>>,
        mask: Option<&dyn SpatialMask<D>>,
    ) -> Result<ImageSampleContainer<D>, Error>
    where
        T: Copy + Into<f64> + Sync,
    {
        let mut samples = Vec::new();
        self.sample_into(image, region, mask, &mut samples)?;
        Ok(samples)
    }

    /// Like [`Self::sample`], reusing the capacity of `samples`.
    ///
    /// Previous contents are discarded. On error `samples` is left empty.
    pub fn sample_into<T, const D: usize>(
        &self,
        image: &Image<T, D>,
        region: Option<ImageRegion<D>>,
        mask: Option<&dyn SpatialMask<D>>,
        samples: &mut Vec<ImageSample<D>>,
    ) -> Result<(), Error>
    where
        T: Copy + Into<f64> + Sync,
    {
        let result = self.try_sample_into(image, region, mask, samples);
        if result.is_err() {
            samples.clear();
        }
        result
    }

    fn try_sample_into<T, const D: usize>(
        &self,
        image: &Image<T, D>,
        region: Option<ImageRegion<D>>,
        mask: Option<&dyn SpatialMask<D>>,
        samples: &mut Vec<ImageSample<D>>,
    ) -> Result<(), Error>
    where
        T: Copy + Into<f64> + Sync,
    {
        samples.clear();
        let Some(region) = sampling_region(image, region, mask, self.config.crop_to_mask)? else {
            log::debug!("full sampler: empty domain, no samples");
            return Ok(());
        };

        if self.config.use_multi_thread {
            sample_multi_threaded(
                &self.dispatcher,
                self.config.number_of_work_units,
                image,
                &region,
                mask,
                samples,
            )?;
        } else {
            sample_single_threaded(image, &region, mask, samples)?;
        }

        log::debug!(
            "full sampler: {} samples from region {:?} (masked: {})",
            samples.len(),
            region,
            mask.is_some()
        );
        Ok(())
    }
}

/// Resolves the domain to scan.
///
/// `None` selects the whole image. An explicit region must lie inside the
/// image. With `crop_to_mask`, the domain shrinks to the pixels whose points
/// can fall inside the mask's world extent. Returns `Ok(None)` when nothing
/// is left to scan.
pub fn sampling_region<T, const D: usize>(
    image: &Image<T, D>,
    region: Option<ImageRegion<D>>,
    mask: Option<&dyn SpatialMask<D>>,
    crop_to_mask: bool,
) -> Result<Option<ImageRegion<D>>, Error> {
    let largest = image.largest_region();
    let region = match region {
        Some(r) if !r.is_inside(&largest) => return Err(Error::RegionOutsideImage),
        Some(r) => r,
        None => largest,
    };
    if region.is_empty() {
        return Ok(None);
    }

    match mask {
        Some(mask) if crop_to_mask => {
            let cropped = crop_region_to_extent(&region, image.geometry(), &mask.world_extent());
            if cropped != Some(region) {
                log::debug!("full sampler: cropped {region:?} to {cropped:?} by mask extent");
            }
            Ok(cropped)
        }
        _ => Ok(Some(region)),
    }
}

/// Smallest sub-region of `region` holding every pixel whose physical point
/// may lie inside `extent`.
///
/// The extent's corners are mapped to continuous indices; their bounding
/// range is widened to whole indices (floor / ceil) so rounding in the
/// inverse mapping never drops a pixel. A box with a non-finite coordinate
/// does not bound the index range and leaves `region` uncropped.
pub fn crop_region_to_extent<const D: usize>(
    region: &ImageRegion<D>,
    geometry: &ImageGeometry<D>,
    extent: &MaskExtent<D>,
) -> Option<ImageRegion<D>> {
    if region.is_empty() {
        return None;
    }
    let bbox = match extent {
        MaskExtent::Unbounded => return Some(*region),
        MaskExtent::Empty => return None,
        MaskExtent::Bounded(b) => b,
    };
    let finite = |p: &Point<D>| p.coords.iter().all(|c| c.is_finite());
    if !finite(&bbox.min) || !finite(&bbox.max) {
        return Some(*region);
    }

    let mut lo = [f64::INFINITY; D];
    let mut hi = [f64::NEG_INFINITY; D];
    for corner in bbox.corners() {
        let c = geometry.physical_point_to_continuous_index(&corner);
        for d in 0..D {
            lo[d] = lo[d].min(c[d]);
            hi[d] = hi[d].max(c[d]);
        }
    }

    let mut out = *region;
    for d in 0..D {
        let (lo_d, hi_d) = (lo[d].floor(), hi[d].ceil());
        if !lo_d.is_finite() || !hi_d.is_finite() {
            continue;
        }
        if hi_d < 0.0 {
            return None;
        }
        // Float-to-int casts saturate, so huge bounds clamp to the region.
        let first = region.index[d].max(lo_d.max(0.0) as usize);
        let last = (region.index[d] + region.size[d] - 1).min(hi_d as usize);
        if first > last {
            return None;
        }
        out.index[d] = first;
        out.size[d] = last - first + 1;
    }
    Some(out)
}

fn check_region<T, const D: usize>(
    image: &Image<T, D>,
    region: &ImageRegion<D>,
) -> Result<usize, Error> {
    if !region.is_inside(&image.largest_region()) {
        return Err(Error::RegionOutsideImage);
    }
    region.checked_num_pixels()
}

/// Clears `samples` and sizes it to `len` default slots.
///
/// Capacity already held is reused; growing uses a fallible reservation so
/// an oversized domain surfaces as [`Error::Allocation`] instead of an abort.
fn allocate_samples<const D: usize>(
    samples: &mut Vec<ImageSample<D>>,
    len: usize,
) -> Result<(), Error> {
    samples.clear();
    samples
        .try_reserve_exact(len)
        .map_err(|_| Error::Allocation { requested: len })?;
    samples.resize(len, ImageSample::default());
    Ok(())
}

/// One work unit spanning `region`, filled on the calling thread.
pub fn sample_single_threaded<T, const D: usize>(
    image: &Image<T, D>,
    region: &ImageRegion<D>,
    mask: Option<&dyn SpatialMask<D>>,
    samples: &mut Vec<ImageSample<D>>,
) -> Result<(), Error>
where
    T: Copy + Into<f64>,
{
    let len = check_region(image, region)?;
    allocate_samples(samples, len)?;
    if len == 0 {
        return Ok(());
    }

    let mut unit = WorkUnit::new(*region, 0, samples.as_mut_slice());
    match mask {
        Some(mask) => {
            fill_work_unit_masked(&mut unit, image, mask, mask.world_to_object());
            let written = unit.num_samples();
            samples.truncate(written);
        }
        None => fill_work_unit_unmasked(&mut unit, image),
    }
    Ok(())
}

/// Partitions `region`, fills the units through `dispatcher` and merges
/// them back into `samples` in partition order.
pub fn sample_multi_threaded<T, P, const D: usize>(
    dispatcher: &P,
    number_of_work_units: usize,
    image: &Image<T, D>,
    region: &ImageRegion<D>,
    mask: Option<&dyn SpatialMask<D>>,
    samples: &mut Vec<ImageSample<D>>,
) -> Result<(), Error>
where
    T: Copy + Into<f64> + Sync,
    P: Dispatcher,
{
    let len = check_region(image, region)?;
    allocate_samples(samples, len)?;

    let tallies: Vec<UnitTally> = {
        let mut units = generate_work_units(
            region,
            number_of_work_units,
            dispatcher.max_concurrency(),
            samples.as_mut_slice(),
        );
        log::debug!(
            "full sampler: {} work units (requested {}, max concurrency {})",
            units.len(),
            number_of_work_units,
            dispatcher.max_concurrency()
        );

        match mask {
            Some(mask) => {
                let world_to_object = mask.world_to_object();
                dispatcher.run_parallel(&mut units, |_, unit| {
                    fill_work_unit_masked(unit, image, mask, world_to_object)
                });
            }
            None => dispatcher.run_parallel(&mut units, |_, unit| {
                fill_work_unit_unmasked(unit, image)
            }),
        }

        units.iter().map(WorkUnit::tally).collect()
    };

    for (i, tally) in tallies.iter().enumerate() {
        log::trace!(
            "work unit {i}: offset {}, {} of {} slots used",
            tally.offset,
            tally.num_samples,
            tally.capacity
        );
    }

    if mask.is_some() {
        let kept = compact_samples(samples, &tallies);
        log::debug!("full sampler: compacted {len} reserved slots to {kept} samples");
    } else {
        debug_assert_eq!(samples.len(), len);
    }
    Ok(())
}
