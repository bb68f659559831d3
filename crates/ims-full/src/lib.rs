//! Full image sampler: one sample per pixel of a region, optionally masked.
//!
//! Pipeline:
//! - Resolve the domain: the requested region (or the whole image), cropped
//!   to the mask's world extent when one is known.
//! - Reserve one output buffer sized to the domain's unmasked pixel count.
//! - Split the domain along its slowest non-trivial axis into work units,
//!   each owning a disjoint `&mut` window of the buffer.
//! - Fill every unit in scan order through a [`Dispatcher`]; a unit only
//!   writes its own window and its own count, so no locks are involved.
//! - With a mask, compact the per-unit prefixes in partition order.
//!
//! Because the split follows the slowest axis and compaction walks units in
//! partition order, single- and multi-threaded runs return identical
//! sequences.
//!
//! Dispatchers:
//! - [`InlineDispatcher`] runs workers sequentially on the caller's thread.
//! - [`ScopedDispatcher`] spawns scoped threads per call.
//! - [`RayonDispatcher`] reuses a caller-sized `rayon` pool.

mod compact;
mod dispatch;
mod partition;
mod producer;
mod sampler;

pub use compact::compact_samples;
pub use dispatch::{
    Dispatcher, InlineDispatcher, RayonDispatcher, ScopedDispatcher, available_concurrency,
};
pub use partition::{UnitTally, WorkUnit, generate_work_units, split_region};
pub use producer::{fill_work_unit, fill_work_unit_masked, fill_work_unit_unmasked};
pub use sampler::{
    FullSamplerConfig, ImageFullSampler, crop_region_to_extent, sample_multi_threaded,
    sample_single_threaded, sampling_region,
};
