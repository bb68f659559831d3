use ims_core::ImageSample;

use crate::partition::UnitTally;

/// Packs the valid prefix of every unit's range to the front of `samples`,
/// in partition order, and truncates the rest.
///
/// The first unit's samples already start at offset 0 and stay put. Each
/// later prefix moves down to directly after the previous one, so the result
/// keeps whole-domain scan order whatever order the units finished in.
/// Returns the final length.
pub fn compact_samples<const D: usize>(
    samples: &mut Vec<ImageSample<D>>,
    tallies: &[UnitTally],
) -> usize {
    let mut cursor = 0usize;
    for tally in tallies {
        debug_assert!(tally.num_samples <= tally.capacity);
        debug_assert!(tally.offset >= cursor);
        if tally.offset != cursor && tally.num_samples > 0 {
            samples.copy_within(tally.offset..tally.offset + tally.num_samples, cursor);
        }
        cursor += tally.num_samples;
    }

    samples.truncate(cursor);
    cursor
}

#[cfg(test)]
mod tests {
    use ims_core::{ImageSample, Point};

    use super::compact_samples;
    use crate::partition::UnitTally;

    fn sample(v: f64) -> ImageSample<1> {
        ImageSample::new(Point::new([v]), v)
    }

    fn tally(offset: usize, capacity: usize, num_samples: usize) -> UnitTally {
        UnitTally {
            offset,
            capacity,
            num_samples,
        }
    }

    #[test]
    fn moves_partial_prefixes_down_in_order() {
        // Three units of capacity 4; `-1` marks reserved but unused slots.
        let raw = [0.0, 1.0, -1.0, -1.0, 4.0, -1.0, -1.0, -1.0, 8.0, 9.0, 10.0, -1.0];
        let mut samples: Vec<ImageSample<1>> = raw.into_iter().map(sample).collect();
        let tallies = [tally(0, 4, 2), tally(4, 4, 1), tally(8, 4, 3)];

        let len = compact_samples(&mut samples, &tallies);

        assert_eq!(len, 6);
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.0, 1.0, 4.0, 8.0, 9.0, 10.0]);
    }

    #[test]
    fn empty_units_are_skipped() {
        let mut samples: Vec<ImageSample<1>> =
            [-1.0, -1.0, 2.0, 3.0].into_iter().map(sample).collect();
        let tallies = [tally(0, 2, 0), tally(2, 2, 2)];

        assert_eq!(compact_samples(&mut samples, &tallies), 2);
        assert_eq!(samples, vec![sample(2.0), sample(3.0)]);
    }

    #[test]
    fn full_units_need_no_moves() {
        let mut samples: Vec<ImageSample<1>> = (0..6).map(|v| sample(v as f64)).collect();
        let before = samples.clone();
        let tallies = [tally(0, 3, 3), tally(3, 3, 3)];

        assert_eq!(compact_samples(&mut samples, &tallies), 6);
        assert_eq!(samples, before);
    }

    #[test]
    fn no_units_clears_everything() {
        let mut samples = vec![sample(1.0)];
        assert_eq!(compact_samples(&mut samples, &[]), 0);
        assert!(samples.is_empty());
    }
}
