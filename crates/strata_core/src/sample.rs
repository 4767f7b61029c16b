//! Time-keyed sample tracks.

use crate::error::{ObjectError, ObjectResult};
use crate::node::TimeRange;

/// A property sampled at increasing millisecond times.
///
/// Never empty. The value in effect at a time is the last sample at or
/// before it; times before the first sample resolve to the first sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Sampled<T> {
    samples: Vec<(u64, T)>,
}

impl<T> Sampled<T> {
    /// A track holding a single value at time 0.
    pub fn constant(value: T) -> Self {
        Self {
            samples: vec![(0, value)],
        }
    }

    /// Build a track from `(time_ms, value)` pairs in strictly increasing time order.
    pub fn from_samples(samples: Vec<(u64, T)>) -> ObjectResult<Self> {
        if samples.is_empty() {
            return Err(ObjectError::EmptySamples);
        }

        for pair in samples.windows(2) {
            let (previous, next) = (pair[0].0, pair[1].0);
            if next <= previous {
                return Err(ObjectError::UnsortedSamples { previous, next });
            }
        }

        Ok(Self { samples })
    }

    /// The value in effect at `time_ms`.
    pub fn value_at(&self, time_ms: u64) -> &T {
        let idx = self.samples.partition_point(|(t, _)| *t <= time_ms);
        &self.samples[idx.saturating_sub(1)].1
    }

    /// Sampled times, or `EMPTY` if the track holds fewer than two samples.
    pub fn time_range(&self) -> TimeRange {
        match (self.samples.first(), self.samples.last()) {
            (Some((first, _)), Some((last, _))) if self.samples.len() > 1 => {
                TimeRange::new(*first as f64, *last as f64)
            }
            _ => TimeRange::EMPTY,
        }
    }

    pub fn is_constant(&self) -> bool {
        self.samples.len() < 2
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> {
        self.samples.iter().map(|(t, v)| (*t, v))
    }
}
