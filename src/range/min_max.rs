use super::{RangeEstimator, ValueRange};
use crate::{error::Error, iter::ObservationIterator};
use tracing::debug;

/// Uses the plain minimum and maximum of the observations with no clipping.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MinMax;

impl RangeEstimator for MinMax {
    fn estimate<I: ObservationIterator>(&self, observations: I) -> Result<ValueRange, Error> {
        let (min, max, count) = observations.finite().fold(
            (f64::INFINITY, f64::NEG_INFINITY, 0usize),
            |(min, max, count), value| (min.min(value), max.max(value), count + 1),
        );

        if count == 0 {
            return Err(Error::NoData);
        }

        debug!(count, min, max, "estimated min-max range");
        ValueRange::new(min, max)
    }
}
