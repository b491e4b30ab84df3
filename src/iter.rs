use crate::{
    error::Error,
    filter::Finite,
    range::{RangeEstimator, ValueRange},
};

/// An `Iterator` wrapper for observations.
/// This trait exposes additional functions on an `Iterator` over `f64`.
pub trait ObservationIterator: Iterator<Item = f64> {
    /// Drops observations that are NaN or infinite.
    fn finite(self) -> Finite<Self>
    where
        Self: Sized,
    {
        Finite::new(self)
    }

    fn estimate_range<E>(self, estimator: &E) -> Result<ValueRange, Error>
    where
        Self: Sized,
        E: RangeEstimator,
    {
        estimator.estimate(self)
    }
}

impl<I: Iterator<Item = f64>> ObservationIterator for I {}
