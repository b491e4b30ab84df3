use super::{RangeEstimator, ValueRange};
use crate::{error::Error, iter::ObservationIterator};
use tracing::debug;

/// Computes the `q`-th quantile of `sorted` by linear interpolation between
/// order statistics.
///
/// ```text
/// pos  = (n - 1) * q
/// base = floor(pos)
/// rest = pos - base
/// sorted[base] + (sorted[min(base + 1, n - 1)] - sorted[base]) * rest
/// ```
///
/// `sorted` must be in non-decreasing order. Returns [`Error::NoData`] if it
/// is empty and [`Error::InvalidQuantile`] if `q` is not within `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64, Error> {
    if !(0.0..=1.0).contains(&q) {
        return Err(Error::InvalidQuantile { q });
    }

    let n = sorted.len();
    match n {
        0 => Err(Error::NoData),
        1 => Ok(sorted[0]),
        _ => {
            let pos = (n - 1) as f64 * q;
            let base = pos.floor() as usize;
            let rest = pos - base as f64;
            let a = sorted[base];
            let b = sorted[(base + 1).min(n - 1)];
            Ok(a + (b - a) * rest)
        }
    }
}

/// Bounds the display range by a low and a high quantile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantileClip {
    low: f64,
    high: f64,
}

impl QuantileClip {
    /// Creates a new `QuantileClip` from `low` and `high`.
    ///
    /// Both must be within `[0, 1]` and `low` must not exceed `high`.
    pub fn try_new(low: f64, high: f64) -> Result<Self, Error> {
        for q in [low, high] {
            if !(0.0..=1.0).contains(&q) {
                return Err(Error::InvalidQuantile { q });
            }
        }

        if low > high {
            return Err(Error::InvalidRange { low, high });
        }

        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl Default for QuantileClip {
    fn default() -> Self {
        Self {
            low: 0.05,
            high: 0.95,
        }
    }
}

impl RangeEstimator for QuantileClip {
    fn estimate<I: ObservationIterator>(&self, observations: I) -> Result<ValueRange, Error> {
        let mut sorted: Vec<f64> = observations.finite().collect();
        sorted.sort_unstable_by(f64::total_cmp);

        let min = quantile_sorted(&sorted, self.low)?;
        let max = quantile_sorted(&sorted, self.high)?;
        debug!(
            count = sorted.len(),
            low = self.low,
            high = self.high,
            min,
            max,
            "estimated quantile range"
        );

        ValueRange::new(min, max)
    }
}
