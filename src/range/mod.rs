mod min_max;
mod quantile;

use crate::{error::Error, iter::ObservationIterator};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use min_max::MinMax;
pub use quantile::{QuantileClip, quantile_sorted};

/// Lower bound on the width of a [`ValueRange`] when normalizing, so a
/// degenerate range (`min == max`) still divides by a non-zero value.
pub const EPSILON: f64 = 1e-9;

/// The clipping bounds used for both legend text and color normalization.
///
/// Computed once per dataset load and shared by every style computation that
/// follows.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct ValueRange {
    min: f64,
    max: f64,
}

/// Unchecked wire form of a [`ValueRange`].
#[derive(Deserialize)]
struct RawRange {
    min: f64,
    max: f64,
}

impl TryFrom<RawRange> for ValueRange {
    type Error = Error;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl ValueRange {
    /// Creates a new `ValueRange`.
    ///
    /// Returns an error if either bound is not finite or `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, Error> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidRange {
                low: min,
                high: max,
            });
        }

        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Clamps `value` into the range.
    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    /// Maps `value` onto `[0, 1]`.
    ///
    /// Values below `min` give exactly `0.0` and values above `max` give
    /// exactly `1.0`, so outliers collapse onto the extreme colors.
    pub fn normalize(&self, value: f64) -> f64 {
        (self.clamp(value) - self.min) / self.width().max(EPSILON)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Computes a [`ValueRange`] from a stream of observations.
pub trait RangeEstimator {
    fn estimate<I: ObservationIterator>(&self, observations: I) -> Result<ValueRange, Error>;
}

/// Selects which estimator produces the display range.
///
/// The two policies give materially different pictures: `Quantile` maps
/// outliers onto the extreme colors, `MinMax` lets a single outlier compress
/// the gradient for everything else.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClipPolicy {
    Quantile { low: f64, high: f64 },
    MinMax,
}

impl ClipPolicy {
    /// Returns `true` if the policy clips outliers.
    pub fn clips(&self) -> bool {
        matches!(self, ClipPolicy::Quantile { .. })
    }
}

impl Default for ClipPolicy {
    fn default() -> Self {
        ClipPolicy::Quantile {
            low: 0.05,
            high: 0.95,
        }
    }
}

impl fmt::Display for ClipPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipPolicy::Quantile { low, high } => write!(
                f,
                "quantile {}%-{}%",
                percent(*low),
                percent(*high)
            ),
            ClipPolicy::MinMax => write!(f, "min-max"),
        }
    }
}

fn percent(q: f64) -> f64 {
    (q * 1000.).round() / 10.
}

impl RangeEstimator for ClipPolicy {
    fn estimate<I: ObservationIterator>(&self, observations: I) -> Result<ValueRange, Error> {
        match self {
            ClipPolicy::Quantile { low, high } => {
                QuantileClip::try_new(*low, *high)?.estimate(observations)
            }
            ClipPolicy::MinMax => MinMax.estimate(observations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use quickcheck::quickcheck;
    use rstest::rstest;

    #[rstest]
    #[case(f64::NAN, 1.0)]
    #[case(0.0, f64::INFINITY)]
    #[case(2.0, 1.0)]
    fn invalid_range(#[case] min: f64, #[case] max: f64) {
        assert!(ValueRange::new(min, max).is_err());
    }

    #[rstest]
    #[case(-5.0, 0.0)]
    #[case(10.0, 0.0)]
    #[case(20.0, 1.0)]
    #[case(1e12, 1.0)]
    fn outliers_collapse_to_extremes(#[case] value: f64, #[case] t: f64) {
        let range = ValueRange::new(10.0, 20.0).unwrap();
        assert_eq!(range.normalize(value), t);
    }

    #[test]
    fn normalize_midpoint() {
        let range = ValueRange::new(10.0, 20.0).unwrap();
        assert_relative_eq!(range.normalize(15.0), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_range_is_finite() {
        let range = ValueRange::new(7.0, 7.0).unwrap();
        assert_eq!(range.normalize(7.0), 0.0);
        assert_eq!(range.normalize(100.0), 0.0);
    }

    #[test]
    fn policies_differ_with_outlier() {
        let observations = [10.0, 20.0, 30.0, 40.0, 100.0];
        let clipped = ClipPolicy::default()
            .estimate(observations.into_iter())
            .unwrap();
        let plain = ClipPolicy::MinMax.estimate(observations.into_iter()).unwrap();

        assert_eq!(plain, ValueRange::new(10.0, 100.0).unwrap());
        assert_relative_eq!(clipped.min(), 12.0, epsilon = 1e-9);
        assert_relative_eq!(clipped.max(), 88.0, epsilon = 1e-9);
        assert_ne!(clipped, plain);
    }

    #[test]
    fn inverted_range_does_not_deserialize() {
        assert!(serde_json::from_str::<ValueRange>(r#"{"min":10.0,"max":1.0}"#).is_err());

        let range: ValueRange = serde_json::from_str(r#"{"min":1.0,"max":10.0}"#).unwrap();
        assert_eq!(range, ValueRange::new(1.0, 10.0).unwrap());
        assert_eq!(range.normalize(100.0), 1.0);
    }

    #[test]
    fn policy_display() {
        assert_eq!(ClipPolicy::default().to_string(), "quantile 5%-95%");
        assert_eq!(ClipPolicy::MinMax.to_string(), "min-max");
    }

    #[test]
    fn policy_from_json() {
        let policy: ClipPolicy =
            serde_json::from_str(r#"{"kind":"quantile","low":0.1,"high":0.9}"#).unwrap();
        assert_eq!(policy, ClipPolicy::Quantile { low: 0.1, high: 0.9 });

        let policy: ClipPolicy = serde_json::from_str(r#"{"kind":"min_max"}"#).unwrap();
        assert_eq!(policy, ClipPolicy::MinMax);
    }

    quickcheck! {
        fn normalize_is_monotonic(a: i32, b: i32, lo: i16, span: u16) -> bool {
            let min = lo as f64;
            let max = min + span as f64 + 1.0;
            let range = ValueRange::new(min, max).unwrap();
            let (a, b) = (a.min(b) as f64, a.max(b) as f64);
            range.normalize(a) <= range.normalize(b)
        }

        fn normalize_stays_in_unit_interval(value: i64, lo: i16, span: u16) -> bool {
            let min = lo as f64;
            let range = ValueRange::new(min, min + span as f64).unwrap();
            (0.0..=1.0).contains(&range.normalize(value as f64))
        }
    }
}
