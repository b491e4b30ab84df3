use crate::geo::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Names the feature properties that carry the metric and the sample count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricFields {
    /// Property holding the value to color by, e.g. a median unit price.
    pub value: String,
    /// Property holding how many samples the value aggregates.
    pub count: String,
    /// Also accept numeric strings such as `"12,345円"` as metric values.
    pub lenient: bool,
}

impl Default for MetricFields {
    fn default() -> Self {
        Self {
            value: "p_med_tsubo".into(),
            count: "p_count".into(),
            lenient: false,
        }
    }
}

/// Extracts a number from a string that may carry separators or units.
///
/// Everything except digits, `.` and `-` is dropped before parsing, so
/// `"12,345円"` gives `12345.0`. Non-finite results are rejected.
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let digits: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            match digits.as_str() {
                "" | "-" | "." => return None,
                digits => digits.parse::<f64>().ok()?,
            }
        }
        _ => return None,
    };

    number.is_finite().then_some(number)
}

/// A feature collection viewed through its [`MetricFields`].
#[derive(Clone, Debug)]
pub struct Dataset {
    collection: FeatureCollection,
    fields: MetricFields,
}

impl Dataset {
    pub fn new(collection: FeatureCollection, fields: MetricFields) -> Self {
        Self { collection, fields }
    }

    pub fn fields(&self) -> &MetricFields {
        &self.fields
    }

    pub fn collection(&self) -> &FeatureCollection {
        &self.collection
    }

    pub fn into_collection(self) -> FeatureCollection {
        self.collection
    }

    pub fn feature_count(&self) -> usize {
        self.collection.features.len()
    }

    /// Returns the metric value of `feature`, or `None` if it is missing,
    /// non-numeric or not finite.
    pub fn value_of(&self, feature: &Feature) -> Option<f64> {
        value_of(feature, &self.fields)
    }

    /// Returns the sample count of `feature`, rounded to a whole number.
    ///
    /// Counts follow the same strictness as values; anything unusable counts
    /// as zero.
    pub fn count_of(&self, feature: &Feature) -> u64 {
        feature
            .property(&self.fields.count)
            .and_then(|count| number(count, self.fields.lenient))
            .filter(|count| *count > 0.)
            .map(|count| count.round() as u64)
            .unwrap_or(0)
    }

    /// Total number of samples behind all features.
    pub fn point_count(&self) -> u64 {
        self.collection
            .features
            .iter()
            .map(|feature| self.count_of(feature))
            .sum()
    }

    /// The finite metric values of every feature, in collection order.
    pub fn observations(&self) -> impl Iterator<Item = f64> + '_ {
        self.collection
            .features
            .iter()
            .filter_map(|feature| self.value_of(feature))
    }
}

pub(crate) fn value_of(feature: &Feature, fields: &MetricFields) -> Option<f64> {
    number(feature.property(&fields.value)?, fields.lenient)
}

fn number(value: &Value, lenient: bool) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(_) if lenient => coerce_number(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn dataset(lenient: bool) -> Dataset {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [
                { "type": "Feature", "geometry": null, "properties": { "p_med_tsubo": 120.0, "p_count": 3 } },
                { "type": "Feature", "geometry": null, "properties": { "p_med_tsubo": "1,500円", "p_count": "2" } },
                { "type": "Feature", "geometry": null, "properties": { "p_count": null } },
                { "type": "Feature", "geometry": null, "properties": null },
                { "type": "Feature", "geometry": null, "properties": { "p_med_tsubo": 80, "p_count": 5 } }
            ]
        }))
        .unwrap();

        Dataset::new(
            collection,
            MetricFields {
                lenient,
                ..Default::default()
            },
        )
    }

    #[rstest]
    #[case(json!(12.5), Some(12.5))]
    #[case(json!("12,345円"), Some(12345.0))]
    #[case(json!(" -7.5 "), Some(-7.5))]
    #[case(json!("123万円"), Some(123.0))]
    #[case(json!("-"), None)]
    #[case(json!("n/a"), None)]
    #[case(json!(null), None)]
    #[case(json!(true), None)]
    fn coerce(#[case] value: Value, #[case] expected: Option<f64>) {
        assert_eq!(coerce_number(&value), expected);
    }

    #[test]
    fn strict_observations() {
        let dataset = dataset(false);
        assert_eq!(dataset.observations().collect::<Vec<_>>(), vec![120.0, 80.0]);
    }

    #[test]
    fn lenient_observations() {
        let dataset = dataset(true);
        assert_eq!(
            dataset.observations().collect::<Vec<_>>(),
            vec![120.0, 1500.0, 80.0]
        );
    }

    #[rstest]
    #[case(false, 8)]
    #[case(true, 10)]
    fn counts(#[case] lenient: bool, #[case] points: u64) {
        let dataset = dataset(lenient);
        assert_eq!(dataset.feature_count(), 5);
        assert_eq!(dataset.point_count(), points);
    }

    #[rstest]
    #[case(json!(2.6), 3)]
    #[case(json!(2.4), 2)]
    #[case(json!(-4), 0)]
    #[case(json!("7"), 0)]
    fn strict_count_of(#[case] count: Value, #[case] expected: u64) {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "p_count": count }
        }))
        .unwrap();
        assert_eq!(dataset(false).count_of(&feature), expected);
    }
}
