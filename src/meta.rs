use crate::{config::Labels, period::Quarter, utils::group_thousands};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Keys that may carry the dataset's update time, in order of preference.
pub const UPDATED_KEYS: [&str; 4] = ["updated_at", "updated", "date", "generated_at"];

/// The parts of `meta.json` the status line uses.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub updated: Option<String>,
    pub range_from: Option<String>,
    pub range_to: Option<String>,
}

impl Metadata {
    /// Reads metadata from a parsed `meta.json`.
    ///
    /// The update time comes from the first of [`UPDATED_KEYS`] that holds a
    /// non-empty string or a number.
    pub fn from_json(value: &Value) -> Self {
        let text = |key: &str| match value.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };

        Self {
            updated: UPDATED_KEYS.iter().find_map(|&key| text(key)),
            range_from: text("range_from"),
            range_to: text("range_to"),
        }
    }

    /// Formats `range_from`〜`range_to` when both are present.
    ///
    /// Quarter codes such as `20241` are shown as `2024Q1`; anything else is
    /// shown as is.
    pub fn period(&self) -> Option<String> {
        let show = |code: &String| match code.parse::<Quarter>() {
            Ok(quarter) => quarter.to_string(),
            Err(_) => {
                warn!(%code, "range bound is not a quarter code");
                code.clone()
            }
        };

        match (&self.range_from, &self.range_to) {
            (Some(from), Some(to)) => Some(format!("{}〜{}", show(from), show(to))),
            _ => None,
        }
    }
}

/// What the status line knows about the update time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Metadata has not been loaded yet.
    #[default]
    Loading,
    Known(String),
    /// Metadata loaded but carried no usable timestamp.
    Unknown,
    /// Metadata could not be fetched or parsed.
    FetchFailed,
}

/// Display state for the status line.
///
/// Starts empty and is filled in by the load sequence: the update time once
/// metadata resolves, the counts once the feature collection is in.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusLine {
    pub updated: UpdateStatus,
    pub period: Option<String>,
    pub points: Option<u64>,
    pub features: Option<usize>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_metadata(&mut self, metadata: &Metadata) {
        self.updated = match &metadata.updated {
            Some(updated) => UpdateStatus::Known(updated.clone()),
            None => UpdateStatus::Unknown,
        };
        self.period = metadata.period();
    }

    pub fn set_fetch_failed(&mut self) {
        self.updated = UpdateStatus::FetchFailed;
        self.period = None;
    }

    pub fn set_counts(&mut self, points: u64, features: usize) {
        self.points = Some(points);
        self.features = Some(features);
    }

    /// Renders the status line, e.g.
    /// `最終更新: 2025-01-02 03:04:05 / 取引点数: 1,234 / 六角形: 56`.
    pub fn render(&self, labels: &Labels) -> String {
        let updated = match &self.updated {
            UpdateStatus::Loading => labels.loading.as_str(),
            UpdateStatus::Known(updated) => updated.as_str(),
            UpdateStatus::Unknown => labels.unknown.as_str(),
            UpdateStatus::FetchFailed => labels.fetch_failed.as_str(),
        };

        let mut parts = vec![format!("{}: {}", labels.updated, updated)];
        if let Some(period) = &self.period {
            parts.push(format!("{}: {}", labels.period, period));
        }
        if let Some(points) = self.points {
            parts.push(format!("{}: {}", labels.points, group_thousands(points as f64)));
        }
        if let Some(features) = self.features {
            parts.push(format!(
                "{}: {}",
                labels.features,
                group_thousands(features as f64)
            ));
        }

        parts.join(" / ")
    }
}
