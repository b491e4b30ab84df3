use crate::{
    color::{NO_DATA, Rgb},
    dataset::MetricFields,
    error::Error,
    legend::Verbosity,
    range::ClipPolicy,
    style::LayerStyle,
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// User-facing text. Defaults are Japanese to match the bundled dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Heading of the legend and of every popup.
    pub metric: String,
    pub low: String,
    pub mid: String,
    pub high: String,
    /// Caption before the legend range when outliers are clipped.
    pub clipped_range: String,
    /// Caption before the legend range when they are not.
    pub full_range: String,
    /// Shown under a clipped range; `{low}` and `{high}` become the
    /// percentages folded into each extreme color.
    pub clip_note: String,
    pub count: String,
    pub no_data: String,
    pub updated: String,
    pub period: String,
    pub points: String,
    pub features: String,
    pub loading: String,
    pub unknown: String,
    pub fetch_failed: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            metric: "坪単価（中央値）".into(),
            low: "低".into(),
            mid: "中".into(),
            high: "高".into(),
            clipped_range: "表示範囲（外れ値カット）".into(),
            full_range: "表示範囲".into(),
            clip_note: "※ 下位{low}%・上位{high}%は同じ色に丸めています".into(),
            count: "件数".into(),
            no_data: "データなし".into(),
            updated: "最終更新".into(),
            period: "期間".into(),
            points: "取引点数".into(),
            features: "六角形".into(),
            loading: "読み込み中…".into(),
            unknown: "不明".into(),
            fetch_failed: "不明（meta取得失敗）".into(),
        }
    }
}

/// Where the base map starts before it is fitted to the data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseMap {
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
    pub center: (f64, f64),
    pub zoom: u8,
}

impl Default for BaseMap {
    fn default() -> Self {
        Self {
            tile_url: "https://cyberjapandata.gsi.go.jp/xyz/pale/{z}/{x}/{y}.png".into(),
            attribution: "地理院タイル".into(),
            max_zoom: 18,
            center: (35.68, 139.76),
            zoom: 11,
        }
    }
}

/// Everything a render session needs besides the data itself.
///
/// Every field has a default, so a params file only has to name what it
/// changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub meta_path: String,
    pub features_path: String,
    pub fields: MetricFields,
    pub policy: ClipPolicy,
    pub verbosity: Verbosity,
    pub no_data: Rgb,
    pub layer: LayerStyle,
    pub base_map: BaseMap,
    pub labels: Labels,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            meta_path: "data/meta.json".into(),
            features_path: "data/latest.geojson".into(),
            fields: MetricFields::default(),
            policy: ClipPolicy::default(),
            verbosity: Verbosity::Detailed,
            no_data: NO_DATA,
            layer: LayerStyle::default(),
            base_map: BaseMap::default(),
            labels: Labels::default(),
        }
    }
}

impl RenderConfig {
    /// Reads a params file in JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let serialized = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&serialized)?)
    }
}
