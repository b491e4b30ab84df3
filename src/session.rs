use crate::{
    color::ColorScale,
    config::{BaseMap, RenderConfig},
    dataset::Dataset,
    error::Error,
    geo::{Bounds, FeatureCollection},
    iter::ObservationIterator,
    legend::Legend,
    meta::{Metadata, StatusLine},
    popup::popup_html,
    source::JsonSource,
    style::Styler,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

/// Where the map should look once the layer is added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Viewport {
    /// Fit to the bounds of the styled features.
    Fit(Bounds),
    /// Keep the configured starting view; the layer had no usable geometry.
    Initial { center: (f64, f64), zoom: u8 },
}

/// Everything a mapping front-end needs to draw the thematic layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderedMap {
    pub status: String,
    pub legend: Legend,
    pub view: Viewport,
    /// Tile layer drawn underneath.
    pub base_map: BaseMap,
    /// The input collection with style and popup properties attached.
    pub layer: FeatureCollection,
}

/// One load-and-render pass over a data source.
///
/// Metadata is optional: if it cannot be loaded the status line says so and
/// rendering goes on. The feature collection is required.
pub struct Session<S> {
    source: S,
    config: RenderConfig,
    status: StatusLine,
}

impl<S: JsonSource> Session<S> {
    pub fn new(source: S, config: RenderConfig) -> Self {
        Self {
            source,
            config,
            status: StatusLine::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Renders the current status line.
    pub fn status_text(&self) -> String {
        self.status.render(&self.config.labels)
    }

    /// Loads metadata into the status line.
    ///
    /// Never fails; a missing or malformed `meta.json` only changes the
    /// status text.
    pub fn load_metadata(&mut self) {
        match self.source.load(&self.config.meta_path) {
            Ok(value @ Value::Object(_)) => {
                self.status.set_metadata(&Metadata::from_json(&value));
            }
            Ok(_) => {
                warn!(path = %self.config.meta_path, "metadata is not a json object");
                self.status.set_fetch_failed();
            }
            Err(err) => {
                warn!(path = %self.config.meta_path, %err, "failed to load metadata");
                self.status.set_fetch_failed();
            }
        }
    }

    /// Loads the feature collection and records its counts in the status line.
    pub fn load_dataset(&mut self) -> Result<Dataset, Error> {
        let value = self.source.load(&self.config.features_path)?;
        let collection: FeatureCollection = serde_json::from_value(value)?;
        let dataset = Dataset::new(collection, self.config.fields.clone());

        self.status
            .set_counts(dataset.point_count(), dataset.feature_count());
        info!(
            features = dataset.feature_count(),
            points = dataset.point_count(),
            "loaded feature collection"
        );

        Ok(dataset)
    }

    /// Runs the full load sequence and styles every feature.
    ///
    /// Fails if the feature collection cannot be loaded or holds no usable
    /// metric values. The status line stays readable either way.
    pub fn render(&mut self) -> Result<RenderedMap, Error> {
        self.load_metadata();
        let dataset = self.load_dataset()?;

        let policy = self.config.policy;
        let range = dataset.observations().estimate_range(&policy)?;
        info!(%policy, %range, "estimated display range");

        let scale = ColorScale::new(range).with_no_data(self.config.no_data);
        let legend = Legend::new(&scale, policy, self.config.verbosity, &self.config.labels);

        let fields = dataset.fields().clone();
        let labels = &self.config.labels;
        let popups: Vec<String> = dataset
            .collection()
            .features
            .par_iter()
            .map(|feature| popup_html(dataset.value_of(feature), dataset.count_of(feature), labels))
            .collect();

        let mut layer = dataset.into_collection();
        Styler::new(scale, self.config.layer.clone()).par_apply(&mut layer, &fields);
        layer
            .features
            .par_iter_mut()
            .zip(popups)
            .for_each(|(feature, popup)| {
                feature.properties_mut().insert("popup".into(), Value::String(popup));
            });

        let bounds = layer.bounds();
        let view = match bounds.is_valid() {
            true => Viewport::Fit(bounds),
            false => {
                warn!("layer has no valid bounds, keeping initial view");
                Viewport::Initial {
                    center: self.config.base_map.center,
                    zoom: self.config.base_map.zoom,
                }
            }
        };

        Ok(RenderedMap {
            status: self.status_text(),
            legend,
            view,
            base_map: self.config.base_map.clone(),
            layer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::UpdateStatus;
    use serde_json::json;
    use std::collections::HashMap;

    /// Serves canned documents; anything else is a 404.
    struct MemorySource {
        docs: HashMap<&'static str, Value>,
    }

    impl JsonSource for MemorySource {
        fn load(&self, path: &str) -> Result<Value, Error> {
            self.docs.get(path).cloned().ok_or(Error::Fetch {
                path: path.to_string(),
                status: 404,
            })
        }
    }

    fn features(values: &[Value]) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": values.iter().enumerate().map(|(i, v)| json!({
                "type": "Feature",
                "properties": { "p_med_tsubo": v, "p_count": 2 },
                "geometry": { "type": "Point", "coordinates": [139.7 + i as f64 * 0.01, 35.6] }
            })).collect::<Vec<_>>()
        })
    }

    fn session(docs: Vec<(&'static str, Value)>) -> Session<MemorySource> {
        Session::new(
            MemorySource {
                docs: docs.into_iter().collect(),
            },
            RenderConfig::default(),
        )
    }

    #[test]
    fn metadata_failure_is_not_fatal() {
        let mut session = session(vec![(
            "data/latest.geojson",
            features(&[json!(10), json!(20), json!(30)]),
        )]);

        let rendered = session.render().unwrap();
        assert_eq!(session.status().updated, UpdateStatus::FetchFailed);
        assert!(rendered.status.starts_with("最終更新: 不明（meta取得失敗）"));
        assert_eq!(rendered.layer.features.len(), 3);
    }

    #[test]
    fn feature_failure_is_fatal() {
        let mut session = session(vec![("data/meta.json", json!({"updated_at": "2025-01-01"}))]);

        match session.render() {
            Err(Error::Fetch { path, status }) => {
                assert_eq!(path, "data/latest.geojson");
                assert_eq!(status, 404);
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
        assert_eq!(session.status_text(), "最終更新: 2025-01-01");
    }

    #[test]
    fn no_numeric_values_is_no_data() {
        let mut session = session(vec![(
            "data/latest.geojson",
            features(&[json!("n/a"), json!(null)]),
        )]);

        assert!(matches!(session.render(), Err(Error::NoData)));
        assert_eq!(session.status().features, Some(2));
    }

    #[test]
    fn non_numeric_feature_still_renders() {
        let mut session = session(vec![
            ("data/meta.json", json!({"date": "2024-12-31"})),
            (
                "data/latest.geojson",
                features(&[json!(10), json!("n/a"), json!(30)]),
            ),
        ]);

        let rendered = session.render().unwrap();
        let fills: Vec<&Value> = rendered
            .layer
            .features
            .iter()
            .map(|feature| feature.property("fill").unwrap())
            .collect();
        assert_eq!(fills, vec!["rgb(0,80,255)", "rgb(204,204,204)", "rgb(255,0,0)"]);
        assert!(matches!(rendered.view, Viewport::Fit(_)));
        assert_eq!(
            rendered.status,
            "最終更新: 2024-12-31 / 取引点数: 6 / 六角形: 3"
        );

        let popup = rendered.layer.features[1].property("popup").unwrap();
        assert!(popup.as_str().unwrap().contains("データなし"));
    }

    #[test]
    fn no_geometry_keeps_initial_view() {
        let mut session = session(vec![(
            "data/latest.geojson",
            json!({
                "type": "FeatureCollection",
                "features": [
                    { "type": "Feature", "geometry": null, "properties": { "p_med_tsubo": 10, "p_count": 1 } },
                    { "type": "Feature", "geometry": null, "properties": { "p_med_tsubo": 20, "p_count": 1 } }
                ]
            }),
        )]);

        let rendered = session.render().unwrap();
        assert_eq!(
            rendered.view,
            Viewport::Initial {
                center: (35.68, 139.76),
                zoom: 11
            }
        );
    }

    #[test]
    fn base_map_is_described() {
        let mut session = session(vec![(
            "data/latest.geojson",
            features(&[json!(10), json!(20)]),
        )]);

        let rendered = session.render().unwrap();
        assert_eq!(rendered.base_map, BaseMap::default());

        let json = serde_json::to_value(&rendered).unwrap();
        assert_eq!(
            json["base_map"]["tile_url"],
            "https://cyberjapandata.gsi.go.jp/xyz/pale/{z}/{x}/{y}.png"
        );
        assert_eq!(json["base_map"]["max_zoom"], 18);
        assert_eq!(json["base_map"]["attribution"], "地理院タイル");
    }
}
