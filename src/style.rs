use crate::{
    color::{ColorMap, ColorScale, Gradient},
    dataset::{MetricFields, value_of},
    geo::FeatureCollection,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Fixed stroke and opacity settings shared by every feature of a layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerStyle {
    /// CSS color of the polygon outline.
    pub stroke: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
    pub line_join: String,
}

impl Default for LayerStyle {
    fn default() -> Self {
        Self {
            stroke: "rgba(255,255,255,0.9)".into(),
            weight: 1.3,
            opacity: 0.95,
            fill_opacity: 0.75,
            line_join: "round".into(),
        }
    }
}

/// Path options for a single feature, named the way web mapping libraries
/// expect them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    pub line_join: String,
}

/// Per-feature style callback.
pub struct Styler<C = Gradient> {
    scale: ColorScale<C>,
    layer: LayerStyle,
}

impl<C: ColorMap> Styler<C> {
    pub fn new(scale: ColorScale<C>, layer: LayerStyle) -> Self {
        Self { scale, layer }
    }

    pub fn scale(&self) -> &ColorScale<C> {
        &self.scale
    }

    /// Styles a feature from its raw metric value.
    pub fn style(&self, value: Option<f64>) -> FeatureStyle {
        FeatureStyle {
            color: self.layer.stroke.clone(),
            weight: self.layer.weight,
            opacity: self.layer.opacity,
            fill_color: self.scale.color_of(value).to_string(),
            fill_opacity: self.layer.fill_opacity,
            line_join: self.layer.line_join.clone(),
        }
    }
}

impl<C: ColorMap + Sync> Styler<C> {
    /// Writes simplestyle properties (`fill`, `fill-opacity`, `stroke`,
    /// `stroke-width`, `stroke-opacity`) onto every feature of `collection`.
    pub fn par_apply(&self, collection: &mut FeatureCollection, fields: &MetricFields) {
        collection.features.par_iter_mut().for_each(|feature| {
            let style = self.style(value_of(feature, fields));
            let properties = feature.properties_mut();
            properties.insert("fill".into(), json!(style.fill_color));
            properties.insert("fill-opacity".into(), json!(style.fill_opacity));
            properties.insert("stroke".into(), json!(style.color));
            properties.insert("stroke-width".into(), json!(style.weight));
            properties.insert("stroke-opacity".into(), json!(style.opacity));
        });
    }
}
