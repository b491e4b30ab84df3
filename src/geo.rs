//! Minimal GeoJSON model.
//!
//! Only what styling needs is typed: properties stay as raw JSON so the
//! collection can be written back out with every member it came in with.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A position as `[longitude, latitude]` with an optional altitude.
pub type Position = Vec<f64>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

impl Geometry {
    /// Calls `f` with every position in the geometry.
    pub fn for_each_position<F: FnMut(&[f64])>(&self, f: &mut F) {
        match self {
            Geometry::Point { coordinates } => f(coordinates.as_slice()),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().for_each(|p| f(p.as_slice()))
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().for_each(|p| f(p.as_slice()))
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().for_each(|p| f(p.as_slice()))
            }
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().for_each(|g| g.for_each_position(f))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum FeatureType {
    #[default]
    Feature,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum FeatureCollectionType {
    #[default]
    FeatureCollection,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default)]
    pub kind: FeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref()?.get(key)
    }

    pub fn properties_mut(&mut self) -> &mut Map<String, Value> {
        self.properties.get_or_insert_with(Map::new)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default)]
    pub kind: FeatureCollectionType,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(flatten)]
    pub foreign_members: Map<String, Value>,
}

impl FeatureCollection {
    pub fn bounds(&self) -> Bounds {
        let mut bounds = Bounds::empty();
        self.features
            .iter()
            .filter_map(|feature| feature.geometry.as_ref())
            .for_each(|geometry| geometry.for_each_position(&mut |p: &[f64]| bounds.extend(p)));
        bounds
    }
}

/// Geographic bounding box in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    /// Bounds that contain nothing. Not valid until extended.
    pub fn empty() -> Self {
        Self {
            south: f64::INFINITY,
            west: f64::INFINITY,
            north: f64::NEG_INFINITY,
            east: f64::NEG_INFINITY,
        }
    }

    /// Grows the bounds to include `position`.
    ///
    /// Positions with fewer than two coordinates or non-finite coordinates are
    /// ignored.
    pub fn extend(&mut self, position: &[f64]) {
        let (lon, lat) = match position {
            [lon, lat, ..] if lon.is_finite() && lat.is_finite() => (*lon, *lat),
            _ => return,
        };

        self.south = self.south.min(lat);
        self.north = self.north.max(lat);
        self.west = self.west.min(lon);
        self.east = self.east.max(lon);
    }

    pub fn is_valid(&self) -> bool {
        self.south.is_finite()
            && self.north.is_finite()
            && self.west.is_finite()
            && self.east.is_finite()
            && self.south <= self.north
            && self.west <= self.east
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.south + self.north) / 2.,
            (self.west + self.east) / 2.,
        )
    }
}
