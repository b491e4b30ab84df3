use crate::range::ValueRange;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("expected color as rgb(r,g,b) or #rrggbb but got: {input:?}")]
pub struct ParseColorError {
    input: String,
}

/// An opaque 8-bit sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError {
            input: s.to_string(),
        };
        let s = s.trim();

        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(err());
            }
            let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
            return Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let inner = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(err)?;
        let channels: Vec<u8> = inner
            .split(',')
            .map(|part| part.trim().parse::<u8>().map_err(|_| err()))
            .collect::<Result<_, _>>()?;

        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> Self {
        color.to_string()
    }
}

/// Maps a normalized value `t` to a color.
///
/// Implementations must be pure: the same `t` always yields the same color,
/// which keeps legend swatches and feature fills consistent.
pub trait ColorMap {
    fn color(&self, t: f64) -> Rgb;
}

/// A linear gradient between two endpoint colors.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    start: Rgb,
    end: Rgb,
}

impl Gradient {
    pub const fn new(start: Rgb, end: Rgb) -> Self {
        Self { start, end }
    }
}

impl Default for Gradient {
    /// Blue at `t = 0` to red at `t = 1`.
    fn default() -> Self {
        Self::new(Rgb::new(0, 80, 255), Rgb::new(255, 0, 0))
    }
}

impl ColorMap for Gradient {
    fn color(&self, t: f64) -> Rgb {
        // NaN falls to the start color.
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let lerp = |a: u8, b: u8| (a as f64 * (1. - t) + b as f64 * t).round() as u8;

        Rgb::new(
            lerp(self.start.r, self.end.r),
            lerp(self.start.g, self.end.g),
            lerp(self.start.b, self.end.b),
        )
    }
}

/// Returns the color of the default [`Gradient`] at `t`.
///
/// ```text
/// R = 255 * t
/// G =  80 * (1 - t)
/// B = 255 * (1 - t)
/// ```
pub fn color_for(t: f64) -> Rgb {
    Gradient::default().color(t)
}

/// Clamps `value` into `[min, max]` and maps it onto `[0, 1]`.
///
/// Returns `None` if the bounds do not form a valid range.
pub fn normalize(value: f64, min: f64, max: f64) -> Option<f64> {
    ValueRange::new(min, max)
        .ok()
        .map(|range| range.normalize(value))
}

/// A display range paired with a [`ColorMap`].
///
/// Values that are missing or not finite get the `no_data` color instead of
/// inheriting whatever the clamp would make of them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale<C = Gradient> {
    range: ValueRange,
    map: C,
    no_data: Rgb,
}

/// Fill used for features without a usable metric value.
pub const NO_DATA: Rgb = Rgb::new(204, 204, 204);

impl ColorScale<Gradient> {
    pub fn new(range: ValueRange) -> Self {
        Self::with_map(range, Gradient::default())
    }
}

impl<C: ColorMap> ColorScale<C> {
    pub fn with_map(range: ValueRange, map: C) -> Self {
        Self {
            range,
            map,
            no_data: NO_DATA,
        }
    }

    pub fn with_no_data(mut self, color: Rgb) -> Self {
        self.no_data = color;
        self
    }

    pub fn range(&self) -> &ValueRange {
        &self.range
    }

    pub fn no_data(&self) -> Rgb {
        self.no_data
    }

    /// Color at a normalized position, as used by legend swatches.
    pub fn at(&self, t: f64) -> Rgb {
        self.map.color(t)
    }

    /// Color of a raw metric value, as used by feature fills.
    pub fn color_of(&self, value: Option<f64>) -> Rgb {
        match value {
            Some(v) if v.is_finite() => self.at(self.range.normalize(v)),
            _ => self.no_data,
        }
    }
}
