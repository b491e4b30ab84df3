//! Choropleth styling for per-area unit price datasets.
//!
//! Estimate a display range from a feature collection's metric values, map
//! each value onto a fixed color gradient and describe the result (styled
//! GeoJSON, legend, popups, status line) for a web map to draw.
//!
//! ```no_run
//! use pricemap::prelude::*;
//!
//! let mut session = Session::new(DirSource::new("docs"), RenderConfig::default());
//! let rendered = session.render()?;
//! println!("{}", rendered.status);
//! # Ok::<(), pricemap::error::Error>(())
//! ```

pub mod color;
pub mod config;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod geo;
pub mod iter;
pub mod legend;
pub mod meta;
pub mod period;
pub mod popup;
pub mod range;
pub mod session;
pub mod source;
pub mod style;
pub mod utils;

pub mod prelude {
    pub use crate::color::{ColorMap, ColorScale, Gradient, Rgb, color_for, normalize};
    pub use crate::config::{Labels, RenderConfig};
    pub use crate::dataset::{Dataset, MetricFields};
    pub use crate::geo::{Bounds, FeatureCollection};
    pub use crate::iter::ObservationIterator;
    pub use crate::legend::{Legend, Verbosity};
    pub use crate::meta::{Metadata, StatusLine, UpdateStatus};
    pub use crate::period::Quarter;
    pub use crate::range::{
        ClipPolicy, MinMax, QuantileClip, RangeEstimator, ValueRange, quantile_sorted,
    };
    #[cfg(feature = "http")]
    pub use crate::source::HttpSource;
    pub use crate::source::{DirSource, JsonSource};
    pub use crate::session::{RenderedMap, Session, Viewport};
    pub use crate::style::{FeatureStyle, LayerStyle, Styler};
}
