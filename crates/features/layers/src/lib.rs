//! Protocol mappers.
//!
//! Catalog entries come in one raw shape per upstream protocol. [`map_layer`] turns any of
//! them into a [`NormalizedLayer`]: the `{type, options}` document the map client reads,
//! with proxied URLs, synthesized legends and version-dependent request parameters filled in
//! from the map's own properties ([`MapContext`]).
//!
//! Every mapper is a pure function of its input.

mod arcgis;
mod common;
mod context;
mod data;
mod error;
mod legend;
mod normalized;
mod vector;
mod wms;
mod wmts;

pub use arcgis::{ArcGisOptions, ArcGisParams, RawArcGis, map_arcgis};
pub use common::InfoFields;
pub use context::MapContext;
pub use data::{DataOptions, RawData, map_data};
pub use error::{LayerError, LayerErrorExt};
pub use legend::{DEFAULT_LEGEND_DESCRIPTION, LegendEntry, LegendRef, with_scheme};
pub use normalized::{NormalizedLayer, ProjectionRef, map_layer};
pub use vector::{RawVector, VectorOptions, WfsParams, map_vector, output_format};
pub use wms::{LayerInfo, RawWms, WmsOptions, WmsParams, WmsSearch, map_wms};
pub use wmts::{RawWmts, WmtsOptions, map_wmts};
