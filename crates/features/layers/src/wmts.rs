use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{InfoFields, ZoomRange, lenient_string, opacity_or_opaque};
use crate::context::MapContext;
use crate::legend::{DEFAULT_LEGEND_DESCRIPTION, LegendEntry, entries_from};

const TILE_FORMAT: &str = "image/png";

/// A `wmtslayers` catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWmts {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub url: String,
    pub caption: Option<String>,
    pub layer_type: Option<Value>,
    pub visible_at_start: Option<bool>,
    pub opacity: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub layer: Option<Value>,
    pub matrix_set: Option<Value>,
    pub style: Option<Value>,
    pub projection: Option<Value>,
    pub origin: Option<Value>,
    pub resolutions: Option<Value>,
    pub matrix_ids: Option<Value>,
    pub attribution: Option<Value>,
    pub legend: Option<Value>,
    pub legend_icon: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

/// Normalized WMTS options. Tiling parameters are passed through as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmtsOptions {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Vec<f64>>,
    pub queryable: bool,
    pub opacity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    pub format: String,
    pub cross_origin: String,
    pub wrap_x: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_set: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix_ids: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Value>,
    pub legend: Vec<LegendEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_icon: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

#[must_use]
pub fn map_wmts(raw: RawWmts, ctx: &MapContext<'_>) -> WmtsOptions {
    let zoom = ZoomRange::new(raw.min_zoom, raw.max_zoom);

    WmtsOptions {
        name: raw.id.clone(),
        id: raw.id,
        layer_type: raw.layer_type,
        caption: raw.caption,
        visible: raw.visible_at_start != Some(false),
        extent: ctx.map.extent.clone(),
        queryable: false,
        opacity: opacity_or_opaque(raw.opacity),
        max_zoom: zoom.max,
        min_zoom: zoom.min,
        format: TILE_FORMAT.to_owned(),
        cross_origin: ctx.cross_origin(),
        wrap_x: false,
        url: raw.url,
        layer: raw.layer,
        matrix_set: raw.matrix_set,
        style: raw.style,
        projection: raw.projection,
        origin: raw.origin,
        resolutions: raw.resolutions,
        matrix_ids: raw.matrix_ids,
        attribution: raw.attribution,
        legend: entries_from(raw.legend.as_ref(), DEFAULT_LEGEND_DESCRIPTION),
        legend_icon: raw.legend_icon,
        info: raw.info.normalized(),
    }
}
