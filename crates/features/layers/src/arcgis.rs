use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{InfoFields, ZoomRange, lenient_string, string_list};
use crate::legend::{DEFAULT_LEGEND_DESCRIPTION, LegendEntry, entries_from};

/// An `arcgislayers` catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawArcGis {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub url: String,
    pub caption: Option<String>,
    pub layer_type: Option<Value>,
    pub visible_at_start: Option<bool>,
    pub queryable: Option<bool>,
    pub single_tile: Option<bool>,
    pub extent: Option<Value>,
    pub infobox: Option<Value>,
    pub projection: Option<Value>,
    pub opacity: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub attribution: Option<Value>,
    #[serde(deserialize_with = "string_list")]
    pub layers: Vec<String>,
    /// Absolute URL, bare host, `#`-joined data URIs, or a list of URLs.
    pub legend: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcGisOptions {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub queryable: bool,
    pub single_tile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Value>,
    pub params: ArcGisParams,
    pub legend: Vec<LegendEntry>,
    #[serde(flatten)]
    pub info: InfoFields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ArcGisParams {
    /// `show:<id,...>`
    pub layers: String,
}

#[must_use]
pub fn map_arcgis(raw: RawArcGis) -> ArcGisOptions {
    let zoom = ZoomRange::new(raw.min_zoom, raw.max_zoom);

    ArcGisOptions {
        name: raw.id.clone(),
        id: raw.id,
        url: raw.url,
        layer_type: raw.layer_type,
        caption: raw.caption,
        visible: raw.visible_at_start,
        queryable: raw.queryable != Some(false),
        single_tile: raw.single_tile != Some(false),
        extent: raw.extent,
        information: raw.infobox,
        projection: raw.projection,
        opacity: raw.opacity,
        max_zoom: zoom.max,
        min_zoom: zoom.min,
        attribution: raw.attribution,
        params: ArcGisParams { layers: format!("show:{}", raw.layers.join(",")) },
        legend: entries_from(raw.legend.as_ref(), DEFAULT_LEGEND_DESCRIPTION),
        info: raw.info.normalized(),
    }
}
