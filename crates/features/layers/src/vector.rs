use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{InfoFields, lenient_string};
use crate::context::non_empty;
use crate::legend::{DEFAULT_LEGEND_DESCRIPTION, LegendEntry};

const DEFAULT_WFS_VERSION: &str = "1.1.0";

/// A `vectorlayers` (or legacy `wfslayers`) catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawVector {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub url: String,
    pub caption: Option<String>,
    pub layer_type: Option<Value>,
    pub visible_at_start: Option<bool>,
    pub queryable: Option<bool>,
    pub opacity: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub attribution: Option<Value>,
    pub content: Option<Value>,
    pub data_format: Option<String>,
    pub version: Option<String>,
    pub layer: Option<Value>,
    pub projection: Option<Value>,
    pub filterable: Option<Value>,
    pub filter_attribute: Option<Value>,
    pub filter_comparer: Option<Value>,
    pub filter_value: Option<Value>,
    pub legend: Option<String>,
    pub legend_icon: Option<Value>,
    pub infobox: Option<Value>,
    pub info_click_sort_type: Option<Value>,
    pub info_click_sort_desc: Option<Value>,
    pub info_click_sort_property: Option<Value>,
    pub sld_style: Option<Value>,
    pub sld_text: Option<Value>,
    pub sld_url: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

/// Normalized vector options. SLD styling is handed to the client untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorOptions {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queryable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filterable: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_attribute: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_comparer: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_value: Option<Value>,
    /// The legend image doubles as the point icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub legend: Vec<LegendEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_icon: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_desc: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_property: Option<Value>,
    pub params: WfsParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sld_style: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sld_text: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sld_url: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

/// WFS `GetFeature` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WfsParams {
    pub service: String,
    pub request: String,
    pub version: String,
    pub output_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typename: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srsname: Option<Value>,
    pub bbox: String,
}

/// `GeoJSON` always asks for JSON; anything else picks the GML flavour of the WFS version.
#[must_use]
pub fn output_format(data_format: Option<&str>, version: &str) -> &'static str {
    match (data_format, version) {
        (Some("GeoJSON"), _) => "application/json",
        (_, "1.0.0") => "GML2",
        _ => "GML3",
    }
}

#[must_use]
pub fn map_vector(raw: RawVector) -> VectorOptions {
    let version = non_empty(raw.version.as_deref()).unwrap_or(DEFAULT_WFS_VERSION).to_owned();
    let legend = non_empty(raw.legend.as_deref())
        .map(|url| {
            let description = raw.caption.as_deref().unwrap_or(DEFAULT_LEGEND_DESCRIPTION);
            vec![LegendEntry::new(url, description)]
        })
        .unwrap_or_default();

    let params = WfsParams {
        service: "WFS".to_owned(),
        request: "GetFeature".to_owned(),
        output_format: output_format(raw.data_format.as_deref(), &version).to_owned(),
        version,
        typename: raw.layer,
        srsname: raw.projection.clone(),
        bbox: String::new(),
    };

    VectorOptions {
        name: raw.id.clone(),
        id: raw.id,
        url: raw.url,
        layer_type: raw.layer_type,
        caption: raw.caption,
        visible: raw.visible_at_start,
        queryable: raw.queryable,
        opacity: raw.opacity,
        max_zoom: raw.max_zoom,
        min_zoom: raw.min_zoom,
        attribution: raw.attribution,
        content: raw.content,
        data_format: raw.data_format,
        filterable: raw.filterable,
        filter_attribute: raw.filter_attribute,
        filter_comparer: raw.filter_comparer,
        filter_value: raw.filter_value,
        icon: raw.legend,
        legend,
        legend_icon: raw.legend_icon,
        information: raw.infobox,
        info_click_sort_type: raw.info_click_sort_type,
        info_click_sort_desc: raw.info_click_sort_desc,
        info_click_sort_property: raw.info_click_sort_property,
        params,
        projection: raw.projection,
        sld_style: raw.sld_style,
        sld_text: raw.sld_text,
        sld_url: raw.sld_url,
        info: raw.info.normalized(),
    }
}
