use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::lenient_string;
use crate::context::MapContext;

/// A `datalayers` catalog entry: a plain data source with no rendering parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawData {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub url: String,
    pub caption: Option<String>,
    pub layer_type: Option<Value>,
    pub visible_at_start: Option<bool>,
    pub queryable: Option<bool>,
    pub extent: Option<Value>,
    pub projection: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataOptions {
    pub id: String,
    pub url: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    pub opacity: f64,
    pub queryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection: Option<Value>,
}

#[must_use]
pub fn map_data(raw: RawData, ctx: &MapContext<'_>) -> DataOptions {
    DataOptions {
        url: ctx.proxied(&raw.url),
        name: raw.id.clone(),
        id: raw.id,
        layer_type: raw.layer_type,
        caption: raw.caption,
        visible: raw.visible_at_start,
        opacity: 1.0,
        queryable: raw.queryable != Some(false),
        extent: raw.extent,
        projection: raw.projection,
    }
}
