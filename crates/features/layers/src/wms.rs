use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use vista_domain::constants::DEFAULT_PROJECTION;

use crate::common::{
    InfoFields, ZoomRange, has_content, lenient_string, opacity_or_opaque, string_list,
};
use crate::context::{MapContext, non_empty};
use crate::legend::{DEFAULT_LEGEND_DESCRIPTION, LegendEntry, with_scheme};
use crate::normalized::ProjectionRef;

const DEFAULT_VERSION: &str = "1.1.1";
const AXIS_ORIENTED_VERSION: &str = "1.3.0";
const DEFAULT_IMAGE_FORMAT: &str = "image/png";
const DEFAULT_SERVER_TYPE: &str = "geoserver";

/// A `wmslayers` catalog entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWms {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub url: String,
    pub caption: Option<String>,
    pub layer_type: Option<Value>,
    pub visible_at_start: Option<bool>,
    pub opacity: Option<f64>,
    pub min_zoom: Option<f64>,
    pub max_zoom: Option<f64>,
    pub min_max_zoom_alert_on_toggle_only: Option<Value>,
    pub info_click_sort_type: Option<Value>,
    pub info_click_sort_desc: Option<Value>,
    pub info_click_sort_property: Option<Value>,
    pub infobox: Option<Value>,
    pub projection: Option<String>,
    pub single_tile: Option<bool>,
    pub hidpi: Option<Value>,
    pub custom_ratio: Option<Value>,
    pub image_format: Option<String>,
    pub server_type: Option<String>,
    pub attribution: Option<Value>,
    pub search_url: Option<Value>,
    pub search_property_name: Option<Value>,
    pub search_display_name: Option<Value>,
    pub search_short_display_name: Option<Value>,
    pub search_output_format: Option<Value>,
    pub search_geometry_field: Option<Value>,
    /// Explicit legend URL; empty or absent means "ask the server".
    pub legend: Option<String>,
    pub legend_icon: Option<Value>,
    #[serde(deserialize_with = "string_list")]
    pub layers: Vec<String>,
    pub cql_filter: Option<String>,
    pub info_format: Option<Value>,
    pub version: Option<String>,
    pub tiled: Option<Value>,
    pub layers_info: Option<Vec<LayerInfo>>,
    #[serde(deserialize_with = "string_list")]
    pub search_fields: Vec<String>,
    pub display_fields: Option<Value>,
    #[serde(flatten)]
    pub info: InfoFields,
}

/// Per-sublayer settings of a WMS entry (`layersInfo`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infobox: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Normalized WMS options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsOptions {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_zoom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_max_zoom_alert_on_toggle_only: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_desc: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_click_sort_property: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub information: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Vec<f64>>,
    pub projection: ProjectionRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Vec<f64>>,
    pub single_tile: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hidpi: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_ratio: Option<Value>,
    pub image_format: String,
    pub server_type: String,
    pub cross_origin: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribution: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_property_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_display_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_short_display_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_output_format: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_geometry_field: Option<Value>,
    pub legend: Vec<LegendEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_icon: Option<Value>,
    pub params: WmsParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers_info: Option<BTreeMap<String, LayerInfo>>,
    #[serde(flatten)]
    pub info: InfoFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<WmsSearch>,
}

/// GetMap parameters. Exactly one of `SRS` / `CRS` is set, depending on the version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct WmsParams {
    pub layers: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cql_filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_format: Option<Value>,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub srs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiled: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

/// WFS search block derived from a WMS entry with `searchFields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmsSearch {
    pub url: String,
    pub feature_type: String,
    pub property_name: String,
    pub display_name: Value,
    pub srs_name: String,
    pub server_type: String,
}

/// Maps a WMS catalog entry onto the normalized schema.
#[must_use]
pub fn map_wms(raw: RawWms, ctx: &MapContext<'_>) -> WmsOptions {
    let code = ctx.projection(raw.projection.as_deref());
    let version = non_empty(raw.version.as_deref()).unwrap_or(DEFAULT_VERSION).to_owned();
    let axis_oriented = version == AXIS_ORIENTED_VERSION;

    let projection = if axis_oriented {
        ProjectionRef::oriented(code.clone(), ctx.map.extent.clone())
    } else {
        ProjectionRef::Code(code.clone())
    };

    let server_type = match raw.server_type.as_deref() {
        Some("arcgis") => "mapserver".to_owned(),
        other => non_empty(other).unwrap_or(DEFAULT_SERVER_TYPE).to_owned(),
    };

    let legends = LegendUrls::new(&raw, ctx);
    let legend = raw
        .layers
        .iter()
        .map(|layer| LegendEntry::new(legends.url_for(layer), DEFAULT_LEGEND_DESCRIPTION))
        .collect();

    let layers_info = raw.layers_info.as_ref().map(|infos| {
        infos
            .iter()
            .map(|info| {
                let mut info = info.clone();
                if non_empty(info.legend.as_deref()).is_none() {
                    info.legend = Some(legends.url_for(&info.id));
                }
                if has_content(raw.infobox.as_ref()) {
                    info.infobox.clone_from(&raw.infobox);
                }
                (info.id.clone(), info)
            })
            .collect()
    });

    let search = search_block(&raw, ctx, &server_type);
    let zoom = ZoomRange::new(raw.min_zoom, raw.max_zoom);

    let params = WmsParams {
        layers: raw.layers.join(","),
        cql_filter: raw.cql_filter.filter(|f| !f.is_empty()),
        format: raw.image_format.clone(),
        info_format: raw.info_format,
        version,
        srs: (!axis_oriented).then(|| code.clone()),
        crs: axis_oriented.then_some(code),
        tiled: raw.tiled,
        styles: raw.layers_info.as_ref().map(|infos| {
            let styles: Vec<&str> =
                infos.iter().map(|i| i.style.as_deref().unwrap_or_default()).collect();
            styles.join(",")
        }),
    };

    WmsOptions {
        url: ctx.proxied(&raw.url),
        name: raw.id.clone(),
        id: raw.id,
        layer_type: raw.layer_type,
        caption: raw.caption,
        visible: raw.visible_at_start,
        opacity: opacity_or_opaque(raw.opacity),
        max_zoom: zoom.max,
        min_zoom: zoom.min,
        min_max_zoom_alert_on_toggle_only: raw.min_max_zoom_alert_on_toggle_only,
        info_click_sort_type: raw.info_click_sort_type,
        info_click_sort_desc: raw.info_click_sort_desc,
        info_click_sort_property: raw.info_click_sort_property,
        information: raw.infobox,
        resolutions: ctx.map.all_resolutions.clone(),
        projection,
        origin: ctx.map.origin.clone(),
        extent: ctx.map.extent.clone(),
        single_tile: raw.single_tile.unwrap_or(false),
        hidpi: raw.hidpi,
        custom_ratio: raw.custom_ratio,
        image_format: non_empty(raw.image_format.as_deref())
            .unwrap_or(DEFAULT_IMAGE_FORMAT)
            .to_owned(),
        server_type,
        cross_origin: ctx.cross_origin(),
        attribution: raw.attribution,
        search_url: raw.search_url,
        search_property_name: raw.search_property_name,
        search_display_name: raw.search_display_name,
        search_short_display_name: raw.search_short_display_name,
        search_output_format: raw.search_output_format,
        search_geometry_field: raw.search_geometry_field,
        legend,
        legend_icon: raw.legend_icon,
        params,
        layers_info,
        info: raw.info.normalized(),
        search,
    }
}

/// Builds legend URLs for the sublayers of one entry.
struct LegendUrls<'a> {
    explicit: Option<&'a str>,
    base: String,
    layers_info: Option<&'a [LayerInfo]>,
    vendor_params: String,
}

impl<'a> LegendUrls<'a> {
    fn new(raw: &'a RawWms, ctx: &MapContext<'_>) -> Self {
        let glue = if raw.url.contains('?') { '&' } else { '?' };

        let vendor_params = match raw.server_type.as_deref() {
            Some("geoserver") => format!("&LEGEND_OPTIONS={}", ctx.legend_options()),
            Some("qgis") => "&SERVICE=WMS".to_owned(),
            _ => String::new(),
        };

        Self {
            explicit: non_empty(raw.legend.as_deref()),
            base: format!("{}{}{glue}", ctx.proxy(), raw.url),
            layers_info: raw.layers_info.as_deref(),
            vendor_params,
        }
    }

    fn url_for(&self, layer: &str) -> String {
        if let Some(explicit) = self.explicit {
            return with_scheme(explicit);
        }

        let style = self
            .layers_info
            .and_then(|infos| infos.iter().find(|info| info.id == layer))
            .and_then(|info| info.style.as_deref())
            .unwrap_or_default();

        with_scheme(&format!(
            "{}REQUEST=GetLegendGraphic&VERSION=1.0.0&FORMAT=image/png&LAYER={layer}&STYLE={style}{}",
            self.base, self.vendor_params
        ))
    }
}

fn search_block(raw: &RawWms, ctx: &MapContext<'_>, server_type: &str) -> Option<WmsSearch> {
    let first_field = raw.search_fields.first().filter(|field| !field.is_empty())?;
    let first_layer = raw.layers.first().map(String::as_str).unwrap_or_default();

    let mut parts = first_layer.split(':');
    let prefix = parts.next().unwrap_or_default();
    let feature_type = parts.next().filter(|name| !name.is_empty()).unwrap_or(prefix);

    let display_name = match &raw.display_fields {
        Some(fields) if has_content(Some(fields)) => fields.clone(),
        _ => Value::String(first_field.clone()),
    };

    Some(WmsSearch {
        url: ctx.proxied(&raw.url.replacen("wms", "wfs", 1)),
        feature_type: feature_type.to_owned(),
        property_name: raw.search_fields.join(","),
        display_name,
        srs_name: non_empty(ctx.map.projection.as_deref())
            .unwrap_or(DEFAULT_PROJECTION)
            .to_owned(),
        server_type: server_type.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vista_domain::document::MapProperties;

    fn raw(value: Value) -> RawWms {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn legend_url_glue_follows_existing_query() {
        let map = MapProperties::default();
        let ctx = MapContext::new(&map, None);

        let with_query = map_wms(
            raw(json!({ "id": "1", "url": "https://gs/wms?tenant=a", "layers": ["roads"] })),
            &ctx,
        );
        assert!(with_query.legend[0].url.starts_with("https://gs/wms?tenant=a&REQUEST="));

        let plain =
            map_wms(raw(json!({ "id": "1", "url": "https://gs/wms", "layers": ["roads"] })), &ctx);
        assert!(plain.legend[0].url.starts_with("https://gs/wms?REQUEST=GetLegendGraphic"));
        assert!(plain.legend[0].url.ends_with("LAYER=roads&STYLE="));
    }

    #[test]
    fn qgis_legends_name_the_service() {
        let map = MapProperties::default();
        let options = map_wms(
            raw(json!({ "id": "1", "url": "https://q/ows", "layers": "a", "serverType": "qgis" })),
            &MapContext::new(&map, None),
        );
        assert!(options.legend[0].url.ends_with("&SERVICE=WMS"));
        assert!(!options.legend[0].url.contains("LEGEND_OPTIONS"));
        assert_eq!(options.server_type, "qgis");
    }

    #[test]
    fn feature_type_strips_the_namespace() {
        let map = MapProperties { projection: Some("EPSG:3008".to_owned()), ..Default::default() };
        let options = map_wms(
            raw(json!({
                "id": "1",
                "url": "https://gs/geoserver/wms",
                "layers": ["topp:roads", "topp:rail"],
                "searchFields": ["name", "number"]
            })),
            &MapContext::new(&map, Some("/p/")),
        );

        let search = options.search.unwrap();
        assert_eq!(search.url, "/p/https://gs/geoserver/wfs");
        assert_eq!(search.feature_type, "roads");
        assert_eq!(search.property_name, "name,number");
        assert_eq!(search.display_name, json!("name"));
        assert_eq!(search.srs_name, "EPSG:3008");
        assert_eq!(search.server_type, "geoserver");
    }

    #[test]
    fn blank_first_search_field_disables_search() {
        let map = MapProperties::default();
        let ctx = MapContext::new(&map, None);

        let blank = map_wms(
            raw(json!({
                "id": "1",
                "url": "https://gs/wms",
                "layers": ["topp:roads"],
                "searchFields": ["", "number"]
            })),
            &ctx,
        );
        assert!(blank.search.is_none());

        let none = map_wms(raw(json!({ "id": "1", "url": "https://gs/wms", "layers": "a" })), &ctx);
        assert!(none.search.is_none());
    }

    #[test]
    fn layers_info_is_keyed_by_id() {
        let map = MapProperties::default();
        let options = map_wms(
            raw(json!({
                "id": "1",
                "url": "https://gs/wms",
                "layers": ["a", "b"],
                "infobox": "<b>{name}</b>",
                "layersInfo": [
                    { "id": "a", "style": "red", "caption": "A" },
                    { "id": "b", "legend": "https://gs/b.png" }
                ]
            })),
            &MapContext::new(&map, None),
        );

        let info = options.layers_info.unwrap();
        assert!(info["a"].legend.as_deref().unwrap().contains("STYLE=red"));
        assert_eq!(info["a"].extra["caption"], "A");
        assert_eq!(info["a"].infobox, Some(json!("<b>{name}</b>")));
        assert_eq!(info["b"].legend.as_deref(), Some("https://gs/b.png"));
        assert_eq!(options.params.styles.as_deref(), Some("red,"));
    }
}
