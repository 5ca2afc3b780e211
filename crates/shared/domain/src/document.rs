//! Persisted map-configuration documents.
//!
//! Only the fields the service reasons about are typed; everything else on a node is kept in
//! its `extra` map so a document survives a read → wash → serialize cycle unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::LAYER_SWITCHER;
use crate::visibility::VisibleForGroups;

/// A named map configuration (`<name>.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapConfiguration {
    #[serde(default)]
    pub map: MapProperties,
    #[serde(default)]
    pub tools: Vec<Tool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MapConfiguration {
    #[must_use]
    pub fn layer_switcher(&self) -> Option<&LayerSwitcherOptions> {
        self.tools.iter().find_map(|tool| match &tool.options {
            ToolOptions::LayerSwitcher(options) => Some(options),
            ToolOptions::Plugin(_) => None,
        })
    }

    /// Map-level restriction. Lives on the LayerSwitcher tool's options.
    #[must_use]
    pub fn map_visibility(&self) -> VisibleForGroups {
        self.layer_switcher().map(|ls| ls.visible_for_groups.clone()).unwrap_or_default()
    }
}

/// Map-level properties shared by every layer on the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolutions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_resolutions: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geoserver_legend_options: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of the `tools` array, polymorphic by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTool")]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    pub options: ToolOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Tool {
    #[must_use]
    pub const fn visible_for_groups(&self) -> &VisibleForGroups {
        match &self.options {
            ToolOptions::LayerSwitcher(options) => &options.visible_for_groups,
            ToolOptions::Plugin(options) => &options.visible_for_groups,
        }
    }
}

/// Serialized as the bare options object; the tool's `type` selects the variant on read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOptions {
    LayerSwitcher(LayerSwitcherOptions),
    Plugin(PluginOptions),
}

/// Options of any tool other than the LayerSwitcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginOptions {
    #[serde(default)]
    pub visible_for_groups: VisibleForGroups,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerSwitcherOptions {
    #[serde(default)]
    pub visible_for_groups: VisibleForGroups,
    #[serde(default)]
    pub baselayers: Vec<LayerRef>,
    #[serde(default)]
    pub groups: Vec<Group>,
    /// Opt-in to the map's listing in the theme-map dropdown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dropdown_theme_maps: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_map_header_caption: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerSwitcherOptions {
    #[must_use]
    pub fn in_theme_dropdown(&self) -> bool {
        self.dropdown_theme_maps == Some(true)
    }

    /// Copy of everything but `baselayers` and `groups`, which are left empty.
    #[must_use]
    pub fn clone_without_tree(&self) -> Self {
        Self {
            visible_for_groups: self.visible_for_groups.clone(),
            baselayers: Vec::new(),
            groups: Vec::new(),
            dropdown_theme_maps: self.dropdown_theme_maps,
            theme_map_header_caption: self.theme_map_header_caption.clone(),
            extra: self.extra.clone(),
        }
    }
}

/// A node of the LayerSwitcher tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub visible_for_groups: VisibleForGroups,
    #[serde(default)]
    pub layers: Vec<LayerRef>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reference into the layer catalog, with its own restriction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRef {
    pub id: String,
    #[serde(default)]
    pub visible_for_groups: VisibleForGroups,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayerRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into(), ..Self::default() }
    }
}

#[derive(Debug, Deserialize)]
struct RawTool {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    options: Value,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawTool> for Tool {
    type Error = serde_json::Error;

    fn try_from(raw: RawTool) -> Result<Self, Self::Error> {
        let options = if raw.options.is_null() { Value::Object(Map::new()) } else { raw.options };

        let options = if raw.kind == LAYER_SWITCHER {
            ToolOptions::LayerSwitcher(serde_json::from_value(options)?)
        } else {
            ToolOptions::Plugin(serde_json::from_value(options)?)
        };

        Ok(Self { kind: raw.kind, options, extra: raw.extra })
    }
}
