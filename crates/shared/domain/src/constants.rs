/// Tool `type` of the plugin owning baselayers and the group tree.
pub const LAYER_SWITCHER: &str = "layerswitcher";

/// Name of the shared layer catalog document.
pub const CATALOG_DOCUMENT: &str = "layers";

/// Sub-directory holding duplication templates.
pub const TEMPLATES_DIR: &str = "templates";

/// Suffix marking a duplication source as a template.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Template used by `create_new_map`.
pub const DEFAULT_TEMPLATE: &str = "map.template";

/// Projection used when neither the layer nor the map names one.
pub const DEFAULT_PROJECTION: &str = "EPSG:3006";

/// The only export format implemented so far.
pub const EXPORT_FORMAT_JSON: &str = "json";
