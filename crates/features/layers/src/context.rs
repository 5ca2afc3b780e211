use vista_domain::constants::DEFAULT_PROJECTION;
use vista_domain::document::MapProperties;

const DEFAULT_CROSS_ORIGIN: &str = "anonymous";

/// Map-level settings every mapper may draw on.
#[derive(Debug, Clone, Copy)]
pub struct MapContext<'a> {
    pub map: &'a MapProperties,
    proxy: &'a str,
}

impl<'a> MapContext<'a> {
    #[must_use]
    pub fn new(map: &'a MapProperties, proxy: Option<&'a str>) -> Self {
        Self { map, proxy: proxy.unwrap_or_default() }
    }

    #[must_use]
    pub const fn proxy(&self) -> &'a str {
        self.proxy
    }

    pub(crate) fn proxied(&self, url: &str) -> String {
        format!("{}{url}", self.proxy)
    }

    pub(crate) fn cross_origin(&self) -> String {
        non_empty(self.map.cross_origin.as_deref()).unwrap_or(DEFAULT_CROSS_ORIGIN).to_owned()
    }

    /// The layer's own projection, else the map's, else the service default.
    pub(crate) fn projection(&self, own: Option<&str>) -> String {
        non_empty(own)
            .or_else(|| non_empty(self.map.projection.as_deref()))
            .unwrap_or(DEFAULT_PROJECTION)
            .to_owned()
    }

    pub(crate) fn legend_options(&self) -> &'a str {
        self.map.geoserver_legend_options.as_deref().unwrap_or_default()
    }
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
