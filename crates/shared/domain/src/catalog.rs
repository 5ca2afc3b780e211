//! The shared layer catalog (`layers.json`).
//!
//! The catalog is a JSON object of protocol sections (`wmslayers`, `wmtslayers`, ...), each an
//! array of raw layer definitions. It is kept as raw JSON so that `get_layers_store` hands it
//! back byte-for-byte in meaning; typed views are borrowed on demand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Upstream protocol family of a catalog section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Wms,
    Wmts,
    ArcGis,
    Vector,
    Data,
}

impl Protocol {
    /// Maps a catalog section key onto its protocol. Unknown sections are ignored by the mappers.
    #[must_use]
    pub fn from_section(section: &str) -> Option<Self> {
        match section {
            "wmslayers" => Some(Self::Wms),
            "wmtslayers" => Some(Self::Wmts),
            "arcgislayers" => Some(Self::ArcGis),
            "vectorlayers" | "wfslayers" => Some(Self::Vector),
            "datalayers" => Some(Self::Data),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wms => "wms",
            Self::Wmts => "wmts",
            Self::ArcGis => "arcgis",
            Self::Vector => "vector",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerCatalog(Map<String, Value>);

impl LayerCatalog {
    #[must_use]
    pub const fn new(sections: Map<String, Value>) -> Self {
        Self(sections)
    }

    /// Every object entry of every array section, in document order.
    pub fn entries(&self) -> impl Iterator<Item = CatalogLayer<'_>> {
        self.0.iter().flat_map(|(section, value)| {
            let protocol = Protocol::from_section(section);
            value
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_object)
                .map(move |entry| CatalogLayer { section, protocol, entry })
        })
    }

    /// First entry whose id matches.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<CatalogLayer<'_>> {
        self.entries().find(|layer| layer.id().is_some_and(|candidate| candidate == id))
    }
}

/// Borrowed view of one raw catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct CatalogLayer<'a> {
    pub section: &'a str,
    pub protocol: Option<Protocol>,
    pub entry: &'a Map<String, Value>,
}

impl<'a> CatalogLayer<'a> {
    /// Layer id; numeric ids written by older admin builds are accepted.
    #[must_use]
    pub fn id(&self) -> Option<Cow<'a, str>> {
        match self.entry.get("id")? {
            Value::String(id) => Some(Cow::Borrowed(id.as_str())),
            Value::Number(id) => Some(Cow::Owned(id.to_string())),
            _ => None,
        }
    }

    #[must_use]
    pub fn caption(&self) -> Option<&'a str> {
        self.entry.get("caption").and_then(Value::as_str)
    }

    /// Upstream layer names served under this entry (`layers`).
    #[must_use]
    pub fn upstream_layers(&self) -> Vec<&'a str> {
        match self.entry.get("layers") {
            Some(Value::Array(layers)) => layers.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(layers)) => {
                layers.split(',').map(str::trim).filter(|s| !s.is_empty()).collect()
            },
            _ => Vec::new(),
        }
    }

    /// The raw entry as an owned JSON value, ready for a typed mapper.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.entry.clone())
    }
}
