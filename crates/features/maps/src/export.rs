//! Human-readable reports of which catalog layers a map uses.

use serde::Serialize;
use std::collections::BTreeMap;
use vista_domain::catalog::LayerCatalog;
use vista_domain::document::{Group, LayerRef, MapConfiguration};

/// What a catalog layer is called, and which upstream layers it bundles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Only present when the entry serves more than one upstream layer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_layers: Option<Vec<String>>,
}

/// Catalog id → descriptor. Later entries win when an id is repeated.
pub type CatalogIndex = BTreeMap<String, LayerDescriptor>;

/// The LayerSwitcher tree of one map with catalog ids swapped for descriptors.
///
/// A reference the catalog does not know becomes `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MapUsage {
    pub baselayers: Vec<Option<LayerDescriptor>>,
    pub groups: Vec<GroupUsage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub layers: Vec<Option<LayerDescriptor>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupUsage>,
}

/// Result of an export: the whole catalog index, or the usage report of one map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ExportReport {
    Catalog(CatalogIndex),
    Map(MapUsage),
}

/// Builds export reports against one catalog.
#[derive(Debug)]
pub struct ExportDescriber {
    index: CatalogIndex,
}

impl ExportDescriber {
    #[must_use]
    pub fn new(catalog: &LayerCatalog) -> Self {
        let mut index = CatalogIndex::new();
        for layer in catalog.entries() {
            let Some(id) = layer.id() else { continue };
            let upstream = layer.upstream_layers();
            let descriptor = LayerDescriptor {
                name: layer.caption().map(str::to_owned),
                sub_layers: (upstream.len() > 1)
                    .then(|| upstream.into_iter().map(str::to_owned).collect()),
            };
            index.insert(id.into_owned(), descriptor);
        }
        Self { index }
    }

    #[must_use]
    pub const fn index(&self) -> &CatalogIndex {
        &self.index
    }

    #[must_use]
    pub fn into_index(self) -> CatalogIndex {
        self.index
    }

    /// Mirrors the LayerSwitcher of an already washed configuration. A configuration without
    /// a LayerSwitcher yields an empty report.
    #[must_use]
    pub fn describe(&self, config: &MapConfiguration) -> MapUsage {
        let Some(switcher) = config.layer_switcher() else {
            return MapUsage::default();
        };

        MapUsage {
            baselayers: self.lookup_all(&switcher.baselayers),
            groups: switcher.groups.iter().map(|group| self.describe_group(group)).collect(),
        }
    }

    fn describe_group(&self, group: &Group) -> GroupUsage {
        GroupUsage {
            name: group.name.clone().filter(|name| !name.is_empty()),
            layers: self.lookup_all(&group.layers),
            groups: group.groups.iter().map(|child| self.describe_group(child)).collect(),
        }
    }

    fn lookup_all(&self, layers: &[LayerRef]) -> Vec<Option<LayerDescriptor>> {
        layers.iter().map(|layer| self.index.get(&layer.id).cloned()).collect()
    }
}
