use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use vista_access::{ConfigWasher, DirectoryResolver, VisibilityFilter};
use vista_domain::catalog::LayerCatalog;
use vista_domain::config::{AccessConfig, MapsConfig};
use vista_domain::constants::{CATALOG_DOCUMENT, EXPORT_FORMAT_JSON};
use vista_domain::document::MapConfiguration;
use vista_domain::identity::Identity;
use vista_layers::{MapContext, NormalizedLayer, map_layer};

use crate::error::MapServiceError;
use crate::export::{ExportDescriber, ExportReport};
use crate::store::ConfigStore;

/// A map offered in the client's theme-map dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeMap {
    #[serde(rename = "mapConfigurationName")]
    pub name: String,
    #[serde(rename = "mapConfigurationTitle")]
    pub title: Option<String>,
}

/// The map-configuration operations, with group restrictions applied when enabled.
///
/// Cheap to clone; every clone shares the same store and directory.
#[derive(Debug)]
pub struct MapService<D> {
    inner: Arc<Inner<D>>,
}

#[derive(Debug)]
struct Inner<D> {
    store: ConfigStore,
    directory: D,
    restrict_by_groups: bool,
    template: String,
    proxy: Option<String>,
}

impl<D> Clone for MapService<D> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<D: DirectoryResolver> MapService<D> {
    pub fn new(
        store: ConfigStore,
        directory: D,
        access: &AccessConfig,
        maps: &MapsConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                directory,
                restrict_by_groups: access.restrict_by_groups,
                template: maps.template.clone(),
                proxy: maps.proxy.clone().filter(|p| !p.is_empty()),
            }),
        }
    }

    /// Loads map `name` for `identity`.
    ///
    /// With restrictions enabled the identity must be known to the directory and, when the
    /// map's LayerSwitcher names groups, belong to one of them. The result is then washed,
    /// unless `wash` is false. With restrictions disabled the stored document is returned as is.
    ///
    /// # Errors
    /// `NotFound`, `AccessDenied`, `DirectoryUnavailable`, `InvalidName`, `MalformedDocument`.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_map_config(
        &self,
        name: &str,
        identity: &Identity,
        wash: bool,
    ) -> Result<MapConfiguration, MapServiceError> {
        let config = self.inner.store.load_map(name).await?;

        if !self.inner.restrict_by_groups {
            debug!("Group restrictions disabled, serving map as stored");
            return Ok(config);
        }

        self.ensure_valid(identity).await?;

        let filter = VisibilityFilter::new(&self.inner.directory);
        let label = format!("map \"{name}\"");
        if !filter.is_visible(&config.map_visibility(), identity, &label).await? {
            warn!(map = name, %identity, "Identity is in none of the groups allowed on this map");
            return Err(MapServiceError::access_denied(format!(
                "{identity} may not open map '{name}'"
            )));
        }

        if !wash {
            return Ok(config);
        }

        Ok(ConfigWasher::new(&self.inner.directory).wash_configuration(&config, identity).await?)
    }

    /// The whole layer catalog, unwashed.
    ///
    /// # Errors
    /// `AccessDenied` for an unknown identity when restrictions are enabled; store failures.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_layers_store(
        &self,
        identity: &Identity,
    ) -> Result<LayerCatalog, MapServiceError> {
        let catalog = self.inner.store.load_catalog().await?;

        if self.inner.restrict_by_groups {
            self.ensure_valid(identity).await?;
        }

        Ok(catalog)
    }

    /// Describes catalog usage. `name == "layers"` returns the index of the whole catalog;
    /// any other name reports the layers of that map as washed for `identity`.
    ///
    /// # Errors
    /// `UnsupportedFormat` for any `format` but `json`, checked before anything is read.
    /// Otherwise as [`get_layers_store`](Self::get_layers_store) and
    /// [`get_map_config`](Self::get_map_config).
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn export_map_config(
        &self,
        name: &str,
        format: &str,
        identity: &Identity,
    ) -> Result<ExportReport, MapServiceError> {
        if format != EXPORT_FORMAT_JSON {
            return Err(MapServiceError::UnsupportedFormat {
                message: format!("output format '{format}' is not implemented").into(),
                context: None,
            });
        }

        let catalog = self.get_layers_store(identity).await?;
        let describer = ExportDescriber::new(&catalog);

        if name == CATALOG_DOCUMENT {
            return Ok(ExportReport::Catalog(describer.into_index()));
        }

        let config = self.get_map_config(name, identity, true).await?;
        Ok(ExportReport::Map(describer.describe(&config)))
    }

    /// Sorted names of every stored map.
    ///
    /// # Errors
    /// Store failures.
    pub async fn get_available_maps(&self) -> Result<Vec<String>, MapServiceError> {
        self.inner.store.map_names().await
    }

    /// Maps `identity` may open that ask to be listed in the theme-map dropdown.
    ///
    /// Maps the identity is denied, and maps that cannot be parsed, are skipped.
    ///
    /// # Errors
    /// `DirectoryUnavailable` and store failures abort the listing.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_user_specific_maps(
        &self,
        identity: &Identity,
    ) -> Result<Vec<ThemeMap>, MapServiceError> {
        let mut maps = Vec::new();

        for name in self.get_available_maps().await? {
            let config = match self.get_map_config(&name, identity, false).await {
                Ok(config) => config,
                Err(
                    err @ (MapServiceError::AccessDenied { .. }
                    | MapServiceError::NotFound { .. }
                    | MapServiceError::MalformedDocument { .. }
                    | MapServiceError::InvalidName { .. }),
                ) => {
                    debug!(map = %name, error = %err, "Skipping map");
                    continue;
                },
                Err(err) => return Err(err),
            };

            if let Some(switcher) = config.layer_switcher().filter(|ls| ls.in_theme_dropdown()) {
                maps.push(ThemeMap { title: switcher.theme_map_header_caption.clone(), name });
            }
        }

        Ok(maps)
    }

    /// # Errors
    /// `InvalidName`, `NotFound` when `src` does not exist, store failures.
    #[instrument(skip(self))]
    pub async fn duplicate_map(&self, src: &str, dest: &str) -> Result<(), MapServiceError> {
        self.inner.store.duplicate(src, dest).await
    }

    /// Creates map `name` from the configured template.
    ///
    /// # Errors
    /// As [`duplicate_map`](Self::duplicate_map).
    #[instrument(skip(self))]
    pub async fn create_new_map(&self, name: &str) -> Result<(), MapServiceError> {
        info!(map = name, template = %self.inner.template, "Creating map from template");
        self.inner.store.duplicate(&self.inner.template, name).await
    }

    /// # Errors
    /// `InvalidName`, `NotFound`, store failures.
    #[instrument(skip(self))]
    pub async fn delete_map(&self, name: &str) -> Result<(), MapServiceError> {
        self.inner.store.delete(name).await
    }

    /// Every group the directory knows, for the admin UI.
    ///
    /// # Errors
    /// `DirectoryUnavailable`.
    pub async fn get_available_groups(&self) -> Result<Vec<String>, MapServiceError> {
        Ok(self.inner.directory.available_groups().await?)
    }

    /// Groups shared by all of `users`.
    ///
    /// # Errors
    /// `DirectoryUnavailable`.
    pub async fn find_common_groups(
        &self,
        users: &[Identity],
    ) -> Result<Vec<String>, MapServiceError> {
        Ok(self.inner.directory.common_groups(users).await?)
    }

    /// Normalizes catalog layer `layer_id` with the properties of map `map`, after the same
    /// access check [`get_map_config`](Self::get_map_config) performs.
    ///
    /// # Errors
    /// As `get_map_config`; `NotFound` for an unknown layer id; `MalformedDocument` when the
    /// catalog entry cannot be mapped.
    #[instrument(skip(self, identity), fields(identity = %identity))]
    pub async fn get_normalized_layer(
        &self,
        map: &str,
        layer_id: &str,
        identity: &Identity,
    ) -> Result<NormalizedLayer, MapServiceError> {
        let config = self.get_map_config(map, identity, false).await?;
        let catalog = self.inner.store.load_catalog().await?;

        let layer = catalog
            .find(layer_id)
            .ok_or_else(|| MapServiceError::not_found(format!("layer '{layer_id}'")))?;

        let ctx = MapContext::new(&config.map, self.inner.proxy.as_deref());
        Ok(map_layer(&layer, &ctx)?)
    }

    async fn ensure_valid(&self, identity: &Identity) -> Result<(), MapServiceError> {
        if self.inner.directory.is_user_valid(identity).await? {
            return Ok(());
        }
        warn!(%identity, "Group restrictions are enabled but the identity is not a valid user");
        Err(MapServiceError::access_denied("no valid user name was supplied"))
    }
}
