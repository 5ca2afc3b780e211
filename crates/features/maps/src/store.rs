use tracing::{debug, info};
use vista_domain::catalog::LayerCatalog;
use vista_domain::constants::{CATALOG_DOCUMENT, TEMPLATE_SUFFIX, TEMPLATES_DIR};
use vista_domain::document::MapConfiguration;
use vista_storage::DocumentStore;

use crate::error::MapServiceError;

/// Named map documents, the layer catalog and templates on top of a [`DocumentStore`].
///
/// Map `<name>` lives in `<name>.json`; the catalog in `layers.json`; templates in
/// `templates/<name>.template`. Names are checked before they become paths, and the catalog
/// name is reserved.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    documents: DocumentStore,
}

impl ConfigStore {
    #[must_use]
    pub const fn new(documents: DocumentStore) -> Self {
        Self { documents }
    }

    /// Reads one map configuration, fresh from disk.
    ///
    /// # Errors
    /// `InvalidName`, `NotFound` or `MalformedDocument`.
    pub async fn load_map(&self, name: &str) -> Result<MapConfiguration, MapServiceError> {
        let path = map_path(name)?;
        self.documents
            .read_json(&path)
            .await
            .map_err(|err| MapServiceError::from_storage(err, name))
    }

    /// Reads the layer catalog.
    ///
    /// # Errors
    /// `NotFound` when there is no `layers.json`, `MalformedDocument` when it is not an object.
    pub async fn load_catalog(&self) -> Result<LayerCatalog, MapServiceError> {
        self.documents
            .read_json(format!("{CATALOG_DOCUMENT}.json"))
            .await
            .map_err(|err| MapServiceError::from_storage(err, CATALOG_DOCUMENT))
    }

    /// Sorted names of every map configuration, the catalog excluded.
    ///
    /// # Errors
    /// Store failures only.
    pub async fn map_names(&self) -> Result<Vec<String>, MapServiceError> {
        let mut names = self
            .documents
            .list(".", "json")
            .await
            .map_err(|err| MapServiceError::from_storage(err, "."))?;
        names.retain(|name| name != CATALOG_DOCUMENT);
        Ok(names)
    }

    /// Copies `src` to map `dest`, overwriting it. A source ending in `.template` is read
    /// from `templates/`; anything else is the map `<src>.json`. The content is copied as is.
    ///
    /// # Errors
    /// `InvalidName` for either name, `NotFound` when the source does not exist. On failure
    /// the destination keeps its previous state.
    pub async fn duplicate(&self, src: &str, dest: &str) -> Result<(), MapServiceError> {
        let src_path = if src.ends_with(TEMPLATE_SUFFIX) {
            checked(src)?;
            format!("{TEMPLATES_DIR}/{src}")
        } else {
            map_path(src)?
        };
        let dest_path = map_path(dest)?;

        self.documents
            .copy(&src_path, &dest_path)
            .await
            .map_err(|err| MapServiceError::from_storage(err, src))?;

        info!(src, dest, "Map configuration duplicated");
        Ok(())
    }

    /// # Errors
    /// `InvalidName`, or `NotFound` when the map does not exist.
    pub async fn delete(&self, name: &str) -> Result<(), MapServiceError> {
        let path = map_path(name)?;
        self.documents
            .delete(&path)
            .await
            .map_err(|err| MapServiceError::from_storage(err, name))?;

        info!(map = name, "Map configuration deleted");
        Ok(())
    }
}

fn checked(name: &str) -> Result<(), MapServiceError> {
    DocumentStore::validate_name(name).map_err(|err| MapServiceError::from_storage(err, name))
}

fn map_path(name: &str) -> Result<String, MapServiceError> {
    checked(name)?;

    if name == CATALOG_DOCUMENT {
        debug!(name, "Refusing to treat the layer catalog as a map");
        return Err(MapServiceError::InvalidName {
            message: format!("'{name}' is reserved for the layer catalog").into(),
            context: None,
        });
    }

    Ok(format!("{name}.json"))
}
