//! # Map configuration service
//!
//! [`MapService`] is the single entry point for everything the map client and the admin UI
//! ask of the backend: map configurations washed per identity, the layer catalog, catalog
//! usage reports, normalized layers, and map duplication and deletion.
//!
//! Documents are read fresh from the [`ConfigStore`] on every call and never cached; a washed
//! configuration is a new value and the stored document is never touched by a read.
//!
//! ```rust,no_run
//! use vista_access::StaticDirectory;
//! use vista_domain::config::ApiConfig;
//! use vista_maps::{ConfigStore, MapService};
//! use vista_storage::DocumentStore;
//!
//! # async fn run(config: ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let documents = DocumentStore::builder().root(&config.storage.data_dir).connect().await?;
//! let directory = StaticDirectory::from(&config.access.directory);
//! let service =
//!     MapService::new(ConfigStore::new(documents), directory, &config.access, &config.maps);
//!
//! let maps = service.get_available_maps().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod export;
mod service;
mod store;

pub use error::{MapServiceError, MapServiceErrorExt};
pub use export::{
    CatalogIndex, ExportDescriber, ExportReport, GroupUsage, LayerDescriptor, MapUsage,
};
pub use service::{MapService, ThemeMap};
pub use store::ConfigStore;
