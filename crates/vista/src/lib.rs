//! Facade crate for the Vista map-configuration service.
//! Re-exports domain/kernel primitives and wires the feature slices together.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `vista` with the `server` feature for the HTTP plumbing.
//! - Call [`init`] once at startup and share the returned service between handlers.

pub use vista_domain as domain;
pub use vista_kernel as kernel;
pub use vista_storage as storage;

use tracing::info;
use vista_access::StaticDirectory;
use vista_domain::config::ApiConfig;
use vista_maps::{ConfigStore, MapService};
use vista_storage::{DocumentStore, StorageError};

#[cfg(feature = "server")]
pub mod server {
    pub mod router {
        pub use vista_kernel::server::system_router;
    }
    pub use vista_kernel::server::identity_from_headers;
}

/// Feature slices, re-exported for callers that need more than [`init`].
pub mod features {
    pub use vista_access as access;
    pub use vista_layers as layers;
    pub use vista_maps as maps;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        "access",
        "layers",
        "maps",
        #[cfg(feature = "server")]
        "server",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// The service type [`init`] builds.
pub type Service = MapService<StaticDirectory>;

/// Opens the document store and builds the map service from the loaded settings.
///
/// # Errors
/// Returns an error if the data directory cannot be created or resolved.
pub async fn init(config: &ApiConfig) -> Result<Service, StorageError> {
    let documents = DocumentStore::builder()
        .root(&config.storage.data_dir)
        .create(true)
        .pretty(true)
        .connect()
        .await?;

    let directory = StaticDirectory::from(&config.access.directory);

    info!(
        restrict_by_groups = config.access.restrict_by_groups,
        users = config.access.directory.members.len(),
        "Map service ready"
    );

    Ok(MapService::new(ConfigStore::new(documents), directory, &config.access, &config.maps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_creates_the_data_directory() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");

        let mut config = ApiConfig::default();
        config.storage.data_dir = data_dir.clone();

        let service = init(&config).await.unwrap();

        assert!(data_dir.is_dir());
        assert!(service.get_available_maps().await.unwrap().is_empty());
        assert!(features::is_enabled("maps"));
    }
}
