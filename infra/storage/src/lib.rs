//! A sandboxed, flat JSON document store.
//!
//! Map configurations, the layer catalog and templates are plain JSON files in one data
//! directory. This crate owns every filesystem touch on that directory:
//!
//! - **Sandbox Security**: paths are canonicalized and must stay inside the data directory;
//!   document names are checked before they ever become paths.
//! - **Atomic Writes**: unique temp write + `fsync` + `rename`, so a crash never leaves a
//!   truncated document behind.
//! - **Self-Healing**: temp files orphaned by a crash are swept when the store opens.
//!
//! # Examples
//!
//! ```rust
//! use vista_storage::{DocumentStore, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     # let root = tmp.path().join("App_Data");
//!     let store = DocumentStore::builder().root(&root).create(true).connect().await?;
//!
//!     store.write("map_1.json", br#"{"tools":[]}"#).await?;
//!     store.copy("map_1.json", "map_2.json").await?;
//!
//!     assert_eq!(store.list(".", "json").await?, ["map_1", "map_2"]);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod sandbox;

pub use builder::StoreBuilder;
pub use engine::DocumentStore;
pub use error::{StorageError, StorageErrorExt};
