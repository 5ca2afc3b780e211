use crate::engine::{DocumentStore, StoreInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::info;

#[derive(Debug, Clone)]
struct StoreOptions {
    create: bool,
    pretty: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { create: true, pretty: true }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StoreBuilder<S: Sealed = NoRoot> {
    state: S,
    options: StoreOptions,
}

#[allow(private_bounds)]
impl<S: Sealed> StoreBuilder<S> {
    #[must_use = "Sets whether the data directory is created when missing"]
    pub const fn create(mut self, enable: bool) -> Self {
        self.options.create = enable;
        self
    }

    /// Pretty-print documents on write (the admin UI diffs them by eye).
    #[must_use = "Sets whether documents are pretty-printed on write"]
    pub const fn pretty(mut self, enable: bool) -> Self {
        self.options.pretty = enable;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StoreBuilder<N> {
        StoreBuilder { state, options: self.options }
    }
}

impl StoreBuilder<NoRoot> {
    #[must_use = "Creates a new store builder with default options"]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "Sets the data directory of the store"]
    pub fn root(self, path: impl Into<PathBuf>) -> StoreBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StoreBuilder<WithRoot> {
    /// Opens the store.
    ///
    /// Creates the data directory when `create(true)` (the default), canonicalizes it so the
    /// sandbox check compares physical paths, and sweeps temp files left by interrupted writes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] when the directory is missing and creation is
    /// disabled, or [`StorageError::Io`] when it cannot be created or resolved.
    pub async fn connect(self) -> Result<DocumentStore, StorageError> {
        let root = &self.state.0;

        if self.options.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap data directory: {}", root.display()))?;
        } else if !fs::try_exists(root).await.unwrap_or(false) {
            return Err(StorageError::DirectoryNotFound {
                message: root.display().to_string().into(),
                context: None,
            });
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve data directory: {}", root.display()))?;

        info!(path = %canonical.display(), "Document store opened");

        let store = DocumentStore {
            inner: Arc::new(StoreInner {
                root: canonical,
                pretty: self.options.pretty,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        store.purge_tmp().await;

        Ok(store)
    }
}
