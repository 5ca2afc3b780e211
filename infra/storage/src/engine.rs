//! The [`DocumentStore`] handle: sandboxed reads, atomic writes, listing and copies over one
//! flat data directory.

use crate::builder::StoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance::{self, TMP_MARKER};
use crate::sandbox;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// The internal shared state of a [`DocumentStore`].
#[derive(Debug)]
pub struct StoreInner {
    /// Canonicalized data directory; every resolved path must stay under it.
    pub(crate) root: PathBuf,
    pub(crate) pretty: bool,
    pub(crate) tmp_counter: AtomicU64,
}

/// A cheaply clonable handle to the data directory.
///
/// All paths are relative to the data directory and validated against it, so neither
/// `..` segments nor symlinked parents can reach files outside. Writes go through a
/// temp file, `fsync` and `rename`, so readers never observe a half-written document.
///
/// # Example
///
/// ```rust
/// use vista_storage::{DocumentStore, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let store = DocumentStore::builder().root(tmp.path()).connect().await?;
///
///     store.write_json("demo.json", &serde_json::json!({ "tools": [] })).await?;
///     let doc: serde_json::Value = store.read_json("demo.json").await?;
///     assert_eq!(doc["tools"], serde_json::json!([]));
///
///     assert_eq!(store.list(".", "json").await?, vec!["demo".to_owned()]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DocumentStore {
    pub(crate) inner: Arc<StoreInner>,
}

impl Deref for DocumentStore {
    type Target = StoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DocumentStore {
    #[must_use = "The store is not opened until you call .connect()"]
    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Rejects document names that could address anything but a plain file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidName`] for empty, hidden, or separator-bearing names.
    pub fn validate_name(name: &str) -> Result<(), StorageError> {
        sandbox::validate_name(name)
    }

    /// Resolves a relative path inside the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        sandbox::resolve_path(&self.root, path)
    }

    /// Reads a whole file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;

        match fs::read(&resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    /// Reads and parses a JSON document.
    ///
    /// # Errors
    ///
    /// Everything [`read`](Self::read) returns, plus [`StorageError::Malformed`] when the
    /// content is not valid JSON for `T`. Malformed documents are never partially accepted.
    pub async fn read_json<T>(&self, path: impl AsRef<Path>) -> Result<T, StorageError>
    where
        T: DeserializeOwned,
    {
        let path = path.as_ref();
        let bytes = self.read(path).await?;
        serde_json::from_slice(&bytes).context(format!("Parsing {}", path.display()))
    }

    /// Writes `data` atomically (unique temp file, `fsync`, `rename`).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox and
    /// [`StorageError::Io`] on disk failures. The target is left untouched on failure.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;

        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directory for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(&resolved, &self.tmp_counter);

        if let Err(err) = Self::write_temp(&temp, data).await {
            let _ = fs::remove_file(&temp).await;
            return Err(err);
        }

        if let Err(err) = fs::rename(&temp, &resolved).await {
            let _ = fs::remove_file(&temp).await;
            return Err(StorageError::Io {
                source: err,
                context: Some(
                    format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                        .into(),
                ),
            });
        }

        if let Some(parent) = resolved.parent() {
            Self::sync_dir(parent).await;
        }

        debug!(path = %resolved.display(), "Document saved atomically");
        Ok(())
    }

    /// Serializes `value` as JSON and writes it atomically.
    ///
    /// # Errors
    ///
    /// [`StorageError::Malformed`] if `value` cannot be serialized, otherwise as [`write`](Self::write).
    pub async fn write_json<T>(&self, path: impl AsRef<Path>, value: &T) -> Result<(), StorageError>
    where
        T: Serialize + ?Sized,
    {
        let bytes =
            if self.pretty { serde_json::to_vec_pretty(value) } else { serde_json::to_vec(value) };
        let bytes = bytes.context("Serializing document")?;

        self.write(path, &bytes).await
    }

    /// Copies `src` over `dest` (overwriting). The destination is written atomically, so it
    /// either holds the full source content or its previous state.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if `src` is missing.
    pub async fn copy(
        &self,
        src: impl AsRef<Path>,
        dest: impl AsRef<Path>,
    ) -> Result<(), StorageError> {
        let data = self.read(src).await?;
        self.write(dest, &data).await
    }

    /// Deletes a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the file does not exist.
    pub async fn delete(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        match fs::remove_file(&resolved).await {
            Ok(()) => {},
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to delete: {}", resolved.display()).into()),
                });
            },
        }
        debug!(path = %resolved.display(), "Document deleted");
        Ok(())
    }

    /// Checks whether a file exists inside the sandbox.
    ///
    /// # Errors
    ///
    /// Only path resolution failures are errors; a missing file is `Ok(false)`.
    pub async fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        Ok(fs::try_exists(&resolved).await.unwrap_or(false))
    }

    /// Names (without extension) of the regular files in `dir` carrying `extension`, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] if `dir` does not exist.
    pub async fn list(
        &self,
        dir: impl AsRef<Path>,
        extension: &str,
    ) -> Result<Vec<String>, StorageError> {
        let resolved = self.resolve(dir)?;

        let mut entries = match fs::read_dir(&resolved).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::DirectoryNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                });
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Failed to list: {}", resolved.display()).into()),
                });
            },
        };

        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.context("Failed to read entry")? {
            let is_file = entry.file_type().await.is_ok_and(|t| t.is_file());
            let path = entry.path();
            if !is_file || path.extension().and_then(|e| e.to_str()) != Some(extension) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_owned());
            }
        }

        names.sort_unstable();
        Ok(names)
    }

    /// Removes stale temp files; returns how many were removed.
    pub async fn purge_tmp(&self) -> usize {
        maintenance::purge_tmp(&self.root).await
    }

    async fn write_temp(temp: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut file = fs::OpenOptions::new()
            .create_new(true)
            .write(true)
            .open(temp)
            .await
            .context(format!("Temp creation failed: {}", temp.display()))?;
        file.write_all(data).await.context("Write failed")?;
        file.sync_all().await.context("Hardware sync failed")?;
        Ok(())
    }

    async fn sync_dir(path: &Path) {
        match fs::File::open(path).await {
            Ok(dir) => {
                if let Err(err) = dir.sync_all().await {
                    warn!(path = %path.display(), error = %err, "Directory sync failed");
                }
            },
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Directory open failed");
            },
        }
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("document");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}
