use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{error, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Marker inserted into temp file names by the atomic writer.
pub(crate) const TMP_MARKER: &str = ".vistatmp.";

const STALE_AFTER: Duration = Duration::from_secs(300);

/// Removes temp files orphaned by interrupted writes. Failures are logged, never fatal.
pub(crate) async fn purge_tmp(root: &Path) -> usize {
    let root = root.to_path_buf();
    let now = SystemTime::now();

    match tokio::task::spawn_blocking(move || remove_stale(&root, now, STALE_AFTER)).await {
        Ok((removed, failed)) => {
            if removed > 0 || failed > 0 {
                info!(removed, failed, "Cleaned up orphaned temp documents");
            }
            removed
        },
        Err(e) => {
            error!(error = %e, "Temp document cleanup task panicked");
            0
        },
    }
}

fn remove_stale(root: &Path, now: SystemTime, threshold: Duration) -> (usize, usize) {
    let mut removed = 0;
    let mut failed = 0;

    // Documents live in the root and in `templates/`; nothing deeper is ours.
    for entry in WalkDir::new(root).max_depth(2).into_iter().flatten() {
        if !(is_tmp(&entry) && is_stale(&entry, now, threshold)) {
            continue;
        }

        match std::fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Failed to remove temp document");
                failed += 1;
            },
        }
    }

    (removed, failed)
}

fn is_tmp(entry: &DirEntry) -> bool {
    entry.file_type().is_file()
        && entry.file_name().to_str().is_some_and(|name| name.contains(TMP_MARKER))
}

fn is_stale(entry: &DirEntry, now: SystemTime, threshold: Duration) -> bool {
    entry
        .metadata()
        .ok()
        .and_then(|m| m.modified().ok())
        .and_then(|modified| now.duration_since(modified).ok())
        .is_none_or(|age| age > threshold)
}
