//! Per-path serialization of file access within one process
//!
//! Config read-modify-write cycles and log appends hold the mutex for their
//! path for the whole operation, so two threads targeting the same file never
//! interleave. Cross-process exclusion is not provided here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

static PATH_LOCKS: LazyLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Mutex shared by every caller that names the same file
pub(crate) fn path_mutex(path: &Path) -> Arc<Mutex<()>> {
    let key = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut locks = PATH_LOCKS.lock().unwrap_or_else(|e| e.into_inner());
    locks.entry(key).or_default().clone()
}

/// Lock a path mutex, recovering from poisoning
///
/// The guarded data is `()`, so a panic in another holder leaves nothing
/// inconsistent behind.
pub(crate) fn acquire(mutex: &Mutex<()>) -> MutexGuard<'_, ()> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
