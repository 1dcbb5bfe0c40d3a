//! Directory presence cache.
//!
//! Every base directory gets an in-memory snapshot of the files beneath it.
//! Snapshots are re-validated at most once per staleness window by comparing
//! the base directory's own modification time, and only re-walked when it
//! changed.

use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime};

/// How long a snapshot is trusted before the base directory is stat'ed again.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(5);

struct DirSnapshot {
    /// Every non-directory path beneath the base directory.
    files: HashSet<PathBuf>,
    /// Modification time of the base directory itself.
    mtime: SystemTime,
    validated_at: Instant,
}

type Slot = Arc<RwLock<Option<DirSnapshot>>>;

/// Answers "does this file exist" from per-base-directory snapshots.
pub struct PresenceCache {
    stale_after: Duration,
    /// One lock per base directory, so refreshing one never blocks another.
    dirs: RwLock<HashMap<PathBuf, Slot>>,
    walks: AtomicUsize,
}

impl PresenceCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            stale_after,
            dirs: RwLock::new(HashMap::new()),
            walks: AtomicUsize::new(0),
        }
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Check whether `path` (which must live under `base_dir`) exists.
    pub fn exists(&self, base_dir: &Path, path: &Path) -> bool {
        let found = self.with_snapshot(base_dir, |snapshot| {
            snapshot.is_some_and(|s| s.files.contains(path))
        });
        trace!("probe {} -> {}", path.display(), found);
        found
    }

    /// Make sure `base_dir` has a fresh snapshot. Returns false if the
    /// directory does not exist.
    pub fn warm(&self, base_dir: &Path) -> bool {
        self.with_snapshot(base_dir, |snapshot| snapshot.is_some())
    }

    /// Number of full recursive walks performed so far.
    pub fn walk_count(&self) -> usize {
        self.walks.load(Ordering::Relaxed)
    }

    /// Whether a snapshot is currently held for `base_dir`.
    pub fn is_cached(&self, base_dir: &Path) -> bool {
        let slot = {
            let dirs = self.dirs.read().unwrap_or_else(PoisonError::into_inner);
            dirs.get(base_dir).cloned()
        };
        slot.is_some_and(|slot| {
            slot.read()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    fn with_snapshot<R>(&self, base_dir: &Path, f: impl FnOnce(Option<&DirSnapshot>) -> R) -> R {
        let slot = self.slot(base_dir);

        {
            let guard = slot.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(snapshot) = guard.as_ref() {
                if snapshot.validated_at.elapsed() < self.stale_after {
                    return f(Some(snapshot));
                }
            }
        }

        let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
        self.revalidate(base_dir, &mut guard);
        let result = f(guard.as_ref());

        if guard.is_none() {
            drop(guard);
            self.evict(base_dir, &slot);
        }
        result
    }

    fn slot(&self, base_dir: &Path) -> Slot {
        {
            let dirs = self.dirs.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = dirs.get(base_dir) {
                return slot.clone();
            }
        }

        let mut dirs = self.dirs.write().unwrap_or_else(PoisonError::into_inner);
        dirs.entry(base_dir.to_path_buf())
            .or_insert_with(|| Arc::new(RwLock::new(None)))
            .clone()
    }

    /// Called with the slot's write lock held.
    fn revalidate(&self, base_dir: &Path, snapshot: &mut Option<DirSnapshot>) {
        // Another caller may have refreshed while we waited for the lock.
        if let Some(current) = snapshot.as_ref() {
            if current.validated_at.elapsed() < self.stale_after {
                return;
            }
        }

        let mtime = match fs::metadata(base_dir).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                if snapshot.take().is_some() {
                    debug!("Dropping snapshot of {}: {}", base_dir.display(), e);
                }
                return;
            }
        };

        match snapshot.as_mut() {
            Some(current) if current.mtime == mtime => {
                current.validated_at = Instant::now();
            }
            _ => {
                let files = self.walk(base_dir);
                *snapshot = Some(DirSnapshot {
                    files,
                    mtime,
                    validated_at: Instant::now(),
                });
            }
        }
    }

    fn walk(&self, base_dir: &Path) -> HashSet<PathBuf> {
        self.walks.fetch_add(1, Ordering::Relaxed);

        let files: HashSet<PathBuf> = walkdir::WalkDir::new(base_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| !e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        debug!("Indexed {} files under {}", files.len(), base_dir.display());
        files
    }

    fn evict(&self, base_dir: &Path, slot: &Slot) {
        let mut dirs = self.dirs.write().unwrap_or_else(PoisonError::into_inner);
        let still_empty = dirs.get(base_dir).is_some_and(|current| {
            Arc::ptr_eq(current, slot)
                && current
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_none()
        });
        if still_empty {
            dirs.remove(base_dir);
        }
    }
}

impl Default for PresenceCache {
    fn default() -> Self {
        Self::new(DEFAULT_STALE_AFTER)
    }
}
