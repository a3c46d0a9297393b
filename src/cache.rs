//! Memoisation of parsed manifests keyed by file path.
//!
//! Manifests are static for a deployment, so entries are never evicted implicitly. Each key owns
//! its own lock: concurrent first access to one manifest parses it once while lookups for other
//! manifests proceed independently. Failed loads are not cached. Invalidation empties a slot
//! under its lock rather than removing it, so it waits for an in-flight load of the same key and
//! never lets a second load of that key start alongside it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::ManifestResult;
use crate::manifest::{FileReader, FsReader, Manifest};

type Slot = Arc<Mutex<Option<Arc<Manifest>>>>;

/// Cache of parsed manifests shared by all lookups of a process.
#[derive(Debug, Default)]
pub struct ManifestCache<R = FsReader> {
    reader: R,
    entries: DashMap<PathBuf, Slot>,
}

impl<R: FileReader> ManifestCache<R> {
    /// Create an empty cache reading manifests through `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            entries: DashMap::new(),
        }
    }

    /// Reader used to load manifests.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Return the cached manifest for `path`, loading and parsing it on first access.
    pub fn get_or_load(&self, path: &Path) -> ManifestResult<Arc<Manifest>> {
        let key = self.reader.canonicalize(path);
        let slot = self.entries.entry(key).or_default().clone();

        let mut guard = slot.lock();
        if let Some(manifest) = guard.as_ref() {
            debug!(path = %path.display(), "manifest cache hit");
            return Ok(Arc::clone(manifest));
        }

        debug!(path = %path.display(), "manifest cache miss");
        let manifest = Arc::new(Manifest::load_with(&self.reader, path)?);
        *guard = Some(Arc::clone(&manifest));
        Ok(manifest)
    }

    /// Drop the cached manifest for `path`. Returns true when a loaded manifest was dropped.
    pub fn invalidate(&self, path: &Path) -> bool {
        let key = self.reader.canonicalize(path);
        let Some(slot) = self.entries.get(&key).map(|entry| Arc::clone(entry.value())) else {
            return false;
        };
        slot.lock().take().is_some()
    }

    /// Drop every cached manifest.
    pub fn clear(&self) {
        let slots: Vec<Slot> = self
            .entries
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for slot in slots {
            slot.lock().take();
        }
    }

    /// Number of successfully loaded manifests.
    pub fn len(&self) -> usize {
        self
            .entries
            .iter()
            .filter(|entry| entry.value().lock().is_some())
            .count()
    }

    /// Whether no manifest has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
