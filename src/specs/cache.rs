//! Lazily loaded, explicitly reloadable spec holder.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use super::{load, SpecDocument};

/// Caches one spec for the lifetime of its owner.
///
/// The first [`get`](Self::get) loads the spec; later calls share the same
/// `Arc` until [`reload`](Self::reload) re-reads it.
#[derive(Debug)]
pub struct SpecCache<T> {
    override_path: Option<PathBuf>,
    slot: RwLock<Option<Arc<T>>>,
}

impl<T: SpecDocument> SpecCache<T> {
    pub fn new(override_path: Option<PathBuf>) -> Self {
        Self {
            override_path,
            slot: RwLock::new(None),
        }
    }

    pub fn override_path(&self) -> Option<&Path> {
        self.override_path.as_deref()
    }

    /// The cached spec, loading it on first use.
    pub fn get(&self) -> Arc<T> {
        {
            let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
            if let Some(spec) = slot.as_ref() {
                return Arc::clone(spec);
            }
        }

        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have loaded it while we waited for the lock
        if let Some(spec) = slot.as_ref() {
            return Arc::clone(spec);
        }
        let spec = Arc::new(load::<T>(self.override_path.as_deref()));
        *slot = Some(Arc::clone(&spec));
        spec
    }

    /// Re-read the spec and replace the cached copy.
    pub fn reload(&self) -> Arc<T> {
        let spec = Arc::new(load::<T>(self.override_path.as_deref()));
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::clone(&spec));
        spec
    }

    /// Whether a spec has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}
