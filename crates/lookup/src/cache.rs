//! Per-directory cache of parsed project configuration
//!
//! Entries are keyed by the canonical form of the discovered configuration
//! directory and replaced wholesale when the discovered text changes. Two
//! concurrent misses for one directory both parse; the last insert wins.

use crate::connection::LookupConnection;
use dashmap::DashMap;
use malloy_conn_core::{ConfigDocument, DiscoveryResult, Result};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// One parsed project configuration and the lookup built from it
pub struct ConfigCacheEntry {
    pub directory: String,
    pub raw_text: String,
    pub document: Arc<ConfigDocument>,
    pub lookup: Arc<dyn LookupConnection>,
}

/// Counters describing cache behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    /// Number of times configuration text was parsed
    pub parses: u64,
    pub entries: usize,
}

#[derive(Default)]
pub struct ConfigCache {
    entries: DashMap<String, Arc<ConfigCacheEntry>>,
    hits: AtomicU64,
    parses: AtomicU64,
}

impl ConfigCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the entry for the discovered directory, building it with `build`
    /// when absent or when the cached text differs from `found.config_text`.
    ///
    /// A failed build leaves any previous entry in place and is not cached.
    pub fn get_or_build<F>(&self, found: &DiscoveryResult, build: F) -> Result<Arc<ConfigCacheEntry>>
    where
        F: FnOnce(&str) -> Result<(Arc<ConfigDocument>, Arc<dyn LookupConnection>)>,
    {
        let key = canonical_key(&found.config_dir);

        let cached = self.entries.get(&key).map(|entry| Arc::clone(entry.value()));
        if let Some(entry) = cached {
            if entry.raw_text == found.config_text {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!(dir = %key, "Configuration cache hit");
                return Ok(entry);
            }
            debug!(dir = %key, "Configuration text changed, reparsing");
        }

        self.parses.fetch_add(1, Ordering::Relaxed);
        let (document, lookup) = build(&found.config_text)?;
        let entry = Arc::new(ConfigCacheEntry {
            directory: key.clone(),
            raw_text: found.config_text.clone(),
            document,
            lookup,
        });
        self.entries.insert(key, Arc::clone(&entry));
        Ok(entry)
    }

    pub fn get(&self, dir: &Path) -> Option<Arc<ConfigCacheEntry>> {
        self.entries
            .get(&canonical_key(dir))
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            parses: self.parses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}

/// Cache key for a directory: its canonical path when it exists, else as given
pub fn canonical_key(dir: &Path) -> String {
    let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
    canonical.to_string_lossy().into_owned()
}
