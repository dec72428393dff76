//! Named-query catalog: a YAML file mapping query names to backend
//! expressions, re-read only when its modification time changes.

use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use crate::resolve::CatalogLookup;

/// Point-in-time snapshot of the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySet(BTreeMap<String, String>);

impl QuerySet {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for QuerySet {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl CatalogLookup for QuerySet {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

struct CachedSnapshot {
    modified: SystemTime,
    set: Arc<QuerySet>,
}

/// Catalog file handle with an mtime-keyed snapshot cache. The cache lives
/// inside the value, so independent instances never share state.
pub struct Catalog {
    path: PathBuf,
    cache: Mutex<Option<CachedSnapshot>>,
}

impl Catalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load a snapshot. The file is parsed again only when its mtime moved;
    /// a missing file is an empty catalog, not an error.
    pub fn load(&self) -> anyhow::Result<Arc<QuerySet>> {
        if !self.path.exists() {
            *self.cache.lock().unwrap() = None;
            return Ok(Arc::new(QuerySet::default()));
        }

        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .with_context(|| format!("failed to stat {}", self.path.display()))?;

        let mut cache = self.cache.lock().unwrap();
        if let Some(cached) = cache.as_ref() {
            if cached.modified == modified {
                return Ok(cached.set.clone());
            }
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        // A null document (empty file, comments only) is an empty catalog.
        let queries: BTreeMap<String, String> = if contents.trim().is_empty() {
            BTreeMap::new()
        } else {
            serde_yaml::from_str::<Option<BTreeMap<String, String>>>(&contents)
                .with_context(|| format!("failed to parse {}", self.path.display()))?
                .unwrap_or_default()
        };

        let set = Arc::new(QuerySet(queries));
        tracing::debug!(
            "loaded {} queries from {}",
            set.len(),
            self.path.display()
        );
        *cache = Some(CachedSnapshot {
            modified,
            set: set.clone(),
        });
        Ok(set)
    }
}
