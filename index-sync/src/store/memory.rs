use crate::common::{Document, OPTION_NAME};
use crate::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
use crate::request::GeoIndexRequest;
use crate::store::IndexStore;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// An index definition held by [InMemoryIndexStore].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredIndex {
    keys: Document,
    options: Document,
}

impl StoredIndex {
    pub fn keys(&self) -> &Document {
        &self.keys
    }

    pub fn options(&self) -> &Document {
        &self.options
    }

    pub fn name(&self) -> Option<&str> {
        self.options.get(OPTION_NAME).and_then(|name| name.as_str())
    }
}

/// In-memory [IndexStore] keeping index definitions per collection.
///
/// # Purpose
/// A reference implementation of the ensure-index contract, used by tests and
/// by embedders that want to see which indexes a set of entities produces
/// without a live store.
///
/// # Behavior
/// - An identical definition (same keys and options) is a no-op
/// - A different definition reusing an existing name or key pattern is
///   rejected with [ErrorKind::IndexConflict]
/// - While offline every call fails with [ErrorKind::StoreUnavailable]
/// - Every call is counted, successful or not
///
/// # Usage
/// ```rust
/// use index_sync::doc;
/// use index_sync::store::{InMemoryIndexStore, IndexStore};
///
/// let store = InMemoryIndexStore::new();
/// let keys = doc! { email: 1 };
/// let options = doc! { name: "email", dropDups: false, sparse: true, unique: true };
///
/// store.ensure_index("users", &keys, &options).unwrap();
/// store.ensure_index("users", &keys, &options).unwrap();
/// assert_eq!(store.indexes("users").len(), 1);
/// assert_eq!(store.ensure_calls(), 2);
/// ```
#[derive(Clone, Default)]
pub struct InMemoryIndexStore {
    inner: Arc<InMemoryIndexStoreInner>,
}

impl InMemoryIndexStore {
    pub fn new() -> Self {
        InMemoryIndexStore {
            inner: Arc::new(InMemoryIndexStoreInner::new()),
        }
    }

    /// Returns the indexes ensured on a collection, in creation order.
    pub fn indexes(&self, collection: &str) -> Vec<StoredIndex> {
        self.inner
            .collections
            .get(collection)
            .map(|indexes| indexes.value().clone())
            .unwrap_or_default()
    }

    /// Returns the names of all collections holding at least one index, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .collections
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Total number of indexes over all collections.
    pub fn index_count(&self) -> usize {
        self.inner
            .collections
            .iter()
            .map(|entry| entry.value().len())
            .sum()
    }

    /// Number of ensure calls received, including failed ones.
    pub fn ensure_calls(&self) -> usize {
        self.inner.ensure_calls.load(Ordering::SeqCst)
    }

    /// Switches the store between reachable and unreachable.
    pub fn set_online(&self, online: bool) {
        self.inner.online.store(online, Ordering::SeqCst);
    }

    pub fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }
}

impl IndexStore for InMemoryIndexStore {
    fn ensure_index(&self, collection: &str, keys: &Document, options: &Document) -> IndexSyncResult<()> {
        self.inner.ensure(collection, keys, options)
    }

    fn ensure_geo_index(&self, collection: &str, request: &GeoIndexRequest) -> IndexSyncResult<()> {
        self.inner.ensure(collection, request.keys(), request.options())
    }
}

struct InMemoryIndexStoreInner {
    collections: DashMap<String, Vec<StoredIndex>>,
    ensure_calls: AtomicUsize,
    online: AtomicBool,
}

impl Default for InMemoryIndexStoreInner {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndexStoreInner {
    fn new() -> Self {
        InMemoryIndexStoreInner {
            collections: DashMap::new(),
            ensure_calls: AtomicUsize::new(0),
            online: AtomicBool::new(true),
        }
    }

    fn ensure(&self, collection: &str, keys: &Document, options: &Document) -> IndexSyncResult<()> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);

        if !self.online.load(Ordering::SeqCst) {
            return Err(IndexSyncError::new(
                &format!("Store is unreachable, cannot ensure index {} on {}", keys, collection),
                ErrorKind::StoreUnavailable,
            ));
        }

        let name = match options.get(OPTION_NAME).and_then(|name| name.as_str()) {
            Some(name) => name.to_string(),
            None => {
                return Err(IndexSyncError::new(
                    &format!("Index options {} carry no name", options),
                    ErrorKind::InvalidOperation,
                ))
            }
        };

        let candidate = StoredIndex {
            keys: keys.clone(),
            options: options.clone(),
        };

        // the entry guard holds the collection's shard lock until the end of the call
        let mut indexes = self.collections.entry(collection.to_string()).or_default();
        for existing in indexes.iter() {
            if *existing == candidate {
                log::trace!("Index {} already exists on {}", name, collection);
                return Ok(());
            }

            if existing.name() == Some(name.as_str()) {
                return Err(IndexSyncError::new(
                    &format!(
                        "Index with name {} already exists on {} with a different definition",
                        name, collection
                    ),
                    ErrorKind::IndexConflict,
                ));
            }

            if existing.keys == candidate.keys {
                return Err(IndexSyncError::new(
                    &format!(
                        "Index {} on {} duplicates the key pattern {} of index {}",
                        name,
                        collection,
                        keys,
                        existing.name().unwrap_or("")
                    ),
                    ErrorKind::IndexConflict,
                ));
            }
        }

        log::debug!("Created index {} on {} with keys {}", name, collection, keys);
        indexes.push(candidate);
        Ok(())
    }
}
