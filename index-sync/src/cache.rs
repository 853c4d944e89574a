use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeState {
    InProgress,
    Processed,
}

/// Records which entity types have already been analysed.
///
/// # Purpose
/// Guarantees that each entity type is processed at most once for the
/// lifetime of the cache, even when notifications for the same type arrive
/// concurrently on several threads.
///
/// # Characteristics
/// - **Atomic claim**: [`SeenTypeCache::try_claim`] inserts an in-progress
///   placeholder with a single get-or-insert, so exactly one of several
///   concurrent callers wins the right to process a type
/// - **Append only**: processed types are never forgotten; only an in-progress
///   claim can be released
/// - **Shared**: clones share the same state, so one cache can be handed to
///   the engine and inspected from outside
///
/// # Usage
/// ```rust
/// use index_sync::cache::SeenTypeCache;
///
/// let cache = SeenTypeCache::new();
/// assert!(cache.try_claim("app::User"));
/// assert!(!cache.try_claim("app::User"));
/// assert!(!cache.has_been_processed("app::User"));
///
/// cache.mark_processed("app::User");
/// assert!(cache.has_been_processed("app::User"));
/// ```
#[derive(Clone, Default)]
pub struct SeenTypeCache {
    types: Arc<DashMap<String, TypeState>>,
}

impl SeenTypeCache {
    pub fn new() -> Self {
        SeenTypeCache {
            types: Arc::new(DashMap::new()),
        }
    }

    /// Returns true once `mark_processed` has completed for the type.
    pub fn has_been_processed(&self, type_id: &str) -> bool {
        matches!(
            self.types.get(type_id).map(|state| *state),
            Some(TypeState::Processed)
        )
    }

    /// Returns true if the type is being processed or already was.
    pub fn is_claimed(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Claims the type for processing.
    ///
    /// Returns `true` for exactly one caller per type; every other caller,
    /// concurrent or later, gets `false` until the claim is released.
    pub fn try_claim(&self, type_id: &str) -> bool {
        match self.types.entry(type_id.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(TypeState::InProgress);
                true
            }
        }
    }

    /// Marks the type as processed.
    pub fn mark_processed(&self, type_id: &str) {
        self.types.insert(type_id.to_string(), TypeState::Processed);
    }

    /// Drops an in-progress claim so the type can be processed again.
    ///
    /// A type that is already marked processed stays processed.
    pub fn release(&self, type_id: &str) {
        self.types
            .remove_if(type_id, |_, state| *state == TypeState::InProgress);
    }

    /// Number of claimed or processed types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
