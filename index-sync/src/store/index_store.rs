use crate::common::Document;
use crate::errors::IndexSyncResult;
use crate::request::GeoIndexRequest;
use std::ops::Deref;
use std::sync::Arc;

/// Store-side contract for ensuring indexes.
///
/// # Purpose
/// The engine never inspects live index state. It hands every request to an
/// `IndexStore` whose ensure operations create the index when it is missing
/// and do nothing when an equivalent index already exists.
///
/// # Errors
/// Implementations return [crate::errors::ErrorKind::StoreUnavailable] when the
/// store cannot be reached and [crate::errors::ErrorKind::IndexConflict] when it
/// rejects a definition. Timeouts, if any, are the implementation's concern;
/// calls block until the store answers.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`; the engine calls them from whichever
/// thread delivered the mapping notification.
pub trait IndexStore: Send + Sync {
    /// Ensures a regular index described by a key document and an options
    /// document on `collection`.
    fn ensure_index(&self, collection: &str, keys: &Document, options: &Document) -> IndexSyncResult<()>;

    /// Ensures a geospatial index directly on `collection`.
    fn ensure_geo_index(&self, collection: &str, request: &GeoIndexRequest) -> IndexSyncResult<()>;
}

/// Cloneable handle to an [IndexStore] implementation.
///
/// Cloning only bumps a reference count, so the same store can be shared by
/// the engine and every notification thread.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<dyn IndexStore>,
}

impl StoreHandle {
    pub fn new<T: IndexStore + 'static>(inner: T) -> Self {
        StoreHandle {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreHandle {
    type Target = Arc<dyn IndexStore>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
