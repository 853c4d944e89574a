use crate::errors::IndexSyncError;
use crate::request::NamingAdvisory;

/// A declaration that could not be turned into a request.
#[derive(Debug, Clone)]
pub struct IndexFailure {
    declaration: String,
    error: IndexSyncError,
}

impl IndexFailure {
    pub fn new(declaration: &str, error: IndexSyncError) -> Self {
        IndexFailure {
            declaration: declaration.to_string(),
            error,
        }
    }

    /// Name of the failed declaration, or its raw definition when unnamed.
    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn error(&self) -> &IndexSyncError {
        &self.error
    }
}

/// Outcome of processing one entity type.
///
/// A skipped report means the type had already been claimed by an earlier or
/// concurrent call and nothing was sent to the store.
#[derive(Debug, Clone)]
pub struct SyncReport {
    type_id: String,
    skipped: bool,
    indexes_submitted: usize,
    geo_indexes_submitted: usize,
    advisories: Vec<NamingAdvisory>,
    failures: Vec<IndexFailure>,
}

impl SyncReport {
    pub(crate) fn new(type_id: &str) -> Self {
        SyncReport {
            type_id: type_id.to_string(),
            skipped: false,
            indexes_submitted: 0,
            geo_indexes_submitted: 0,
            advisories: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn skipped(type_id: &str) -> Self {
        SyncReport {
            skipped: true,
            ..SyncReport::new(type_id)
        }
    }

    pub(crate) fn record_index(&mut self) {
        self.indexes_submitted += 1;
    }

    pub(crate) fn record_geo_index(&mut self) {
        self.geo_indexes_submitted += 1;
    }

    pub(crate) fn record_advisory(&mut self, advisory: NamingAdvisory) {
        self.advisories.push(advisory);
    }

    pub(crate) fn record_failure(&mut self, failure: IndexFailure) {
        self.failures.push(failure);
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Regular (simple and compound) indexes handed to the store.
    pub fn indexes_submitted(&self) -> usize {
        self.indexes_submitted
    }

    pub fn geo_indexes_submitted(&self) -> usize {
        self.geo_indexes_submitted
    }

    pub fn total_submitted(&self) -> usize {
        self.indexes_submitted + self.geo_indexes_submitted
    }

    pub fn advisories(&self) -> &[NamingAdvisory] {
        &self.advisories
    }

    pub fn failures(&self) -> &[IndexFailure] {
        &self.failures
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
