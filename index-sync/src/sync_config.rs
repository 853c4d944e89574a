use std::fmt::Display;

/// Runtime options for an [crate::engine::IndexSyncEngine].
///
/// # Options
///
/// - **retry_failed_types** (default `true`): when a store submission fails
///   the type's claim is dropped, so a later notification for the same type
///   analyses it again. When `false` the type is marked processed anyway and
///   never retried for the lifetime of the cache.
/// - **naming_advisories** (default `true`): whether a simple index whose
///   explicit name differs from its property name is reported as a naming
///   advisory (logged at warn level and listed in the [crate::engine::SyncReport]).
///
/// # Examples
///
/// ```rust
/// use index_sync::sync_config::IndexSyncConfig;
///
/// let config = IndexSyncConfig::new().with_retry_failed_types(false);
/// assert!(!config.retry_failed_types());
/// assert!(config.naming_advisories());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSyncConfig {
    retry_failed_types: bool,
    naming_advisories: bool,
}

impl Default for IndexSyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSyncConfig {
    pub fn new() -> Self {
        IndexSyncConfig {
            retry_failed_types: true,
            naming_advisories: true,
        }
    }

    pub fn with_retry_failed_types(mut self, retry: bool) -> Self {
        self.retry_failed_types = retry;
        self
    }

    pub fn with_naming_advisories(mut self, enabled: bool) -> Self {
        self.naming_advisories = enabled;
        self
    }

    pub fn retry_failed_types(&self) -> bool {
        self.retry_failed_types
    }

    pub fn naming_advisories(&self) -> bool {
        self.naming_advisories
    }
}

impl Display for IndexSyncConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IndexSyncConfig(retry_failed_types={}, naming_advisories={})",
            self.retry_failed_types, self.naming_advisories
        )
    }
}
