use crate::cache::SeenTypeCache;
use crate::engine::{IndexSyncEngine, MappingEventBus};
use crate::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
use crate::model::EntityDescriptor;
use crate::store::{IndexStore, StoreHandle};
use crate::sync_config::IndexSyncConfig;

/// Builder for creating and wiring an [IndexSyncEngine].
///
/// `IndexSyncBuilder` collects the store, the initial entity types, an
/// optional event bus and the configuration before the engine is built. It
/// captures configuration errors and reports the first one from
/// [IndexSyncBuilder::build].
///
/// Building processes the initial entity types in the order they were added,
/// then, if a bus was given, subscribes the engine to it exactly once.
///
/// # Examples
///
/// ```rust
/// use index_sync::engine::MappingEventBus;
/// use index_sync::model::{EntityDescriptor, PropertyDescriptor, SimpleIndexDeclaration};
/// use index_sync::store::InMemoryIndexStore;
/// use index_sync::sync_builder::IndexSyncBuilder;
///
/// let store = InMemoryIndexStore::new();
/// let bus = MappingEventBus::new();
///
/// let engine = IndexSyncBuilder::new()
///     .store(store.clone())
///     .entity(EntityDescriptor::new("app::Order").with_property(
///         PropertyDescriptor::new("total").indexed(SimpleIndexDeclaration::new()),
///     ))
///     .event_bus(&bus)
///     .build()
///     .unwrap();
///
/// assert!(engine.is_attached());
/// assert_eq!(store.indexes("order").len(), 1);
/// ```
#[derive(Default)]
pub struct IndexSyncBuilder {
    error: Option<IndexSyncError>,
    store: Option<StoreHandle>,
    seen_cache: Option<SeenTypeCache>,
    entities: Vec<EntityDescriptor>,
    event_bus: Option<MappingEventBus>,
    config: IndexSyncConfig,
}

impl IndexSyncBuilder {
    pub fn new() -> Self {
        IndexSyncBuilder {
            error: None,
            store: None,
            seen_cache: None,
            entities: Vec::new(),
            event_bus: None,
            config: IndexSyncConfig::new(),
        }
    }

    /// Sets the store that receives every index request.
    ///
    /// Setting a second store is an error.
    pub fn store<T: IndexStore + 'static>(self, store: T) -> Self {
        self.store_handle(StoreHandle::new(store))
    }

    /// Same as [IndexSyncBuilder::store] for an already shared handle.
    pub fn store_handle(mut self, store: StoreHandle) -> Self {
        if self.store.is_some() {
            self.capture(IndexSyncError::new(
                "Index store has already been configured",
                ErrorKind::InvalidOperation,
            ));
        } else {
            self.store = Some(store);
        }
        self
    }

    /// Uses an existing cache instead of a fresh one, e.g. to share the seen
    /// types between engines of the same store.
    pub fn seen_cache(mut self, seen_cache: SeenTypeCache) -> Self {
        self.seen_cache = Some(seen_cache);
        self
    }

    /// Adds an entity type to process at build time.
    pub fn entity(mut self, entity: EntityDescriptor) -> Self {
        if entity.type_id().trim().is_empty() {
            self.capture(IndexSyncError::new(
                "Entity type id cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        } else {
            self.entities.push(entity);
        }
        self
    }

    pub fn entities<I: IntoIterator<Item = EntityDescriptor>>(self, entities: I) -> Self {
        entities.into_iter().fold(self, |builder, entity| builder.entity(entity))
    }

    /// Subscribes the built engine to mapping notifications on `bus`.
    pub fn event_bus(mut self, bus: &MappingEventBus) -> Self {
        self.event_bus = Some(bus.clone());
        self
    }

    pub fn retry_failed_types(mut self, retry: bool) -> Self {
        self.config = self.config.with_retry_failed_types(retry);
        self
    }

    pub fn naming_advisories(mut self, enabled: bool) -> Self {
        self.config = self.config.with_naming_advisories(enabled);
        self
    }

    pub fn config(mut self, config: IndexSyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the engine, processes the initial entity types and subscribes
    /// to the event bus if one was given.
    ///
    /// # Errors
    ///
    /// - The first error captured while configuring the builder
    /// - [ErrorKind::InvalidOperation] if no store was set
    /// - The first store failure raised while processing the initial types
    pub fn build(self) -> IndexSyncResult<IndexSyncEngine> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let store = match self.store {
            Some(store) => store,
            None => {
                return Err(IndexSyncError::new(
                    "An index store is required to build the engine",
                    ErrorKind::InvalidOperation,
                ))
            }
        };

        log::debug!("Building index sync engine with {}", self.config);
        let engine = IndexSyncEngine::create(store, self.seen_cache.unwrap_or_default(), self.config);
        engine.initialize(&self.entities)?;

        if let Some(bus) = &self.event_bus {
            engine.attach(bus)?;
        }
        Ok(engine)
    }

    fn capture(&mut self, err: IndexSyncError) {
        log::error!("Invalid index sync configuration: {}", err);
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
