use crate::cache::SeenTypeCache;
use crate::common::{Document, SubscriberRef};
use crate::engine::{IndexFailure, MappingEvent, MappingEventBus, MappingEventListener, SyncReport};
use crate::errors::{IndexSyncError, IndexSyncResult};
use crate::model::{EntityDescriptor, PropertyIndex};
use crate::request::{
    build_compound_request, build_geo_request, build_simple_request, naming_advisory, resolve_collection,
    IndexRequest,
};
use crate::store::StoreHandle;
use crate::sync_config::IndexSyncConfig;
use parking_lot::Mutex;
use std::sync::Arc;

/// Keeps a store's indexes in step with the index declarations of mapped types.
///
/// # Purpose
/// For every entity type it learns about, either at construction or through a
/// [MappingEvent], the engine reads the type's compound, simple and geospatial
/// index declarations and asks the store to ensure each of them exists. The
/// engine never drops or modifies an index and never inspects live index state.
///
/// # Characteristics
/// - **At most once per type**: a shared [SeenTypeCache] is claimed atomically
///   before any work, so a type announced repeatedly or concurrently is
///   analysed once
/// - **Ordered submission**: compound indexes first, in declaration order,
///   then property indexes in property order
/// - **Partial failure**: a malformed compound definition is logged and
///   recorded in the [SyncReport] while the remaining declarations are still
///   submitted; a store failure stops processing of the type and is returned
///   to the caller
/// - **Cheap to clone**: clones share the store, cache and configuration
///
/// # Usage
/// ```rust
/// use index_sync::engine::IndexSyncEngine;
/// use index_sync::model::{EntityDescriptor, PropertyDescriptor, SimpleIndexDeclaration};
/// use index_sync::store::{InMemoryIndexStore, StoreHandle};
///
/// let store = InMemoryIndexStore::new();
/// let user = EntityDescriptor::new("app::User")
///     .with_collection("users")
///     .with_property(PropertyDescriptor::new("id"))
///     .with_property(PropertyDescriptor::new("email").indexed(
///         SimpleIndexDeclaration::new().with_unique(true).with_sparse(true),
///     ));
///
/// let engine = IndexSyncEngine::new(StoreHandle::new(store.clone()), vec![user]).unwrap();
/// assert!(engine.seen_cache().has_been_processed("app::User"));
/// assert_eq!(store.indexes("users").len(), 1);
/// ```
#[derive(Clone)]
pub struct IndexSyncEngine {
    inner: Arc<IndexSyncEngineInner>,
}

impl IndexSyncEngine {
    /// Creates an engine with a fresh cache and default configuration and
    /// processes `entities` in order.
    ///
    /// The first store failure aborts construction and is returned.
    pub fn new(store: StoreHandle, entities: Vec<EntityDescriptor>) -> IndexSyncResult<Self> {
        let engine = Self::create(store, SeenTypeCache::new(), IndexSyncConfig::default());
        engine.initialize(&entities)?;
        Ok(engine)
    }

    pub(crate) fn create(store: StoreHandle, seen_cache: SeenTypeCache, config: IndexSyncConfig) -> Self {
        IndexSyncEngine {
            inner: Arc::new(IndexSyncEngineInner {
                store,
                seen_cache,
                config,
                subscription: Mutex::new(None),
            }),
        }
    }

    /// Processes the initial set of entity types, one after the other.
    pub(crate) fn initialize(&self, entities: &[EntityDescriptor]) -> IndexSyncResult<()> {
        log::debug!("Bootstrapping indexes for {} entity types", entities.len());
        for entity in entities {
            self.process_entity(entity)?;
        }
        Ok(())
    }

    /// Analyses one entity type and ensures all of its declared indexes.
    ///
    /// Returns a skipped report when the type was already claimed. On a store
    /// failure the claim is released or kept according to
    /// [IndexSyncConfig::retry_failed_types] and the error is returned.
    pub fn process_entity(&self, entity: &EntityDescriptor) -> IndexSyncResult<SyncReport> {
        self.inner.process_entity(entity)
    }

    /// Reacts to a mapping notification.
    ///
    /// Entities of other stores are ignored and yield `Ok(None)`.
    pub fn on_entity_discovered(&self, event: &MappingEvent) -> IndexSyncResult<Option<SyncReport>> {
        match event {
            MappingEvent::EntityAdded(entity) => self.process_entity(entity).map(Some),
            MappingEvent::ForeignEntity { type_id } => {
                log::trace!("Ignoring {} as it is not mapped to this store", type_id);
                Ok(None)
            }
        }
    }

    /// Hands a single index request to the store.
    pub fn ensure_index(&self, collection: &str, keys: &Document, options: &Document) -> IndexSyncResult<()> {
        self.inner.submit(&IndexRequest::new(collection, keys.clone(), options.clone()))
    }

    /// Registers this engine as a listener on `bus`.
    ///
    /// The returned reference can be passed to [MappingEventBus::deregister].
    pub fn subscribe(&self, bus: &MappingEventBus) -> IndexSyncResult<SubscriberRef> {
        let engine = self.clone();
        bus.register(MappingEventListener::new(move |event: MappingEvent| {
            engine.on_entity_discovered(&event).map(|_| ())
        }))
    }

    pub(crate) fn attach(&self, bus: &MappingEventBus) -> IndexSyncResult<()> {
        let subscriber = self.subscribe(bus)?;
        *self.inner.subscription.lock() = Some(subscriber);
        Ok(())
    }

    /// Removes the subscription made when the engine was built with an event
    /// bus. Does nothing if there is none.
    pub fn detach(&self, bus: &MappingEventBus) -> IndexSyncResult<()> {
        let subscriber = self.inner.subscription.lock().take();
        match subscriber {
            Some(subscriber) => bus.deregister(subscriber),
            None => Ok(()),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.inner.subscription.lock().is_some()
    }

    pub fn seen_cache(&self) -> &SeenTypeCache {
        &self.inner.seen_cache
    }

    pub fn config(&self) -> &IndexSyncConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &StoreHandle {
        &self.inner.store
    }
}

struct IndexSyncEngineInner {
    store: StoreHandle,
    seen_cache: SeenTypeCache,
    config: IndexSyncConfig,
    subscription: Mutex<Option<SubscriberRef>>,
}

impl IndexSyncEngineInner {
    fn process_entity(&self, entity: &EntityDescriptor) -> IndexSyncResult<SyncReport> {
        let type_id = entity.type_id();

        // Use RAII pattern for the type claim
        struct ClaimGuard<'a> {
            cache: &'a SeenTypeCache,
            type_id: &'a str,
            completed: bool,
        }

        impl<'a> ClaimGuard<'a> {
            fn complete(&mut self) {
                self.cache.mark_processed(self.type_id);
                self.completed = true;
            }
        }

        impl<'a> Drop for ClaimGuard<'a> {
            fn drop(&mut self) {
                if !self.completed {
                    self.cache.release(self.type_id);
                }
            }
        }

        if !self.seen_cache.try_claim(type_id) {
            log::trace!("Type {} has already been analyzed, skipping", type_id);
            return Ok(SyncReport::skipped(type_id));
        }

        let mut guard = ClaimGuard {
            cache: &self.seen_cache,
            type_id,
            completed: false,
        };

        log::debug!("Analyzing type {} for index information", type_id);
        match self.create_indexes(entity) {
            Ok(report) => {
                guard.complete();
                Ok(report)
            }
            Err(err) => {
                if self.config.retry_failed_types() {
                    log::error!("Failed to sync indexes of {}, it will be retried: {}", type_id, err);
                } else {
                    log::error!("Failed to sync indexes of {}: {}", type_id, err);
                    guard.complete();
                }
                Err(err)
            }
        }
    }

    fn create_indexes(&self, entity: &EntityDescriptor) -> IndexSyncResult<SyncReport> {
        let mut report = SyncReport::new(entity.type_id());

        for declaration in entity.compound_indexes() {
            match build_compound_request(entity, declaration) {
                Ok(request) => {
                    self.submit(&request)?;
                    report.record_index();
                }
                Err(err) => {
                    log::error!(
                        "Skipping compound index {} on {}: {}",
                        declaration.definition(),
                        entity.type_id(),
                        err
                    );
                    let label = declaration.name().unwrap_or(declaration.definition());
                    report.record_failure(IndexFailure::new(label, err));
                }
            }
        }

        for property in entity.properties() {
            match property.index() {
                PropertyIndex::Simple(declaration) => {
                    if self.config.naming_advisories() {
                        if let Some(advisory) = naming_advisory(entity, declaration, property) {
                            log::warn!("{}", advisory);
                            report.record_advisory(advisory);
                        }
                    }
                    self.submit(&build_simple_request(entity, property, declaration))?;
                    report.record_index();
                }
                PropertyIndex::Geo(declaration) => {
                    let collection = resolve_collection(declaration, entity);
                    let request = build_geo_request(declaration, property);
                    self.store
                        .ensure_geo_index(&collection, &request)
                        .map_err(|err| store_failure(&format!("geo index {}", request), &collection, err))?;
                    log::debug!("Created geo index {} on {}", request, collection);
                    report.record_geo_index();
                }
                PropertyIndex::None => {}
            }
        }

        Ok(report)
    }

    fn submit(&self, request: &IndexRequest) -> IndexSyncResult<()> {
        self.store
            .ensure_index(request.collection(), request.keys(), request.options())
            .map_err(|err| store_failure(&format!("index {}", request.keys()), request.collection(), err))?;
        log::debug!("Created index {} on {}", request.keys(), request.collection());
        Ok(())
    }
}

fn store_failure(what: &str, collection: &str, cause: IndexSyncError) -> IndexSyncError {
    IndexSyncError::new_with_cause(
        &format!("Failed to ensure {} on {}", what, collection),
        cause.kind().clone(),
        cause,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::model::{
        CompoundIndexDeclaration, GeoIndexDeclaration, PropertyDescriptor, SimpleIndexDeclaration,
    };
    use crate::store::{InMemoryIndexStore, IndexStore};
    use crate::request::GeoIndexRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[ctor::ctor]
    fn init() {
        colog::init();
    }

    fn engine_with(store: &InMemoryIndexStore, config: IndexSyncConfig) -> IndexSyncEngine {
        IndexSyncEngine::create(StoreHandle::new(store.clone()), SeenTypeCache::new(), config)
    }

    fn user() -> EntityDescriptor {
        EntityDescriptor::new("app::User")
            .with_collection("users")
            .with_property(PropertyDescriptor::new("id"))
            .with_property(PropertyDescriptor::new("email").indexed(
                SimpleIndexDeclaration::new().with_unique(true).with_sparse(true),
            ))
    }

    #[test]
    fn processes_simple_index() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());

        let report = engine.process_entity(&user()).unwrap();
        assert!(!report.is_skipped());
        assert_eq!(report.indexes_submitted(), 1);
        assert!(report.advisories().is_empty());

        let indexes = store.indexes("users");
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].keys(), &doc! { email: 1 });
        assert_eq!(
            indexes[0].options(),
            &doc! { name: "email", dropDups: false, sparse: true, unique: true }
        );
        assert!(engine.seen_cache().has_been_processed("app::User"));
    }

    #[test]
    fn second_pass_is_skipped() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        engine.process_entity(&user()).unwrap();
        let report = engine.process_entity(&user()).unwrap();
        assert!(report.is_skipped());
        assert_eq!(store.ensure_calls(), 1);
    }

    #[test]
    fn compound_indexes_come_first() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let entity = EntityDescriptor::new("app::Person")
            .with_compound_index(CompoundIndexDeclaration::new("{'last': 1, 'first': -1}"))
            .with_property(PropertyDescriptor::new("age").indexed(SimpleIndexDeclaration::new()));

        engine.process_entity(&entity).unwrap();
        let indexes = store.indexes("person");
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].keys(), &doc! { last: 1, first: (-1) });
        assert_eq!(indexes[1].keys(), &doc! { age: 1 });
    }

    #[test]
    fn malformed_compound_is_recorded_and_skipped() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let entity = EntityDescriptor::new("app::Person")
            .with_compound_index(CompoundIndexDeclaration::new("{ last: ").with_name("broken"))
            .with_property(PropertyDescriptor::new("age").indexed(SimpleIndexDeclaration::new()));

        let report = engine.process_entity(&entity).unwrap();
        assert_eq!(report.indexes_submitted(), 1);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].declaration(), "broken");
        assert_eq!(report.failures()[0].error().kind(), &ErrorKind::ParseError);
        assert!(engine.seen_cache().has_been_processed("app::Person"));
    }

    #[test]
    fn geo_index_goes_to_the_geo_operation() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let entity = EntityDescriptor::new("app::Place").with_property(
            PropertyDescriptor::new("location").geo_indexed(GeoIndexDeclaration::new()),
        );

        let report = engine.process_entity(&entity).unwrap();
        assert_eq!(report.geo_indexes_submitted(), 1);
        let indexes = store.indexes("place");
        assert_eq!(indexes[0].keys(), &doc! { location: "2d" });
        assert_eq!(
            indexes[0].options(),
            &doc! { name: "location", min: (-180), max: 180 }
        );
    }

    #[test]
    fn advisory_is_reported_but_index_created() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let entity = EntityDescriptor::new("app::Account").with_property(
            PropertyDescriptor::new("login")
                .indexed(SimpleIndexDeclaration::new().with_name("login_idx").with_unique(true)),
        );

        let report = engine.process_entity(&entity).unwrap();
        assert_eq!(report.advisories().len(), 1);
        assert_eq!(report.advisories()[0].index_name(), "login_idx");
        assert_eq!(store.indexes("account")[0].name(), Some("login_idx"));
    }

    #[test]
    fn advisories_can_be_disabled() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::new().with_naming_advisories(false));
        let entity = EntityDescriptor::new("app::Account").with_property(
            PropertyDescriptor::new("login")
                .indexed(SimpleIndexDeclaration::new().with_name("login_idx").with_unique(true)),
        );

        let report = engine.process_entity(&entity).unwrap();
        assert!(report.advisories().is_empty());
        assert_eq!(report.indexes_submitted(), 1);
    }

    #[test]
    fn store_failure_releases_claim_when_retrying() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        store.set_online(false);

        let err = engine.process_entity(&user()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::StoreUnavailable);
        assert!(err.cause().is_some());
        assert!(!engine.seen_cache().is_claimed("app::User"));

        store.set_online(true);
        let report = engine.process_entity(&user()).unwrap();
        assert_eq!(report.indexes_submitted(), 1);
    }

    #[test]
    fn store_failure_marks_processed_without_retry() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::new().with_retry_failed_types(false));
        store.set_online(false);

        assert!(engine.process_entity(&user()).is_err());
        assert!(engine.seen_cache().has_been_processed("app::User"));

        store.set_online(true);
        assert!(engine.process_entity(&user()).unwrap().is_skipped());
        assert_eq!(store.index_count(), 0);
    }

    #[test]
    fn foreign_entities_are_ignored() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let event = MappingEvent::ForeignEntity {
            type_id: "graph::Node".to_string(),
        };
        assert!(engine.on_entity_discovered(&event).unwrap().is_none());
        assert!(engine.seen_cache().is_empty());
        assert_eq!(store.ensure_calls(), 0);
    }

    #[test]
    fn entity_added_event_is_processed() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let report = engine
            .on_entity_discovered(&MappingEvent::EntityAdded(user()))
            .unwrap()
            .unwrap();
        assert_eq!(report.type_id(), "app::User");
        assert_eq!(store.index_count(), 1);
    }

    #[test]
    fn new_bootstraps_entities_in_order() {
        let store = InMemoryIndexStore::new();
        let other = EntityDescriptor::new("app::Order")
            .with_property(PropertyDescriptor::new("total").indexed(SimpleIndexDeclaration::new()));
        let engine = IndexSyncEngine::new(StoreHandle::new(store.clone()), vec![user(), other]).unwrap();

        assert_eq!(store.collections(), vec!["order".to_string(), "users".to_string()]);
        assert_eq!(engine.seen_cache().len(), 2);
    }

    #[test]
    fn ensure_index_delegates_to_store() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        engine
            .ensure_index("logs", &doc! { at: (-1) }, &doc! { name: "at" })
            .unwrap();
        assert_eq!(store.indexes("logs")[0].name(), Some("at"));
    }

    struct PanickingStore {
        calls: AtomicUsize,
    }

    impl IndexStore for PanickingStore {
        fn ensure_index(&self, _: &str, _: &Document, _: &Document) -> IndexSyncResult<()> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("driver crashed");
            }
            Ok(())
        }

        fn ensure_geo_index(&self, _: &str, _: &GeoIndexRequest) -> IndexSyncResult<()> {
            Ok(())
        }
    }

    #[test]
    fn panicking_store_does_not_leave_claim_behind() {
        let engine = IndexSyncEngine::create(
            StoreHandle::new(PanickingStore {
                calls: AtomicUsize::new(0),
            }),
            SeenTypeCache::new(),
            IndexSyncConfig::default(),
        );

        let cloned = engine.clone();
        let outcome = std::thread::spawn(move || cloned.process_entity(&user())).join();
        assert!(outcome.is_err());
        assert!(!engine.seen_cache().is_claimed("app::User"));
        assert!(engine.process_entity(&user()).is_ok());
    }

    #[test]
    fn subscribe_and_detach() {
        let store = InMemoryIndexStore::new();
        let engine = engine_with(&store, IndexSyncConfig::default());
        let bus = MappingEventBus::new();

        engine.attach(&bus).unwrap();
        assert!(engine.is_attached());
        assert!(bus.has_listeners());

        engine.detach(&bus).unwrap();
        assert!(!engine.is_attached());
        assert!(engine.detach(&bus).is_ok());
    }
}
