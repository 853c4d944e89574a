use index_sync::engine::{IndexSyncEngine, MappingEventBus};
use index_sync::errors::IndexSyncResult;
use index_sync::model::{
    CompoundIndexDeclaration, EntityDescriptor, GeoIndexDeclaration, PropertyDescriptor, SimpleIndexDeclaration,
};
use index_sync::store::InMemoryIndexStore;
use index_sync::sync_builder::IndexSyncBuilder;
use std::backtrace::Backtrace;
use std::thread;
use std::time::{Duration, Instant};

/// Runs a test with retry logic and error handling.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> IndexSyncResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> IndexSyncResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> IndexSyncResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 2;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx).map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    eprintln!("Backtrace:\n{}", bt);
                }
                e
            }
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("Error: {}", error);
            thread::sleep(Duration::from_millis(50 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// A fresh in-memory store and mapping event bus shared by one test.
#[derive(Clone)]
pub struct TestContext {
    store: InMemoryIndexStore,
    bus: MappingEventBus,
}

impl TestContext {
    pub fn new(store: InMemoryIndexStore, bus: MappingEventBus) -> Self {
        Self { store, bus }
    }

    pub fn store(&self) -> InMemoryIndexStore {
        self.store.clone()
    }

    pub fn bus(&self) -> MappingEventBus {
        self.bus.clone()
    }

    /// Builds an engine over this context's store, bootstrapped with
    /// `entities` and subscribed to the bus.
    pub fn engine(&self, entities: Vec<EntityDescriptor>) -> IndexSyncResult<IndexSyncEngine> {
        IndexSyncBuilder::new()
            .store(self.store.clone())
            .entities(entities)
            .event_bus(&self.bus)
            .build()
    }
}

pub fn create_test_context() -> IndexSyncResult<TestContext> {
    Ok(TestContext::new(InMemoryIndexStore::new(), MappingEventBus::new()))
}

pub fn cleanup(ctx: TestContext) -> IndexSyncResult<()> {
    ctx.bus.close()
}

pub fn wait_for<F: Fn() -> bool>(timeout_ms: u64, check: F) {
    awaitility::at_most(Duration::from_millis(timeout_ms)).until(check);
}

/// `User` mapped to `users`: an unindexed `id` and a unique, sparse `email`.
pub fn user_entity() -> EntityDescriptor {
    EntityDescriptor::new("app::model::User")
        .with_collection("users")
        .with_property(PropertyDescriptor::new("id"))
        .with_property(PropertyDescriptor::new("email").indexed(
            SimpleIndexDeclaration::new().with_unique(true).with_sparse(true),
        ))
}

/// `Person` with two compound indexes, two simple indexes and a geo index.
pub fn person_entity() -> EntityDescriptor {
    EntityDescriptor::new("app::model::Person")
        .with_compound_index(CompoundIndexDeclaration::new(r#"{"lastName": 1, "firstName": 1}"#).with_name("full_name"))
        .with_compound_index(CompoundIndexDeclaration::new(r#"{"age": -1, "city": 1}"#).with_unique(true))
        .with_property(PropertyDescriptor::new("firstName"))
        .with_property(PropertyDescriptor::new("lastName"))
        .with_property(PropertyDescriptor::new("ssn").indexed(SimpleIndexDeclaration::new().with_unique(true)))
        .with_property(
            PropertyDescriptor::new("createdAt")
                .with_field_name("created_at")
                .indexed(SimpleIndexDeclaration::new().with_direction(index_sync::common::IndexDirection::Descending)),
        )
        .with_property(PropertyDescriptor::new("home").geo_indexed(GeoIndexDeclaration::new()))
}

/// `Account` whose `login` index is unique, not sparse and renamed.
pub fn account_entity() -> EntityDescriptor {
    EntityDescriptor::new("app::model::Account").with_property(
        PropertyDescriptor::new("login").indexed(
            SimpleIndexDeclaration::new()
                .with_name("account_login")
                .with_unique(true),
        ),
    )
}

/// A family of distinct entity types, each with one simple index.
pub fn numbered_entity(index: usize) -> EntityDescriptor {
    EntityDescriptor::new(&format!("app::generated::Entity{}", index))
        .with_collection(&format!("entity_{}", index))
        .with_property(PropertyDescriptor::new("value").indexed(SimpleIndexDeclaration::new()))
}
