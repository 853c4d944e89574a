//! # Index Sync - Declarative Index Synchronization
//!
//! Keeps the indexes of a document store in step with the index declarations
//! of mapped entity types. Each type is analysed at most once; its compound,
//! simple and geospatial declarations are turned into ensure-index requests
//! and handed to the store.
//!
//! ## Quick Start
//!
//! ```rust
//! use index_sync::doc;
//! use index_sync::engine::{MappingEvent, MappingEventBus};
//! use index_sync::model::{EntityDescriptor, PropertyDescriptor, SimpleIndexDeclaration};
//! use index_sync::store::InMemoryIndexStore;
//! use index_sync::sync_builder::IndexSyncBuilder;
//!
//! let store = InMemoryIndexStore::new();
//! let bus = MappingEventBus::new();
//! let engine = IndexSyncBuilder::new()
//!     .store(store.clone())
//!     .event_bus(&bus)
//!     .build()
//!     .unwrap();
//!
//! let user = EntityDescriptor::new("app::User")
//!     .with_collection("users")
//!     .with_property(PropertyDescriptor::new("email").indexed(
//!         SimpleIndexDeclaration::new().with_unique(true).with_sparse(true),
//!     ));
//!
//! let report = engine.on_entity_discovered(&MappingEvent::EntityAdded(user)).unwrap();
//! assert_eq!(report.map(|r| r.indexes_submitted()), Some(1));
//! assert_eq!(store.indexes("users")[0].keys(), &doc! { email: 1 });
//! ```
//!
//! ## Module Organization
//!
//! - [`cache`] - The seen-type cache guarding against repeated analysis
//! - [`common`] - Documents, values, index direction and the event bus
//! - [`engine`] - The engine, mapping events and sync reports
//! - [`errors`] - Error types and result definitions
//! - [`model`] - Entity, property and index declarations
//! - [`request`] - Translation of declarations into store requests
//! - [`store`] - The store contract and an in-memory implementation
//! - [`sync_builder`] - Engine builder
//! - [`sync_config`] - Engine options

pub mod cache;
pub mod common;
pub mod engine;
pub mod errors;
pub mod model;
pub mod request;
pub mod store;
pub mod sync_builder;
pub mod sync_config;

pub use cache::SeenTypeCache;
pub use engine::{IndexSyncEngine, MappingEvent, MappingEventBus, SyncReport};
pub use errors::{ErrorKind, IndexSyncError, IndexSyncResult};
pub use sync_builder::IndexSyncBuilder;
pub use sync_config::IndexSyncConfig;
