use crate::common::SyncEventBus;
use crate::errors::IndexSyncResult;
use crate::model::EntityDescriptor;
use anyhow::Error;
use basu::error::BasuError;
use basu::event::Event;
use basu::Handle;
use std::fmt::Debug;
use std::sync::Arc;

/// Notification published by the mapping layer when it discovers a type.
///
/// # Variants
///
/// - **EntityAdded**: a type mapped to the document store; the engine analyses
///   its index declarations
/// - **ForeignEntity**: a type the mapping layer discovered for some other
///   store; the engine ignores it
///
/// Delivery is at-least-once: the same type may be announced several times and
/// from several threads.
#[derive(Debug, Clone, PartialEq)]
pub enum MappingEvent {
    EntityAdded(EntityDescriptor),
    ForeignEntity { type_id: String },
}

impl MappingEvent {
    pub fn type_id(&self) -> &str {
        match self {
            MappingEvent::EntityAdded(entity) => entity.type_id(),
            MappingEvent::ForeignEntity { type_id } => type_id,
        }
    }
}

/// Callable that processes mapping events.
pub trait MappingEventCallback: Send + Sync + Fn(MappingEvent) -> IndexSyncResult<()> {}

impl<F> MappingEventCallback for F where F: Send + Sync + Fn(MappingEvent) -> IndexSyncResult<()> {}

/// A listener for mapping events that wraps a callback.
///
/// Cloning is cheap; the callback sits behind an `Arc`. A failing callback is
/// reported back to the publisher through the bus.
///
/// # Examples
///
/// ```rust
/// use index_sync::engine::{MappingEvent, MappingEventListener};
///
/// let listener = MappingEventListener::new(|event: MappingEvent| {
///     println!("discovered {}", event.type_id());
///     Ok(())
/// });
/// ```
#[derive(Clone)]
pub struct MappingEventListener {
    on_event: Arc<dyn MappingEventCallback>,
}

impl MappingEventListener {
    pub fn new(on_event: impl MappingEventCallback + 'static) -> Self {
        MappingEventListener {
            on_event: Arc::new(on_event),
        }
    }
}

impl Handle<MappingEvent> for MappingEventListener {
    fn handle(&self, event: &Event<MappingEvent>) -> Result<(), BasuError> {
        match (self.on_event)(event.data.clone()) {
            Ok(_) => Ok(()),
            Err(e) => Err(BasuError::HandlerError(Error::from(e))),
        }
    }
}

impl Debug for MappingEventListener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingEventListener").finish()
    }
}

/// Event bus carrying [MappingEvent]s from the mapping layer to the engine.
pub type MappingEventBus = SyncEventBus<MappingEvent, MappingEventListener>;
