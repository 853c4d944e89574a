use crate::common::MAPPING_EVENT;
use crate::errors::{ErrorKind, IndexSyncError, IndexSyncResult};
use basu::error::BasuError;
use basu::event::Event;
use basu::{EventBus, Handle, HandlerId};
use std::marker::PhantomData;
use std::sync::Arc;

/// Publishes events to registered listeners.
///
/// A thin, cloneable wrapper over a `basu` event bus. The mapping layer owns a
/// bus and publishes a notification for every entity type it discovers;
/// interested components register a listener once and receive every
/// subsequent event.
///
/// # Example
///
/// ```ignore
/// let bus: SyncEventBus<MappingEvent, MappingEventListener> = SyncEventBus::new();
/// let subscriber = bus.register(listener)?;
/// bus.publish(MappingEvent::EntityAdded(entity))?;
/// bus.deregister(subscriber)?;
/// ```
#[derive(Clone)]
pub struct SyncEventBus<E, L> {
    inner: Arc<SyncEventBusInner<E, L>>,
}

impl<E, L> Default for SyncEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E, L> SyncEventBus<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    /// Creates a new event bus instance.
    pub fn new() -> Self {
        SyncEventBus {
            inner: Arc::new(SyncEventBusInner::new()),
        }
    }

    /// Registers an event listener with the bus.
    pub fn register(&self, listener: L) -> IndexSyncResult<SubscriberRef> {
        self.inner.register(listener)
    }

    /// Deregisters a previously registered event listener.
    pub fn deregister(&self, subscriber: SubscriberRef) -> IndexSyncResult<()> {
        self.inner.deregister(subscriber)
    }

    /// Publishes an event to all registered listeners.
    pub fn publish(&self, event: E) -> IndexSyncResult<()> {
        self.inner.publish(event)
    }

    /// Closes the event bus and clears all registered listeners.
    pub fn close(&self) -> IndexSyncResult<()> {
        self.inner.close()
    }

    /// Returns true if there are any registered listeners.
    pub fn has_listeners(&self) -> bool {
        self.inner.has_listeners()
    }
}

/// Handle returned by a registration, used to deregister the listener.
pub struct SubscriberRef {
    pub(crate) inner: HandlerId,
}

impl SubscriberRef {
    pub fn new(inner: HandlerId) -> Self {
        SubscriberRef { inner }
    }
}

struct SyncEventBusInner<E, L> {
    event_bus: EventBus<E>,
    phantom_data: PhantomData<L>,
}

impl<E, L> SyncEventBusInner<E, L>
where
    L: Handle<E> + 'static,
    E: Send + Sync,
{
    fn new() -> Self {
        SyncEventBusInner {
            event_bus: EventBus::new(),
            phantom_data: PhantomData,
        }
    }

    fn register(&self, listener: L) -> IndexSyncResult<SubscriberRef> {
        self.event_bus
            .subscribe(MAPPING_EVENT, Box::new(listener))
            .map(SubscriberRef::new)
            .map_err(Self::sync_error)
    }

    #[inline]
    fn deregister(&self, subscriber: SubscriberRef) -> IndexSyncResult<()> {
        self.event_bus
            .unsubscribe(MAPPING_EVENT, &subscriber.inner)
            .map_err(Self::sync_error)
    }

    #[inline]
    fn publish(&self, event: E) -> IndexSyncResult<()> {
        // nobody listening yet, nothing to deliver
        match self.event_bus.get_handler_count(MAPPING_EVENT) {
            Ok(0) => return Ok(()),
            Ok(_) => {}
            Err(BasuError::EventTypeNotFOUND) => return Ok(()),
            Err(e) => return Err(Self::sync_error(e)),
        }

        let basu_event = Event::new(event);
        self.event_bus
            .publish(MAPPING_EVENT, &basu_event)
            .map_err(Self::sync_error)
    }

    #[inline]
    fn close(&self) -> IndexSyncResult<()> {
        self.event_bus.clear().map_err(Self::sync_error)
    }

    #[inline]
    fn has_listeners(&self) -> bool {
        match self.event_bus.get_handler_count(MAPPING_EVENT) {
            Ok(count) => count > 0,
            Err(BasuError::EventTypeNotFOUND) => false,
            Err(e) => {
                log::warn!("Failed to check listeners: {}, defaulting to false", e);
                false
            }
        }
    }

    fn sync_error(e: BasuError) -> IndexSyncError {
        match e {
            BasuError::EventTypeNotFOUND => IndexSyncError::new(
                "Event bus error: no listener has been registered for mapping events",
                ErrorKind::EventError,
            ),
            BasuError::MutexPoisoned => IndexSyncError::new(
                "Event bus error: internal mutex poisoned",
                ErrorKind::EventError,
            ),
            BasuError::HandlerError(e) => {
                // keep the handler's own error when it is one of ours
                match e.downcast::<IndexSyncError>() {
                    Ok(cause) => IndexSyncError::new_with_cause(
                        &format!("Event handler error: {}", cause.message()),
                        ErrorKind::EventError,
                        cause,
                    ),
                    Err(other) => IndexSyncError::new(
                        &format!("Event handler error: {}", other),
                        ErrorKind::EventError,
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone)]
    struct CountingListener {
        count: Arc<AtomicUsize>,
    }

    impl Handle<String> for CountingListener {
        fn handle(&self, _event: &Event<String>) -> Result<(), BasuError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn listener() -> (CountingListener, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        (
            CountingListener {
                count: count.clone(),
            },
            count,
        )
    }

    #[test]
    fn publish_without_listeners_is_noop() {
        let bus: SyncEventBus<String, CountingListener> = SyncEventBus::new();
        assert!(!bus.has_listeners());
        assert!(bus.publish("ignored".to_string()).is_ok());
    }

    #[test]
    fn register_and_deregister() {
        let bus: SyncEventBus<String, CountingListener> = SyncEventBus::new();
        let (listener, _) = listener();
        let subscriber = bus.register(listener).unwrap();
        assert!(bus.has_listeners());
        assert!(bus.deregister(subscriber).is_ok());
        assert!(!bus.has_listeners());
    }

    #[test]
    fn deregister_unknown_subscriber_fails() {
        let bus: SyncEventBus<String, CountingListener> = SyncEventBus::new();
        let subscriber = SubscriberRef::new(HandlerId::new());
        let result = bus.deregister(subscriber);
        assert_eq!(result.unwrap_err().kind(), &ErrorKind::EventError);
    }

    #[test]
    fn close_clears_listeners() {
        let bus: SyncEventBus<String, CountingListener> = SyncEventBus::new();
        let (listener, _) = listener();
        bus.register(listener).unwrap();
        assert!(bus.close().is_ok());
        assert!(!bus.has_listeners());
    }
}
