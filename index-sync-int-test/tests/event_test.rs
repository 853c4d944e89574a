use index_sync::engine::{MappingEvent, MappingEventListener};
use index_sync_int_test::test_util::{
    cleanup, create_test_context, numbered_entity, person_entity, run_test, user_entity, wait_for,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_entity_added_event_creates_indexes() {
    run_test(
        create_test_context,
        |ctx| {
            let engine = ctx.engine(vec![])?;
            assert!(engine.is_attached());

            ctx.bus().publish(MappingEvent::EntityAdded(user_entity()))?;

            let store = ctx.store();
            wait_for(1000, || store.index_count() == 1);
            assert!(engine.seen_cache().has_been_processed("app::model::User"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_repeated_events_are_processed_once() {
    run_test(
        create_test_context,
        |ctx| {
            let engine = ctx.engine(vec![user_entity()])?;
            let bus = ctx.bus();
            for _ in 0..5 {
                bus.publish(MappingEvent::EntityAdded(user_entity()))?;
            }
            bus.publish(MappingEvent::EntityAdded(person_entity()))?;

            let store = ctx.store();
            wait_for(1000, || engine.seen_cache().has_been_processed("app::model::Person"));
            assert_eq!(store.indexes("users").len(), 1);
            assert_eq!(store.ensure_calls(), 6);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_foreign_entity_event_is_ignored() {
    run_test(
        create_test_context,
        |ctx| {
            let engine = ctx.engine(vec![])?;
            let bus = ctx.bus();

            let seen = Arc::new(Mutex::new(Vec::new()));
            let seen_clone = seen.clone();
            bus.register(MappingEventListener::new(move |event: MappingEvent| {
                seen_clone.lock().push(event.type_id().to_string());
                Ok(())
            }))?;

            bus.publish(MappingEvent::ForeignEntity {
                type_id: "graph::Node".to_string(),
            })?;

            wait_for(1000, || seen.lock().len() == 1);
            assert!(engine.seen_cache().is_empty());
            assert_eq!(ctx.store().ensure_calls(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_detached_engine_stops_listening() {
    run_test(
        create_test_context,
        |ctx| {
            let engine = ctx.engine(vec![])?;
            let bus = ctx.bus();
            engine.detach(&bus)?;
            assert!(!engine.is_attached());

            bus.publish(MappingEvent::EntityAdded(user_entity()))?;
            thread::sleep(std::time::Duration::from_millis(100));
            assert_eq!(ctx.store().ensure_calls(), 0);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_events_from_many_threads() {
    run_test(
        create_test_context,
        |ctx| {
            let engine = ctx.engine(vec![])?;
            let bus = ctx.bus();
            let num_threads = 4;
            let per_thread = 5;

            let handles: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let bus = bus.clone();
                    thread::spawn(move || {
                        for i in 0..per_thread {
                            let _ = bus.publish(MappingEvent::EntityAdded(numbered_entity(thread_id * per_thread + i)));
                        }
                    })
                })
                .collect();

            for handle in handles {
                let _ = handle.join();
            }

            let store = ctx.store();
            wait_for(2000, || engine.seen_cache().len() == num_threads * per_thread);
            assert_eq!(store.index_count(), num_threads * per_thread);
            assert_eq!(store.ensure_calls(), num_threads * per_thread);
            Ok(())
        },
        cleanup,
    )
}
