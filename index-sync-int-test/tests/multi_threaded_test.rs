use index_sync::engine::MappingEvent;
use index_sync_int_test::test_util::{cleanup, create_test_context, numbered_entity, person_entity};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[ctor::ctor]
fn init() {
    colog::init();
}

#[test]
fn test_same_type_from_many_threads() {
    // no retries: a lost race must fail the test
    let ctx = create_test_context().unwrap();
    let engine = ctx.engine(vec![]).unwrap();
    let num_threads = 8;
    let barrier = Arc::new(Barrier::new(num_threads));
    let processed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..num_threads)
        .map(|_| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            let processed = processed.clone();
            thread::spawn(move || {
                barrier.wait();
                let event = MappingEvent::EntityAdded(person_entity());
                if let Ok(Some(report)) = engine.on_entity_discovered(&event) {
                    if !report.is_skipped() {
                        processed.fetch_add(1, Ordering::SeqCst);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(processed.load(Ordering::SeqCst), 1);
    assert_eq!(ctx.store().ensure_calls(), 5);
    assert_eq!(ctx.store().index_count(), 5);
    cleanup(ctx).unwrap();
}

#[test]
fn test_distinct_types_in_parallel() {
    let ctx = create_test_context().unwrap();
    let engine = ctx.engine(vec![]).unwrap();
    let num_threads = 6;
    let types_per_thread = 10;
    let barrier = Arc::new(Barrier::new(num_threads));

    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..types_per_thread {
                    let entity = numbered_entity(thread_id * types_per_thread + i);
                    let _ = engine.process_entity(&entity);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = num_threads * types_per_thread;
    let store = ctx.store();
    assert_eq!(engine.seen_cache().len(), total);
    assert_eq!(store.ensure_calls(), total);
    assert_eq!(store.collections().len(), total);
    cleanup(ctx).unwrap();
}

#[test]
fn test_overlapping_types_across_threads() {
    let ctx = create_test_context().unwrap();
    let engine = ctx.engine(vec![]).unwrap();
    let num_threads = 4;
    let shared_types = 12;
    let barrier = Arc::new(Barrier::new(num_threads));

    // every thread announces the same set of types in a different order
    let handles: Vec<_> = (0..num_threads)
        .map(|thread_id| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for i in 0..shared_types {
                    let entity = numbered_entity((i + thread_id * 3) % shared_types);
                    let _ = engine.on_entity_discovered(&MappingEvent::EntityAdded(entity));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ctx.store().ensure_calls(), shared_types);
    assert_eq!(ctx.store().index_count(), shared_types);
    cleanup(ctx).unwrap();
}
