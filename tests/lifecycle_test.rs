//! End-to-end tests for the worker lifecycle protocol

use worker_lifecycle::prelude::*;

use crossbeam_channel::unbounded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[test]
fn test_echo_round_trip_runs_on_worker_thread() {
    let (seen_tx, seen_rx) = unbounded();

    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start(
            "app",
            |err| panic!("unexpected uncaught failure: {}", err),
            move |message: String| {
                let on_thread = thread::current().name().map(str::to_string);
                seen_tx
                    .send((message, on_thread))
                    .map_err(|_| LifecycleError::other("test receiver gone"))
            },
        )
        .expect("failed to start worker");

    let dispatcher = lifecycle.dispatcher().expect("dispatcher while running");
    dispatcher
        .dispatch("ping".to_string())
        .expect("failed to dispatch");

    let (message, on_thread) = seen_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("callback never ran");
    assert_eq!(message, "ping");
    assert_eq!(on_thread.as_deref(), Some("app"));
    assert_ne!(on_thread.as_deref(), thread::current().name());

    // Exactly once.
    assert!(seen_rx.recv_timeout(Duration::from_millis(100)).is_err());

    lifecycle.stop().expect("failed to stop worker");
    assert!(lifecycle.dispatcher().is_none());
}

#[test]
fn test_messages_execute_in_enqueue_order() {
    let (seen_tx, seen_rx) = unbounded();

    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start(
            "ordered",
            |_| {},
            move |n: usize| {
                seen_tx
                    .send(n)
                    .map_err(|_| LifecycleError::other("test receiver gone"))
            },
        )
        .expect("failed to start worker");

    let dispatcher = lifecycle.dispatcher().expect("dispatcher while running");
    for n in 0..100 {
        dispatcher.dispatch(n).expect("failed to dispatch");
    }

    for expected in 0..100 {
        let got = seen_rx
            .recv_timeout(Duration::from_secs(2))
            .expect("message never arrived");
        assert_eq!(got, expected);
    }

    lifecycle.stop().expect("failed to stop worker");
}

#[test]
fn test_restart_produces_an_independent_worker() {
    let first_hits = Arc::new(AtomicUsize::new(0));
    let second_hits = Arc::new(AtomicUsize::new(0));

    let lifecycle = WorkerLifecycle::new();

    let count = Arc::clone(&first_hits);
    lifecycle
        .start(
            "app",
            |_| {},
            move |_: &'static str| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .expect("failed to start first worker");

    let stale = lifecycle.dispatcher().expect("dispatcher while running");
    stale.dispatch("before stop").expect("failed to dispatch");
    thread::sleep(Duration::from_millis(100));

    lifecycle.stop().expect("failed to stop first worker");

    let count = Arc::clone(&second_hits);
    lifecycle
        .start(
            "app",
            |_| {},
            move |_: &'static str| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .expect("failed to start second worker");

    let fresh = lifecycle.dispatcher().expect("dispatcher after restart");

    // A pre-stop handle must not silently reach the new worker.
    let err = stale.dispatch("after restart").unwrap_err();
    assert_eq!(err.into_message(), "after restart");

    fresh.dispatch("to new worker").expect("failed to dispatch");
    thread::sleep(Duration::from_millis(100));

    assert_eq!(first_hits.load(Ordering::SeqCst), 1);
    assert_eq!(second_hits.load(Ordering::SeqCst), 1);

    lifecycle.stop().expect("failed to stop second worker");
}

#[test]
fn test_stop_withdraws_dispatcher_before_thread() {
    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start("app", |_| {}, |_: String| Ok(()))
        .expect("failed to start worker");

    lifecycle.stop().expect("failed to stop worker");

    assert!(lifecycle.dispatcher().is_none());
    assert!(!lifecycle.is_running());

    // Stop again from Idle: a no-op, not an error.
    lifecycle.stop().expect("stop should be idempotent");
}

#[test]
fn test_callback_failure_routed_to_uncaught_handler() {
    let (failure_tx, failure_rx) = unbounded();

    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start(
            "fallible",
            move |err| {
                let _ = failure_tx.send(err.to_string());
            },
            |message: &'static str| {
                if message == "bad" {
                    return Err(LifecycleError::other("cannot process"));
                }
                Ok(())
            },
        )
        .expect("failed to start worker");

    let dispatcher = lifecycle.dispatcher().expect("dispatcher while running");
    dispatcher.dispatch("good").expect("failed to dispatch");
    dispatcher.dispatch("bad").expect("failed to dispatch");
    dispatcher.dispatch("good").expect("failed to dispatch");

    let failure = failure_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("handler never ran");
    assert!(failure.contains("cannot process"));

    // One failure, and the loop survived it.
    assert!(failure_rx.recv_timeout(Duration::from_millis(100)).is_err());
    assert!(lifecycle.is_running());

    lifecycle.stop().expect("failed to stop worker");
}

#[test]
fn test_panicking_message_does_not_stop_the_loop() {
    let (failure_tx, failure_rx) = unbounded();
    let processed = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&processed);
    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start(
            "panicky",
            move |err| {
                assert!(matches!(err, LifecycleError::WorkerPanic { .. }));
                let _ = failure_tx.send(());
            },
            move |n: usize| {
                if n == 13 {
                    panic!("unlucky message");
                }
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .expect("failed to start worker");

    let dispatcher = lifecycle.dispatcher().expect("dispatcher while running");
    dispatcher.dispatch(1).expect("failed to dispatch");
    dispatcher.dispatch(13).expect("failed to dispatch");
    dispatcher.dispatch(2).expect("failed to dispatch");

    failure_rx
        .recv_timeout(Duration::from_secs(2))
        .expect("panic never reached the handler");
    thread::sleep(Duration::from_millis(100));

    assert_eq!(processed.load(Ordering::SeqCst), 2);
    assert!(lifecycle.is_running());

    lifecycle.stop().expect("failed to stop worker");
}

#[test]
fn test_cloned_dispatchers_feed_one_loop() {
    let processed = Arc::new(AtomicUsize::new(0));

    let count = Arc::clone(&processed);
    let lifecycle = WorkerLifecycle::new();
    lifecycle
        .start(
            "shared",
            |_| {},
            move |_: usize| {
                count.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .expect("failed to start worker");

    let dispatcher = lifecycle.dispatcher().expect("dispatcher while running");
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let dispatcher = dispatcher.clone();
            thread::spawn(move || {
                for _ in 0..25 {
                    dispatcher.dispatch(i).expect("failed to dispatch");
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("producer thread panicked");
    }

    thread::sleep(Duration::from_millis(200));
    assert_eq!(processed.load(Ordering::SeqCst), 100);

    lifecycle.stop().expect("failed to stop worker");
}
