//! Basic worker lifecycle usage example
//!
//! Demonstrates starting a worker, dispatching messages to it, and
//! cooperative shutdown.
//!
//! Run with: cargo run --example echo_worker

use worker_lifecycle::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    println!("=== Worker Lifecycle - Echo Example ===\n");

    // Start a worker thread named "echo" with a per-message callback
    let lifecycle = WorkerLifecycle::new();
    lifecycle.start(
        "echo",
        |err| eprintln!("  [uncaught] {}", err),
        |message: String| {
            println!(
                "  echo on {:?}: {}",
                thread::current().name().unwrap_or("<unnamed>"),
                message
            );
            if message.contains("fail") {
                return Err(LifecycleError::other("refusing to echo failures"));
            }
            Ok(())
        },
    )?;
    println!("1. Worker started, running: {}", lifecycle.is_running());

    // Dispatch a few messages; they run sequentially on the worker thread
    println!("\n2. Dispatching messages:");
    let dispatcher = lifecycle.dispatcher().expect("worker is running");
    for text in ["hello", "world", "please fail", "still alive"] {
        dispatcher.dispatch(text.to_string())?;
    }

    // Give the worker a moment to drain
    thread::sleep(Duration::from_millis(200));

    // Stop: the dispatch handle is withdrawn, the loop is asked to quit
    println!("\n3. Stopping worker");
    lifecycle.stop()?;
    println!("   dispatcher after stop: {:?}", lifecycle.dispatcher());

    // A handle kept from before the stop is now dead
    match dispatcher.dispatch("too late".to_string()) {
        Err(err) => println!("   stale dispatch rejected: {}", err),
        Ok(()) => println!("   stale dispatch unexpectedly succeeded"),
    }

    // The same lifecycle can start a fresh worker
    println!("\n4. Restarting");
    lifecycle.start(
        "echo",
        |err| eprintln!("  [uncaught] {}", err),
        |message: String| {
            println!("  second worker: {}", message);
            Ok(())
        },
    )?;
    let fresh = lifecycle.dispatcher().expect("worker restarted");
    fresh.dispatch("hello again".to_string())?;

    thread::sleep(Duration::from_millis(100));
    lifecycle.stop()?;
    println!("\nDone");
    Ok(())
}
