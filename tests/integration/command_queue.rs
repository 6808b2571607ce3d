//! Integration tests for the Command Queue
//!
//! Tests cover:
//! - FIFO execution with at most one command in flight
//! - Batching of concurrent enqueuers onto one drain
//! - Reverse-pair cancellation
//! - Recovery after an unknown command

use click_censor::error::QueueError;
use click_censor::queue::{CommandQueue, QueuedCommand};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

struct Probe {
    order: Mutex<Vec<i64>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

fn probed_queue() -> (CommandQueue, Arc<Probe>) {
    let queue = CommandQueue::new();
    let probe = Arc::new(Probe {
        order: Mutex::new(Vec::new()),
        in_flight: AtomicUsize::new(0),
        max_in_flight: AtomicUsize::new(0),
    });
    let p = Arc::clone(&probe);
    queue.register("work", move |args| {
        let p = Arc::clone(&p);
        async move {
            let now = p.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            p.max_in_flight.fetch_max(now, Ordering::SeqCst);
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            p.order.lock().push(args.as_i64().unwrap_or(-1));
            p.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(())
        }
    });
    (queue, probe)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fifo_one_at_a_time() {
    let (queue, probe) = probed_queue();

    let mut last = None;
    for i in 0..20 {
        last = queue.enqueue(QueuedCommand::new("work", json!(i)));
    }
    last.unwrap().await.unwrap();

    assert_eq!(*probe.order.lock(), (0..20).collect::<Vec<i64>>());
    assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_enqueuers_share_one_drain() {
    let (queue, probe) = probed_queue();

    let first = queue.enqueue(QueuedCommand::new("work", json!(1))).unwrap();
    // Let the drain start executing the first command.
    tokio::task::yield_now().await;
    assert!(queue.is_draining());
    let second = queue.enqueue(QueuedCommand::new("work", json!(2))).unwrap();

    // The first caller's handle also waits for the command added after it.
    first.await.unwrap();
    assert_eq!(*probe.order.lock(), vec![1, 2]);
    second.await.unwrap();
    assert_eq!(queue.drains_started(), 1);
}

#[tokio::test]
async fn test_new_drain_after_previous_finished() {
    let (queue, probe) = probed_queue();
    queue.enqueue(QueuedCommand::new("work", json!(1))).unwrap().await.unwrap();
    queue.enqueue(QueuedCommand::new("work", json!(2))).unwrap().await.unwrap();
    assert_eq!(*probe.order.lock(), vec![1, 2]);
    assert_eq!(queue.drains_started(), 2);
}

#[tokio::test]
async fn test_reverse_pair_leaves_queue_unchanged() {
    let (queue, probe) = probed_queue();
    let gate = Arc::new(Notify::new());
    let g = Arc::clone(&gate);
    queue.register("hold", move |_| {
        let g = Arc::clone(&g);
        async move {
            g.notified().await;
            Ok(())
        }
    });

    // Occupy the drain so the following commands stay pending.
    let drain = queue.enqueue(QueuedCommand::new("hold", json!(null))).unwrap();
    tokio::task::yield_now().await;
    queue.enqueue(QueuedCommand::new("work", json!(7)));
    let before = queue.len();

    assert!(queue
        .enqueue(QueuedCommand::reversable("work", json!(1), false, true))
        .is_some());
    assert!(queue
        .enqueue(QueuedCommand::reversable("work", json!(2), true, false))
        .is_none());
    assert_eq!(queue.len(), before);

    gate.notify_one();
    drain.await.unwrap();
    assert_eq!(*probe.order.lock(), vec![7]);
}

#[tokio::test]
async fn test_inverse_transitions_on_different_commands_do_not_cancel() {
    let queue = CommandQueue::new();
    queue.register("a", |_| async { Ok(()) });
    queue.register("b", |_| async { Ok(()) });

    queue.enqueue(QueuedCommand::reversable("a", json!(true), false, true));
    assert!(queue
        .enqueue(QueuedCommand::reversable("b", json!(false), true, false))
        .is_some());
    assert_eq!(queue.pending_ids(), vec!["a".to_string(), "b".to_string()]);
    queue.settled().await.unwrap();
}

#[tokio::test]
async fn test_executing_command_is_not_cancelled() {
    let (queue, probe) = probed_queue();

    let drain = queue
        .enqueue(QueuedCommand::reversable("work", json!(1), false, true))
        .unwrap();
    // The drain pops the command and suspends inside its executor.
    tokio::task::yield_now().await;
    assert!(queue.is_empty());

    assert!(queue
        .enqueue(QueuedCommand::reversable("work", json!(2), true, false))
        .is_some());
    drain.await.unwrap();
    assert_eq!(*probe.order.lock(), vec![1, 2]);
}

#[tokio::test]
async fn test_unknown_command_fails_only_its_drain() {
    let (queue, probe) = probed_queue();

    let failed = queue.enqueue(QueuedCommand::new("nope", json!(null))).unwrap();
    queue.enqueue(QueuedCommand::new("work", json!(1)));
    assert_eq!(
        failed.await,
        Err(QueueError::UnknownCommand("nope".to_string()))
    );
    assert!(probe.order.lock().is_empty());

    queue.enqueue(QueuedCommand::new("work", json!(2))).unwrap().await.unwrap();
    assert_eq!(*probe.order.lock(), vec![1, 2]);
}
