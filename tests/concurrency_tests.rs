use std::sync::Arc;
use std::thread;

use dispatch_lite::{DispatchQueue, HostSlotLedger, IterOutcome, TaskHandle, Visit};
use uuid::Uuid;

#[test]
fn test_balanced_credits_and_debits_across_threads() {
    let ledger = Arc::new(HostSlotLedger::new(60_000));
    let threads = 8;
    let rounds = 500;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..rounds {
                    // Credit before debit keeps every interleaving non-negative.
                    ledger.mark_available("shared");
                    ledger.mark_kicked("shared");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.snapshot("shared"), Some(0));
    assert!(!ledger.has_slot("shared"));
}

#[test]
fn test_credits_from_many_threads_all_land() {
    let ledger = Arc::new(HostSlotLedger::new(60_000));
    let threads: u32 = 8;
    let rounds: u32 = 250;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                for _ in 0..rounds {
                    ledger.mark_available("shared");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(ledger.snapshot("shared"), Some(threads * rounds));
}

#[test]
fn test_concurrent_enqueues_keep_every_task_once() {
    let queue = Arc::new(DispatchQueue::new());
    let threads = 8u32;
    let per_thread = 50u32;

    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let queue = Arc::clone(&queue);
            let job = Uuid::new_v4();
            thread::spawn(move || {
                for index in 0..per_thread {
                    assert!(queue.enqueue(
                        (index % 3) as i32,
                        TaskHandle::new(job, index),
                        false,
                        false,
                    ));
                }
                job
            })
        })
        .collect();
    let jobs: Vec<Uuid> = workers.into_iter().map(|w| w.join().unwrap()).collect();

    let total: usize = (0..3).map(|priority| queue.size_at(priority)).sum();
    assert_eq!(total, (threads * per_thread) as usize);

    let mut seen = std::collections::HashSet::new();
    queue.iterate(|_, task| {
        assert!(seen.insert(task.handle), "duplicate handle {}", task.handle);
        Visit::Keep
    });
    assert_eq!(seen.len(), (threads * per_thread) as usize);
    for job in jobs {
        for index in 0..per_thread {
            assert!(seen.contains(&TaskHandle::new(job, index)));
        }
    }
}

#[test]
fn test_try_lock_fails_while_queue_is_held() {
    let queue = DispatchQueue::new();

    let guard = queue.lock();
    assert!(queue.try_lock().is_none());
    drop(guard);
    assert!(queue.try_lock().is_some());
}

#[test]
fn test_stop_flag_set_by_another_thread_yields_iteration() {
    let queue = Arc::new(DispatchQueue::new());
    let job = Uuid::new_v4();
    for index in 0..100 {
        queue.enqueue(5, TaskHandle::new(job, index), false, false);
    }

    {
        let queue = Arc::clone(&queue);
        thread::spawn(move || queue.set_stop_flag(true))
            .join()
            .unwrap();
    }

    let outcome = queue.iterate(|_, _| Visit::Remove);
    assert_eq!(outcome, IterOutcome::Yielded);
    assert_eq!(queue.size_at(5), 100, "yielded iteration removed nothing");
}
