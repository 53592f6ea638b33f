//! A miniature of the external dispatch loop: synthetic hosts, a few queued
//! tasks, and repeated passes that kick whatever the policy admits.
//!
//! Run with `cargo run --example dispatch_loop`.

use dispatch_lite::{DispatchQueue, HostState, TaskHandle, Visit};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let queue = DispatchQueue::new();

    let hosts = vec![
        HostState::new("host-a", 2, 8).with_mean_active_tasks(3.2),
        HostState::new("host-b", 1, 4).with_mean_active_tasks(0.8),
        HostState::new("host-c", 1, 1).with_mean_active_tasks(0.1),
        HostState {
            up: false,
            ..HostState::new("host-down", 6, 8)
        },
    ];
    queue.refresh_ledger(&hosts, queue.now_ms());

    // Eligibility filtering is the caller's job; the queue never re-checks
    // liveness.
    let candidates: Vec<HostState> = hosts.into_iter().filter(|h| h.up).collect();

    let job = Uuid::new_v4();
    queue.enqueue(10, TaskHandle::new(job, 0), true, false);
    for index in 1..5 {
        queue.enqueue(5, TaskHandle::new(job, index), false, false);
    }
    tracing::info!(%job, queued = 5, "job submitted");

    let mut pass = 0;
    loop {
        pass += 1;
        let kicked = dispatch_pass(&queue, &candidates);
        tracing::info!(pass, kicked, "dispatch pass done");
        if kicked == 0 {
            break;
        }
    }

    if let Some(rows) = queue.try_queue_snapshot() {
        for row in &rows {
            tracing::info!(
                handle = %row.handle,
                priority = row.priority,
                enqueued_at = %row.enqueued_at,
                "still queued, waiting for slots"
            );
        }
        tracing::info!(remaining = rows.len(), "no further kicks possible");
    }
}

/// Walk the queue once under its lock, kicking every task the policy admits.
fn dispatch_pass(queue: &DispatchQueue, candidates: &[HostState]) -> usize {
    let mut kicks = Vec::new();
    queue.iterate(|priority, task| {
        let Some(best) = queue.pick_host(candidates, true) else {
            return Visit::Keep;
        };
        if !queue.may_kick_new_task_on(best, task.age_ms(queue.now_ms())) {
            return Visit::Keep;
        }
        queue.mark_host_kicked(&best.host_id);
        kicks.push((priority, task.handle, best.host_id.clone()));
        Visit::Remove
    });

    // The kick commands themselves go out after the queue lock is released.
    for (priority, handle, host_id) in &kicks {
        tracing::info!(%handle, priority, host = %host_id, "task kicked");
    }
    kicks.len()
}
