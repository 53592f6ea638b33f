use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use serde::Serialize;

use crate::stop::StopFlag;
use crate::task::{QueuedTask, TaskHandle};

type Buckets = BTreeMap<i32, VecDeque<QueuedTask>>;

/// Visitor verdict for the current item during [`QueueGuard::iterate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Leave the item queued and move on.
    Keep,
    /// Remove the item (it was dispatched or is no longer wanted) and move on.
    Remove,
    /// Leave the item queued and stop iterating.
    Halt,
}

/// How a queue iteration ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterOutcome {
    /// Every queued item was visited.
    Finished,
    /// The visitor asked to stop early.
    Halted,
    /// The stop flag was raised; the walk gave the lock back for a pending
    /// job stop.
    Yielded,
}

/// One queued item as reported by [`QueueGuard::snapshot_rows`].
#[derive(Debug, Clone, Serialize)]
pub struct QueueSnapshotRow {
    pub priority: i32,
    pub handle: TaskHandle,
    pub can_ignore_quiesce: bool,
    pub enqueued_at: DateTime<Utc>,
}

/// Priority-keyed FIFO of queued tasks.
///
/// Buckets are walked highest priority first; within a bucket, order is the
/// order enqueuers acquired the lock, except for explicit head inserts. A
/// single mutex covers the whole structure. The dispatch loop holds it across
/// a full iteration via [`TaskQueue::lock`], so visitor steps must stay short
/// and the iteration re-checks the stop flag between items.
#[derive(Debug, Default)]
pub struct TaskQueue {
    buckets: Mutex<Buckets>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the queue for a multi-operation critical section. Blocks.
    pub fn lock(&self) -> QueueGuard<'_> {
        QueueGuard {
            buckets: self.buckets.lock(),
        }
    }

    /// Non-blocking acquire for callers that must not wait, such as
    /// management endpoints.
    pub fn try_lock(&self) -> Option<QueueGuard<'_>> {
        self.buckets
            .try_lock()
            .map(|buckets| QueueGuard { buckets })
    }
}

/// Exclusive access to the queue for the lifetime of the guard.
pub struct QueueGuard<'a> {
    buckets: MutexGuard<'a, Buckets>,
}

impl QueueGuard<'_> {
    /// Insert a task into its priority bucket, at the tail by default or at
    /// position 0 with `at_head`. Always acknowledges the insert.
    pub fn enqueue(&mut self, priority: i32, task: QueuedTask, at_head: bool) -> bool {
        let bucket = self.buckets.entry(priority).or_default();
        if at_head {
            bucket.push_front(task);
        } else {
            bucket.push_back(task);
        }
        true
    }

    /// Remove the first item in the bucket whose handle matches, honoring the
    /// wildcard semantics of [`TaskHandle::matches`].
    pub fn remove(&mut self, priority: i32, handle: &TaskHandle) -> bool {
        let Some(bucket) = self.buckets.get_mut(&priority) else {
            return false;
        };
        let Some(position) = bucket.iter().position(|item| item.handle.matches(handle)) else {
            return false;
        };
        bucket.remove(position);
        if bucket.is_empty() {
            self.buckets.remove(&priority);
        }
        true
    }

    pub fn size_at(&self, priority: i32) -> usize {
        self.buckets.get(&priority).map_or(0, VecDeque::len)
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(VecDeque::is_empty)
    }

    /// Walk priorities high to low and items within each priority in order,
    /// letting the visitor remove the current item. The stop flag is checked
    /// before every item so a pending job stop gets the lock back promptly.
    pub fn iterate(
        &mut self,
        stop: &StopFlag,
        mut visit: impl FnMut(i32, &QueuedTask) -> Visit,
    ) -> IterOutcome {
        let priorities: Vec<i32> = self.buckets.keys().rev().copied().collect();
        for priority in priorities {
            let mut index = 0;
            loop {
                let Some(bucket) = self.buckets.get_mut(&priority) else {
                    break;
                };
                if index >= bucket.len() {
                    break;
                }
                if stop.get() {
                    return IterOutcome::Yielded;
                }
                match visit(priority, &bucket[index]) {
                    Visit::Keep => index += 1,
                    Visit::Remove => {
                        bucket.remove(index);
                    }
                    Visit::Halt => return IterOutcome::Halted,
                }
            }
            self.prune_empty(priority);
        }
        IterOutcome::Finished
    }

    /// Flat dump of queue contents, highest priority first, for management
    /// views.
    pub fn snapshot_rows(&self) -> Vec<QueueSnapshotRow> {
        self.buckets
            .iter()
            .rev()
            .flat_map(|(&priority, bucket)| {
                bucket.iter().map(move |item| QueueSnapshotRow {
                    priority,
                    handle: item.handle,
                    can_ignore_quiesce: item.can_ignore_quiesce,
                    enqueued_at: item.enqueued_at,
                })
            })
            .collect()
    }

    fn prune_empty(&mut self, priority: i32) {
        if self
            .buckets
            .get(&priority)
            .is_some_and(VecDeque::is_empty)
        {
            self.buckets.remove(&priority);
        }
    }
}
