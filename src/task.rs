use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a single task within a job.
///
/// Equality and hashing cover both fields; [`TaskHandle::matches`] is the
/// looser predicate the queue uses for removal, where a `None` index addresses
/// every task of the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskHandle {
    pub job_id: Uuid,
    pub task_index: Option<u32>,
}

impl TaskHandle {
    pub fn new(job_id: Uuid, task_index: u32) -> Self {
        Self {
            job_id,
            task_index: Some(task_index),
        }
    }

    /// A wildcard handle matching any task of the given job.
    pub fn any_task(job_id: Uuid) -> Self {
        Self {
            job_id,
            task_index: None,
        }
    }

    /// True when both handles name the same job and their indexes agree.
    /// An absent index on either side matches any index on the other.
    pub fn matches(&self, other: &TaskHandle) -> bool {
        self.job_id == other.job_id
            && match (self.task_index, other.task_index) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            }
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.task_index {
            Some(index) => write!(f, "{}/{}", self.job_id, index),
            None => write!(f, "{}/*", self.job_id),
        }
    }
}

/// A task waiting on the dispatch queue.
///
/// `enqueued_at_ms` comes from the queue's monotonic clock and drives every
/// timing decision; the wall-clock stamp exists only for management output.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedTask {
    pub handle: TaskHandle,
    pub can_ignore_quiesce: bool,
    pub enqueued_at_ms: u64,
    pub enqueued_at: DateTime<Utc>,
}

impl QueuedTask {
    pub fn new(handle: TaskHandle, can_ignore_quiesce: bool, enqueued_at_ms: u64) -> Self {
        Self {
            handle,
            can_ignore_quiesce,
            enqueued_at_ms,
            enqueued_at: Utc::now(),
        }
    }

    /// Time this task has spent on the queue as of `now_ms`.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.enqueued_at_ms)
    }
}

/// The slice of task state migration decisions look at.
#[derive(Debug, Clone)]
pub struct TaskSummary {
    pub handle: TaskHandle,
    pub byte_count: u64,
    pub current_host_id: Option<String>,
}
