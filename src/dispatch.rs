//! The dispatch core: priority queue, host slot ledger, migration gate and
//! stop flag behind one surface.
//!
//! Lock order is global and one-way: **queue, then ledger**. Every policy
//! method here takes at most one of the two locks itself, so the dispatch loop
//! may call any of them while holding a [`QueueGuard`]; nothing in the ledger
//! or gate ever calls back into the queue. The gate synchronizes internally
//! and may be used under either lock.

use crate::clock::Clock;
use crate::config::DispatchConfig;
use crate::error::Result;
use crate::gate::MigrationGate;
use crate::host::HostState;
use crate::ledger::HostSlotLedger;
use crate::queue::{IterOutcome, QueueGuard, QueueSnapshotRow, TaskQueue, Visit};
use crate::stop::StopFlag;
use crate::task::{QueuedTask, TaskHandle, TaskSummary};

/// Priority task-dispatch queue with host slot accounting and rate-limited
/// migration.
///
/// Producers enqueue task handles; host events credit and debit the ledger;
/// the dispatch loop iterates the queue under its lock and asks the policy
/// methods which task may run where. Every decision is a pure function of the
/// current ledger, gate and clock state.
pub struct DispatchQueue {
    config: DispatchConfig,
    clock: Clock,
    queue: TaskQueue,
    ledger: HostSlotLedger,
    gate: MigrationGate,
    stop: StopFlag,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::with_config(DispatchConfig::default()).expect("default config is valid")
    }

    pub fn with_config(config: DispatchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            clock: Clock::new(),
            queue: TaskQueue::new(),
            ledger: HostSlotLedger::new(config.avail_refresh_ms),
            gate: MigrationGate::new(config.migration_interval_per_host_ms),
            stop: StopFlag::new(),
            config,
        })
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Current reading of the queue's monotonic clock.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // ---- queue surface ----

    /// Queue a task at the given priority, stamping its time of arrival.
    /// `at_head` puts it in front of everything already queued at that
    /// priority.
    pub fn enqueue(
        &self,
        priority: i32,
        handle: TaskHandle,
        can_ignore_quiesce: bool,
        at_head: bool,
    ) -> bool {
        let task = QueuedTask::new(handle, can_ignore_quiesce, self.clock.now_ms());
        tracing::debug!(%handle, priority, at_head, "task queued");
        self.queue.lock().enqueue(priority, task, at_head)
    }

    /// Remove the first queued item matching the handle at the given
    /// priority. A handle with no task index removes the first task of that
    /// job.
    pub fn remove(&self, priority: i32, handle: &TaskHandle) -> bool {
        let removed = self.queue.lock().remove(priority, handle);
        if removed {
            tracing::debug!(%handle, priority, "task removed from queue");
        }
        removed
    }

    pub fn size_at(&self, priority: i32) -> usize {
        self.queue.lock().size_at(priority)
    }

    /// Acquire the queue for a multi-operation critical section. Ledger and
    /// gate methods may be called while holding the guard; the reverse order
    /// is never allowed.
    pub fn lock(&self) -> QueueGuard<'_> {
        self.queue.lock()
    }

    pub fn try_lock(&self) -> Option<QueueGuard<'_>> {
        self.queue.try_lock()
    }

    /// Lock the queue and walk it highest priority first, FIFO within a
    /// priority. The visitor may remove the current item; the walk yields the
    /// lock as soon as the stop flag is observed.
    pub fn iterate(&self, visit: impl FnMut(i32, &QueuedTask) -> Visit) -> IterOutcome {
        self.queue.lock().iterate(&self.stop, visit)
    }

    /// Non-blocking dump of queue contents for management endpoints. `None`
    /// when the queue lock is currently held elsewhere.
    pub fn try_queue_snapshot(&self) -> Option<Vec<QueueSnapshotRow>> {
        self.queue.try_lock().map(|guard| guard.snapshot_rows())
    }

    // ---- host slot ledger ----

    /// Credit a slot back to a host, usually on a task-completion event.
    pub fn mark_host_available(&self, host_id: &str) {
        self.ledger.mark_available(host_id);
    }

    /// Debit a slot for a kick being sent to a host.
    pub fn mark_host_kicked(&self, host_id: &str) {
        self.ledger.mark_kicked(host_id);
    }

    /// Reconcile the ledger against authoritative host state; throttled to at
    /// most once per `avail_refresh_ms`. Returns whether it was applied.
    pub fn refresh_ledger(&self, hosts: &[HostState], now_ms: u64) -> bool {
        self.ledger.refresh(hosts, now_ms)
    }

    // ---- dispatch policy ----

    /// Best host for a task out of pre-filtered candidates. With
    /// `require_free_slot`, only returns a host the ledger shows a free slot
    /// on.
    pub fn pick_host<'a>(
        &self,
        candidates: &'a [HostState],
        require_free_slot: bool,
    ) -> Option<&'a HostState> {
        self.ledger.best_host(candidates, require_free_slot)
    }

    /// Whether a new task that has waited `time_on_queue_ms` may take a slot
    /// on this host. The last slot of a multi-slot host is held back for
    /// `last_slot_delay_ms` so restarts and urgent work can land; single-slot
    /// hosts are always usable, as are hosts the ledger has never seen.
    pub fn may_kick_new_task_on(&self, host: &HostState, time_on_queue_ms: u64) -> bool {
        match self.ledger.snapshot(&host.host_id) {
            Some(slots) if slots <= 1 => {
                if host.max_slots == 1 {
                    true
                } else {
                    time_on_queue_ms > self.config.last_slot_delay_ms
                }
            }
            _ => true,
        }
    }

    /// Whether a queued task may migrate to `target_host_id` right now.
    /// Suspicious input (no recorded size or source host, empty target) is
    /// rejected outright; otherwise the target needs a free slot and neither
    /// endpoint may have migrated within the per-host interval.
    pub fn may_migrate(&self, task: &TaskSummary, target_host_id: &str, now_ms: u64) -> bool {
        if !self.config.migration_enabled {
            return false;
        }
        let Some(src_host_id) = task.current_host_id.as_deref().filter(|id| !id.is_empty())
        else {
            return false;
        };
        if task.byte_count == 0 || target_host_id.is_empty() {
            return false;
        }
        if !self.ledger.has_slot(target_host_id) {
            return false;
        }
        if self.gate.recently_touched(src_host_id, now_ms)
            || self.gate.recently_touched(target_host_id, now_ms)
        {
            tracing::debug!(
                handle = %task.handle,
                src = src_host_id,
                target = target_host_id,
                "migration blocked by per-host interval"
            );
            return false;
        }
        true
    }

    /// Whether a task of this size may migrate given its time on queue. The
    /// size limit starts at `migration_min_bytes` and grows linearly to
    /// `migration_max_bytes` as the task ages toward `migration_growth_ms`.
    pub fn size_age_admits(&self, byte_count: u64, time_on_queue_ms: u64) -> bool {
        let progress =
            (time_on_queue_ms as f64 / self.config.migration_growth_ms as f64).min(1.0);
        let limit_bytes = self.config.migration_min_bytes as f64
            + progress * (self.config.migration_max_bytes - self.config.migration_min_bytes) as f64;
        (byte_count as f64) < limit_bytes
    }

    /// Record a completed migration, putting both hosts on migration cooldown
    /// for the per-host interval.
    pub fn mark_migrated_pair(&self, src_host_id: &str, dst_host_id: &str, now_ms: u64) {
        self.gate.mark_pair(src_host_id, dst_host_id, now_ms);
    }

    pub fn migration_enabled(&self) -> bool {
        self.config.migration_enabled
    }

    // ---- stop flag ----

    /// Raise or clear the job-stop hint read by queue iterations.
    pub fn set_stop_flag(&self, stopped: bool) {
        self.stop.set(stopped);
    }

    pub fn stop_flag(&self) -> bool {
        self.stop.get()
    }

    /// The flag itself, for callers driving [`QueueGuard::iterate`] inside
    /// their own critical section.
    pub fn stop(&self) -> &StopFlag {
        &self.stop
    }
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}
