use std::collections::HashMap;

use parking_lot::Mutex;

use crate::host::HostState;
use crate::rank;

#[derive(Debug, Default)]
struct LedgerInner {
    slots: HashMap<String, u32>,
    last_refresh_ms: Option<u64>,
}

/// Effective free-slot counts per host.
///
/// A kick is debited here the moment the command goes out, long before the
/// host's next state report reflects it, so a burst of dispatches cannot
/// oversubscribe a host inside the refresh window. Completions credit a slot
/// back, with no upper bound; the map is replaced wholesale from authoritative
/// [`HostState`] at most once per refresh interval, correcting drift in either
/// direction.
///
/// All operations serialize on one internal mutex. Host ranking runs under the
/// same single lock acquisition so every slot count it reads belongs to one
/// ledger state.
#[derive(Debug)]
pub struct HostSlotLedger {
    inner: Mutex<LedgerInner>,
    refresh_interval_ms: u64,
}

impl HostSlotLedger {
    pub fn new(refresh_interval_ms: u64) -> Self {
        Self {
            inner: Mutex::new(LedgerInner::default()),
            refresh_interval_ms,
        }
    }

    /// Credit one slot to a host, typically on a task-completion event.
    pub fn mark_available(&self, host_id: &str) {
        if host_id.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        *inner.slots.entry(host_id.to_owned()).or_insert(0) += 1;
    }

    /// Debit one slot from a host for an outgoing kick. A debit that would go
    /// below zero leaves the entry untouched: a completion event was missed
    /// and the next refresh will settle the count.
    pub fn mark_kicked(&self, host_id: &str) {
        let mut inner = self.inner.lock();
        match inner.slots.get_mut(host_id) {
            Some(slots) if *slots > 0 => *slots -= 1,
            _ => tracing::warn!(host_id, "slot debit on a host with no tracked slots"),
        }
    }

    pub fn has_slot(&self, host_id: &str) -> bool {
        self.inner
            .lock()
            .slots
            .get(host_id)
            .is_some_and(|&slots| slots > 0)
    }

    /// Current entry for a host. `None` means the host has never been
    /// observed, which the last-slot rule treats differently from an explicit
    /// zero.
    pub fn snapshot(&self, host_id: &str) -> Option<u32> {
        self.inner.lock().slots.get(host_id).copied()
    }

    /// Replace the whole ledger from authoritative host state, unless the
    /// previous refresh was less than the refresh interval ago. Returns
    /// whether the refresh was applied. Hosts with empty IDs are skipped.
    pub fn refresh(&self, hosts: &[HostState], now_ms: u64) -> bool {
        let mut inner = self.inner.lock();
        if let Some(last) = inner.last_refresh_ms {
            if now_ms.saturating_sub(last) < self.refresh_interval_ms {
                return false;
            }
        }
        inner.slots = hosts
            .iter()
            .filter(|host| !host.host_id.is_empty())
            .map(|host| (host.host_id.clone(), host.available_slots))
            .collect();
        inner.last_refresh_ms = Some(now_ms);
        tracing::trace!(hosts = inner.slots.len(), "slot ledger refreshed");
        true
    }

    /// Pick the best candidate under one ledger observation: most effective
    /// free slots first, ties to the lower mean active-task count. With
    /// `require_free_slot`, a winner without a positive entry yields `None`.
    ///
    /// Candidates must already be filtered for liveness and eligibility.
    pub fn best_host<'a>(
        &self,
        candidates: &'a [HostState],
        require_free_slot: bool,
    ) -> Option<&'a HostState> {
        let inner = self.inner.lock();
        let slots_of = |host: &HostState| inner.slots.get(&host.host_id).copied().unwrap_or(0);
        let best = candidates
            .iter()
            .min_by(|a, b| rank::compare_hosts(a, slots_of(a), b, slots_of(b)))?;
        if require_free_slot && slots_of(best) == 0 {
            return None;
        }
        Some(best)
    }
}
