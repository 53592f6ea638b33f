use std::cmp::Ordering;

use crate::host::HostState;

/// Orders candidate hosts best-first: more effective free slots wins, then the
/// lower mean active-task count.
///
/// Both slot counts must come from the same ledger observation, so this is
/// only evaluated with the ledger lock held. Remaining ties keep the caller's
/// candidate order (`min_by` takes the first of equals).
pub(crate) fn compare_hosts(a: &HostState, slots_a: u32, b: &HostState, slots_b: u32) -> Ordering {
    slots_b
        .cmp(&slots_a)
        .then_with(|| a.mean_active_tasks.total_cmp(&b.mean_active_tasks))
}
