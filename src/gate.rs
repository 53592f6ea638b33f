use std::collections::HashMap;

use parking_lot::Mutex;

/// Rate limiter for task migration: a host that recently took part in one,
/// on either side, sits out until `ttl_ms` has passed since its last mark.
///
/// Expiry is lazy. Entries are compared against the caller's `now_ms` at read
/// time, so an expired entry is indistinguishable from an absent one;
/// [`MigrationGate::compact`] exists to bound memory, not for correctness.
#[derive(Debug)]
pub struct MigrationGate {
    marks: Mutex<HashMap<String, u64>>,
    ttl_ms: u64,
}

impl MigrationGate {
    pub fn new(ttl_ms: u64) -> Self {
        Self {
            marks: Mutex::new(HashMap::new()),
            ttl_ms,
        }
    }

    /// True if the host was marked within the TTL window ending at `now_ms`.
    pub fn recently_touched(&self, host_id: &str, now_ms: u64) -> bool {
        self.marks
            .lock()
            .get(host_id)
            .is_some_and(|&marked_at| now_ms.saturating_sub(marked_at) <= self.ttl_ms)
    }

    /// Mark a host as having participated in a migration, overwriting any
    /// earlier mark.
    pub fn mark(&self, host_id: &str, now_ms: u64) {
        self.marks.lock().insert(host_id.to_owned(), now_ms);
    }

    /// Mark both endpoints of a completed migration under one lock
    /// acquisition.
    pub fn mark_pair(&self, src_host_id: &str, dst_host_id: &str, now_ms: u64) {
        let mut marks = self.marks.lock();
        marks.insert(src_host_id.to_owned(), now_ms);
        marks.insert(dst_host_id.to_owned(), now_ms);
        tracing::debug!(
            src = src_host_id,
            dst = dst_host_id,
            now_ms,
            "migration recorded for host pair"
        );
    }

    /// Drop entries that have aged out. Returns how many were removed.
    pub fn compact(&self, now_ms: u64) -> usize {
        let mut marks = self.marks.lock();
        let before = marks.len();
        marks.retain(|_, &mut marked_at| now_ms.saturating_sub(marked_at) <= self.ttl_ms);
        before - marks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_drops_only_expired_entries() {
        let gate = MigrationGate::new(1_000);
        gate.mark("old", 0);
        gate.mark("fresh", 5_000);

        assert_eq!(gate.compact(5_500), 1);
        assert!(!gate.recently_touched("old", 5_500));
        assert!(gate.recently_touched("fresh", 5_500));
    }
}
