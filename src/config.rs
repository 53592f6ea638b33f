use crate::error::{DispatchError, Result};

/// Tunables for the dispatch core, fixed at construction.
///
/// Defaults match the production values the scheduler has run with; tests and
/// embedders override individual knobs through the `with_*` builders.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Minimum interval between wholesale ledger refreshes from host state.
    pub avail_refresh_ms: u64,
    /// How long a new task must wait on the queue before it may take the last
    /// free slot of a multi-slot host.
    pub last_slot_delay_ms: u64,
    /// Master switch for task migration.
    pub migration_enabled: bool,
    /// Tasks below this size may always migrate.
    pub migration_min_bytes: u64,
    /// Hard size ceiling for migration, reached once a task has aged past
    /// `migration_growth_ms`.
    pub migration_max_bytes: u64,
    /// Time on queue after which the migration size limit reaches its maximum.
    pub migration_growth_ms: u64,
    /// A host participates in at most one migration per this interval.
    pub migration_interval_per_host_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            avail_refresh_ms: 60_000,
            last_slot_delay_ms: 90_000,
            migration_enabled: true,
            migration_min_bytes: 50_000_000,
            migration_max_bytes: 10_000_000_000,
            migration_growth_ms: 1_200_000,
            migration_interval_per_host_ms: 240_000,
        }
    }
}

impl DispatchConfig {
    pub fn with_avail_refresh_ms(mut self, ms: u64) -> Self {
        self.avail_refresh_ms = ms;
        self
    }

    pub fn with_last_slot_delay_ms(mut self, ms: u64) -> Self {
        self.last_slot_delay_ms = ms;
        self
    }

    pub fn with_migration_enabled(mut self, enabled: bool) -> Self {
        self.migration_enabled = enabled;
        self
    }

    pub fn with_migration_bytes(mut self, min_bytes: u64, max_bytes: u64) -> Self {
        self.migration_min_bytes = min_bytes;
        self.migration_max_bytes = max_bytes;
        self
    }

    pub fn with_migration_growth_ms(mut self, ms: u64) -> Self {
        self.migration_growth_ms = ms;
        self
    }

    pub fn with_migration_interval_per_host_ms(mut self, ms: u64) -> Self {
        self.migration_interval_per_host_ms = ms;
        self
    }

    /// Reject configurations the admission math cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.migration_min_bytes > self.migration_max_bytes {
            return Err(DispatchError::MigrationBytesInverted {
                min_bytes: self.migration_min_bytes,
                max_bytes: self.migration_max_bytes,
            });
        }
        if self.migration_growth_ms == 0 {
            return Err(DispatchError::ZeroInterval {
                name: "migration_growth_ms",
            });
        }
        Ok(())
    }
}
