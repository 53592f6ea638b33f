//! Priority task-dispatch queue for a distributed job scheduler.
//!
//! The [`DispatchQueue`] decides which queued task runs on which worker host.
//! It combines a priority-ordered FIFO of task handles with a ledger of
//! per-host slot capacity that is debited the moment a kick goes out, plus a
//! rate-limited policy for migrating queued tasks away from congested hosts.
//! Transport, host state collection and job definitions live outside this
//! crate and are reached only through the [`HostState`] and [`TaskSummary`]
//! contracts.

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod host;
pub mod ledger;
pub mod queue;
mod rank;
pub mod stop;
pub mod task;

pub use config::DispatchConfig;
pub use dispatch::DispatchQueue;
pub use error::{DispatchError, Result};
pub use gate::MigrationGate;
pub use host::HostState;
pub use ledger::HostSlotLedger;
pub use queue::{IterOutcome, QueueGuard, QueueSnapshotRow, TaskQueue, Visit};
pub use stop::StopFlag;
pub use task::{QueuedTask, TaskHandle, TaskSummary};
