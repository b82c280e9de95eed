//! Tick scheduler
//!
//! Shared clock and mask state plus the periodic driver that polls the slave
//! bus and streams LED jobs.

pub mod state;
pub mod tick;

pub use state::{elapsed, is_due, MaskView, SchedulerState};
pub use tick::{TickOutcome, TickScheduler};
