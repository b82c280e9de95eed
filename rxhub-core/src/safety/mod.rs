//! Safety monitoring
//!
//! Detects loss of App traffic so the LED channels can be blanked.

pub mod watchdog;

pub use watchdog::{IdleStatus, IdleWatchdog};
