//! Idle watchdog
//!
//! Declares the board idle once the App has been silent for a fixed number
//! of ticks. Comparisons use the signed tick distance, so the watchdog keeps
//! working when the clock wraps.

use crate::config::TimingConfig;
use crate::scheduler::state::elapsed;

/// Watchdog verdict for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IdleStatus {
    /// App traffic seen within the threshold
    Active,
    /// No App traffic for at least the threshold
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleWatchdog {
    idle_ticks: u32,
}

impl IdleWatchdog {
    /// Create a watchdog that fires after `idle_ticks` silent ticks
    pub const fn new(idle_ticks: u32) -> Self {
        Self { idle_ticks }
    }

    pub const fn from_timing(timing: &TimingConfig) -> Self {
        Self::new(timing.idle_ticks)
    }

    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    /// Check the clock against the last App activity
    pub fn check(&self, now: u32, last_activity: u32) -> IdleStatus {
        if elapsed(now, last_activity) >= self.idle_ticks as i32 {
            IdleStatus::Idle
        } else {
            IdleStatus::Active
        }
    }
}

impl Default for IdleWatchdog {
    fn default() -> Self {
        Self::from_timing(&TimingConfig::default())
    }
}
