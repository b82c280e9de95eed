//! Configuration type definitions
//!
//! Capacities are compile-time constants because they size static tables.
//! Timing is a runtime value so a board file can tune it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rxhub_protocol::pixel::PIXEL_FRAME_MAX;
use rxhub_protocol::slave::{SLAVE_FRAME_MAX, SLAVE_REPLY_MAX};
use rxhub_protocol::MAX_BODY_SIZE;

/// Maximum connectors in the uploaded map
pub const MAX_CFG: usize = 32;

/// Concurrent slave-link LED jobs
pub const MAX_SLAVE_JOBS: usize = 16;

/// Concurrent pixel-strip LED jobs
pub const MAX_PIXEL_JOBS: usize = 16;

/// Minimum ticks between two emissions of the same job
pub const MIN_PERIOD_TICKS: u32 = 1;

/// Slots in the slave-link TX ring (one slot is kept free)
pub const SLAVE_TXQ_SLOTS: usize = 16;

/// Slots in the pixel-strip TX ring (one slot is kept free)
pub const PIXEL_TXQ_SLOTS: usize = 8;

/// Slave-link TX frame size
pub const SLAVE_TX_FRAME: usize = SLAVE_FRAME_MAX;

/// Pixel-strip TX frame size
pub const PIXEL_TX_FRAME: usize = PIXEL_FRAME_MAX;

/// Largest LEN accepted from the App
pub const HOST_BODY_CAP: usize = MAX_BODY_SIZE;

/// Largest LEN accepted from a slave
pub const SLAVE_BODY_CAP: usize = SLAVE_REPLY_MAX;

/// Capacity of the pending status reply
pub const STATUS_FRAME_MAX: usize = 64;

/// Pixels on the local strip
pub const PIXEL_LED_COUNT: usize = 96;

/// Relays on the board
pub const RELAY_COUNT: usize = 6;

/// Configuration validation failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick period must be at least 1 ms
    ZeroTickPeriod,
    /// Idle threshold must be at least one tick
    ZeroIdleTicks,
    /// Idle threshold does not fit the signed tick distance
    IdleTicksTooLarge,
    /// Baud rate of zero
    ZeroBaudRate,
}

/// Scheduler timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimingConfig {
    /// Period of the scheduler tick in milliseconds
    pub tick_period_ms: u32,
    /// Ticks without App traffic before the board goes idle
    pub idle_ticks: u32,
    /// Minimum ticks between physical pixel writes (0 = unthrottled)
    pub min_flush_ticks: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 70,
            idle_ticks: 43,
            min_flush_ticks: 0,
        }
    }
}

impl TimingConfig {
    /// Build a timing config whose idle threshold is `idle_ms` rounded up to
    /// whole ticks
    pub const fn from_millis(tick_period_ms: u32, idle_ms: u32) -> Self {
        let idle_ticks = if tick_period_ms == 0 {
            0
        } else {
            idle_ms.div_ceil(tick_period_ms)
        };
        Self {
            tick_period_ms,
            idle_ticks,
            min_flush_ticks: 0,
        }
    }

    /// Check the values the scheduler relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ZeroTickPeriod);
        }
        if self.idle_ticks == 0 {
            return Err(ConfigError::ZeroIdleTicks);
        }
        if self.idle_ticks > i32::MAX as u32 {
            return Err(ConfigError::IdleTicksTooLarge);
        }
        Ok(())
    }

    /// Idle threshold expressed in milliseconds
    pub fn idle_ms(&self) -> u32 {
        self.idle_ticks.saturating_mul(self.tick_period_ms)
    }
}
