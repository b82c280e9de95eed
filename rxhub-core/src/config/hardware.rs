//! Board-level configuration
//!
//! Serial link settings and the timing block, as read from the board file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{ConfigError, TimingConfig};

/// Baud rates for the three serial links
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// App host link
    pub host_baud: u32,
    /// Slave bus
    pub slave_baud: u32,
    /// BIN pixel-strip link
    pub pixel_baud: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            host_baud: 115_200,
            slave_baud: 9_600,
            pixel_baud: 115_200,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    pub timing: TimingConfig,
    pub links: LinkConfig,
}

impl BoardConfig {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        let links = &self.links;
        if links.host_baud == 0 || links.slave_baud == 0 || links.pixel_baud == 0 {
            return Err(ConfigError::ZeroBaudRate);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_board_is_valid() {
        assert_eq!(BoardConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_zero_baud_rejected() {
        let mut board = BoardConfig::default();
        board.links.slave_baud = 0;
        assert_eq!(board.validate(), Err(ConfigError::ZeroBaudRate));
    }

    #[test]
    fn test_timing_errors_surface_first() {
        let mut board = BoardConfig::default();
        board.timing.tick_period_ms = 0;
        board.links.host_baud = 0;
        assert_eq!(board.validate(), Err(ConfigError::ZeroTickPeriod));
    }
}
