//! Slave bus frames
//!
//! Outbound frames to the slaves use the short header
//! `START | GROUP | LEN | SC_SLAVE | addr | op | args.. | END`
//! where LEN counts SC_SLAVE through the last argument. Slaves answer a poll
//! with a status reply `START | GROUP | 3 | SC_STATUS | addr | state | END`.

use crate::codes::*;
use crate::frame::FrameError;

/// Largest slave-bus frame in bytes
pub const SLAVE_FRAME_MAX: usize = 9;

/// Largest body a slave reply may carry
pub const SLAVE_REPLY_MAX: usize = 8;

/// Poll request for one connector
pub const fn poll_frame(connector: u8) -> [u8; 9] {
    [
        FRAME_START,
        GRP_RX_TO_SLV,
        0x05,
        SC_SLAVE,
        connector,
        SLAVE_OP_POLL,
        0x00,
        0x00,
        FRAME_END,
    ]
}

/// Turn on `led` on the slave at `connector`
pub const fn led_on_frame(connector: u8, led: u8) -> [u8; 9] {
    [
        FRAME_START,
        GRP_RX_TO_SLV,
        0x05,
        SC_SLAVE,
        connector,
        SLAVE_OP_LED_ON,
        0x01,
        led,
        FRAME_END,
    ]
}

/// Turn every LED off on every slave
pub const fn led_off_broadcast_frame() -> [u8; 8] {
    [
        FRAME_START,
        GRP_RX_TO_SLV,
        0x04,
        SC_SLAVE,
        BROADCAST_ADDR,
        SLAVE_OP_LED_OFF_ALL,
        0x00,
        FRAME_END,
    ]
}

/// Status reply from one slave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveReply {
    /// Connector address of the replying slave
    pub addr: u8,
    /// Raw state byte; 0 means no report
    pub state: u8,
}

impl SlaveReply {
    /// Parse a reply from a frame body; only status replies are recognized
    pub fn from_body(body: &[u8]) -> Result<Self, FrameError> {
        match body {
            [SC_STATUS, addr, state] => Ok(Self {
                addr: *addr,
                state: *state,
            }),
            _ => Err(FrameError::InvalidFrame),
        }
    }

    /// Mask bit for the replying connector (0 when out of range)
    pub fn bit(&self) -> u32 {
        connector_bit(self.addr)
    }

    /// True when the reply may update the alive/triggered masks
    pub fn is_reportable(&self) -> bool {
        self.bit() != 0 && self.state != 0
    }

    /// True when the slave reports its triggered state
    pub fn is_triggered(&self) -> bool {
        self.state == SLAVE_STATE_TRIGGERED
    }
}
