//! Protocol vocabulary: framing bytes, group identifiers, service codes
//! and the connector-to-bitmask mapping.

/// Start-of-frame marker
pub const FRAME_START: u8 = 0x27;

/// End-of-frame marker
pub const FRAME_END: u8 = 0x16;

// Group identifiers
pub const GRP_APP_TO_RX: u8 = 0x85;
pub const GRP_RX_TO_APP: u8 = 0x00;
pub const GRP_RX_TO_SLV: u8 = 0x97;
/// Same value as [`FRAME_START`]; slave replies open with two 0x27 bytes.
pub const GRP_SLV_TO_RX: u8 = 0x27;

/// Bus address of this board
pub const RX_ID: u8 = 0x01;

// Service codes
pub const SC_POLL: u8 = 0x00;
pub const SC_LED_CTRL: u8 = 0x02;
/// One-shot status 01 plus LED reset
pub const SC_NEW_STATUS01: u8 = 0x03;
pub const SC_UPLOAD_MAP: u8 = 0x04;
pub const SC_RELAY_SET: u8 = 0x06;
pub const SC_BTNFLAG_RESET: u8 = 0x09;
pub const SC_STATUS: u8 = 0x0A;
pub const SC_BIN_MASK: u8 = 0x0B;
pub const SC_LED_RESET: u8 = 0x3A;
pub const SC_SLAVE: u8 = 0x85;

// Sub-commands carried in SC_SLAVE frames
pub const SLAVE_OP_POLL: u8 = 0x00;
pub const SLAVE_OP_LED_ON: u8 = 0x02;
pub const SLAVE_OP_LED_OFF_ALL: u8 = 0x03;
pub const SLAVE_OP_LED_MASK: u8 = 0x04;

/// Slave address used for broadcasts
pub const BROADCAST_ADDR: u8 = 0xFF;

/// Slave state byte that marks a triggered connector
pub const SLAVE_STATE_TRIGGERED: u8 = 0x03;

/// Connector-map entry status that makes a connector active
pub const MAP_ENTRY_ACTIVE: u8 = 0x01;

// Per-connector status codes in the App status frame
pub const STATUS_IDLE: u8 = 0x00;
pub const STATUS_ALERT: u8 = 0x01;
pub const STATUS_ALIVE: u8 = 0x05;
pub const STATUS_TRIGGERED: u8 = 0x07;

/// Lowest valid connector address
pub const MIN_CONNECTOR: u8 = 1;

/// Highest valid connector address
pub const MAX_CONNECTOR: u8 = 31;

/// Map a connector address to its bit in a 32-bit mask.
///
/// Addresses outside `1..=31` have no bit and return 0.
pub const fn connector_bit(connector: u8) -> u32 {
    if connector >= MIN_CONNECTOR && connector <= MAX_CONNECTOR {
        1u32 << (connector - 1)
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connector_bit_range() {
        assert_eq!(connector_bit(1), 0x0000_0001);
        assert_eq!(connector_bit(12), 0x0000_0800);
        assert_eq!(connector_bit(31), 0x4000_0000);
    }

    #[test]
    fn test_connector_bit_out_of_range() {
        assert_eq!(connector_bit(0), 0);
        assert_eq!(connector_bit(32), 0);
        assert_eq!(connector_bit(0xFF), 0);
    }
}
