//! Commands sent by the App to this board
//!
//! Every App frame carries a service code; the payload layout depends on it.
//! Unrecognized service codes decode to [`HostCommand::Unknown`] so the
//! caller can treat them as a no-op.

use crate::codes::*;
use crate::frame::{Frame, FrameError, MAX_PAYLOAD_SIZE};
use heapless::Vec;

/// Wire value selecting the slave-link LED channel
pub const CHANNEL_SLAVE_LINK: u8 = 0x01;
/// Wire value selecting the pixel-strip LED channel
pub const CHANNEL_PIXEL_STRIP: u8 = 0x02;

/// Which LED channel an LED command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedChannel {
    /// Indicator LEDs on the slaves, reached over the slave bus
    SlaveLink,
    /// Addressable pixels on the BIN strip
    PixelStrip,
}

impl LedChannel {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CHANNEL_SLAVE_LINK => Some(LedChannel::SlaveLink),
            CHANNEL_PIXEL_STRIP => Some(LedChannel::PixelStrip),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LedChannel::SlaveLink => CHANNEL_SLAVE_LINK,
            LedChannel::PixelStrip => CHANNEL_PIXEL_STRIP,
        }
    }
}

/// LED control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedMode {
    /// Stop every job showing the indicator
    Stop,
    /// Stream the indicator on each target, replacing other indicators there
    Stream,
    /// Stop everything on the channel, then stream on the targets only
    Exclusive,
}

impl LedMode {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(LedMode::Stop),
            1 => Some(LedMode::Stream),
            2 => Some(LedMode::Exclusive),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LedMode::Stop => 0,
            LedMode::Stream => 1,
            LedMode::Exclusive => 2,
        }
    }
}

/// Connector selection for status overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetSet<'a> {
    /// Every connector
    All,
    /// The listed connector addresses
    List(&'a [u8]),
}

impl<'a> TargetSet<'a> {
    /// Empty payloads and lists containing 0xFF select every connector
    fn from_payload(payload: &'a [u8]) -> Self {
        if payload.is_empty() || payload.contains(&BROADCAST_ADDR) {
            TargetSet::All
        } else {
            TargetSet::List(payload)
        }
    }

    /// Fold the selection into a 32-bit connector mask
    pub fn mask(&self) -> u32 {
        match self {
            TargetSet::All => u32::MAX,
            TargetSet::List(list) => list.iter().fold(0, |m, &c| m | connector_bit(c)),
        }
    }
}

/// Connector-map upload payload: `N, (addr, status) × N`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MapUpload<'a> {
    entries: &'a [u8],
}

impl<'a> MapUpload<'a> {
    fn from_payload(payload: &'a [u8]) -> Result<Self, FrameError> {
        let count = *payload.first().ok_or(FrameError::InvalidFrame)? as usize;
        let end = 1 + 2 * count;
        if payload.len() < end {
            return Err(FrameError::InvalidFrame);
        }
        Ok(Self {
            entries: &payload[1..end],
        })
    }

    /// Number of `(addr, status)` entries, active or not
    pub fn len(&self) -> usize {
        self.entries.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Addresses whose status is active, in payload order
    pub fn active_connectors(&self) -> impl Iterator<Item = u8> + 'a {
        self.entries
            .chunks_exact(2)
            .filter(|pair| pair[1] == MAP_ENTRY_ACTIVE)
            .map(|pair| pair[0])
    }
}

/// Commands parsed from App-originated frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostCommand<'a> {
    /// Heartbeat; the reply is the status frame
    Poll,
    /// Start or stop LED streaming on one channel
    LedControl {
        channel: LedChannel,
        mode: LedMode,
        indicator: u8,
        targets: &'a [u8],
    },
    /// One-shot status 01 for the selected connectors, plus LED reset
    NewStatus01 { targets: TargetSet<'a> },
    /// Replace the connector map
    UploadMap(MapUpload<'a>),
    /// Stop all LED streaming and blank both channels
    LedReset,
    /// Drive one relay
    RelaySet { relay: u8, on: bool },
    /// Clear button status bits
    ButtonFlagReset { mask: u8 },
    /// Light exactly the listed pixels
    PixelMask { leds: &'a [u8] },
    /// Service code this board does not handle
    Unknown(u8),
}

impl<'a> HostCommand<'a> {
    /// Parse a command from its service code and payload
    pub fn parse(service: u8, payload: &'a [u8]) -> Result<Self, FrameError> {
        match service {
            SC_POLL => Ok(HostCommand::Poll),
            SC_LED_CTRL => {
                if payload.len() < 3 {
                    return Err(FrameError::InvalidFrame);
                }
                let channel = LedChannel::from_byte(payload[0]).ok_or(FrameError::InvalidFrame)?;
                let mode = LedMode::from_byte(payload[1]).ok_or(FrameError::InvalidFrame)?;
                Ok(HostCommand::LedControl {
                    channel,
                    mode,
                    indicator: payload[2],
                    targets: &payload[3..],
                })
            }
            SC_NEW_STATUS01 => Ok(HostCommand::NewStatus01 {
                targets: TargetSet::from_payload(payload),
            }),
            SC_UPLOAD_MAP => Ok(HostCommand::UploadMap(MapUpload::from_payload(payload)?)),
            SC_LED_RESET => Ok(HostCommand::LedReset),
            SC_RELAY_SET => {
                if payload.len() < 2 {
                    return Err(FrameError::InvalidFrame);
                }
                Ok(HostCommand::RelaySet {
                    relay: payload[0],
                    on: payload[1] != 0,
                })
            }
            SC_BTNFLAG_RESET => Ok(HostCommand::ButtonFlagReset {
                mask: payload.first().copied().unwrap_or(0xFF),
            }),
            SC_BIN_MASK => {
                let count = *payload.first().ok_or(FrameError::InvalidFrame)? as usize;
                if payload.len() < 1 + count {
                    return Err(FrameError::InvalidFrame);
                }
                Ok(HostCommand::PixelMask {
                    leds: &payload[1..1 + count],
                })
            }
            other => Ok(HostCommand::Unknown(other)),
        }
    }

    /// Parse a command from a frame
    pub fn from_frame(frame: &'a Frame) -> Result<Self, FrameError> {
        Self::parse(frame.service, &frame.payload)
    }

    /// Service code carried by this command
    pub fn service_code(&self) -> u8 {
        match self {
            HostCommand::Poll => SC_POLL,
            HostCommand::LedControl { .. } => SC_LED_CTRL,
            HostCommand::NewStatus01 { .. } => SC_NEW_STATUS01,
            HostCommand::UploadMap(_) => SC_UPLOAD_MAP,
            HostCommand::LedReset => SC_LED_RESET,
            HostCommand::RelaySet { .. } => SC_RELAY_SET,
            HostCommand::ButtonFlagReset { .. } => SC_BTNFLAG_RESET,
            HostCommand::PixelMask { .. } => SC_BIN_MASK,
            HostCommand::Unknown(sc) => *sc,
        }
    }

    /// Encode this command into an App frame (for testing or simulation)
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
        let overflow = |_: ()| FrameError::PayloadTooLarge;

        match self {
            HostCommand::Poll | HostCommand::LedReset | HostCommand::Unknown(_) => {}
            HostCommand::LedControl {
                channel,
                mode,
                indicator,
                targets,
            } => {
                payload
                    .extend_from_slice(&[channel.to_byte(), mode.to_byte(), *indicator])
                    .map_err(overflow)?;
                payload.extend_from_slice(targets).map_err(overflow)?;
            }
            HostCommand::NewStatus01 { targets } => match targets {
                TargetSet::All => payload.push(BROADCAST_ADDR).map_err(|_| FrameError::PayloadTooLarge)?,
                TargetSet::List(list) => payload.extend_from_slice(list).map_err(overflow)?,
            },
            HostCommand::UploadMap(upload) => {
                payload
                    .push(upload.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload.extend_from_slice(upload.entries).map_err(overflow)?;
            }
            HostCommand::RelaySet { relay, on } => {
                payload
                    .extend_from_slice(&[*relay, u8::from(*on)])
                    .map_err(overflow)?;
            }
            HostCommand::ButtonFlagReset { mask } => {
                payload.push(*mask).map_err(|_| FrameError::PayloadTooLarge)?;
            }
            HostCommand::PixelMask { leds } => {
                payload
                    .push(leds.len() as u8)
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                payload.extend_from_slice(leds).map_err(overflow)?;
            }
        }

        Frame::new(GRP_APP_TO_RX, RX_ID, self.service_code(), &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll() {
        assert_eq!(HostCommand::parse(SC_POLL, &[]), Ok(HostCommand::Poll));
    }

    #[test]
    fn test_led_control() {
        let cmd = HostCommand::parse(SC_LED_CTRL, &[0x01, 1, 4, 5, 12]).unwrap();
        assert_eq!(
            cmd,
            HostCommand::LedControl {
                channel: LedChannel::SlaveLink,
                mode: LedMode::Stream,
                indicator: 4,
                targets: &[5, 12],
            }
        );
    }

    #[test]
    fn test_led_control_rejects_unknown_mode() {
        assert_eq!(
            HostCommand::parse(SC_LED_CTRL, &[0x01, 7, 4, 5]),
            Err(FrameError::InvalidFrame)
        );
        assert_eq!(
            HostCommand::parse(SC_LED_CTRL, &[0x03, 1, 4, 5]),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_upload_map_active_entries_in_order() {
        let payload = [3, 5, 1, 9, 0, 12, 1];
        let cmd = HostCommand::parse(SC_UPLOAD_MAP, &payload).unwrap();
        let HostCommand::UploadMap(upload) = cmd else {
            panic!("expected upload");
        };
        assert_eq!(upload.len(), 3);
        let mut active = upload.active_connectors();
        assert_eq!(active.next(), Some(5));
        assert_eq!(active.next(), Some(12));
        assert_eq!(active.next(), None);
    }

    #[test]
    fn test_upload_map_truncated_payload() {
        assert_eq!(
            HostCommand::parse(SC_UPLOAD_MAP, &[3, 5, 1, 9, 0]),
            Err(FrameError::InvalidFrame)
        );
        assert_eq!(
            HostCommand::parse(SC_UPLOAD_MAP, &[]),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_new_status01_targets() {
        let all = HostCommand::parse(SC_NEW_STATUS01, &[]).unwrap();
        assert_eq!(all, HostCommand::NewStatus01 { targets: TargetSet::All });

        let list = HostCommand::parse(SC_NEW_STATUS01, &[1, 3]).unwrap();
        let HostCommand::NewStatus01 { targets } = list else {
            panic!("expected status01");
        };
        assert_eq!(targets.mask(), 0b101);
    }

    #[test]
    fn test_target_mask_ignores_invalid_addresses() {
        assert_eq!(TargetSet::List(&[0, 32, 2]).mask(), 0b10);
        assert_eq!(TargetSet::All.mask(), u32::MAX);
    }

    #[test]
    fn test_button_flag_reset_defaults_to_all() {
        assert_eq!(
            HostCommand::parse(SC_BTNFLAG_RESET, &[]),
            Ok(HostCommand::ButtonFlagReset { mask: 0xFF })
        );
        assert_eq!(
            HostCommand::parse(SC_BTNFLAG_RESET, &[0x02]),
            Ok(HostCommand::ButtonFlagReset { mask: 0x02 })
        );
    }

    #[test]
    fn test_pixel_mask() {
        assert_eq!(
            HostCommand::parse(SC_BIN_MASK, &[2, 7, 9, 0xAA]),
            Ok(HostCommand::PixelMask { leds: &[7, 9] })
        );
        assert_eq!(
            HostCommand::parse(SC_BIN_MASK, &[3, 7]),
            Err(FrameError::InvalidFrame)
        );
    }

    #[test]
    fn test_unknown_service_code() {
        assert_eq!(HostCommand::parse(0x42, &[1, 2]), Ok(HostCommand::Unknown(0x42)));
    }

    #[test]
    fn test_relay_frame_bytes() {
        let frame = HostCommand::RelaySet { relay: 3, on: true }.to_frame().unwrap();
        let bytes = frame.encode_to_vec().unwrap();
        assert_eq!(
            bytes.as_slice(),
            &[0x27, 0x05, 0x85, 0x01, 0x06, 0x03, 0x01, 0x16]
        );
    }

    #[test]
    fn test_command_frame_parses_back() {
        let original = HostCommand::LedControl {
            channel: LedChannel::PixelStrip,
            mode: LedMode::Exclusive,
            indicator: 1,
            targets: &[4],
        };
        let frame = original.to_frame().unwrap();
        assert_eq!(HostCommand::from_frame(&frame), Ok(original));
    }
}
