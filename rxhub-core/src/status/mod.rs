//! App status frame
//!
//! The App sees one status code per configured connector, derived from the
//! alive/triggered masks and two override masks. The frame is rebuilt after
//! every App command and parked in a single-slot buffer for the main loop.

pub mod reply;
pub mod rules;

pub use reply::{PendingReply, StatusFrame, StatusReply};
pub use rules::{evaluate, StatusInputs, StatusRule, Verdict, RULES};

use heapless::Vec;
use portable_atomic::{AtomicU32, AtomicU8, Ordering};
use rxhub_protocol::codes::{GRP_RX_TO_APP, RX_ID, SC_STATUS};
use rxhub_protocol::{connector_bit, Frame, FrameError, MAX_PAYLOAD_SIZE};

/// Status byte bit latched by button S1
pub const EXT_BUTTON_S1: u8 = 0x01;

/// Status byte bit latched by button S2
pub const EXT_BUTTON_S2: u8 = 0x02;

/// Override masks and the button status byte
pub struct StatusOverrides {
    one_shot: AtomicU32,
    force_while_triggered: AtomicU32,
    ext: AtomicU8,
}

impl Default for StatusOverrides {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusOverrides {
    pub const fn new() -> Self {
        Self {
            one_shot: AtomicU32::new(0),
            force_while_triggered: AtomicU32::new(0),
            ext: AtomicU8::new(0),
        }
    }

    /// Report alert once for `mask` (`u32::MAX` = every connector)
    pub fn arm_one_shot(&self, mask: u32) {
        self.one_shot.fetch_or(mask, Ordering::AcqRel);
    }

    /// Keep reporting alert for `mask` until each connector stops being triggered
    pub fn force_while_triggered(&self, mask: u32) {
        self.force_while_triggered.fetch_or(mask, Ordering::AcqRel);
    }

    pub fn one_shot(&self) -> u32 {
        self.one_shot.load(Ordering::Acquire)
    }

    pub fn forced(&self) -> u32 {
        self.force_while_triggered.load(Ordering::Acquire)
    }

    /// Clear one-shot bits that made it into a frame
    pub fn consume_one_shot(&self, mask: u32) {
        self.one_shot.fetch_and(!mask, Ordering::AcqRel);
    }

    pub fn release_force(&self, mask: u32) {
        if mask != 0 {
            self.force_while_triggered.fetch_and(!mask, Ordering::AcqRel);
        }
    }

    /// Button status byte (bit0 = S1, bit1 = S2)
    pub fn ext(&self) -> u8 {
        self.ext.load(Ordering::Acquire)
    }

    pub fn set_ext_bits(&self, bits: u8) {
        self.ext.fetch_or(bits, Ordering::AcqRel);
    }

    pub fn clear_ext_bits(&self, mask: u8) {
        self.ext.fetch_and(!mask, Ordering::AcqRel);
    }

    pub fn clear_ext(&self) {
        self.ext.store(0, Ordering::Release);
    }
}

/// Encode the status frame for `connectors`
///
/// Layout: `START | N+7 | GRP_RX_TO_APP | RX_ID | SC_STATUS | ext | N |
/// S1..SN | 0 | 0 | END`. Force bits released while deriving the codes are
/// OR-ed into `released`.
pub fn build_status_frame(
    connectors: impl ExactSizeIterator<Item = u8>,
    ext: u8,
    inputs: &StatusInputs,
    released: &mut u32,
) -> Result<StatusFrame, FrameError> {
    let count = connectors.len();
    let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
    payload
        .extend_from_slice(&[ext, count as u8])
        .map_err(|_| FrameError::PayloadTooLarge)?;
    for connector in connectors {
        let code = evaluate(connector_bit(connector), inputs, released);
        payload
            .push(code)
            .map_err(|_| FrameError::PayloadTooLarge)?;
    }
    payload
        .extend_from_slice(&[0x00, 0x00])
        .map_err(|_| FrameError::PayloadTooLarge)?;

    let frame = Frame::new(GRP_RX_TO_APP, RX_ID, SC_STATUS, &payload)?;
    let encoded = frame.encode_to_vec()?;
    StatusFrame::from_slice(&encoded).map_err(|_| FrameError::BufferTooSmall)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rxhub_protocol::codes::*;

    fn build(connectors: &[u8], ext: u8, inputs: &StatusInputs) -> (StatusFrame, u32) {
        let mut released = 0;
        let frame =
            build_status_frame(connectors.iter().copied(), ext, inputs, &mut released).unwrap();
        (frame, released)
    }

    #[test]
    fn test_frame_layout() {
        let inputs = StatusInputs {
            alive: connector_bit(5),
            triggered: connector_bit(5),
            ..Default::default()
        };
        let (frame, _) = build(&[5, 12], 0x02, &inputs);
        assert_eq!(
            &frame[..],
            &[
                FRAME_START,
                9,
                GRP_RX_TO_APP,
                RX_ID,
                SC_STATUS,
                0x02,
                2,
                STATUS_TRIGGERED,
                STATUS_IDLE,
                0x00,
                0x00,
                FRAME_END
            ]
        );
    }

    #[test]
    fn test_empty_map_frame() {
        let (frame, _) = build(&[], 0, &StatusInputs::default());
        assert_eq!(frame.len(), 10);
        assert_eq!(frame[1], 7);
        assert_eq!(frame[6], 0);
    }

    #[test]
    fn test_released_force_reported() {
        let inputs = StatusInputs {
            force_while_triggered: connector_bit(3),
            ..Default::default()
        };
        let (frame, released) = build(&[3], 0, &inputs);
        assert_eq!(frame[7], STATUS_IDLE);
        assert_eq!(released, connector_bit(3));
    }

    #[test]
    fn test_oversized_map_rejected() {
        let connectors = [1u8; 60];
        let mut released = 0;
        let result = build_status_frame(
            connectors.iter().copied(),
            0,
            &StatusInputs::default(),
            &mut released,
        );
        assert_eq!(result, Err(FrameError::PayloadTooLarge));
    }

    #[test]
    fn test_overrides_bits() {
        let overrides = StatusOverrides::new();
        overrides.arm_one_shot(0b0110);
        overrides.consume_one_shot(0b0010);
        assert_eq!(overrides.one_shot(), 0b0100);

        overrides.force_while_triggered(0b11);
        overrides.release_force(0b01);
        assert_eq!(overrides.forced(), 0b10);

        overrides.set_ext_bits(0b01);
        overrides.set_ext_bits(0b10);
        overrides.clear_ext_bits(0b01);
        assert_eq!(overrides.ext(), 0b10);
        overrides.clear_ext();
        assert_eq!(overrides.ext(), 0);
    }
}
