//! Pixel-strip (BIN) frames
//!
//! The BIN controller speaks the slave-bus header layout, with larger
//! frames for batch mask updates.

use heapless::Vec;

use crate::codes::*;
use crate::frame::FrameError;

/// Largest pixel-strip frame in bytes
pub const PIXEL_FRAME_MAX: usize = 192;

/// Most LEDs a single mask frame can list (8 bytes of framing)
pub const MAX_MASK_LEDS: usize = PIXEL_FRAME_MAX - 8;

/// Light `led` on bin `bin`
pub const fn led_on_frame(bin: u8, led: u8) -> [u8; 9] {
    crate::slave::led_on_frame(bin, led)
}

/// Turn every pixel off
pub const fn led_off_broadcast_frame() -> [u8; 8] {
    crate::slave::led_off_broadcast_frame()
}

/// Light exactly the listed LEDs (1-indexed), clearing all others
pub fn mask_frame(leds: &[u8]) -> Result<Vec<u8, PIXEL_FRAME_MAX>, FrameError> {
    if leds.len() > MAX_MASK_LEDS {
        return Err(FrameError::PayloadTooLarge);
    }

    let mut frame = Vec::new();
    let header = [
        FRAME_START,
        GRP_RX_TO_SLV,
        (4 + leds.len()) as u8,
        SC_SLAVE,
        BROADCAST_ADDR,
        SLAVE_OP_LED_MASK,
        leds.len() as u8,
    ];
    frame
        .extend_from_slice(&header)
        .map_err(|_| FrameError::BufferTooSmall)?;
    frame
        .extend_from_slice(leds)
        .map_err(|_| FrameError::BufferTooSmall)?;
    frame
        .push(FRAME_END)
        .map_err(|_| FrameError::BufferTooSmall)?;
    Ok(frame)
}
