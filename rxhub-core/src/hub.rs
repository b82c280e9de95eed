//! Interrupt-shared state
//!
//! [`Hub`] gathers everything the interrupt handlers and the main loop
//! share. It is built in a `const` context so firmware can keep it in a
//! `static` and hand `&'static Hub` to every context.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;
use rxhub_protocol::pixel::PIXEL_FRAME_MAX;
use rxhub_protocol::LedChannel;

use crate::config::{MAX_PIXEL_JOBS, MAX_SLAVE_JOBS};
use crate::connectors::ConnectorMap;
use crate::jobs::JobTable;
use crate::scheduler::state::SchedulerState;
use crate::status::{build_status_frame, StatusInputs, StatusOverrides, StatusReply};
use crate::traits::PixelBuffer;

/// Pixel batch frame waiting for the tick
pub type PixelBatch = Vec<u8, PIXEL_FRAME_MAX>;

pub struct Hub {
    pub state: SchedulerState,
    pub connectors: ConnectorMap,
    pub slave_jobs: JobTable<MAX_SLAVE_JOBS>,
    pub pixel_jobs: JobTable<MAX_PIXEL_JOBS>,
    pub overrides: StatusOverrides,
    pub reply: StatusReply,
    pixel_batch: Mutex<RefCell<Option<PixelBatch>>>,
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    pub const fn new() -> Self {
        Self {
            state: SchedulerState::new(),
            connectors: ConnectorMap::new(),
            slave_jobs: JobTable::new(),
            pixel_jobs: JobTable::new(),
            overrides: StatusOverrides::new(),
            reply: StatusReply::new(),
            pixel_batch: Mutex::new(RefCell::new(None)),
        }
    }

    /// Rebuild the App status frame into the reply slot
    ///
    /// Returns false when the frame did not fit; the slot is then empty and
    /// the one-shot mask stays armed for the next attempt.
    pub fn request_status_reply(&self) -> bool {
        let view = self.state.status_view();
        let inputs = StatusInputs {
            alive: view.alive,
            triggered: view.triggered,
            one_shot: self.overrides.one_shot(),
            force_while_triggered: self.overrides.forced(),
        };

        let mut released = 0;
        let built = build_status_frame(
            self.connectors.iter(),
            self.overrides.ext(),
            &inputs,
            &mut released,
        );
        self.overrides.release_force(released);

        match built {
            Ok(frame) => {
                self.reply.store(&frame);
                self.overrides.consume_one_shot(inputs.one_shot);
                true
            }
            Err(_) => {
                self.reply.clear();
                false
            }
        }
    }

    /// Latch button edges into the status byte and rebuild the status frame
    pub fn on_button_edge(&self, bits: u8) {
        self.overrides.set_ext_bits(bits);
        self.request_status_reply();
    }

    /// Stop all streaming and blank both channels
    pub fn led_reset(&self, pixels: &mut impl PixelBuffer) {
        self.slave_jobs.stop_all();
        self.pixel_jobs.stop_all();
        self.state.request_off(LedChannel::SlaveLink);
        self.state.request_off(LedChannel::PixelStrip);
        pixels.clear_all();
        pixels.request_flush();
    }

    /// Hand a pixel batch frame to the next tick; replaces an unsent one
    pub fn post_pixel_batch(&self, frame: PixelBatch) {
        critical_section::with(|cs| {
            self.pixel_batch.borrow_ref_mut(cs).replace(frame);
        });
    }

    pub fn take_pixel_batch(&self) -> Option<PixelBatch> {
        critical_section::with(|cs| self.pixel_batch.borrow_ref_mut(cs).take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::mock::{MockPixels, PixelCall};
    use rxhub_protocol::codes::*;
    use rxhub_protocol::{connector_bit, SlaveReply};

    fn codes(hub: &Hub) -> heapless::Vec<u8, 32> {
        let frame = hub.reply.take().unwrap();
        let count = frame[6] as usize;
        heapless::Vec::from_slice(&frame[7..7 + count]).unwrap()
    }

    fn hub_with(connectors: &[u8]) -> Hub {
        let hub = Hub::new();
        hub.connectors.replace(connectors.iter().copied());
        hub
    }

    #[test]
    fn test_alive_and_triggered_connector() {
        let hub = hub_with(&[5, 12]);
        hub.state.record_reply(&SlaveReply { addr: 5, state: 0x03 }, false);
        hub.state.commit_round();

        assert!(hub.request_status_reply());
        assert_eq!(&codes(&hub)[..], &[STATUS_TRIGGERED, STATUS_IDLE]);
    }

    #[test]
    fn test_one_shot_all_then_derived() {
        let hub = hub_with(&[1, 2, 3]);
        hub.state.record_reply(&SlaveReply { addr: 2, state: 0x01 }, false);
        hub.overrides.arm_one_shot(u32::MAX);

        hub.request_status_reply();
        assert_eq!(&codes(&hub)[..], &[STATUS_ALERT; 3]);
        assert_eq!(hub.overrides.one_shot(), 0);

        hub.request_status_reply();
        assert_eq!(&codes(&hub)[..], &[STATUS_IDLE, STATUS_ALIVE, STATUS_IDLE]);
    }

    #[test]
    fn test_force_while_triggered_released() {
        let hub = hub_with(&[4]);
        hub.state.record_reply(&SlaveReply { addr: 4, state: 0x03 }, false);
        hub.overrides.force_while_triggered(connector_bit(4));

        hub.request_status_reply();
        assert_eq!(&codes(&hub)[..], &[STATUS_ALERT]);

        hub.state.record_reply(&SlaveReply { addr: 4, state: 0x01 }, false);
        hub.request_status_reply();
        assert_eq!(&codes(&hub)[..], &[STATUS_ALIVE]);
        assert_eq!(hub.overrides.forced(), 0);
    }

    #[test]
    fn test_button_edge_sets_ext() {
        let hub = hub_with(&[1]);
        hub.on_button_edge(0b01);
        hub.on_button_edge(0b10);
        let frame = hub.reply.take().unwrap();
        assert_eq!(frame[5], 0b11);
    }

    #[test]
    fn test_led_reset() {
        let hub = Hub::new();
        let mut pixels = MockPixels::new();
        hub.slave_jobs.start(1, 1, 0);
        hub.pixel_jobs.start(2, 2, 0);

        hub.led_reset(&mut pixels);
        assert!(!hub.slave_jobs.any_active());
        assert!(!hub.pixel_jobs.any_active());
        assert!(hub.state.off_pending(LedChannel::SlaveLink));
        assert!(hub.state.off_pending(LedChannel::PixelStrip));
        assert_eq!(pixels.calls[0], PixelCall::ClearAll);
    }

    #[test]
    fn test_pixel_batch_mailbox() {
        let hub = Hub::new();
        assert!(hub.take_pixel_batch().is_none());

        hub.post_pixel_batch(PixelBatch::from_slice(&[1]).unwrap());
        hub.post_pixel_batch(PixelBatch::from_slice(&[2]).unwrap());
        assert_eq!(&hub.take_pixel_batch().unwrap()[..], &[2]);
        assert!(hub.take_pixel_batch().is_none());
    }
}
