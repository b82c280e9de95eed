//! Periodic tick
//!
//! One call per hardware tick. The tick is the only producer on both
//! transmit queues: it sends pending OFF broadcasts and pixel batches, then
//! either blanks everything (idle) or gives the slave bus to LED streaming
//! or to the connector poll, and finally emits one pixel-strip job.
//!
//! Nothing here blocks or retries. A refused push is counted by its queue.

use rxhub_protocol::{pixel, slave, LedChannel};

use crate::config::TimingConfig;
use crate::hub::Hub;
use crate::queue::{PixelProducer, SlaveProducer};
use crate::safety::{IdleStatus, IdleWatchdog};
use crate::traits::PixelBuffer;

/// What the slave bus did on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// No App traffic; both channels blanked
    Idle,
    /// A slave-link LED job was sent
    LedEmitted,
    /// Streaming just ended; polling restarts from the first connector
    LedYielded,
    /// A poll was sent
    Polled { connector: u8 },
    /// No connector map yet
    Unconfigured,
}

pub struct TickScheduler<'a> {
    hub: &'a Hub,
    slave_tx: SlaveProducer<'a>,
    pixel_tx: PixelProducer<'a>,
    watchdog: IdleWatchdog,
    poll_cursor: usize,
    led_active: bool,
}

impl<'a> TickScheduler<'a> {
    pub fn new(
        hub: &'a Hub,
        slave_tx: SlaveProducer<'a>,
        pixel_tx: PixelProducer<'a>,
        timing: &TimingConfig,
    ) -> Self {
        Self {
            hub,
            slave_tx,
            pixel_tx,
            watchdog: IdleWatchdog::from_timing(timing),
            poll_cursor: 0,
            led_active: false,
        }
    }

    /// Index of the next connector to poll
    pub fn poll_cursor(&self) -> usize {
        self.poll_cursor
    }

    /// Run one tick
    pub fn on_tick(&mut self, pixels: &mut impl PixelBuffer) -> TickOutcome {
        let hub = self.hub;
        let now = hub.state.advance();

        self.service_broadcasts();

        if self.watchdog.check(now, hub.state.last_activity()) == IdleStatus::Idle {
            hub.state.request_off(LedChannel::SlaveLink);
            hub.state.request_off(LedChannel::PixelStrip);
            if hub.state.begin_idle_clear() {
                pixels.clear_all();
            }
            pixels.request_flush();
            return TickOutcome::Idle;
        }
        hub.state.end_idle();

        let slave_tx = &mut self.slave_tx;
        let emitted = hub.slave_jobs.emit_one(now, |job| {
            let _ = slave_tx.push(&slave::led_on_frame(job.target, job.indicator));
        });

        let outcome = if emitted {
            self.led_active = true;
            TickOutcome::LedEmitted
        } else if self.led_active {
            self.led_active = false;
            self.poll_cursor = 0;
            TickOutcome::LedYielded
        } else {
            self.poll_next()
        };
        pixels.request_flush();

        let pixel_tx = &mut self.pixel_tx;
        hub.pixel_jobs.emit_one(now, |job| {
            let _ = pixel_tx.push(&pixel::led_on_frame(job.target, job.indicator));
        });

        outcome
    }

    /// Send coalesced OFF broadcasts, then any posted pixel batch
    fn service_broadcasts(&mut self) {
        let state = &self.hub.state;
        if state.take_off(LedChannel::SlaveLink) {
            let _ = self.slave_tx.push(&slave::led_off_broadcast_frame());
        }
        if state.take_off(LedChannel::PixelStrip) {
            let _ = self.pixel_tx.push(&pixel::led_off_broadcast_frame());
        }
        if let Some(batch) = self.hub.take_pixel_batch() {
            let _ = self.pixel_tx.push(&batch);
        }
    }

    /// Poll the connector at the cursor, committing the round at its start
    fn poll_next(&mut self) -> TickOutcome {
        let connectors = &self.hub.connectors;
        let count = connectors.len();
        if count == 0 {
            return TickOutcome::Unconfigured;
        }
        // The map may have shrunk since the last poll
        if self.poll_cursor >= count {
            self.poll_cursor = 0;
        }
        if self.poll_cursor == 0 {
            self.hub.state.commit_round();
        }

        let Some(connector) = connectors.get(self.poll_cursor) else {
            self.poll_cursor = 0;
            return TickOutcome::Unconfigured;
        };
        let _ = self.slave_tx.push(&slave::poll_frame(connector));
        self.poll_cursor = (self.poll_cursor + 1) % count;
        TickOutcome::Polled { connector }
    }
}
