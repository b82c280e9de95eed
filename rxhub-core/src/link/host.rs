//! App command receiver
//!
//! Frames addressed to this board refresh the activity timestamp, run their
//! command and always end with a status rebuild, so every App frame gets a
//! fresh status reply even when its payload was unusable.

use rxhub_protocol::codes::{GRP_APP_TO_RX, RX_ID};
use rxhub_protocol::{pixel, Frame, FrameError, FrameParser, HostCommand, LedChannel, LedMode};

use crate::config::HOST_BODY_CAP;
use crate::hub::Hub;
use crate::jobs::JobTable;
use crate::traits::{PixelBuffer, RelayError, RelayOutput};

/// Why a well-formed frame's command had no effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Payload does not match the service code
    Malformed(FrameError),
    /// Relay output refused the command
    Relay(RelayError),
}

/// What happened to one complete frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostEvent {
    /// Command applied
    Handled { service: u8 },
    /// Frame accepted but the command failed
    Rejected { service: u8, error: CommandError },
    /// Frame for another group or address
    Ignored,
}

pub struct HostLink<'a> {
    hub: &'a Hub,
    parser: FrameParser<HOST_BODY_CAP>,
}

impl<'a> HostLink<'a> {
    pub const fn new(hub: &'a Hub) -> Self {
        Self {
            hub,
            parser: FrameParser::new(),
        }
    }

    /// Feed one received byte
    ///
    /// Returns the outcome once a frame completes. Framing errors reset the
    /// parser and are passed back for tracing only.
    pub fn on_byte(
        &mut self,
        byte: u8,
        pixels: &mut impl PixelBuffer,
        relays: &mut impl RelayOutput,
    ) -> Result<Option<HostEvent>, FrameError> {
        let Some(body) = self.parser.feed(byte)? else {
            return Ok(None);
        };
        Ok(Some(self.handle_body(&body, pixels, relays)))
    }

    pub fn reset(&mut self) {
        self.parser.reset();
    }

    /// Apply a frame body (GROUP through the last payload byte)
    pub fn handle_body(
        &self,
        body: &[u8],
        pixels: &mut impl PixelBuffer,
        relays: &mut impl RelayOutput,
    ) -> HostEvent {
        let Ok(frame) = Frame::from_body(body) else {
            return HostEvent::Ignored;
        };
        if frame.group != GRP_APP_TO_RX || frame.addr != RX_ID {
            return HostEvent::Ignored;
        }

        self.hub.state.touch_activity();
        let result = HostCommand::from_frame(&frame)
            .map_err(CommandError::Malformed)
            .and_then(|command| self.dispatch(command, pixels, relays));
        self.hub.request_status_reply();

        let service = frame.service;
        match result {
            Ok(()) => HostEvent::Handled { service },
            Err(error) => HostEvent::Rejected { service, error },
        }
    }

    /// Apply one decoded command to the shared state
    pub fn dispatch(
        &self,
        command: HostCommand<'_>,
        pixels: &mut impl PixelBuffer,
        relays: &mut impl RelayOutput,
    ) -> Result<(), CommandError> {
        let hub = self.hub;
        match command {
            HostCommand::Poll | HostCommand::Unknown(_) => {}
            HostCommand::LedControl {
                channel,
                mode,
                indicator,
                targets,
            } => self.led_control(channel, mode, indicator, targets, pixels),
            HostCommand::NewStatus01 { targets } => {
                let mask = targets.mask();
                hub.overrides.arm_one_shot(mask);
                hub.overrides
                    .force_while_triggered(mask & hub.state.status_view().triggered);
                hub.led_reset(pixels);
            }
            HostCommand::UploadMap(upload) => {
                hub.connectors.apply_upload(&upload);
                hub.overrides.clear_ext();
            }
            HostCommand::LedReset => hub.led_reset(pixels),
            HostCommand::RelaySet { relay, on } => {
                relays.set_relay(relay, on).map_err(CommandError::Relay)?;
            }
            HostCommand::ButtonFlagReset { mask } => hub.overrides.clear_ext_bits(mask),
            HostCommand::PixelMask { leds } => {
                let batch = pixel::mask_frame(leds).map_err(CommandError::Malformed)?;
                pixels.set_mask_and_clear_others(leds);
                pixels.request_flush();
                hub.post_pixel_batch(batch);
            }
        }
        Ok(())
    }

    fn led_control(
        &self,
        channel: LedChannel,
        mode: LedMode,
        indicator: u8,
        targets: &[u8],
        pixels: &mut impl PixelBuffer,
    ) {
        let now = self.hub.state.now();
        match channel {
            LedChannel::SlaveLink => {
                self.apply_jobs(&self.hub.slave_jobs, channel, mode, indicator, targets, now);
            }
            LedChannel::PixelStrip => {
                self.apply_jobs(&self.hub.pixel_jobs, channel, mode, indicator, targets, now);
                match mode {
                    LedMode::Stop => {
                        if !self.hub.pixel_jobs.any_active() {
                            pixels.clear_all();
                        }
                    }
                    LedMode::Stream => {
                        for &target in targets {
                            pixels.set_one(target);
                        }
                    }
                    LedMode::Exclusive => {
                        if let Some((&first, rest)) = targets.split_first() {
                            pixels.set_exclusive(first);
                            for &target in rest {
                                pixels.set_one(target);
                            }
                        }
                    }
                }
                pixels.request_flush();
            }
        }
    }

    fn apply_jobs<const N: usize>(
        &self,
        jobs: &JobTable<N>,
        channel: LedChannel,
        mode: LedMode,
        indicator: u8,
        targets: &[u8],
        now: u32,
    ) {
        match mode {
            LedMode::Stop => {
                jobs.stop_by_indicator(indicator);
                if !jobs.any_active() {
                    self.hub.state.request_off(channel);
                }
            }
            LedMode::Stream => {
                for &target in targets {
                    jobs.remove_by_target_except(target, indicator);
                    // A full table drops the request
                    jobs.start(target, indicator, now);
                }
            }
            LedMode::Exclusive => {
                jobs.stop_all();
                for &target in targets {
                    jobs.start(target, indicator, now);
                }
            }
        }
    }
}
