//! Slave bus receiver

use rxhub_protocol::codes::GRP_SLV_TO_RX;
use rxhub_protocol::{FrameError, FrameParser, SlaveReply};

use crate::config::SLAVE_BODY_CAP;
use crate::hub::Hub;

pub struct SlaveLink<'a> {
    hub: &'a Hub,
    parser: FrameParser<SLAVE_BODY_CAP>,
}

impl<'a> SlaveLink<'a> {
    pub const fn new(hub: &'a Hub) -> Self {
        Self {
            hub,
            parser: FrameParser::with_group_prefix(GRP_SLV_TO_RX),
        }
    }

    /// Feed one received byte
    ///
    /// A complete status reply is folded into the round masks (and into the
    /// committed masks while slave-link streaming suspends polling) and
    /// returned. Other frames are rejected with [`FrameError::InvalidFrame`].
    pub fn on_byte(&mut self, byte: u8) -> Result<Option<SlaveReply>, FrameError> {
        let Some(body) = self.parser.feed(byte)? else {
            return Ok(None);
        };
        let reply = SlaveReply::from_body(&body)?;
        self.hub
            .state
            .record_reply(&reply, self.hub.slave_jobs.is_streaming());
        Ok(Some(reply))
    }

    pub fn reset(&mut self) {
        self.parser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::state::MaskView;

    fn feed(link: &mut SlaveLink<'_>, bytes: &[u8]) -> Option<SlaveReply> {
        let mut last = None;
        for &b in bytes {
            if let Ok(Some(reply)) = link.on_byte(b) {
                last = Some(reply);
            }
        }
        last
    }

    #[test]
    fn test_reply_sets_round_masks() {
        let hub = Hub::new();
        let mut link = SlaveLink::new(&hub);

        let reply = feed(&mut link, &[0x27, 0x27, 0x03, 0x0A, 0x05, 0x03, 0x16]).unwrap();
        assert_eq!(reply.addr, 5);
        assert_eq!(hub.state.round(), MaskView { alive: 1 << 4, triggered: 1 << 4 });
        assert_eq!(hub.state.committed(), MaskView::default());
    }

    #[test]
    fn test_zero_state_ignored() {
        let hub = Hub::new();
        let mut link = SlaveLink::new(&hub);
        feed(&mut link, &[0x27, 0x27, 0x03, 0x0A, 0x05, 0x00, 0x16]);
        assert_eq!(hub.state.round(), MaskView::default());
    }

    #[test]
    fn test_oversized_length_resets() {
        let hub = Hub::new();
        let mut link = SlaveLink::new(&hub);
        assert_eq!(link.on_byte(0x27), Ok(None));
        assert_eq!(link.on_byte(0x27), Ok(None));
        assert_eq!(link.on_byte(0x09), Err(FrameError::InvalidLength));

        // Next frame still parses
        assert!(feed(&mut link, &[0x27, 0x27, 0x03, 0x0A, 0x02, 0x01, 0x16]).is_some());
    }

    #[test]
    fn test_other_service_rejected() {
        let hub = Hub::new();
        let mut link = SlaveLink::new(&hub);
        let mut result = Ok(None);
        for &b in &[0x27, 0x27, 0x03, 0x0B, 0x02, 0x01, 0x16] {
            result = link.on_byte(b);
        }
        assert_eq!(result, Err(FrameError::InvalidFrame));
        assert_eq!(hub.state.round(), MaskView::default());
    }

    #[test]
    fn test_streaming_mirrors_into_committed() {
        let hub = Hub::new();
        hub.slave_jobs.start(3, 1, 0);
        hub.slave_jobs.emit_one(0, |_| {});
        assert!(hub.slave_jobs.is_streaming());

        let mut link = SlaveLink::new(&hub);
        feed(&mut link, &[0x27, 0x27, 0x03, 0x0A, 0x03, 0x03, 0x16]);
        assert_eq!(hub.state.committed(), MaskView { alive: 1 << 2, triggered: 1 << 2 });
    }
}
