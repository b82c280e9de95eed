//! Scheduler state shared between interrupt contexts
//!
//! Every field is a single-word atomic. The tick context owns the clock,
//! the idle flag and the commit; the host link owns the activity timestamp;
//! the slave link owns the round accumulators between commits.

use portable_atomic::{AtomicBool, AtomicU32, Ordering};
use rxhub_protocol::{LedChannel, SlaveReply};

/// Signed distance from `since` to `now` on the wrapping tick clock
pub fn elapsed(now: u32, since: u32) -> i32 {
    now.wrapping_sub(since) as i32
}

/// True once `now` has reached `at`
pub fn is_due(now: u32, at: u32) -> bool {
    elapsed(now, at) >= 0
}

/// Alive/triggered snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaskView {
    pub alive: u32,
    pub triggered: u32,
}

pub struct SchedulerState {
    tick: AtomicU32,
    last_activity: AtomicU32,
    idle_cleared: AtomicBool,
    slave_off_pending: AtomicBool,
    pixel_off_pending: AtomicBool,
    round_alive: AtomicU32,
    round_triggered: AtomicU32,
    alive: AtomicU32,
    triggered: AtomicU32,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedulerState {
    pub const fn new() -> Self {
        Self {
            tick: AtomicU32::new(0),
            last_activity: AtomicU32::new(0),
            idle_cleared: AtomicBool::new(false),
            slave_off_pending: AtomicBool::new(false),
            pixel_off_pending: AtomicBool::new(false),
            round_alive: AtomicU32::new(0),
            round_triggered: AtomicU32::new(0),
            alive: AtomicU32::new(0),
            triggered: AtomicU32::new(0),
        }
    }

    /// Current tick
    pub fn now(&self) -> u32 {
        self.tick.load(Ordering::Acquire)
    }

    /// Advance the clock by one tick and return the new value
    pub fn advance(&self) -> u32 {
        self.tick.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }

    /// Record App traffic at the current tick
    pub fn touch_activity(&self) {
        self.last_activity.store(self.now(), Ordering::Release);
    }

    pub fn last_activity(&self) -> u32 {
        self.last_activity.load(Ordering::Acquire)
    }

    /// Mark the idle episode as handled; true the first time per episode
    pub fn begin_idle_clear(&self) -> bool {
        !self.idle_cleared.swap(true, Ordering::AcqRel)
    }

    /// Activity resumed; the next idle episode clears again
    pub fn end_idle(&self) {
        self.idle_cleared.store(false, Ordering::Release);
    }

    pub fn is_idle_cleared(&self) -> bool {
        self.idle_cleared.load(Ordering::Acquire)
    }

    fn off_flag(&self, channel: LedChannel) -> &AtomicBool {
        match channel {
            LedChannel::SlaveLink => &self.slave_off_pending,
            LedChannel::PixelStrip => &self.pixel_off_pending,
        }
    }

    /// Ask the next tick to broadcast OFF on `channel`
    pub fn request_off(&self, channel: LedChannel) {
        self.off_flag(channel).store(true, Ordering::Release);
    }

    /// Consume a pending OFF request; repeated requests coalesce into one
    pub fn take_off(&self, channel: LedChannel) -> bool {
        self.off_flag(channel).swap(false, Ordering::AcqRel)
    }

    pub fn off_pending(&self, channel: LedChannel) -> bool {
        self.off_flag(channel).load(Ordering::Acquire)
    }

    /// Fold a slave reply into the round accumulators
    ///
    /// With `mirror` set (slave-link LED streaming in progress) the update is
    /// copied into the committed masks as well, since polling is suspended
    /// and no commit would otherwise publish it. Returns false when the reply
    /// carried nothing to record.
    pub fn record_reply(&self, reply: &SlaveReply, mirror: bool) -> bool {
        if !reply.is_reportable() {
            return false;
        }
        let bit = reply.bit();
        self.round_alive.fetch_or(bit, Ordering::AcqRel);
        if reply.is_triggered() {
            self.round_triggered.fetch_or(bit, Ordering::AcqRel);
        } else {
            self.round_triggered.fetch_and(!bit, Ordering::AcqRel);
        }

        if mirror {
            self.alive.fetch_or(bit, Ordering::AcqRel);
            if reply.is_triggered() {
                self.triggered.fetch_or(bit, Ordering::AcqRel);
            } else {
                self.triggered.fetch_and(!bit, Ordering::AcqRel);
            }
        }
        true
    }

    /// Publish the finished round and start a new one
    pub fn commit_round(&self) -> MaskView {
        let alive = self.round_alive.swap(0, Ordering::AcqRel);
        let triggered = self.round_triggered.swap(0, Ordering::AcqRel) & alive;
        self.alive.store(alive, Ordering::Release);
        self.triggered.store(triggered, Ordering::Release);
        MaskView { alive, triggered }
    }

    /// Committed masks
    pub fn committed(&self) -> MaskView {
        MaskView {
            alive: self.alive.load(Ordering::Acquire),
            triggered: self.triggered.load(Ordering::Acquire),
        }
    }

    /// Round accumulators
    pub fn round(&self) -> MaskView {
        MaskView {
            alive: self.round_alive.load(Ordering::Acquire),
            triggered: self.round_triggered.load(Ordering::Acquire),
        }
    }

    /// Committed masks merged with the round in progress
    pub fn status_view(&self) -> MaskView {
        let committed = self.committed();
        let round = self.round();
        let alive = committed.alive | round.alive;
        MaskView {
            alive,
            triggered: (committed.triggered | round.triggered) & alive,
        }
    }

    #[cfg(test)]
    pub(crate) fn set_tick(&self, tick: u32) {
        self.tick.store(tick, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reply(addr: u8, state: u8) -> SlaveReply {
        SlaveReply { addr, state }
    }

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed(5, u32::MAX - 4), 10);
        assert_eq!(elapsed(u32::MAX - 4, 5), -10);
        assert!(is_due(3, 3));
        assert!(!is_due(2, 3));
        assert!(is_due(1, u32::MAX));
    }

    #[test]
    fn test_advance_wraps() {
        let state = SchedulerState::new();
        state.set_tick(u32::MAX);
        assert_eq!(state.advance(), 0);
        assert_eq!(state.now(), 0);
    }

    #[test]
    fn test_record_reply_sets_and_clears_triggered() {
        let state = SchedulerState::new();
        assert!(state.record_reply(&reply(3, 0x03), false));
        assert_eq!(state.round(), MaskView { alive: 0b100, triggered: 0b100 });

        assert!(state.record_reply(&reply(3, 0x01), false));
        assert_eq!(state.round(), MaskView { alive: 0b100, triggered: 0 });
        assert_eq!(state.committed(), MaskView::default());
    }

    #[test]
    fn test_record_reply_ignores_unreportable() {
        let state = SchedulerState::new();
        assert!(!state.record_reply(&reply(0, 0x03), false));
        assert!(!state.record_reply(&reply(32, 0x03), false));
        assert!(!state.record_reply(&reply(4, 0x00), false));
        assert_eq!(state.round(), MaskView::default());
    }

    #[test]
    fn test_mirror_updates_committed() {
        let state = SchedulerState::new();
        state.record_reply(&reply(2, 0x03), true);
        assert_eq!(state.committed(), MaskView { alive: 0b10, triggered: 0b10 });

        state.record_reply(&reply(2, 0x01), true);
        assert_eq!(state.committed(), MaskView { alive: 0b10, triggered: 0 });
    }

    #[test]
    fn test_commit_clears_round() {
        let state = SchedulerState::new();
        state.record_reply(&reply(1, 0x03), false);
        state.record_reply(&reply(2, 0x01), false);

        let view = state.commit_round();
        assert_eq!(view, MaskView { alive: 0b11, triggered: 0b01 });
        assert_eq!(state.round(), MaskView::default());

        // A round with no replies publishes empty masks
        assert_eq!(state.commit_round(), MaskView::default());
    }

    #[test]
    fn test_status_view_merges_round() {
        let state = SchedulerState::new();
        state.record_reply(&reply(1, 0x03), false);
        state.commit_round();
        state.record_reply(&reply(5, 0x01), false);

        let view = state.status_view();
        assert_eq!(view.alive, 0b1_0001);
        assert_eq!(view.triggered, 0b1);
    }

    #[test]
    fn test_off_requests_coalesce() {
        let state = SchedulerState::new();
        state.request_off(LedChannel::SlaveLink);
        state.request_off(LedChannel::SlaveLink);
        assert!(!state.off_pending(LedChannel::PixelStrip));
        assert!(state.take_off(LedChannel::SlaveLink));
        assert!(!state.take_off(LedChannel::SlaveLink));
    }

    #[test]
    fn test_idle_clear_once_per_episode() {
        let state = SchedulerState::new();
        assert!(state.begin_idle_clear());
        assert!(!state.begin_idle_clear());
        state.end_idle();
        assert!(state.begin_idle_clear());
    }

    proptest! {
        #[test]
        fn prop_commit_keeps_triggered_within_alive(
            replies in proptest::collection::vec((0u8..40, 0u8..5, any::<bool>()), 0..64)
        ) {
            let state = SchedulerState::new();
            for (addr, st, mirror) in replies {
                state.record_reply(&reply(addr, st), mirror);
                let view = state.commit_round();
                prop_assert_eq!(view.triggered & !view.alive, 0);
                let committed = state.committed();
                prop_assert_eq!(committed.triggered & !committed.alive, 0);
            }
        }

        #[test]
        fn prop_elapsed_matches_offset(start in any::<u32>(), offset in 0u32..(i32::MAX as u32)) {
            let now = start.wrapping_add(offset);
            prop_assert_eq!(elapsed(now, start), offset as i32);
            prop_assert!(is_due(now, start));
        }
    }
}
