//! Pending status reply
//!
//! Single slot holding the latest status frame for the main loop. The last
//! write wins. Each write bumps a generation number so acknowledging a frame
//! that has since been replaced leaves the newer one in place.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec;

use crate::config::STATUS_FRAME_MAX;

/// Status frame bytes
pub type StatusFrame = Vec<u8, STATUS_FRAME_MAX>;

struct Slot {
    frame: StatusFrame,
    generation: u32,
}

/// Frame read from the slot, tagged for [`StatusReply::mark_sent`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub frame: StatusFrame,
    pub generation: u32,
}

pub struct StatusReply {
    slot: Mutex<RefCell<Slot>>,
}

impl Default for StatusReply {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReply {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(Slot {
                frame: Vec::new(),
                generation: 0,
            })),
        }
    }

    /// Replace the slot contents
    pub fn store(&self, frame: &[u8]) {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            slot.frame.clear();
            if slot.frame.extend_from_slice(frame).is_err() {
                slot.frame.clear();
            }
            slot.generation = slot.generation.wrapping_add(1);
        });
    }

    /// Empty the slot
    pub fn clear(&self) {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            slot.frame.clear();
            slot.generation = slot.generation.wrapping_add(1);
        });
    }

    /// Copy of the pending frame, if any
    pub fn peek(&self) -> Option<PendingReply> {
        critical_section::with(|cs| {
            let slot = self.slot.borrow_ref(cs);
            if slot.frame.is_empty() {
                None
            } else {
                Some(PendingReply {
                    frame: slot.frame.clone(),
                    generation: slot.generation,
                })
            }
        })
    }

    /// Release the frame returned by [`peek`](Self::peek)
    ///
    /// Returns false when a newer frame was stored in the meantime; that
    /// frame stays pending.
    pub fn mark_sent(&self, generation: u32) -> bool {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            if slot.generation != generation {
                return false;
            }
            slot.frame.clear();
            true
        })
    }

    /// Remove and return the pending frame
    pub fn take(&self) -> Option<StatusFrame> {
        critical_section::with(|cs| {
            let mut slot = self.slot.borrow_ref_mut(cs);
            if slot.frame.is_empty() {
                None
            } else {
                Some(core::mem::take(&mut slot.frame))
            }
        })
    }

    pub fn is_pending(&self) -> bool {
        critical_section::with(|cs| !self.slot.borrow_ref(cs).frame.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_then_mark_sent() {
        let reply = StatusReply::new();
        assert!(reply.peek().is_none());

        reply.store(&[1, 2, 3]);
        let pending = reply.peek().unwrap();
        assert_eq!(&pending.frame[..], &[1, 2, 3]);
        assert!(reply.is_pending());

        assert!(reply.mark_sent(pending.generation));
        assert!(!reply.is_pending());
    }

    #[test]
    fn test_last_write_wins() {
        let reply = StatusReply::new();
        reply.store(&[1]);
        reply.store(&[2]);
        assert_eq!(&reply.take().unwrap()[..], &[2]);
        assert!(reply.take().is_none());
    }

    #[test]
    fn test_stale_ack_keeps_newer_frame() {
        let reply = StatusReply::new();
        reply.store(&[1]);
        let first = reply.peek().unwrap();
        reply.store(&[2]);

        assert!(!reply.mark_sent(first.generation));
        assert_eq!(&reply.peek().unwrap().frame[..], &[2]);
    }

    #[test]
    fn test_clear_empties_slot() {
        let reply = StatusReply::new();
        reply.store(&[1]);
        reply.clear();
        assert!(reply.peek().is_none());
    }
}
