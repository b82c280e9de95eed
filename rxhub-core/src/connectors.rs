//! Connector map uploaded by the App
//!
//! Ordered list of polled connector addresses. Written only by the host
//! link; the tick and the status builder read it.

use portable_atomic::{AtomicU8, Ordering};
use rxhub_protocol::{connector_bit, MapUpload};

use crate::config::MAX_CFG;

pub struct ConnectorMap {
    entries: [AtomicU8; MAX_CFG],
    count: AtomicU8,
}

impl Default for ConnectorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectorMap {
    pub const fn new() -> Self {
        Self {
            entries: [const { AtomicU8::new(0) }; MAX_CFG],
            count: AtomicU8::new(0),
        }
    }

    /// Replace the map with the active entries of an upload, in order
    ///
    /// Entries past [`MAX_CFG`] are ignored. Returns the new count.
    pub fn apply_upload(&self, upload: &MapUpload<'_>) -> usize {
        self.replace(upload.active_connectors())
    }

    /// Replace the map with `connectors`, truncated to [`MAX_CFG`]
    pub fn replace(&self, connectors: impl IntoIterator<Item = u8>) -> usize {
        self.count.store(0, Ordering::Release);
        let mut count = 0;
        for (slot, addr) in self.entries.iter().zip(connectors) {
            slot.store(addr, Ordering::Relaxed);
            count += 1;
        }
        self.count.store(count as u8, Ordering::Release);
        count
    }

    pub fn len(&self) -> usize {
        (self.count.load(Ordering::Acquire) as usize).min(MAX_CFG)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Connector at `index`, if within the map
    pub fn get(&self, index: usize) -> Option<u8> {
        if index < self.len() {
            Some(self.entries[index].load(Ordering::Relaxed))
        } else {
            None
        }
    }

    /// Configured connectors in map order
    pub fn iter(&self) -> impl ExactSizeIterator<Item = u8> + '_ {
        self.entries[..self.len()]
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
    }

    /// Union of the mask bits of every configured connector
    pub fn mask(&self) -> u32 {
        self.iter().fold(0, |m, c| m | connector_bit(c))
    }
}
