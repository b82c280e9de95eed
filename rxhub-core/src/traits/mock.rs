//! Recording collaborators for tests

use heapless::Vec;

use super::{PixelBuffer, RelayError, RelayOutput};

/// Calls made on a [`PixelBuffer`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PixelCall {
    ClearAll,
    SetOne(u8),
    SetExclusive(u8),
    SetMask(Vec<u8, 64>),
    Flush,
}

#[derive(Debug, Default)]
pub struct MockPixels {
    pub calls: Vec<PixelCall, 64>,
}

impl MockPixels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls other than flush requests
    pub fn changes(&self) -> impl Iterator<Item = &PixelCall> {
        self.calls.iter().filter(|c| **c != PixelCall::Flush)
    }

    pub fn flushes(&self) -> usize {
        self.calls.iter().filter(|c| **c == PixelCall::Flush).count()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn record(&mut self, call: PixelCall) {
        // Keep the newest calls if a long test overflows the log
        if self.calls.is_full() {
            self.calls.remove(0);
        }
        let _ = self.calls.push(call);
    }
}

impl PixelBuffer for MockPixels {
    fn clear_all(&mut self) {
        self.record(PixelCall::ClearAll);
    }

    fn set_one(&mut self, led: u8) {
        self.record(PixelCall::SetOne(led));
    }

    fn set_exclusive(&mut self, led: u8) {
        self.record(PixelCall::SetExclusive(led));
    }

    fn set_mask_and_clear_others(&mut self, leds: &[u8]) {
        let mask = Vec::from_slice(leds).unwrap_or_default();
        self.record(PixelCall::SetMask(mask));
    }

    fn request_flush(&mut self) {
        self.record(PixelCall::Flush);
    }
}

/// Relay bank with `N` relays that records the last state of each
#[derive(Debug)]
pub struct MockRelays<const N: usize> {
    pub states: [bool; N],
}

impl<const N: usize> Default for MockRelays<N> {
    fn default() -> Self {
        Self { states: [false; N] }
    }
}

impl<const N: usize> RelayOutput for MockRelays<N> {
    fn set_relay(&mut self, relay: u8, on: bool) -> Result<(), RelayError> {
        let index = (relay as usize)
            .checked_sub(1)
            .filter(|i| *i < N)
            .ok_or(RelayError::InvalidRelay)?;
        self.states[index] = on;
        Ok(())
    }
}
