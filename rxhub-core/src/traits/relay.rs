//! Relay outputs

/// Errors driving a relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayError {
    /// Relay number outside the bank
    InvalidRelay,
    /// Output pin reported a failure
    Pin,
}

/// Bank of relays numbered from 1
pub trait RelayOutput {
    fn set_relay(&mut self, relay: u8, on: bool) -> Result<(), RelayError>;
}

impl<T: RelayOutput + ?Sized> RelayOutput for &mut T {
    fn set_relay(&mut self, relay: u8, on: bool) -> Result<(), RelayError> {
        (**self).set_relay(relay, on)
    }
}
