//! GPIO relay bank
//!
//! Relays driven straight from output pins, active high. Relay numbers on
//! the wire start at 1.

use embedded_hal::digital::OutputPin;
use rxhub_core::traits::{RelayError, RelayOutput};

pub struct RelayBank<P, const N: usize> {
    pins: [P; N],
    states: [bool; N],
}

impl<P: OutputPin, const N: usize> RelayBank<P, N> {
    /// Take ownership of the pins and switch every relay off
    pub fn new(pins: [P; N]) -> Result<Self, RelayError> {
        let mut bank = Self {
            pins,
            states: [false; N],
        };
        for pin in bank.pins.iter_mut() {
            pin.set_low().map_err(|_| RelayError::Pin)?;
        }
        Ok(bank)
    }

    /// Last commanded state of relay `relay`
    pub fn is_on(&self, relay: u8) -> Option<bool> {
        Self::index(relay).map(|i| self.states[i])
    }

    fn index(relay: u8) -> Option<usize> {
        (relay as usize).checked_sub(1).filter(|i| *i < N)
    }
}

impl<P: OutputPin, const N: usize> RelayOutput for RelayBank<P, N> {
    fn set_relay(&mut self, relay: u8, on: bool) -> Result<(), RelayError> {
        let index = Self::index(relay).ok_or(RelayError::InvalidRelay)?;
        let pin = &mut self.pins[index];
        let result = if on { pin.set_high() } else { pin.set_low() };
        result.map_err(|_| RelayError::Pin)?;
        self.states[index] = on;
        Ok(())
    }
}
