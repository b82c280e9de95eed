//! Relay outputs

mod gpio;

pub use gpio::RelayBank;
