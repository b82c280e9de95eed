//! Inbound serial links
//!
//! Each link owns a byte-at-a-time frame parser and applies complete frames
//! to the [`Hub`](crate::hub::Hub). Both are meant to be fed from the
//! receive interrupt of their UART.

pub mod host;
pub mod slave;

pub use host::{CommandError, HostEvent, HostLink};
pub use slave::SlaveLink;
