//! RX hub wire protocol
//!
//! This crate defines the framing shared by the RX motherboard and its three
//! serial peers: the App host, the slave bus, and the BIN pixel strip.
//!
//! # Protocol Overview
//!
//! App frames (both directions):
//! ```text
//! ┌───────┬─────┬───────┬──────┬────┬─────────────┬─────┐
//! │ START │ LEN │ GROUP │ ADDR │ SC │ PAYLOAD     │ END │
//! │ 0x27  │ 1B  │ 1B    │ 1B   │ 1B │ LEN-3 bytes │0x16 │
//! └───────┴─────┴───────┴──────┴────┴─────────────┴─────┘
//! ```
//!
//! Slave and BIN frames are short fixed frames built by [`slave`] and
//! [`pixel`]. All parsing happens one byte at a time through
//! [`FrameParser`], so it can run inside a receive interrupt.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod codes;
pub mod frame;
pub mod messages;
pub mod pixel;
pub mod slave;

pub use codes::connector_bit;
pub use frame::{Frame, FrameError, FrameParser, MAX_BODY_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use messages::{HostCommand, LedChannel, LedMode, MapUpload, TargetSet};
pub use slave::SlaveReply;
