//! Output collaborator implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in rxhub-core:
//!
//! - Pixel framebuffer with deferred, throttled flush
//! - GPIO relay bank

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod pixel;
pub mod relay;

pub use pixel::{Framebuffer, StripWriter, LED_OFF, LED_ON};
pub use relay::RelayBank;
