//! Board-agnostic core logic for the RX hub
//!
//! This crate contains everything that runs on the hub without touching
//! hardware directly:
//!
//! - Tick scheduler with idle watchdog
//! - Transmit queues between the tick and the main loop
//! - LED job tables for the slave link and the pixel strip
//! - Host and slave link handlers
//! - Status frame builder
//! - Collaborator traits and configuration types
//!
//! Shared state lives in [`Hub`] as atomics, so every interrupt context can
//! reach it through a shared reference.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod connectors;
pub mod hub;
pub mod jobs;
pub mod link;
pub mod queue;
pub mod safety;
pub mod scheduler;
pub mod status;
pub mod traits;

pub use hub::Hub;
pub use scheduler::{TickOutcome, TickScheduler};
