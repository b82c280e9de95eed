//! Board configuration
//!
//! `BOARD` is generated by build.rs from board.toml, which is validated
//! there, so the values are known good at compile time.

use rxhub_core::config::{BoardConfig, LinkConfig, TimingConfig};

include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
