//! Configuration types
//!
//! Table capacities, scheduler timing and serial link settings.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
