//! Embassy async tasks
//!
//! All tasks run on the thread executor and share state through the hub.

pub mod buttons;
pub mod drain;
pub mod host_rx;
pub mod slave_rx;
pub mod tick;

pub use buttons::buttons_task;
pub use drain::{drain_task, Outputs};
pub use host_rx::host_rx_task;
pub use slave_rx::slave_rx_task;
pub use tick::tick_task;
