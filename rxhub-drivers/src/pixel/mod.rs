//! Pixel-strip framebuffer

mod framebuffer;

pub use framebuffer::{Framebuffer, StripWriter, LED_OFF, LED_ON};
