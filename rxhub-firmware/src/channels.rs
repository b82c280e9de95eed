//! State shared between tasks
//!
//! The hub is reached from every task through atomics and short critical
//! sections. The pixel framebuffer sits behind a blocking
//! critical-section mutex; only the drain task writes it to the strip.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use rxhub_core::config::PIXEL_LED_COUNT;
use rxhub_core::Hub;
use rxhub_drivers::Framebuffer;

use crate::config::BOARD;

/// Interrupt-shared scheduler, job and status state
pub static HUB: Hub = Hub::new();

/// Local pixel-strip framebuffer
pub static PIXELS: Mutex<CriticalSectionRawMutex, RefCell<Framebuffer<PIXEL_LED_COUNT>>> =
    Mutex::new(RefCell::new(Framebuffer::new(BOARD.timing.min_flush_ticks)));

/// Signal that queued output is waiting for the drain task
pub static TX_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();
