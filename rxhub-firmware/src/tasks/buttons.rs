//! Front-panel buttons
//!
//! Each falling edge latches its bit into the status byte until the App
//! clears it.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use rxhub_core::status::{EXT_BUTTON_S1, EXT_BUTTON_S2};

use crate::channels::{HUB, TX_READY};

/// Lockout after an edge while the contact settles
const SETTLE_MS: u64 = 20;

#[embassy_executor::task]
pub async fn buttons_task(mut s1: Input<'static>, mut s2: Input<'static>) {
    info!("Button task started");

    loop {
        let bits = match select(s1.wait_for_falling_edge(), s2.wait_for_falling_edge()).await {
            Either::First(()) => EXT_BUTTON_S1,
            Either::Second(()) => EXT_BUTTON_S2,
        };
        debug!("Button edge: 0x{:02x}", bits);

        HUB.on_button_edge(bits);
        TX_READY.signal(());

        Timer::after_millis(SETTLE_MS).await;
    }
}
