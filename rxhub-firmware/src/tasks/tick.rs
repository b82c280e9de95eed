//! Scheduler tick task
//!
//! Runs one scheduler tick per period. The tick is the only producer on the
//! transmit queues and signals the drain task after each run.

use defmt::*;
use embassy_time::{Duration, Ticker};

use rxhub_core::config::TimingConfig;
use rxhub_core::{TickOutcome, TickScheduler};

use crate::channels::{HUB, PIXELS, TX_READY};

#[embassy_executor::task]
pub async fn tick_task(mut scheduler: TickScheduler<'static>, timing: TimingConfig) {
    info!(
        "Tick task started: {} ms period, idle after {} ticks",
        timing.tick_period_ms, timing.idle_ticks
    );

    let mut ticker = Ticker::every(Duration::from_millis(timing.tick_period_ms as u64));
    let mut last: Option<TickOutcome> = None;

    loop {
        ticker.next().await;

        let outcome = PIXELS.lock(|fb| scheduler.on_tick(&mut *fb.borrow_mut()));

        // Log changes of activity, not every poll
        if last != Some(outcome) {
            match outcome {
                TickOutcome::Idle => info!("App silent, LED channels blanked"),
                TickOutcome::Polled { .. } => trace!("Tick {}: {:?}", HUB.state.now(), outcome),
                _ => debug!("Tick {}: {:?}", HUB.state.now(), outcome),
            }
            last = Some(outcome);
        }

        TX_READY.signal(());
    }
}
