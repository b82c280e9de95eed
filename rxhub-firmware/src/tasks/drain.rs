//! Output drain task
//!
//! The main loop of the board: empties both transmit queues onto their
//! links, sends the pending status reply to the App and pushes the pixel
//! framebuffer to the strip when a flush was requested.

use core::convert::Infallible;

use defmt::*;
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio_programs::uart::PioUartTx;
use embassy_rp::pio_programs::ws2812::PioWs2812;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;
use smart_leds::RGB8;

use rxhub_core::config::PIXEL_LED_COUNT;
use rxhub_core::queue::{PixelConsumer, SlaveConsumer};
use rxhub_drivers::{StripWriter, LED_OFF};

use crate::channels::{HUB, PIXELS, TX_READY};

/// Serial and LED outputs owned by the drain task
pub struct Outputs {
    pub host_tx: BufferedUartTx,
    pub slave_tx: BufferedUartTx,
    pub bin_tx: PioUartTx<'static, PIO0, 0>,
    pub strip: PioWs2812<'static, PIO0, 1, PIXEL_LED_COUNT>,
}

/// Copy of the framebuffer taken under the lock, written after release
struct StripSnapshot {
    pixels: [RGB8; PIXEL_LED_COUNT],
}

impl StripWriter for StripSnapshot {
    type Error = Infallible;

    fn write(&mut self, pixels: &[RGB8]) -> Result<(), Infallible> {
        self.pixels.copy_from_slice(pixels);
        Ok(())
    }
}

#[embassy_executor::task]
pub async fn drain_task(
    mut outputs: Outputs,
    mut slave_queue: SlaveConsumer<'static>,
    mut pixel_queue: PixelConsumer<'static>,
) {
    info!("Drain task started");

    let mut snapshot = StripSnapshot {
        pixels: [LED_OFF; PIXEL_LED_COUNT],
    };
    let mut reported_drops = (0u32, 0u32);

    loop {
        TX_READY.wait().await;

        while let Some(frame) = slave_queue.pop() {
            if let Err(e) = outputs.slave_tx.write_all(frame.as_bytes()).await {
                warn!("Slave UART write error: {:?}", e);
            }
        }

        while let Some(frame) = pixel_queue.pop() {
            if let Err(e) = outputs.bin_tx.write_all(frame.as_bytes()).await {
                warn!("BIN link write error: {:?}", e);
            }
        }

        if let Some(pending) = HUB.reply.peek() {
            if let Err(e) = outputs.host_tx.write_all(&pending.frame).await {
                warn!("Host UART write error: {:?}", e);
            }
            HUB.reply.mark_sent(pending.generation);
        }

        let now = HUB.state.now();
        let flushed = PIXELS.lock(|fb| fb.borrow_mut().flush_if_pending(now, &mut snapshot));
        if let Ok(true) = flushed {
            outputs.strip.write(&snapshot.pixels).await;
        }

        let drops = (slave_queue.drops(), pixel_queue.drops());
        if drops != reported_drops {
            warn!("TX queue drops: slave={} pixel={}", drops.0, drops.1);
            reported_drops = drops;
        }
    }
}
