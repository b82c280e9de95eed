//! App host receive task
//!
//! Feeds bytes from the host UART into the host link. Commands run against
//! the hub, the pixel framebuffer and the relay bank.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use rxhub_core::config::RELAY_COUNT;
use rxhub_core::link::{HostEvent, HostLink};
use rxhub_drivers::RelayBank;

use crate::channels::{HUB, PIXELS, TX_READY};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

#[embassy_executor::task]
pub async fn host_rx_task(
    mut rx: BufferedUartRx,
    mut relays: RelayBank<Output<'static>, RELAY_COUNT>,
) {
    info!("Host RX task started");

    let mut link = HostLink::new(&HUB);
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    let result =
                        PIXELS.lock(|fb| link.on_byte(byte, &mut *fb.borrow_mut(), &mut relays));
                    match result {
                        Ok(Some(event)) => {
                            log_event(event);
                            TX_READY.signal(());
                        }
                        Ok(None) => {}
                        Err(e) => trace!("Host frame dropped: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Host UART read error: {:?}", e);
                link.reset();
            }
        }
    }
}

fn log_event(event: HostEvent) {
    match event {
        HostEvent::Handled { service } => trace!("Host command 0x{:02x} handled", service),
        HostEvent::Rejected { service, error } => {
            warn!("Host command 0x{:02x} rejected: {:?}", service, error)
        }
        HostEvent::Ignored => trace!("Host frame for another board ignored"),
    }
}
