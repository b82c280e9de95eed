//! Slave bus receive task

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use rxhub_core::link::SlaveLink;

use crate::channels::HUB;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

#[embassy_executor::task]
pub async fn slave_rx_task(mut rx: BufferedUartRx) {
    info!("Slave RX task started");

    let mut link = SlaveLink::new(&HUB);
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                for &byte in &buf[..n] {
                    match link.on_byte(byte) {
                        Ok(Some(reply)) => trace!("Slave {} state {}", reply.addr, reply.state),
                        Ok(None) => {}
                        Err(e) => trace!("Slave frame dropped: {:?}", e),
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("Slave UART read error: {:?}", e);
                link.reset();
            }
        }
    }
}
