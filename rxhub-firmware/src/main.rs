//! RX hub motherboard firmware
//!
//! Main firmware binary for the RP2040-based RX hub. Polls the slave bus,
//! reports connector status to the App and drives the slave-link and
//! pixel-strip LED channels.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::{PIO0, UART0, UART1};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::uart::{PioUartTx, PioUartTxProgram};
use embassy_rp::pio_programs::ws2812::{PioWs2812, PioWs2812Program};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use rxhub_core::queue::{PixelTxQueue, SlaveTxQueue};
use rxhub_core::TickScheduler;
use rxhub_drivers::RelayBank;

use crate::channels::{HUB, PIXELS};
use crate::config::BOARD;

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    PIO0_IRQ_0 => embassy_rp::pio::InterruptHandler<PIO0>;
});

// Static cells for UART buffers (must live forever)
static HOST_TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static HOST_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static SLAVE_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static SLAVE_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

// Transmit queues; the tick owns the producers, the drain task the consumers
static SLAVE_TXQ: StaticCell<SlaveTxQueue> = StaticCell::new();
static PIXEL_TXQ: StaticCell<PixelTxQueue> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("RX hub firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let board = BOARD;
    if let Err(e) = board.validate() {
        // build.rs rejects bad board files, so this only fires on a hand-edited build
        error!("Board configuration invalid: {:?}", e);
    }
    info!(
        "Board: tick={}ms idle={} ticks, host={} slave={} bin={} baud",
        board.timing.tick_period_ms,
        board.timing.idle_ticks,
        board.links.host_baud,
        board.links.slave_baud,
        board.links.pixel_baud
    );

    // App host link (GPIO0 TX, GPIO1 RX)
    let mut host_config = UartConfig::default();
    host_config.baudrate = board.links.host_baud;
    let host_uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, host_config).into_buffered(
        Irqs,
        HOST_TX_BUF.init([0u8; 256]),
        HOST_RX_BUF.init([0u8; 256]),
    );
    let (host_tx, host_rx) = host_uart.split();

    // Slave bus (GPIO4 TX, GPIO5 RX)
    let mut slave_config = UartConfig::default();
    slave_config.baudrate = board.links.slave_baud;
    let slave_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, slave_config).into_buffered(
        Irqs,
        SLAVE_TX_BUF.init([0u8; 64]),
        SLAVE_RX_BUF.init([0u8; 64]),
    );
    let (slave_tx, slave_rx) = slave_uart.split();

    info!("UARTs initialized");

    // PIO0: SM0 is the BIN link transmitter (GPIO6), SM1 drives the local strip (GPIO16)
    let Pio {
        mut common,
        sm0,
        sm1,
        ..
    } = Pio::new(p.PIO0, Irqs);

    let bin_program = PioUartTxProgram::new(&mut common);
    let bin_tx = PioUartTx::new(board.links.pixel_baud, &mut common, sm0, p.PIN_6, &bin_program);

    let strip_program = PioWs2812Program::new(&mut common);
    let strip = PioWs2812::new(&mut common, sm1, p.DMA_CH0, p.PIN_16, &strip_program);

    PIXELS.lock(|fb| fb.borrow_mut().init());

    info!("PIO BIN link and pixel strip initialized");

    // Relays 1..6 on GPIO10..15, all off
    let relays = RelayBank::new([
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
    ])
    .unwrap();

    // Buttons S1/S2, active low
    let s1 = Input::new(p.PIN_20, Pull::Up);
    let s2 = Input::new(p.PIN_21, Pull::Up);

    let (slave_producer, slave_consumer) = SLAVE_TXQ.init(SlaveTxQueue::new()).split();
    let (pixel_producer, pixel_consumer) = PIXEL_TXQ.init(PixelTxQueue::new()).split();
    let scheduler = TickScheduler::new(&HUB, slave_producer, pixel_producer, &board.timing);

    spawner
        .spawn(tasks::tick_task(scheduler, board.timing))
        .unwrap();
    spawner.spawn(tasks::host_rx_task(host_rx, relays)).unwrap();
    spawner.spawn(tasks::slave_rx_task(slave_rx)).unwrap();
    spawner.spawn(tasks::buttons_task(s1, s2)).unwrap();
    spawner
        .spawn(tasks::drain_task(
            tasks::Outputs {
                host_tx,
                slave_tx,
                bin_tx,
                strip,
            },
            slave_consumer,
            pixel_consumer,
        ))
        .unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
