//! LED Bridge firmware
//!
//! STM32F042 firmware that exposes a WS2812 strip as an I2C register file at
//! address 0x74. Bus writes land in a shared frame buffer; the SPI output
//! re-sends that frame to the strip without pause.
//!
//! The bridge runs entirely in the I2C1 and SPI1 interrupt handlers. The
//! embassy executor only hosts the status logger.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use ledbridge_core::FrameBuffer;
use {defmt_rtt as _, panic_probe as _};

use crate::config::{BRIDGE, FRAME_LEN};

mod config;
mod handlers;
mod setup;
mod stats;
mod tasks;

/// LED colors, shared by both handlers
pub static FRAME: FrameBuffer<FRAME_LEN> = FrameBuffer::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LED bridge firmware starting...");

    let mut stm32_config = embassy_stm32::Config::default();
    {
        use embassy_stm32::rcc::*;
        // 48 MHz from HSI48: SPI1 divides it to the bit clock
        stm32_config.rcc.hsi48 = Some(Hsi48Config {
            sync_from_usb: false,
        });
        stm32_config.rcc.sys = Sysclk::HSI48;
    }
    let _p = embassy_stm32::init(stm32_config);
    info!("Clocks initialized");

    if let Err(e) = BRIDGE.validate() {
        error!("Invalid bridge configuration: {:?}", e);
        halt();
    }
    info!(
        "Bridge: {} LEDs, {:?} addressing, remap {:?}",
        BRIDGE.led_count, BRIDGE.address_width, BRIDGE.remap
    );
    info!(
        "Reset gap: {} bytes ({} us), bit period {} ns",
        BRIDGE.reset_bytes(),
        BRIDGE.reset_hold_actual_us(),
        BRIDGE.bit_period_ns()
    );

    if let Err(e) = setup::setup_spi().and_then(|_| setup::setup_i2c()) {
        error!("Peripheral setup failed: {:?}", e);
        halt();
    }

    setup::start();
    info!("Bridge running");

    if let Err(e) = spawner.spawn(tasks::status_task()) {
        warn!("Status task not started: {:?}", e);
    }
}

/// Stop here for good, leaving the strip dark
fn halt() -> ! {
    loop {
        cortex_m::asm::wfi();
    }
}
