//! Interrupt handlers
//!
//! Each vector owns its half of the bridge as handler-local state. The only
//! thing they share is [`FRAME`].

use embassy_stm32::interrupt;
use ledbridge_core::{BusTarget, Phase, StripOutput};
use ledbridge_hal::TargetEvent;
use ledbridge_hal_stm32f0::{I2cTarget, SpiOutput};

use crate::config::{BRIDGE, FRAME_LEN};
use crate::{stats, FRAME};

/// SPI1 transmit-empty: one byte per entry
#[interrupt]
fn SPI1() {
    static mut OUTPUT: StripOutput<'static, FRAME_LEN> =
        StripOutput::new(&FRAME, BRIDGE.reset_bytes());
    static mut PORT: SpiOutput = SpiOutput::spi1();

    OUTPUT.service(PORT);

    if OUTPUT.encoder().phase() == Phase::Reset {
        stats::publish_passes(OUTPUT.encoder().completed_passes());
    }
}

/// I2C1 event and error: one event per entry, re-entered while flags remain
#[interrupt]
fn I2C1() {
    static mut BUS: BusTarget<'static, FRAME_LEN> = BusTarget::new(&FRAME, &BRIDGE);
    static mut PORT: I2cTarget = I2cTarget::i2c1();
    static mut BUS_ERRORS: u32 = 0;

    if PORT.take_error().is_some() {
        *BUS_ERRORS = BUS_ERRORS.wrapping_add(1);
        stats::publish_bus_errors(*BUS_ERRORS);
    }

    if let Some(TargetEvent::Stop) = BUS.service(PORT) {
        stats::publish_slave(&BUS.slave().stats());
    }
}
