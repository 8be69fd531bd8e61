//! Peripheral bring-up
//!
//! Both peripherals are configured with their interrupts masked, then
//! [`start`] unmasks them in one go. The bus handler must be able to preempt
//! the output handler: a held I2C byte only stretches the clock, but a late
//! SPI byte stretches a WS2812 bit.

use defmt::*;
use embassy_stm32::interrupt::{self, InterruptExt, Priority};
use ledbridge_hal::i2c::I2cConfig;
use ledbridge_hal::spi::{SpiConfig, MODE_2};
use ledbridge_hal_stm32f0::gpio::AfPin;
use ledbridge_hal_stm32f0::{I2cBusError, I2cTarget, SpiOutput, SpiSetupError, PCLK_HZ};
use ledbridge_protocol::SLAVE_ADDRESS;

use crate::config::{BRIDGE, I2C_FREQUENCY_HZ};

/// Bus events: may preempt the output handler
const I2C_PRIORITY: Priority = Priority::P0;

/// Output bytes
const SPI_PRIORITY: Priority = Priority::P1;

/// Errors from bring-up
#[derive(Debug, Clone, Copy, Format)]
pub enum SetupError {
    /// SPI output could not be configured
    Spi(SpiSetupError),
    /// I2C target could not be configured
    I2c(I2cBusError),
}

impl From<SpiSetupError> for SetupError {
    fn from(e: SpiSetupError) -> Self {
        SetupError::Spi(e)
    }
}

impl From<I2cBusError> for SetupError {
    fn from(e: I2cBusError) -> Self {
        SetupError::I2c(e)
    }
}

/// Configure SPI1 on PA5/PA7 for the LED line
///
/// Returns the bit clock actually reached.
pub fn setup_spi() -> Result<u32, SetupError> {
    AfPin::SPI1_SCK.apply();
    AfPin::SPI1_MOSI.apply();

    let config = SpiConfig::new(BRIDGE.bit_clock_hz, MODE_2);
    let hz = SpiOutput::spi1().configure(&config, PCLK_HZ)?;
    info!("SPI1 ready: {} Hz bit clock", hz);
    Ok(hz)
}

/// Configure I2C1 on PB6/PB7 as target at the bridge address
pub fn setup_i2c() -> Result<(), SetupError> {
    AfPin::I2C1_SCL.apply();
    AfPin::I2C1_SDA.apply();

    let config = I2cConfig {
        frequency: I2C_FREQUENCY_HZ,
        address: SLAVE_ADDRESS,
    };
    I2cTarget::i2c1().configure(&config)?;
    info!("I2C1 ready: target 0x{:02x} at {} Hz", SLAVE_ADDRESS, I2C_FREQUENCY_HZ);
    Ok(())
}

/// Set priorities, unmask both vectors and switch the peripherals on
pub fn start() {
    interrupt::I2C1.set_priority(I2C_PRIORITY);
    interrupt::SPI1.set_priority(SPI_PRIORITY);

    // SAFETY: both handlers only touch their own state and the atomic frame
    unsafe {
        interrupt::I2C1.enable();
        interrupt::SPI1.enable();
    }

    I2cTarget::i2c1().enable();
    SpiOutput::spi1().start();
}
