//! STM32F0 ports for the LED bridge
//!
//! Register-level implementations of the `ledbridge-hal` ports for the
//! STM32F042. The peripherals are driven straight from their interrupt
//! vectors, so these types talk to the PAC exposed by `embassy-stm32` rather
//! than to its async drivers.
//!
//! - [`i2c::I2cTarget`] - I2C1 in target mode, one [`TargetEvent`] per flag
//! - [`spi::SpiOutput`] - SPI1 master, transmit-empty interrupt
//! - [`gpio::AfPin`] - alternate-function pin muxing for both
//!
//! # Features
//!
//! - `stm32f042f6` / `stm32f042k6` - chip selection, forwarded to embassy-stm32
//! - `defmt` - Enable debug formatting support
//!
//! [`TargetEvent`]: ledbridge_hal::TargetEvent

#![no_std]

pub mod gpio;
pub mod i2c;
pub mod spi;

pub use i2c::{I2cBusError, I2cTarget};
pub use spi::{SpiOutput, SpiSetupError};

/// System clock with the HSI48 oscillator selected
pub const SYSCLK_HZ: u32 = 48_000_000;

/// APB clock feeding SPI1 (no APB prescaler)
pub const PCLK_HZ: u32 = SYSCLK_HZ;

/// I2C1 kernel clock (HSI, the reset default of `I2C1SW`)
pub const I2C_KERNEL_CLOCK_HZ: u32 = 8_000_000;
