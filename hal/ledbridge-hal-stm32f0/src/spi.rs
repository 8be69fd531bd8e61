//! SPI1 output port for STM32F0
//!
//! Master, 8-bit frames, MSB first. Only the data line reaches the strip.
//! The transmit-empty interrupt stays enabled for good: every time the FIFO
//! has room the handler pushes exactly one byte.

use embassy_stm32::pac;
use embassy_stm32::pac::spi::{vals, Spi as Regs};
use ledbridge_hal::spi::{Phase, Polarity, SpiConfig};
use ledbridge_hal::SpiTx;

/// Errors from setting up the SPI output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiSetupError {
    /// No prescaler brings the peripheral clock down to the requested rate
    FrequencyOutOfRange,
}

/// SPI peripheral driving the LED line
pub struct SpiOutput {
    regs: Regs,
}

impl SpiOutput {
    /// Wrap the SPI1 registers, usable in a `static`
    pub const fn spi1() -> Self {
        Self::new(pac::SPI1)
    }

    /// Wrap a register block
    pub const fn new(regs: Regs) -> Self {
        Self { regs }
    }

    /// Enable the peripheral clock and program mode, rate and frame size
    ///
    /// Returns the resulting bit clock in Hz. The peripheral stays off
    /// until [`Self::start`].
    pub fn configure(&self, config: &SpiConfig, pclk_hz: u32) -> Result<u32, SpiSetupError> {
        let exp = config
            .prescaler_exponent(pclk_hz)
            .ok_or(SpiSetupError::FrequencyOutOfRange)?;

        pac::RCC.apb2enr().modify(|w| w.set_spi1en(true));

        self.regs.cr1().modify(|w| w.set_spe(false));
        self.regs.cr2().write(|w| {
            w.set_ds(vals::Ds::BITS8);
            w.set_frxth(vals::Frxth::QUARTER);
        });
        self.regs.cr1().write(|w| {
            w.set_cpol(match config.polarity {
                Polarity::IdleLow => vals::Cpol::IDLE_LOW,
                Polarity::IdleHigh => vals::Cpol::IDLE_HIGH,
            });
            w.set_cpha(match config.phase {
                Phase::CaptureOnFirstTransition => vals::Cpha::FIRST_EDGE,
                Phase::CaptureOnSecondTransition => vals::Cpha::SECOND_EDGE,
            });
            w.set_mstr(vals::Mstr::MASTER);
            w.set_br(vals::Br::from_bits(exp));
            // No NSS pin: hold the internal select high to stay master
            w.set_ssm(true);
            w.set_ssi(true);
        });

        Ok(pclk_hz >> (exp + 1))
    }

    /// Enable the peripheral and its transmit-empty interrupt
    ///
    /// The FIFO is empty, so the interrupt fires right away and the output
    /// starts with the reset gap.
    pub fn start(&self) {
        self.regs.cr2().modify(|w| w.set_txeie(true));
        self.regs.cr1().modify(|w| w.set_spe(true));
    }
}

impl SpiTx for SpiOutput {
    #[inline]
    fn write_byte(&mut self, byte: u8) {
        // Byte-wide store: a 16-bit store to DR would queue two frames
        self.regs.dr8().write_value(byte);
    }
}
