//! SPI transmit abstractions
//!
//! The LED output only ever shifts bytes out, one per transmit-empty
//! interrupt. Clock and data line are the only pins that matter; the strip
//! listens to the data line alone.

pub use embedded_hal::spi::{Mode, MODE_2};

/// Transmit-only SPI port
pub trait SpiTx {
    /// Write one byte into the transmit data register
    ///
    /// Called from the transmit-empty interrupt, so the register is known to
    /// have room and this must not wait.
    fn write_byte(&mut self, byte: u8);
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        // 4 SPI bits per WS2812 bit; clock idles high like the LED line
        Self::new(3_000_000, MODE_2)
    }
}

impl SpiConfig {
    /// Configuration for `frequency` in an embedded-hal SPI mode
    pub const fn new(frequency: u32, mode: Mode) -> Self {
        Self {
            frequency,
            polarity: match mode.polarity {
                embedded_hal::spi::Polarity::IdleLow => Polarity::IdleLow,
                embedded_hal::spi::Polarity::IdleHigh => Polarity::IdleHigh,
            },
            phase: match mode.phase {
                embedded_hal::spi::Phase::CaptureOnFirstTransition => {
                    Phase::CaptureOnFirstTransition
                }
                embedded_hal::spi::Phase::CaptureOnSecondTransition => {
                    Phase::CaptureOnSecondTransition
                }
            },
        }
    }

    /// Smallest power-of-two prescaler that keeps the clock at or below
    /// `frequency` for the given peripheral clock
    ///
    /// Returns the divider exponent (`0` = /2, `7` = /256), or `None` if even
    /// /256 is too fast.
    pub fn prescaler_exponent(&self, pclk_hz: u32) -> Option<u8> {
        (0u8..8).find(|&exp| pclk_hz >> (exp + 1) <= self.frequency)
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}
