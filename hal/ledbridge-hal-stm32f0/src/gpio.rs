//! Alternate-function pin muxing for STM32F0
//!
//! Port clocks are already running once `embassy_stm32::init` returns, so
//! muxing a pin is four register updates on its port.

use embassy_stm32::pac;
use embassy_stm32::pac::gpio::{vals, Gpio};

/// MODER value for alternate function
const MODE_ALTERNATE: u8 = 0b10;

/// OSPEEDR value for the fastest edge rate
const SPEED_HIGH: u8 = 0b11;

/// PUPDR value for no pull resistor
const PULL_NONE: u8 = 0b00;

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// GPIOA
    A,
    /// GPIOB
    B,
}

impl Port {
    fn regs(self) -> Gpio {
        match self {
            Port::A => pac::GPIOA,
            Port::B => pac::GPIOB,
        }
    }
}

/// Output driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputType {
    /// Push-pull
    PushPull,
    /// Open-drain (bus lines with external pull-ups)
    OpenDrain,
}

/// A pin routed to a peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AfPin {
    /// Port the pin belongs to
    pub port: Port,
    /// Pin number within the port (0-15)
    pub pin: usize,
    /// Alternate function number
    pub af: u8,
    /// Output driver
    pub output: OutputType,
}

impl AfPin {
    /// PB6, I2C1 clock
    pub const I2C1_SCL: Self = Self::new(Port::B, 6, 1, OutputType::OpenDrain);

    /// PB7, I2C1 data
    pub const I2C1_SDA: Self = Self::new(Port::B, 7, 1, OutputType::OpenDrain);

    /// PA5, SPI1 clock (not wired to the strip)
    pub const SPI1_SCK: Self = Self::new(Port::A, 5, 0, OutputType::PushPull);

    /// PA7, SPI1 data out, drives the strip
    pub const SPI1_MOSI: Self = Self::new(Port::A, 7, 0, OutputType::PushPull);

    /// Describe a pin
    pub const fn new(port: Port, pin: usize, af: u8, output: OutputType) -> Self {
        Self {
            port,
            pin,
            af,
            output,
        }
    }

    /// Route the pin to its peripheral
    pub fn apply(&self) {
        let gpio = self.port.regs();
        let n = self.pin;

        gpio.afr(n / 8).modify(|w| w.set_afr(n % 8, self.af));
        gpio.otyper().modify(|w| {
            w.set_ot(
                n,
                vals::Ot::from_bits((self.output == OutputType::OpenDrain) as u8),
            )
        });
        gpio.ospeedr()
            .modify(|w| w.set_ospeedr(n, vals::Ospeedr::from_bits(SPEED_HIGH)));
        gpio.pupdr()
            .modify(|w| w.set_pupdr(n, vals::Pupdr::from_bits(PULL_NONE)));
        // Mode last, so the pin never drives with a stale function
        gpio.moder()
            .modify(|w| w.set_moder(n, vals::Moder::from_bits(MODE_ALTERNATE)));
    }
}
