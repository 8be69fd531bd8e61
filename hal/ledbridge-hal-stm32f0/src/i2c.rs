//! I2C1 target (slave) port for STM32F0
//!
//! The peripheral is left in target mode with clock stretching on, so the
//! master waits while an event is pending and the handler can take them one
//! at a time.

use embassy_stm32::i2c::Error as I2cError;
use embassy_stm32::pac;
use embassy_stm32::pac::i2c::{regs, vals, I2c as Regs};
use ledbridge_hal::i2c::I2cConfig;
use ledbridge_hal::{Direction, I2cTargetPort, TargetEvent};

/// TIMINGR for standard mode at an 8 MHz kernel clock (RM0091)
const TIMINGR_STANDARD_8MHZ: u32 = 0x1042_0F13;

/// TIMINGR for fast mode at an 8 MHz kernel clock (RM0091)
const TIMINGR_FAST_8MHZ: u32 = 0x0031_0309;

/// Error from I2C operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cBusError {
    /// Misplaced start or stop condition
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// NACK received
    Nack,
    /// Timeout
    Timeout,
    /// CRC error
    Crc,
    /// Received byte not read in time
    Overrun,
    /// Own address does not fit in 7 bits
    InvalidAddress,
    /// No timing preset for the requested bus frequency
    UnsupportedFrequency,
    /// Other error
    Other,
}

impl From<I2cError> for I2cBusError {
    fn from(e: I2cError) -> Self {
        match e {
            I2cError::Bus => I2cBusError::Bus,
            I2cError::Arbitration => I2cBusError::ArbitrationLost,
            I2cError::Nack => I2cBusError::Nack,
            I2cError::Timeout => I2cBusError::Timeout,
            I2cError::Crc => I2cBusError::Crc,
            I2cError::Overrun => I2cBusError::Overrun,
            _ => I2cBusError::Other,
        }
    }
}

/// TIMINGR preset for `frequency`
///
/// Presets assume [`crate::I2C_KERNEL_CLOCK_HZ`].
pub const fn timing_for(frequency: u32) -> Option<u32> {
    match frequency {
        I2cConfig::STANDARD => Some(TIMINGR_STANDARD_8MHZ),
        I2cConfig::FAST => Some(TIMINGR_FAST_8MHZ),
        _ => None,
    }
}

/// I2C peripheral in target mode
pub struct I2cTarget {
    regs: Regs,
}

impl I2cTarget {
    /// Wrap the I2C1 registers, usable in a `static`
    pub const fn i2c1() -> Self {
        Self::new(pac::I2C1)
    }

    /// Wrap a register block
    pub const fn new(regs: Regs) -> Self {
        Self { regs }
    }

    /// Enable the peripheral clock and program own address and timing
    ///
    /// Leaves the peripheral disabled; call [`Self::enable`] once the
    /// interrupt handler is ready.
    pub fn configure(&self, config: &I2cConfig) -> Result<(), I2cBusError> {
        if config.address > 0x7F {
            return Err(I2cBusError::InvalidAddress);
        }
        let timing = timing_for(config.frequency).ok_or(I2cBusError::UnsupportedFrequency)?;

        pac::RCC.apb1enr().modify(|w| w.set_i2c1en(true));

        // TIMINGR and OAR1 only take writes while disabled
        self.regs.cr1().modify(|w| w.set_pe(false));
        self.regs.timingr().write_value(regs::Timingr(timing));
        self.regs.oar1().write(|w| w.set_oa1en(false));
        self.regs.oar1().write(|w| {
            w.set_oa1(config.address_8bit());
            w.set_oa1mode(vals::Addmode::BIT7);
            w.set_oa1en(true);
        });

        Ok(())
    }

    /// Turn the peripheral on with every target event interrupt enabled
    pub fn enable(&self) {
        self.regs.cr1().modify(|w| {
            w.set_addrie(true);
            w.set_rxie(true);
            w.set_txie(true);
            w.set_nackie(true);
            w.set_stopie(true);
            w.set_errie(true);
            w.set_pe(true);
        });
    }

    /// Take and clear a pending bus error, if any
    ///
    /// The peripheral recovers by itself; clearing the flag only stops the
    /// interrupt from firing again.
    pub fn take_error(&mut self) -> Option<I2cBusError> {
        let isr = self.regs.isr().read();
        let error = if isr.berr() {
            self.regs.icr().write(|w| w.set_berrcf(true));
            I2cError::Bus
        } else if isr.arlo() {
            self.regs.icr().write(|w| w.set_arlocf(true));
            I2cError::Arbitration
        } else if isr.ovr() {
            self.regs.icr().write(|w| w.set_ovrcf(true));
            I2cError::Overrun
        } else {
            return None;
        };
        Some(error.into())
    }
}

impl I2cTargetPort for I2cTarget {
    fn next_event(&mut self) -> Option<TargetEvent> {
        let isr = self.regs.isr().read();

        // A byte received before a repeated start belongs to the old transfer
        if isr.rxne() {
            return Some(TargetEvent::ByteReceived(self.regs.rxdr().read().rxdata()));
        }

        if isr.addr() {
            let direction = if isr.dir() == vals::Dir::READ {
                // Drop whatever a previous read left in TXDR
                self.regs.isr().write(|w| w.set_txe(true));
                Direction::Read
            } else {
                Direction::Write
            };
            self.regs.icr().write(|w| w.set_addrcf(true));
            return Some(TargetEvent::AddressMatch(direction));
        }

        if isr.txis() {
            return Some(TargetEvent::ByteRequested);
        }

        if isr.nackf() {
            self.regs.icr().write(|w| w.set_nackcf(true));
            return Some(TargetEvent::Nack);
        }

        if isr.stopf() {
            self.regs.icr().write(|w| w.set_stopcf(true));
            return Some(TargetEvent::Stop);
        }

        None
    }

    #[inline]
    fn respond(&mut self, byte: u8) {
        self.regs.txdr().write(|w| w.set_txdata(byte));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bus_speed_has_timing() {
        assert_eq!(timing_for(I2cConfig::STANDARD), Some(TIMINGR_STANDARD_8MHZ));
        assert_eq!(timing_for(I2cConfig::FAST), Some(TIMINGR_FAST_8MHZ));
        assert_eq!(timing_for(1_000_000), None);
    }

    #[test]
    fn test_own_address_fits_oa1() {
        let config = I2cConfig {
            frequency: I2cConfig::FAST,
            address: 0x74,
        };
        // 7-bit mode takes the address in OA1[7:1]
        assert_eq!(config.address_8bit(), 0xE8);
        assert_eq!(config.address_8bit() & !0x00FE, 0);
    }
}
