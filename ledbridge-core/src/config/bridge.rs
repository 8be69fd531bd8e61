//! Bridge configuration
//!
//! Capacity, address width, remap and latch timing are fixed per build but
//! carried as a plain value, so one implementation serves every variant and
//! each variant can be tested on the host.

use ledbridge_protocol::legacy::COLOR_DATA_SLOTS;
use ledbridge_protocol::{AddressWidth, BYTES_PER_LED};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Minimum low time that makes WS2812 LEDs latch a frame
pub const MIN_RESET_HOLD_US: u16 = 50;

/// Slowest bit clock that keeps a WS2812 bit (4 clock bits) inside the WS2812 timing window
pub const MIN_BIT_CLOCK_HZ: u32 = 2_400_000;

/// Fastest bit clock that keeps a WS2812 bit (4 clock bits) inside the WS2812 timing window
pub const MAX_BIT_CLOCK_HZ: u32 = 4_000_000;

/// Clock bits per output byte
const BITS_PER_BYTE: u64 = 8;

/// Register-map translation applied to bus writes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RemapMode {
    /// Registers are frame offsets
    Disabled,
    /// Registers follow the IS31FL3731 page 0 color layout
    Is31fl3731,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// LED count is zero
    ZeroLeds,
    /// Frame exceeds what the register pointer can address
    FrameTooLarge,
    /// Frame does not fit in the legacy color registers
    LegacyFrameTooLarge,
    /// Legacy remap requires single-byte registers
    RemapNeedsByteAddressing,
    /// Reset hold shorter than the LED latch time
    ResetHoldTooShort,
    /// Bit clock is zero
    ZeroBitClock,
    /// Bit clock gives a WS2812 bit period outside the tolerated range
    BitClockOutOfRange,
}

/// Bridge configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeConfig {
    /// Number of LEDs on the strip
    pub led_count: u16,
    /// Register pointer width on the bus
    pub address_width: AddressWidth,
    /// Register translation for writes
    pub remap: RemapMode,
    /// Low time between frames (µs)
    pub reset_hold_us: u16,
    /// SPI clock driving the LED line (Hz)
    pub bit_clock_hz: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::NATIVE_512
    }
}

impl BridgeConfig {
    /// 512 LEDs, two-byte registers
    pub const NATIVE_512: Self = Self {
        led_count: 512,
        address_width: AddressWidth::Word,
        remap: RemapMode::Disabled,
        reset_hold_us: 64,
        bit_clock_hz: 3_000_000,
    };

    /// 128 LEDs, two-byte registers
    pub const NATIVE_128: Self = Self {
        led_count: 128,
        ..Self::NATIVE_512
    };

    /// 72 LEDs behind the IS31FL3731 register map
    pub const LEGACY_72: Self = Self {
        led_count: 72,
        address_width: AddressWidth::Byte,
        remap: RemapMode::Is31fl3731,
        reset_hold_us: 64,
        bit_clock_hz: 3_000_000,
    };

    /// Frame buffer length in bytes
    pub const fn frame_len(&self) -> usize {
        self.led_count as usize * BYTES_PER_LED
    }

    /// Zero bytes needed to hold the line low for `reset_hold_us`
    ///
    /// Rounded up, never below one.
    pub const fn reset_bytes(&self) -> u16 {
        let bits = (self.reset_hold_us as u64 * self.bit_clock_hz as u64).div_ceil(1_000_000);
        let bytes = bits.div_ceil(BITS_PER_BYTE);
        if bytes == 0 {
            1
        } else if bytes > u16::MAX as u64 {
            u16::MAX
        } else {
            bytes as u16
        }
    }

    /// Duration of one WS2812 bit (four clock bits) in ns
    pub const fn bit_period_ns(&self) -> u32 {
        if self.bit_clock_hz == 0 {
            return 0;
        }
        (4_000_000_000u64 / self.bit_clock_hz as u64) as u32
    }

    /// Actual low time produced by [`Self::reset_bytes`] in µs
    pub const fn reset_hold_actual_us(&self) -> u32 {
        if self.bit_clock_hz == 0 {
            return 0;
        }
        (self.reset_bytes() as u64 * BITS_PER_BYTE * 1_000_000 / self.bit_clock_hz as u64) as u32
    }

    /// Check the configuration for consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.led_count == 0 {
            return Err(ConfigError::ZeroLeds);
        }
        if self.frame_len() > self.address_width.max_register() as usize + 1 {
            return Err(ConfigError::FrameTooLarge);
        }

        if self.remap == RemapMode::Is31fl3731 {
            if self.address_width != AddressWidth::Byte {
                return Err(ConfigError::RemapNeedsByteAddressing);
            }
            if self.frame_len() > COLOR_DATA_SLOTS {
                return Err(ConfigError::LegacyFrameTooLarge);
            }
        }

        if self.reset_hold_us < MIN_RESET_HOLD_US {
            return Err(ConfigError::ResetHoldTooShort);
        }

        if self.bit_clock_hz == 0 {
            return Err(ConfigError::ZeroBitClock);
        }
        if !(MIN_BIT_CLOCK_HZ..=MAX_BIT_CLOCK_HZ).contains(&self.bit_clock_hz) {
            return Err(ConfigError::BitClockOutOfRange);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(BridgeConfig::NATIVE_512.validate(), Ok(()));
        assert_eq!(BridgeConfig::NATIVE_128.validate(), Ok(()));
        assert_eq!(BridgeConfig::LEGACY_72.validate(), Ok(()));
    }

    #[test]
    fn test_frame_len() {
        assert_eq!(BridgeConfig::NATIVE_512.frame_len(), 1536);
        assert_eq!(BridgeConfig::NATIVE_128.frame_len(), 384);
        assert_eq!(BridgeConfig::LEGACY_72.frame_len(), 216);
    }

    #[test]
    fn test_reset_bytes_at_3mhz() {
        // 64µs at 3 MHz = 192 clock bits = 24 bytes
        let config = BridgeConfig::NATIVE_512;
        assert_eq!(config.reset_bytes(), 24);
        assert!(config.reset_hold_actual_us() >= MIN_RESET_HOLD_US as u32);
    }

    #[test]
    fn test_reset_bytes_round_up() {
        let config = BridgeConfig {
            reset_hold_us: 50,
            ..BridgeConfig::NATIVE_512
        };
        // 150 clock bits -> 19 bytes (152 bits), never short of the hold
        assert_eq!(config.reset_bytes(), 19);
        assert!(config.reset_hold_actual_us() >= 50);
    }

    #[test]
    fn test_bit_period() {
        // 4 clock bits at 3 MHz
        assert_eq!(BridgeConfig::NATIVE_512.bit_period_ns(), 1333);
    }

    #[test]
    fn test_zero_leds() {
        let config = BridgeConfig {
            led_count: 0,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroLeds));
    }

    #[test]
    fn test_remap_requires_byte_addressing() {
        let config = BridgeConfig {
            address_width: AddressWidth::Word,
            ..BridgeConfig::LEGACY_72
        };
        assert_eq!(config.validate(), Err(ConfigError::RemapNeedsByteAddressing));
    }

    #[test]
    fn test_legacy_frame_too_large() {
        let config = BridgeConfig {
            led_count: 73,
            ..BridgeConfig::LEGACY_72
        };
        assert_eq!(config.validate(), Err(ConfigError::LegacyFrameTooLarge));
    }

    #[test]
    fn test_frame_too_large() {
        let config = BridgeConfig {
            led_count: 21_846,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(config.validate(), Err(ConfigError::FrameTooLarge));
    }

    #[test]
    fn test_reset_hold_too_short() {
        let config = BridgeConfig {
            reset_hold_us: 49,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(config.validate(), Err(ConfigError::ResetHoldTooShort));
    }

    #[test]
    fn test_bit_clock_checks() {
        let zero = BridgeConfig {
            bit_clock_hz: 0,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(zero.validate(), Err(ConfigError::ZeroBitClock));

        let slow = BridgeConfig {
            bit_clock_hz: 1_500_000,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(slow.validate(), Err(ConfigError::BitClockOutOfRange));
    }

    #[test]
    fn test_byte_addressing_limits_frame() {
        let config = BridgeConfig {
            led_count: 86,
            address_width: AddressWidth::Byte,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(config.validate(), Err(ConfigError::FrameTooLarge));
    }

    #[test]
    fn test_byte_addressing_without_remap() {
        let config = BridgeConfig {
            led_count: 80,
            address_width: AddressWidth::Byte,
            ..BridgeConfig::NATIVE_512
        };
        assert_eq!(config.validate(), Ok(()));
    }
}
