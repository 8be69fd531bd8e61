//! I2C target (slave) abstractions
//!
//! The bridge never masters the bus. A chip-specific HAL decodes its status
//! flags into [`TargetEvent`]s, one per interrupt, and accepts the byte to
//! clock out when the master reads.

/// Transfer direction reported on an address match, from the master's view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Master writes to us
    Write,
    /// Master reads from us
    Read,
}

/// A single bus event seen by the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetEvent {
    /// Our address was matched (start or repeated start)
    AddressMatch(Direction),
    /// The master wrote a byte
    ByteReceived(u8),
    /// The master wants the next byte
    ByteRequested,
    /// The master NACKed the last byte we sent
    Nack,
    /// Stop condition
    Stop,
}

/// I2C target port
///
/// Implementations must be non-blocking: `next_event` returns `None` as soon
/// as no flag is pending.
pub trait I2cTargetPort {
    /// Take the next pending event and acknowledge its hardware flag
    fn next_event(&mut self) -> Option<TargetEvent>;

    /// Load the byte the master will clock out next
    fn respond(&mut self, byte: u8);
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// 7-bit own address
    pub address: u8,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 400_000, // Fast mode
            address: 0x74,
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: u32 = 100_000;

    /// Fast mode (400 kHz)
    pub const FAST: u32 = 400_000;

    /// Own address shifted into the 8-bit form most address registers use
    pub const fn address_8bit(&self) -> u16 {
        (self.address as u16 & 0x7F) << 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_8bit() {
        let config = I2cConfig::default();
        assert_eq!(config.address_8bit(), 0xE8);
    }

    #[test]
    fn test_address_masks_high_bit() {
        let config = I2cConfig {
            frequency: I2cConfig::FAST,
            address: 0xF4,
        };
        assert_eq!(config.address_8bit(), 0xE8);
    }
}
