//! LED Bridge I2C Wire Contract
//!
//! This crate defines what a bus master sees when it talks to the bridge:
//! one fixed slave address, a register pointer set at the start of every
//! write, and a flat register file of LED color bytes behind it.
//!
//! # Transaction Overview
//!
//! Native builds address the whole frame with a two-byte register, low byte
//! first:
//! ```text
//! ┌───────┬────────┬────────┬──────────────┐
//! │ ADDR  │ REG LO │ REG HI │ DATA …       │
//! │ 0x74  │ 1B     │ 1B     │ 0–N bytes    │
//! └───────┴────────┴────────┴──────────────┘
//! ```
//!
//! Legacy builds mimic the IS31FL3731 LED-matrix driver and use a single
//! register byte, so unmodified masters written for that chip keep working:
//! ```text
//! ┌───────┬────────┬──────────────┐
//! │ ADDR  │ REG    │ DATA …       │
//! │ 0x74  │ 1B     │ 0–N bytes    │
//! └───────┴────────┴──────────────┘
//! ```
//!
//! Reads return bytes from wherever the last write left the pointer. There
//! is no status channel: out-of-range writes are accepted on the wire and
//! have no effect, out-of-range reads return zero.

#![no_std]
#![deny(unsafe_code)]

pub mod legacy;
pub mod transaction;

pub use transaction::{
    chunked_writes, ChunkedWrites, RegisterWrite, TransactionError, MAX_PACKET_DATA,
    MAX_PACKET_SIZE,
};

/// 7-bit slave address, shared with the IS31FL3731 so legacy hosts need no change
pub const SLAVE_ADDRESS: u8 = 0x74;

/// Bytes per LED (three color channels)
pub const BYTES_PER_LED: usize = 3;

/// Width of the register pointer sent at the start of a write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AddressWidth {
    /// One register byte (legacy IS31FL3731 convention)
    Byte,
    /// Two register bytes, low then high (native)
    Word,
}

impl AddressWidth {
    /// Number of register bytes a write starts with
    pub const fn len(self) -> usize {
        match self {
            AddressWidth::Byte => 1,
            AddressWidth::Word => 2,
        }
    }

    /// Highest register the pointer can be set to
    pub const fn max_register(self) -> u16 {
        match self {
            AddressWidth::Byte => 0xFF,
            AddressWidth::Word => 0xFFFF,
        }
    }

    /// Encode a register into its wire bytes
    ///
    /// Returns the bytes and how many of them are used.
    pub const fn encode(self, register: u16) -> ([u8; 2], usize) {
        let [lo, hi] = register.to_le_bytes();
        match self {
            AddressWidth::Byte => ([lo, 0], 1),
            AddressWidth::Word => ([lo, hi], 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_register_is_low_byte_first() {
        let (bytes, len) = AddressWidth::Word.encode(0x0123);
        assert_eq!(len, 2);
        assert_eq!(bytes, [0x23, 0x01]);
    }

    #[test]
    fn test_byte_register() {
        let (bytes, len) = AddressWidth::Byte.encode(0x24);
        assert_eq!(len, 1);
        assert_eq!(bytes[0], 0x24);
    }

    #[test]
    fn test_max_register() {
        assert_eq!(AddressWidth::Byte.max_register(), 0xFF);
        assert_eq!(AddressWidth::Word.max_register(), 0xFFFF);
        assert_eq!(AddressWidth::Byte.len(), 1);
        assert_eq!(AddressWidth::Word.len(), 2);
    }
}
