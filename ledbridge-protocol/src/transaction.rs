//! Master-side register writes
//!
//! Bus bridges on the host side usually cap a single I2C transfer at a few
//! dozen bytes, so a full frame goes out as a run of short writes, each
//! re-sending the register it starts at.

use heapless::Vec;

use crate::AddressWidth;

/// Data bytes per write packet
pub const MAX_PACKET_DATA: usize = 16;

/// Maximum encoded packet size (register bytes + data)
pub const MAX_PACKET_SIZE: usize = 2 + MAX_PACKET_DATA;

/// Errors from building a register write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionError {
    /// More data than fits in one packet
    PacketTooLarge,
    /// Register (or the last register written) exceeds the address width
    RegisterOutOfRange,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// One write transaction: register pointer followed by data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterWrite<'a> {
    width: AddressWidth,
    register: u16,
    data: &'a [u8],
}

impl<'a> RegisterWrite<'a> {
    /// Create a write of at most [`MAX_PACKET_DATA`] bytes
    pub fn new(width: AddressWidth, register: u16, data: &'a [u8]) -> Result<Self, TransactionError> {
        if data.len() > MAX_PACKET_DATA {
            return Err(TransactionError::PacketTooLarge);
        }
        check_span(width, register, data.len())?;
        Ok(Self::new_unchecked(width, register, data))
    }

    pub(crate) const fn new_unchecked(width: AddressWidth, register: u16, data: &'a [u8]) -> Self {
        Self {
            width,
            register,
            data,
        }
    }

    /// Register the write starts at
    pub fn register(&self) -> u16 {
        self.register
    }

    /// Data bytes after the register
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Address width used on the wire
    pub fn width(&self) -> AddressWidth {
        self.width
    }

    /// Encoded length in bytes
    pub fn encoded_len(&self) -> usize {
        self.width.len() + self.data.len()
    }

    /// Encode this write into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, TransactionError> {
        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(TransactionError::BufferTooSmall);
        }

        let (register, reg_len) = self.width.encode(self.register);
        buffer[..reg_len].copy_from_slice(&register[..reg_len]);
        buffer[reg_len..len].copy_from_slice(self.data);

        Ok(len)
    }

    /// Encode this write into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_PACKET_SIZE>, TransactionError> {
        let mut buffer = [0u8; MAX_PACKET_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| TransactionError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Check that `len` bytes starting at `register` stay addressable
fn check_span(width: AddressWidth, register: u16, len: usize) -> Result<(), TransactionError> {
    let last = register as usize + len.saturating_sub(1);
    if last > width.max_register() as usize {
        return Err(TransactionError::RegisterOutOfRange);
    }
    Ok(())
}

/// Iterator over the packets of a long write
#[derive(Debug, Clone)]
pub struct ChunkedWrites<'a> {
    width: AddressWidth,
    register: u16,
    remaining: &'a [u8],
}

impl<'a> Iterator for ChunkedWrites<'a> {
    type Item = RegisterWrite<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining.is_empty() {
            return None;
        }

        let take = self.remaining.len().min(MAX_PACKET_DATA);
        let (chunk, rest) = self.remaining.split_at(take);
        let write = RegisterWrite::new_unchecked(self.width, self.register, chunk);

        self.remaining = rest;
        // Span was checked up front, so this only wraps past the final chunk
        self.register = self.register.wrapping_add(take as u16);
        Some(write)
    }
}

/// Split `data` into packets that each re-send their starting register
pub fn chunked_writes(
    width: AddressWidth,
    register: u16,
    data: &[u8],
) -> Result<ChunkedWrites<'_>, TransactionError> {
    check_span(width, register, data.len())?;
    Ok(ChunkedWrites {
        width,
        register,
        remaining: data,
    })
}
