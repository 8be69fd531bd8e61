//! WS2812 bit encoder
//!
//! Runs once per SPI transmit-empty interrupt and produces exactly one SPI
//! byte, so it has to finish well inside one byte time (2.7µs at 3 MHz).
//! Every call is a single match arm: no loops, no waiting.
//!
//! # Encoding
//!
//! Each nibble of an SPI byte is one WS2812 bit at a 3 MHz clock:
//!
//! ```text
//! 0-bit: 1000  (~0.33µs high, ~1µs low)
//! 1-bit: 1110  (~1µs high, ~0.33µs low)
//! ```
//!
//! So a source byte is sent as four 2-bit groups, MSB first, each looked up
//! in [`BIT_PATTERNS`]. After the last frame byte the line is held low for
//! the reset gap, then the frame is sent again from byte 0.

use ledbridge_hal::SpiTx;

use crate::frame::FrameBuffer;

/// SPI byte for each 2-bit group (`0b00`, `0b01`, `0b10`, `0b11`)
pub const BIT_PATTERNS: [u8; 4] = [0x88, 0x8E, 0xE8, 0xEE];

/// SPI bytes emitted per source byte
pub const GROUPS_PER_BYTE: usize = 4;

/// Encoder phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// Bits 7..6 of the current byte
    EmitGroup0,
    /// Bits 5..4
    EmitGroup1,
    /// Bits 3..2
    EmitGroup2,
    /// Bits 1..0, then advance
    EmitGroup3,
    /// Holding the line low between frames
    Reset,
}

/// Look up the SPI byte for the low two bits of `bits`
#[inline(always)]
const fn pattern(bits: u8) -> u8 {
    BIT_PATTERNS[(bits & 0b11) as usize]
}

/// Expand one source byte into its four SPI bytes
pub const fn encode_byte(byte: u8) -> [u8; GROUPS_PER_BYTE] {
    [
        pattern(byte >> 6),
        pattern(byte >> 4),
        pattern(byte >> 2),
        pattern(byte),
    ]
}

/// Gap length the encoder actually sends: at least one zero byte
const fn gap_len(reset_bytes: u16) -> u16 {
    if reset_bytes == 0 {
        1
    } else {
        reset_bytes
    }
}

/// SPI bytes in one full pass: the encoded frame plus the reset gap
pub const fn cycle_len(frame_len: usize, reset_bytes: u16) -> usize {
    frame_len * GROUPS_PER_BYTE + gap_len(reset_bytes) as usize
}

/// Encoder cursor and phase
///
/// Starts in [`Phase::Reset`] so the strip latches a dark frame before the
/// first real byte goes out.
#[derive(Debug, Clone)]
pub struct Encoder {
    /// Current phase
    phase: Phase,
    /// Frame offset of the byte being sent
    cursor: usize,
    /// Snapshot of the frame byte taken at `EmitGroup0`
    latched: u8,
    /// Reset gap length in bytes
    reset_bytes: u16,
    /// Zero bytes still to send in the current gap
    reset_remaining: u16,
    /// Completed frame passes (wrapping)
    passes: u32,
}

impl Encoder {
    /// Create an encoder with a reset gap of `reset_bytes` zero bytes
    ///
    /// A gap of 0 is raised to one zero byte.
    pub const fn new(reset_bytes: u16) -> Self {
        let reset_bytes = gap_len(reset_bytes);
        Self {
            phase: Phase::Reset,
            cursor: 0,
            latched: 0,
            reset_bytes,
            reset_remaining: reset_bytes,
            passes: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Frame offset of the byte being sent
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Configured reset gap in bytes
    pub fn reset_bytes(&self) -> u16 {
        self.reset_bytes
    }

    /// Number of full frame passes sent, wrapping at `u32::MAX`
    pub fn completed_passes(&self) -> u32 {
        self.passes
    }

    /// Produce the next SPI byte
    #[inline]
    pub fn next_byte<const N: usize>(&mut self, frame: &FrameBuffer<N>) -> u8 {
        match self.phase {
            Phase::Reset => {
                self.reset_remaining = self.reset_remaining.saturating_sub(1);
                if self.reset_remaining == 0 {
                    self.cursor = 0;
                    self.phase = Phase::EmitGroup0;
                }
                0
            }
            Phase::EmitGroup0 => {
                // One load per byte: all four groups come from the same value
                self.latched = frame.get(self.cursor);
                self.phase = Phase::EmitGroup1;
                pattern(self.latched >> 6)
            }
            Phase::EmitGroup1 => {
                self.phase = Phase::EmitGroup2;
                pattern(self.latched >> 4)
            }
            Phase::EmitGroup2 => {
                self.phase = Phase::EmitGroup3;
                pattern(self.latched >> 2)
            }
            Phase::EmitGroup3 => {
                self.cursor += 1;
                if self.cursor >= N {
                    self.cursor = 0;
                    self.reset_remaining = self.reset_bytes;
                    self.passes = self.passes.wrapping_add(1);
                    self.phase = Phase::Reset;
                } else {
                    self.phase = Phase::EmitGroup0;
                }
                pattern(self.latched)
            }
        }
    }

    /// Feed the next byte to the transmitter
    ///
    /// Call from the transmit-empty interrupt.
    #[inline]
    pub fn service<const N: usize, T: SpiTx>(&mut self, frame: &FrameBuffer<N>, tx: &mut T) {
        let byte = self.next_byte(frame);
        tx.write_byte(byte);
    }
}
