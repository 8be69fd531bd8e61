//! IS31FL3731 compatibility remap
//!
//! Legacy masters address page 0 PWM registers starting at
//! [`COLOR_DATA_BASE`]. The chip documents its channels in a different order
//! than the strip expects: channels 0 and 1 of every pixel are swapped,
//! channel 2 stays put. Anything outside page 0 color data is accepted and
//! ignored, like on a chip with nothing wired to those registers.

use ledbridge_protocol::legacy::{COLOR_DATA_BASE, PAGE_SELECT_REGISTER, PIXEL_PAGE};
use ledbridge_protocol::BYTES_PER_LED;

use crate::frame::FrameBuffer;
use crate::slave::ByteOutcome;

/// Translate a legacy register into a frame offset
///
/// Returns `None` for registers below the color base, at or above the
/// command register, or beyond `capacity`.
pub const fn translate(register: u32, capacity: usize) -> Option<usize> {
    if register < COLOR_DATA_BASE as u32 || register >= PAGE_SELECT_REGISTER as u32 {
        return None;
    }

    let r = (register - COLOR_DATA_BASE as u32) as usize;
    let offset = match r % BYTES_PER_LED {
        0 => r + 1,
        1 => r - 1,
        _ => r,
    };

    if offset < capacity {
        Some(offset)
    } else {
        None
    }
}

/// Legacy page state
///
/// The page register belongs to the emulated chip, not to one transaction,
/// so it survives stop conditions like it does on the real part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LegacyRemap {
    page: u8,
}

impl Default for LegacyRemap {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacyRemap {
    /// Start on page 0
    pub const fn new() -> Self {
        Self { page: PIXEL_PAGE }
    }

    /// Currently selected page
    pub fn page(&self) -> u8 {
        self.page
    }

    /// Apply a data-phase byte written at legacy `register`
    #[inline]
    pub fn write<const N: usize>(
        &mut self,
        register: u32,
        byte: u8,
        frame: &FrameBuffer<N>,
    ) -> ByteOutcome {
        if register == PAGE_SELECT_REGISTER as u32 {
            self.page = byte;
            return ByteOutcome::PageSelected;
        }
        if self.page != PIXEL_PAGE {
            return ByteOutcome::Dropped;
        }

        match translate(register, N) {
            Some(offset) if frame.set(offset, byte) => ByteOutcome::Stored,
            _ => ByteOutcome::Dropped,
        }
    }
}
