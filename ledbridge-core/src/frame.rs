//! Shared frame buffer
//!
//! The only state both interrupt handlers touch. Every cell is an atomic
//! byte, so the bus side can store while the encoder loads without a lock:
//! a single byte is always seen whole, only a pixel (three bytes) can be seen
//! half-updated, and the next pass repaints it.

use portable_atomic::{AtomicU8, Ordering};

use ledbridge_protocol::BYTES_PER_LED;

/// Fixed-capacity table of LED color bytes
///
/// Byte `3k..3k+2` holds LED `k`'s channels in strip order. `N` never
/// changes after construction.
pub struct FrameBuffer<const N: usize> {
    bytes: [AtomicU8; N],
}

impl<const N: usize> Default for FrameBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> FrameBuffer<N> {
    /// Create an all-zero (dark) frame, usable in a `static`
    pub const fn new() -> Self {
        Self {
            bytes: [const { AtomicU8::new(0) }; N],
        }
    }

    /// Capacity in bytes
    pub const fn len(&self) -> usize {
        N
    }

    /// True for a zero-capacity frame
    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Number of whole LEDs in the frame
    pub const fn led_count(&self) -> usize {
        N / BYTES_PER_LED
    }

    /// Read the byte at `offset`, or 0 past the end
    #[inline]
    pub fn get(&self, offset: usize) -> u8 {
        match self.bytes.get(offset) {
            Some(cell) => cell.load(Ordering::Relaxed),
            None => 0,
        }
    }

    /// Store `byte` at `offset`
    ///
    /// Returns false (and changes nothing) past the end.
    #[inline]
    pub fn set(&self, offset: usize, byte: u8) -> bool {
        match self.bytes.get(offset) {
            Some(cell) => {
                cell.store(byte, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// Store a run of bytes starting at `offset`
    ///
    /// Returns how many bytes landed inside the frame.
    pub fn write_from(&self, offset: usize, data: &[u8]) -> usize {
        data.iter()
            .enumerate()
            .take_while(|&(i, &byte)| self.set(offset.saturating_add(i), byte))
            .count()
    }

    /// Copy bytes starting at `offset` into `out`, zero-filling past the end
    pub fn read_into(&self, offset: usize, out: &mut [u8]) {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.get(offset.saturating_add(i));
        }
    }

    /// Channels of LED `index`, if it exists
    pub fn pixel(&self, index: usize) -> Option<[u8; BYTES_PER_LED]> {
        if index >= self.led_count() {
            return None;
        }
        let base = index * BYTES_PER_LED;
        Some([self.get(base), self.get(base + 1), self.get(base + 2)])
    }

    /// Set every byte to `byte`
    pub fn fill(&self, byte: u8) {
        for cell in &self.bytes {
            cell.store(byte, Ordering::Relaxed);
        }
    }

    /// Turn every LED off
    pub fn clear(&self) {
        self.fill(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_frame_is_dark() {
        let frame = FrameBuffer::<12>::new();
        assert_eq!(frame.len(), 12);
        assert_eq!(frame.led_count(), 4);
        assert!((0..12).all(|i| frame.get(i) == 0));
    }

    #[test]
    fn test_set_and_get() {
        let frame = FrameBuffer::<6>::new();
        assert!(frame.set(5, 0xAB));
        assert_eq!(frame.get(5), 0xAB);
    }

    #[test]
    fn test_out_of_bounds_write_rejected() {
        let frame = FrameBuffer::<6>::new();
        assert!(!frame.set(6, 0xFF));
        assert!((0..6).all(|i| frame.get(i) == 0));
    }

    #[test]
    fn test_out_of_bounds_read_is_zero() {
        let frame = FrameBuffer::<3>::new();
        frame.fill(0xFF);
        assert_eq!(frame.get(3), 0);
        assert_eq!(frame.get(usize::MAX), 0);
    }

    #[test]
    fn test_write_from_stops_at_end() {
        let frame = FrameBuffer::<4>::new();
        assert_eq!(frame.write_from(2, &[1, 2, 3, 4]), 2);
        assert_eq!(frame.get(2), 1);
        assert_eq!(frame.get(3), 2);
    }

    #[test]
    fn test_read_into_zero_fills() {
        let frame = FrameBuffer::<4>::new();
        frame.fill(0x11);
        let mut out = [0xEEu8; 4];
        frame.read_into(2, &mut out);
        assert_eq!(out, [0x11, 0x11, 0, 0]);
    }

    #[test]
    fn test_pixel() {
        let frame = FrameBuffer::<7>::new();
        frame.write_from(3, &[1, 2, 3]);
        assert_eq!(frame.pixel(1), Some([1, 2, 3]));
        // Trailing partial pixel is not an LED
        assert_eq!(frame.pixel(2), None);
    }

    #[test]
    fn test_clear() {
        let frame = FrameBuffer::<3>::new();
        frame.fill(0x42);
        frame.clear();
        assert_eq!(frame.pixel(0), Some([0, 0, 0]));
    }
}
