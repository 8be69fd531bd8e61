//! I2C register-file slave
//!
//! Turns bus events into frame buffer reads and writes. Every write
//! transaction starts by setting the register pointer (one or two bytes,
//! depending on [`AddressWidth`]); everything after that is data, stored at
//! the pointer, which then advances. Every address match starts a fresh
//! session, so a read always returns bytes from register 0 onward.
//!
//! Runs in the bus interrupt, which preempts the encoder, so each event is
//! handled in constant time.

use ledbridge_hal::{Direction, I2cTargetPort, TargetEvent};
use ledbridge_protocol::AddressWidth;

use crate::config::RemapMode;
use crate::frame::FrameBuffer;
use crate::remap::LegacyRemap;

/// Where the current write transaction is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressPhase {
    /// Next byte is the register (low byte in word mode)
    ExpectAddress,
    /// Next byte is the register high byte (word mode only)
    ExpectAddressHigh,
    /// Register set; bytes are data
    Data,
}

/// What happened to a received byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteOutcome {
    /// Consumed as (part of) the register pointer
    AddressByte,
    /// Stored in the frame
    Stored,
    /// Accepted on the wire with no effect
    Dropped,
    /// Consumed as a legacy page number
    PageSelected,
}

/// Per-slave counters, wrapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveStats {
    /// Address matches seen
    pub transactions: u32,
    /// Data bytes stored in the frame
    pub stored: u32,
    /// Data bytes dropped (out of range or wrong page)
    pub dropped: u32,
    /// Bytes sent to the master
    pub sent: u32,
}

/// Register protocol state machine
#[derive(Debug, Clone)]
pub struct RegisterSlave {
    /// Register pointer width
    width: AddressWidth,
    /// Transaction phase
    phase: AddressPhase,
    /// Register pointer, saturating so it never wraps back into the frame
    pointer: u32,
    /// Legacy register translation, if enabled
    remap: Option<LegacyRemap>,
    /// Counters
    stats: SlaveStats,
}

impl RegisterSlave {
    /// Create a slave for the given register layout
    pub const fn new(width: AddressWidth, remap: RemapMode) -> Self {
        Self {
            width,
            phase: AddressPhase::ExpectAddress,
            pointer: 0,
            remap: match remap {
                RemapMode::Disabled => None,
                RemapMode::Is31fl3731 => Some(LegacyRemap::new()),
            },
            stats: SlaveStats {
                transactions: 0,
                stored: 0,
                dropped: 0,
                sent: 0,
            },
        }
    }

    /// Current transaction phase
    pub fn phase(&self) -> AddressPhase {
        self.phase
    }

    /// Current register pointer
    pub fn pointer(&self) -> u32 {
        self.pointer
    }

    /// Legacy remap state, when enabled
    pub fn remap(&self) -> Option<&LegacyRemap> {
        self.remap.as_ref()
    }

    /// Counters since reset
    pub fn stats(&self) -> SlaveStats {
        self.stats
    }

    /// Start of a transaction, in either direction
    ///
    /// Nothing of the previous session survives: the pointer goes back to 0
    /// and the next written byte is a register byte again.
    pub fn on_address_match(&mut self, _direction: Direction) {
        self.stats.transactions = self.stats.transactions.wrapping_add(1);
        self.phase = AddressPhase::ExpectAddress;
        self.pointer = 0;
    }

    /// A byte written by the master
    pub fn on_byte_received<const N: usize>(
        &mut self,
        byte: u8,
        frame: &FrameBuffer<N>,
    ) -> ByteOutcome {
        match self.phase {
            AddressPhase::ExpectAddress => {
                self.pointer = byte as u32;
                self.phase = match self.width {
                    AddressWidth::Byte => AddressPhase::Data,
                    AddressWidth::Word => AddressPhase::ExpectAddressHigh,
                };
                ByteOutcome::AddressByte
            }
            AddressPhase::ExpectAddressHigh => {
                self.pointer |= (byte as u32) << 8;
                self.phase = AddressPhase::Data;
                ByteOutcome::AddressByte
            }
            AddressPhase::Data => {
                let register = self.pointer;
                self.pointer = self.pointer.saturating_add(1);

                let outcome = match self.remap.as_mut() {
                    Some(remap) => remap.write(register, byte, frame),
                    None if frame.set(register as usize, byte) => ByteOutcome::Stored,
                    None => ByteOutcome::Dropped,
                };
                match outcome {
                    ByteOutcome::Stored => self.stats.stored = self.stats.stored.wrapping_add(1),
                    ByteOutcome::Dropped => self.stats.dropped = self.stats.dropped.wrapping_add(1),
                    ByteOutcome::AddressByte | ByteOutcome::PageSelected => {}
                }
                outcome
            }
        }
    }

    /// The master wants a byte: the frame byte at the pointer, or 0 past the end
    pub fn on_byte_requested<const N: usize>(&mut self, frame: &FrameBuffer<N>) -> u8 {
        let byte = frame.get(self.pointer as usize);
        self.pointer = self.pointer.saturating_add(1);
        self.stats.sent = self.stats.sent.wrapping_add(1);
        byte
    }

    /// The master stopped acknowledging read bytes
    #[inline]
    pub fn on_nack(&mut self) {}

    /// End of a transaction
    ///
    /// Session state is rebuilt at the next address match.
    #[inline]
    pub fn on_stop(&mut self) {}

    /// Dispatch one bus event
    ///
    /// Returns the byte to send for [`TargetEvent::ByteRequested`].
    #[inline]
    pub fn handle<const N: usize>(
        &mut self,
        event: TargetEvent,
        frame: &FrameBuffer<N>,
    ) -> Option<u8> {
        match event {
            TargetEvent::AddressMatch(direction) => {
                self.on_address_match(direction);
                None
            }
            TargetEvent::ByteReceived(byte) => {
                self.on_byte_received(byte, frame);
                None
            }
            TargetEvent::ByteRequested => Some(self.on_byte_requested(frame)),
            TargetEvent::Nack => {
                self.on_nack();
                None
            }
            TargetEvent::Stop => {
                self.on_stop();
                None
            }
        }
    }

    /// Handle one pending event from the port
    ///
    /// Call from the bus interrupt; the interrupt fires again while flags
    /// remain. Returns the event handled, if any.
    #[inline]
    pub fn service<const N: usize, P: I2cTargetPort>(
        &mut self,
        port: &mut P,
        frame: &FrameBuffer<N>,
    ) -> Option<TargetEvent> {
        let event = port.next_event()?;
        if let Some(byte) = self.handle(event, frame) {
            port.respond(byte);
        }
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledbridge_protocol::legacy::{COLOR_DATA_BASE, PAGE_SELECT_REGISTER};

    fn write<const N: usize>(slave: &mut RegisterSlave, frame: &FrameBuffer<N>, bytes: &[u8]) {
        slave.handle(TargetEvent::AddressMatch(Direction::Write), frame);
        for &byte in bytes {
            slave.handle(TargetEvent::ByteReceived(byte), frame);
        }
        slave.handle(TargetEvent::Stop, frame);
    }

    fn read<const N: usize>(slave: &mut RegisterSlave, frame: &FrameBuffer<N>, out: &mut [u8]) {
        slave.handle(TargetEvent::AddressMatch(Direction::Read), frame);
        for slot in out.iter_mut() {
            *slot = slave.handle(TargetEvent::ByteRequested, frame).unwrap();
        }
        slave.handle(TargetEvent::Nack, frame);
        slave.handle(TargetEvent::Stop, frame);
    }

    #[test]
    fn test_word_address_low_then_high() {
        let frame = FrameBuffer::<0x300>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        write(&mut slave, &frame, &[0x02, 0x01, 0xAB]);
        assert_eq!(frame.get(0x102), 0xAB);
        assert_eq!(slave.pointer(), 0x103);
    }

    #[test]
    fn test_byte_address() {
        let frame = FrameBuffer::<16>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Byte, RemapMode::Disabled);

        write(&mut slave, &frame, &[0x04, 1, 2]);
        assert_eq!(frame.get(4), 1);
        assert_eq!(frame.get(5), 2);
    }

    #[test]
    fn test_phases() {
        let frame = FrameBuffer::<4>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        slave.on_address_match(Direction::Write);
        assert_eq!(slave.phase(), AddressPhase::ExpectAddress);
        assert_eq!(slave.on_byte_received(0, &frame), ByteOutcome::AddressByte);
        assert_eq!(slave.phase(), AddressPhase::ExpectAddressHigh);
        assert_eq!(slave.on_byte_received(0, &frame), ByteOutcome::AddressByte);
        assert_eq!(slave.phase(), AddressPhase::Data);
        assert_eq!(slave.on_byte_received(7, &frame), ByteOutcome::Stored);
    }

    #[test]
    fn test_write_past_end_dropped() {
        let frame = FrameBuffer::<4>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        write(&mut slave, &frame, &[0x03, 0x00, 0x11, 0x22, 0x33]);
        assert_eq!(frame.get(3), 0x11);
        assert_eq!(slave.stats().stored, 1);
        assert_eq!(slave.stats().dropped, 2);
    }

    #[test]
    fn test_read_starts_at_zero() {
        let frame = FrameBuffer::<8>::new();
        frame.write_from(0, &[10, 11, 12, 13, 14, 15, 16, 17]);
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        // A pointer left by the previous write does not carry over
        write(&mut slave, &frame, &[0x05, 0x00]);
        let mut out = [0u8; 5];
        read(&mut slave, &frame, &mut out);
        assert_eq!(out, [10, 11, 12, 13, 14]);
    }

    #[test]
    fn test_plain_read_returns_written_pattern() {
        let frame = FrameBuffer::<8>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        write(&mut slave, &frame, &[0x00, 0x00, 0x11, 0x22, 0x33]);
        assert_eq!(slave.pointer(), 3);

        slave.on_address_match(Direction::Read);
        assert_eq!(slave.pointer(), 0);
        assert_eq!(slave.phase(), AddressPhase::ExpectAddress);

        let mut out = [0u8; 3];
        read(&mut slave, &frame, &mut out);
        assert_eq!(out, [0x11, 0x22, 0x33]);
    }

    #[test]
    fn test_read_past_end_returns_zero() {
        let frame = FrameBuffer::<2>::new();
        frame.write_from(0, &[5, 6]);
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        let mut out = [0xAAu8; 4];
        read(&mut slave, &frame, &mut out);
        assert_eq!(out, [5, 6, 0, 0]);
    }

    #[test]
    fn test_new_write_resets_pointer() {
        let frame = FrameBuffer::<8>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        // Abandoned after the low address byte
        write(&mut slave, &frame, &[0x05]);
        slave.on_address_match(Direction::Write);
        assert_eq!(slave.pointer(), 0);
        assert_eq!(slave.phase(), AddressPhase::ExpectAddress);
    }

    #[test]
    fn test_pointer_saturates() {
        let frame = FrameBuffer::<4>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);

        write(&mut slave, &frame, &[0xFF, 0xFF, 1, 2, 3]);
        assert!(slave.pointer() > 0xFFFF);
        assert!((0..4).all(|i| frame.get(i) == 0));
    }

    #[test]
    fn test_legacy_write_is_remapped() {
        let frame = FrameBuffer::<216>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Byte, RemapMode::Is31fl3731);

        write(&mut slave, &frame, &[COLOR_DATA_BASE, 0xA0, 0xA1, 0xA2]);
        assert_eq!(frame.pixel(0), Some([0xA1, 0xA0, 0xA2]));
        // Pointer counts legacy registers
        assert_eq!(slave.pointer(), COLOR_DATA_BASE as u32 + 3);
    }

    #[test]
    fn test_legacy_page_gate_persists() {
        let frame = FrameBuffer::<216>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Byte, RemapMode::Is31fl3731);

        write(&mut slave, &frame, &[PAGE_SELECT_REGISTER, 0x01]);
        write(&mut slave, &frame, &[COLOR_DATA_BASE, 0xFF, 0xFF, 0xFF]);
        assert!((0..216).all(|i| frame.get(i) == 0));
        assert_eq!(slave.remap().map(|r| r.page()), Some(1));

        write(&mut slave, &frame, &[PAGE_SELECT_REGISTER, 0x00]);
        write(&mut slave, &frame, &[COLOR_DATA_BASE, 0xFF]);
        assert_eq!(frame.get(1), 0xFF);
    }

    #[test]
    fn test_legacy_below_base_dropped() {
        let frame = FrameBuffer::<216>::new();
        let mut slave = RegisterSlave::new(AddressWidth::Byte, RemapMode::Is31fl3731);

        write(&mut slave, &frame, &[0x00, 0xFF, 0xFF, 0xFF]);
        assert!((0..216).all(|i| frame.get(i) == 0));
        assert_eq!(slave.stats().dropped, 3);
    }

    #[test]
    fn test_legacy_read_is_raw() {
        let frame = FrameBuffer::<216>::new();
        frame.write_from(0, &[1, 2, 3]);
        let mut slave = RegisterSlave::new(AddressWidth::Byte, RemapMode::Is31fl3731);

        let mut out = [0u8; 3];
        read(&mut slave, &frame, &mut out);
        assert_eq!(out, [1, 2, 3]);
    }

    struct ScriptedBus {
        events: heapless::Deque<TargetEvent, 16>,
        replies: heapless::Vec<u8, 16>,
    }

    impl I2cTargetPort for ScriptedBus {
        fn next_event(&mut self) -> Option<TargetEvent> {
            self.events.pop_front()
        }

        fn respond(&mut self, byte: u8) {
            self.replies.push(byte).unwrap();
        }
    }

    #[test]
    fn test_service_answers_reads() {
        let frame = FrameBuffer::<4>::new();
        frame.write_from(0, &[9, 8, 7, 6]);
        let mut slave = RegisterSlave::new(AddressWidth::Word, RemapMode::Disabled);
        let mut bus = ScriptedBus {
            events: heapless::Deque::new(),
            replies: heapless::Vec::new(),
        };
        for event in [
            TargetEvent::AddressMatch(Direction::Write),
            TargetEvent::ByteReceived(0x01),
            TargetEvent::ByteReceived(0x00),
            TargetEvent::AddressMatch(Direction::Read),
            TargetEvent::ByteRequested,
            TargetEvent::ByteRequested,
            TargetEvent::Stop,
        ] {
            bus.events.push_back(event).unwrap();
        }

        while slave.service(&mut bus, &frame).is_some() {}
        // The repeated start is a new session: reads begin at register 0
        assert_eq!(bus.replies.as_slice(), &[9, 8]);
        assert_eq!(slave.stats().transactions, 2);
    }
}
