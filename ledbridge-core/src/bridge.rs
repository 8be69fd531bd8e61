//! Bridge coordinator
//!
//! Owns the two state machines and hands out the shared frame. On the
//! target each half lives in its own interrupt handler; [`Bridge::split`]
//! gives them out, or the firmware builds them directly with the `const`
//! constructors after validating its configuration.

use ledbridge_hal::{I2cTargetPort, SpiTx, TargetEvent};

use crate::config::{BridgeConfig, ConfigError};
use crate::encoder::Encoder;
use crate::frame::FrameBuffer;
use crate::slave::RegisterSlave;

/// Errors from building a bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError {
    /// Configuration is inconsistent
    Config(ConfigError),
    /// Configured LED count does not match the frame buffer
    CapacityMismatch {
        /// Bytes the configuration asks for
        configured: usize,
        /// Bytes the frame buffer holds
        actual: usize,
    },
}

impl From<ConfigError> for BridgeError {
    fn from(e: ConfigError) -> Self {
        BridgeError::Config(e)
    }
}

/// LED output half: the encoder and a view of the frame
pub struct StripOutput<'a, const N: usize> {
    frame: &'a FrameBuffer<N>,
    encoder: Encoder,
}

impl<'a, const N: usize> StripOutput<'a, N> {
    /// Create the output half without validation
    pub const fn new(frame: &'a FrameBuffer<N>, reset_bytes: u16) -> Self {
        Self {
            frame,
            encoder: Encoder::new(reset_bytes),
        }
    }

    /// Next SPI byte
    #[inline]
    pub fn next_byte(&mut self) -> u8 {
        self.encoder.next_byte(self.frame)
    }

    /// Feed the transmitter; call from the transmit-empty interrupt
    #[inline]
    pub fn service<T: SpiTx>(&mut self, tx: &mut T) {
        self.encoder.service(self.frame, tx);
    }

    /// Encoder state
    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }
}

/// Bus half: the register slave and a view of the frame
pub struct BusTarget<'a, const N: usize> {
    frame: &'a FrameBuffer<N>,
    slave: RegisterSlave,
}

impl<'a, const N: usize> BusTarget<'a, N> {
    /// Create the bus half without validation
    pub const fn new(frame: &'a FrameBuffer<N>, config: &BridgeConfig) -> Self {
        Self {
            frame,
            slave: RegisterSlave::new(config.address_width, config.remap),
        }
    }

    /// Dispatch one bus event, returning the reply byte for reads
    #[inline]
    pub fn handle(&mut self, event: TargetEvent) -> Option<u8> {
        self.slave.handle(event, self.frame)
    }

    /// Handle one pending event; call from the bus interrupt
    #[inline]
    pub fn service<P: I2cTargetPort>(&mut self, port: &mut P) -> Option<TargetEvent> {
        self.slave.service(port, self.frame)
    }

    /// Slave state
    pub fn slave(&self) -> &RegisterSlave {
        &self.slave
    }
}

/// Both halves over one frame
pub struct Bridge<'a, const N: usize> {
    config: BridgeConfig,
    output: StripOutput<'a, N>,
    bus: BusTarget<'a, N>,
}

impl<'a, const N: usize> Bridge<'a, N> {
    /// Validate `config` against the frame and build both halves
    pub fn new(config: BridgeConfig, frame: &'a FrameBuffer<N>) -> Result<Self, BridgeError> {
        config.validate()?;
        if config.frame_len() != N {
            return Err(BridgeError::CapacityMismatch {
                configured: config.frame_len(),
                actual: N,
            });
        }

        Ok(Self {
            config,
            output: StripOutput::new(frame, config.reset_bytes()),
            bus: BusTarget::new(frame, &config),
        })
    }

    /// Active configuration
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Shared frame
    pub fn frame(&self) -> &'a FrameBuffer<N> {
        self.output.frame
    }

    /// Transmit-empty event: next SPI byte
    pub fn on_tx_ready(&mut self) -> u8 {
        self.output.next_byte()
    }

    /// Bus event: reply byte for reads
    pub fn on_bus_event(&mut self, event: TargetEvent) -> Option<u8> {
        self.bus.handle(event)
    }

    /// Output half
    pub fn output(&self) -> &StripOutput<'a, N> {
        &self.output
    }

    /// Bus half
    pub fn bus(&self) -> &BusTarget<'a, N> {
        &self.bus
    }

    /// Separate the halves for their interrupt contexts
    pub fn split(self) -> (StripOutput<'a, N>, BusTarget<'a, N>) {
        (self.output, self.bus)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{Phase, BIT_PATTERNS};
    use ledbridge_hal::Direction;

    #[test]
    fn test_capacity_mismatch() {
        let frame = FrameBuffer::<100>::new();
        let result = Bridge::new(BridgeConfig::NATIVE_128, &frame);
        assert_eq!(
            result.err(),
            Some(BridgeError::CapacityMismatch {
                configured: 384,
                actual: 100
            })
        );
    }

    #[test]
    fn test_invalid_config() {
        let frame = FrameBuffer::<0>::new();
        let config = BridgeConfig {
            led_count: 0,
            ..BridgeConfig::NATIVE_128
        };
        assert_eq!(
            Bridge::new(config, &frame).err(),
            Some(BridgeError::Config(ConfigError::ZeroLeds))
        );
    }

    #[test]
    fn test_bus_write_reaches_strip() {
        let frame = FrameBuffer::<216>::new();
        let mut bridge = Bridge::new(BridgeConfig::LEGACY_72, &frame).unwrap();

        bridge.on_bus_event(TargetEvent::AddressMatch(Direction::Write));
        for byte in [0x24, 0xFF, 0x00, 0x00] {
            bridge.on_bus_event(TargetEvent::ByteReceived(byte));
        }
        bridge.on_bus_event(TargetEvent::Stop);

        // Channel 0 was written, channel 1 holds it after the swap
        while bridge.output().encoder().phase() == Phase::Reset {
            assert_eq!(bridge.on_tx_ready(), 0);
        }
        for _ in 0..4 {
            assert_eq!(bridge.on_tx_ready(), BIT_PATTERNS[0]);
        }
        for _ in 0..4 {
            assert_eq!(bridge.on_tx_ready(), BIT_PATTERNS[3]);
        }
    }

    #[test]
    fn test_split_shares_frame() {
        let frame = FrameBuffer::<384>::new();
        let bridge = Bridge::new(BridgeConfig::NATIVE_128, &frame).unwrap();
        assert_eq!(bridge.config().reset_bytes(), 24);

        let (mut output, mut bus) = bridge.split();
        bus.handle(TargetEvent::AddressMatch(Direction::Write));
        bus.handle(TargetEvent::ByteReceived(0));
        bus.handle(TargetEvent::ByteReceived(0));
        bus.handle(TargetEvent::ByteReceived(0xFF));

        for _ in 0..24 {
            assert_eq!(output.next_byte(), 0);
        }
        assert_eq!(output.next_byte(), BIT_PATTERNS[3]);
        assert_eq!(bus.slave().stats().stored, 1);
    }
}
