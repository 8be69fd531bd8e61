//! Board-agnostic core of the LED bridge
//!
//! This crate contains everything between the two interrupt sources that
//! does not depend on a specific chip:
//!
//! - Shared frame buffer (atomic bytes, no locks)
//! - WS2812 bit encoder, driven by SPI transmit-empty events
//! - I2C register-file slave, driven by bus events
//! - IS31FL3731 compatibility remap
//! - Bridge configuration and validation
//!
//! ```text
//! I2C events ─▶ RegisterSlave ─(LegacyRemap)─▶ FrameBuffer ─▶ Encoder ─▶ SPI
//!        ◀──────────── reads ─────────────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod encoder;
pub mod frame;
pub mod remap;
pub mod slave;

pub use bridge::{Bridge, BridgeError, BusTarget, StripOutput};
pub use config::{BridgeConfig, ConfigError, RemapMode};
pub use encoder::{encode_byte, Encoder, Phase, BIT_PATTERNS};
pub use frame::FrameBuffer;
pub use remap::LegacyRemap;
pub use slave::{AddressPhase, ByteOutcome, RegisterSlave, SlaveStats};
