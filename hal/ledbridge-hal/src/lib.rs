//! LED Bridge Hardware Abstraction Layer
//!
//! This crate defines the two hardware seams the bridge core talks to. Each
//! peripheral is reduced to an event-sized port, so the state machines in
//! `ledbridge-core` can be driven by an interrupt handler on the target or by
//! a plain test on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ledbridge-firmware (interrupt glue)    │
//! └─────────────────────────────────────────┘
//!            │                     │
//!            ▼                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ledbridge-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ledbridge-hal-stm32f0 (register level) │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`i2c::I2cTargetPort`] - I2C slave (target) byte events
//! - [`spi::SpiTx`] - Transmit-only SPI data register

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod spi;

// Re-export key traits at crate root for convenience
pub use i2c::{Direction, I2cTargetPort, TargetEvent};
pub use spi::SpiTx;
