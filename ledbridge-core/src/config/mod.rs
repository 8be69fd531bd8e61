//! Configuration types
//!
//! Every build variant (LED count, address width, legacy remap, reset hold)
//! is a [`BridgeConfig`] value chosen at construction time.

pub mod bridge;

pub use bridge::*;
