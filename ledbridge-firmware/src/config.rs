//! Build-time configuration
//!
//! Generated from `bridge.toml` by the build script, which has already
//! rejected anything [`BridgeConfig::validate`] would.

use ledbridge_core::config::{BridgeConfig, RemapMode};
use ledbridge_protocol::AddressWidth;

include!(concat!(env!("OUT_DIR"), "/bridge_config.rs"));

// The frame buffer type is sized from FRAME_LEN; keep it in step with BRIDGE
const _: () = assert!(BRIDGE.frame_len() == FRAME_LEN);
