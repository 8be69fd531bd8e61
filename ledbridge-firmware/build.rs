//! Build script for ledbridge-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates bridge.toml at compile time
//! - Generates `bridge_config.rs` with the validated configuration

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use ledbridge_core::config::{BridgeConfig, ConfigError, RemapMode};
use ledbridge_protocol::AddressWidth;

const SUPPORTED_I2C_HZ: [i64; 2] = [100_000, 400_000];

fn main() {
    setup_linker();
    let settings = validate_config();
    generate_config(&settings);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Everything bridge.toml decides
struct Settings {
    bridge: BridgeConfig,
    i2c_frequency_hz: u32,
    status_interval_s: u64,
}

/// Validate bridge.toml configuration at compile time
fn validate_config() -> Settings {
    // Re-run if bridge.toml changes
    println!("cargo:rerun-if-changed=bridge.toml");

    let config_path = Path::new("bridge.toml");

    // Check if config file exists
    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: bridge.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a bridge.toml configuration file.         ║\n\
            ║  Please create one in the ledbridge-firmware directory.          ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    // Read the config file
    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read bridge.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in bridge.toml                       ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    let bridge = parse_bridge(&config, &mut errors);
    let i2c_frequency_hz = parse_i2c(&config, &mut errors);
    let status_interval_s = parse_status(&config, &mut errors);

    if let Some(bridge) = &bridge {
        if let Err(e) = bridge.validate() {
            errors.push(describe(e));
        }
    }

    report("Invalid bridge configuration", &errors);

    // Only reached with no errors, so every field parsed
    let settings = Settings {
        bridge: bridge.unwrap(),
        i2c_frequency_hz,
        status_interval_s,
    };

    println!(
        "cargo:warning=bridge.toml validated: {} LEDs, {} reset bytes",
        settings.bridge.led_count,
        settings.bridge.reset_bytes()
    );
    settings
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Panic with every collected error in one box
fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Look up an integer field, recording an error if it is missing or mistyped
fn integer(table: &toml::Table, section: &str, key: &str, errors: &mut Vec<String>) -> Option<i64> {
    match table.get(key) {
        Some(toml::Value::Integer(v)) => Some(*v),
        Some(_) => {
            errors.push(format!("[{}] '{}' must be an integer", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// Look up a string field, recording an error if it is missing or mistyped
fn string<'a>(
    table: &'a toml::Table,
    section: &str,
    key: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    match table.get(key) {
        Some(toml::Value::String(v)) => Some(v.as_str()),
        Some(_) => {
            errors.push(format!("[{}] '{}' must be a string", section, key));
            None
        }
        None => {
            errors.push(format!("[{}] missing '{}'", section, key));
            None
        }
    }
}

/// Get a section table, recording an error if it is missing
fn section<'a>(config: &'a toml::Value, name: &str, errors: &mut Vec<String>) -> Option<&'a toml::Table> {
    match config.get(name) {
        Some(toml::Value::Table(t)) => Some(t),
        Some(_) => {
            errors.push(format!("[{}] must be a table", name));
            None
        }
        None => {
            errors.push(format!("Missing [{}] section", name));
            None
        }
    }
}

/// Narrow an integer field to its target type
fn narrow<T: TryFrom<i64>>(value: i64, section: &str, key: &str, errors: &mut Vec<String>) -> Option<T> {
    match T::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(format!("[{}] '{}' out of range: {}", section, key, value));
            None
        }
    }
}

/// Parse the [bridge] section
fn parse_bridge(config: &toml::Value, errors: &mut Vec<String>) -> Option<BridgeConfig> {
    let table = section(config, "bridge", errors)?;

    let led_count = integer(table, "bridge", "leds", errors)
        .and_then(|v| narrow::<u16>(v, "bridge", "leds", errors));
    let reset_hold_us = integer(table, "bridge", "reset_hold_us", errors)
        .and_then(|v| narrow::<u16>(v, "bridge", "reset_hold_us", errors));
    let bit_clock_hz = integer(table, "bridge", "bit_clock_hz", errors)
        .and_then(|v| narrow::<u32>(v, "bridge", "bit_clock_hz", errors));

    let address_width = match string(table, "bridge", "address_width", errors) {
        Some("word") => Some(AddressWidth::Word),
        Some("byte") => Some(AddressWidth::Byte),
        Some(other) => {
            errors.push(format!("[bridge] address_width must be 'word' or 'byte', got '{}'", other));
            None
        }
        None => None,
    };

    let remap = match string(table, "bridge", "remap", errors) {
        Some("none") => Some(RemapMode::Disabled),
        Some("is31fl3731") => Some(RemapMode::Is31fl3731),
        Some(other) => {
            errors.push(format!("[bridge] remap must be 'none' or 'is31fl3731', got '{}'", other));
            None
        }
        None => None,
    };

    Some(BridgeConfig {
        led_count: led_count?,
        address_width: address_width?,
        remap: remap?,
        reset_hold_us: reset_hold_us?,
        bit_clock_hz: bit_clock_hz?,
    })
}

/// Parse the [i2c] section
fn parse_i2c(config: &toml::Value, errors: &mut Vec<String>) -> u32 {
    let Some(table) = section(config, "i2c", errors) else {
        return 0;
    };
    match integer(table, "i2c", "frequency_hz", errors) {
        Some(hz) if SUPPORTED_I2C_HZ.contains(&hz) => hz as u32,
        Some(hz) => {
            errors.push(format!("[i2c] frequency_hz must be 100000 or 400000, got {}", hz));
            0
        }
        None => 0,
    }
}

/// Parse the [status] section
fn parse_status(config: &toml::Value, errors: &mut Vec<String>) -> u64 {
    let Some(table) = section(config, "status", errors) else {
        return 0;
    };
    match integer(table, "status", "interval_s", errors) {
        Some(s) if (1..=3600).contains(&s) => s as u64,
        Some(s) => {
            errors.push(format!("[status] interval_s must be 1-3600, got {}", s));
            0
        }
        None => 0,
    }
}

/// Human-readable message for a rejected configuration
fn describe(e: ConfigError) -> String {
    match e {
        ConfigError::ZeroLeds => "[bridge] leds must be at least 1".into(),
        ConfigError::FrameTooLarge => {
            "[bridge] leds * 3 exceeds what address_width can address".into()
        }
        ConfigError::LegacyFrameTooLarge => {
            "[bridge] is31fl3731 remap fits at most 72 LEDs".into()
        }
        ConfigError::RemapNeedsByteAddressing => {
            "[bridge] is31fl3731 remap needs address_width = 'byte'".into()
        }
        ConfigError::ResetHoldTooShort => "[bridge] reset_hold_us must be at least 50".into(),
        ConfigError::ZeroBitClock => "[bridge] bit_clock_hz must not be 0".into(),
        ConfigError::BitClockOutOfRange => {
            "[bridge] bit_clock_hz must be 2400000-4000000".into()
        }
    }
}

/// Write `bridge_config.rs` for the firmware to include
fn generate_config(settings: &Settings) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let bridge = &settings.bridge;

    let address_width = match bridge.address_width {
        AddressWidth::Byte => "AddressWidth::Byte",
        AddressWidth::Word => "AddressWidth::Word",
    };
    let remap = match bridge.remap {
        RemapMode::Disabled => "RemapMode::Disabled",
        RemapMode::Is31fl3731 => "RemapMode::Is31fl3731",
    };

    let code = format!(
        "// Generated from bridge.toml by build.rs\n\
         \n\
         /// Bridge configuration this image was built for\n\
         pub const BRIDGE: BridgeConfig = BridgeConfig {{\n    \
             led_count: {},\n    \
             address_width: {},\n    \
             remap: {},\n    \
             reset_hold_us: {},\n    \
             bit_clock_hz: {},\n\
         }};\n\
         \n\
         /// Frame buffer length in bytes\n\
         pub const FRAME_LEN: usize = {};\n\
         \n\
         /// I2C bus frequency in Hz\n\
         pub const I2C_FREQUENCY_HZ: u32 = {};\n\
         \n\
         /// Seconds between status log lines\n\
         pub const STATUS_INTERVAL_S: u64 = {};\n",
        bridge.led_count,
        address_width,
        remap,
        bridge.reset_hold_us,
        bridge.bit_clock_hz,
        bridge.frame_len(),
        settings.i2c_frequency_hz,
        settings.status_interval_s,
    );

    let mut f = File::create(out_dir.join("bridge_config.rs")).unwrap();
    f.write_all(code.as_bytes()).unwrap();
}
