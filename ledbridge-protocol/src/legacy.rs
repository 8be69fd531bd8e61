//! IS31FL3731 register map, as far as the bridge honors it
//!
//! The legacy chip has eight frame pages plus a function page, selected by
//! writing the page number to the command register at `0xFD`. Within a frame
//! page, `0x00..0x12` are LED on/off bits, `0x12..0x24` blink bits and
//! `0x24..` PWM (color) data. The bridge maps only page 0 color data onto
//! its frame buffer.

use crate::transaction::RegisterWrite;
use crate::AddressWidth;

/// Command register: the data byte written here selects the page
pub const PAGE_SELECT_REGISTER: u8 = 0xFD;

/// First color (PWM) register of a frame page
pub const COLOR_DATA_BASE: u8 = 0x24;

/// Number of legacy registers that can carry color data
///
/// Runs from [`COLOR_DATA_BASE`] up to, but not including, the command
/// register.
pub const COLOR_DATA_SLOTS: usize = (PAGE_SELECT_REGISTER - COLOR_DATA_BASE) as usize;

/// The only page whose color data reaches the LEDs
pub const PIXEL_PAGE: u8 = 0x00;

/// Function register page
pub const FUNCTION_PAGE: u8 = 0x0B;

/// LED control (on/off) registers at the start of a frame page
pub const LED_CONTROL_BASE: u8 = 0x00;

/// Number of LED control registers
pub const LED_CONTROL_LEN: usize = 0x12;

/// Function page: configuration (display mode) register
pub const REG_CONFIG: u8 = 0x00;

/// Function page: picture display (which frame to show) register
pub const REG_PICTURE_DISPLAY: u8 = 0x01;

/// Function page: shutdown register
pub const REG_SHUTDOWN: u8 = 0x0A;

/// Highest register touched by the clear loop of the init sequence
const CLEAR_END: u8 = 0xB4;

/// Registers cleared per clear-loop write
const CLEAR_STRIDE: u8 = 0x10;

static ZEROS: [u8; CLEAR_STRIDE as usize] = [0; CLEAR_STRIDE as usize];
static ALL_ON: [u8; LED_CONTROL_LEN] = [0xFF; LED_CONTROL_LEN];

/// One write of the legacy bring-up sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitStep {
    /// The register write to send
    pub write: RegisterWrite<'static>,
    /// How long the master waits after this write
    pub settle_ms: u16,
}

impl InitStep {
    const fn byte(register: u8, value: &'static [u8], settle_ms: u16) -> Self {
        Self {
            write: RegisterWrite::new_unchecked(AddressWidth::Byte, register as u16, value),
            settle_ms,
        }
    }
}

const PROLOGUE: [InitStep; 6] = [
    InitStep::byte(PAGE_SELECT_REGISTER, &[FUNCTION_PAGE], 0),
    InitStep::byte(REG_SHUTDOWN, &[0x00], 10),
    InitStep::byte(REG_SHUTDOWN, &[0x01], 0),
    InitStep::byte(REG_CONFIG, &[0x01], 0),
    InitStep::byte(REG_PICTURE_DISPLAY, &[0x00], 0),
    InitStep::byte(PAGE_SELECT_REGISTER, &[PIXEL_PAGE], 0),
];

/// The sequence a stock IS31FL3731 driver sends before drawing
///
/// Function page setup (shutdown, restore, picture mode, frame 0), then a
/// page 0 clear in 16-byte writes and finally every LED control bit on. A
/// bridge in legacy mode must swallow all of it: function-page writes land
/// on a non-zero page, and control-bit writes sit below the color base.
pub fn legacy_init_sequence() -> impl Iterator<Item = InitStep> {
    let clear = (0..=CLEAR_END)
        .step_by(CLEAR_STRIDE as usize)
        .map(|register| InitStep::byte(register, &ZEROS, 0));

    PROLOGUE
        .into_iter()
        .chain(clear)
        .chain(core::iter::once(InitStep::byte(LED_CONTROL_BASE, &ALL_ON, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_slots_fit_72_leds() {
        // 72 LEDs * 3 channels must fit below the command register
        assert!(72 * 3 <= COLOR_DATA_SLOTS);
        assert_eq!(COLOR_DATA_SLOTS, 217);
    }

    #[test]
    fn test_init_sequence_starts_on_function_page() {
        let first = legacy_init_sequence().next().unwrap();
        assert_eq!(first.write.register(), PAGE_SELECT_REGISTER as u16);
        assert_eq!(first.write.data(), &[FUNCTION_PAGE]);
    }

    #[test]
    fn test_init_sequence_waits_after_shutdown() {
        let shutdown = legacy_init_sequence().nth(1).unwrap();
        assert_eq!(shutdown.write.register(), REG_SHUTDOWN as u16);
        assert_eq!(shutdown.settle_ms, 10);
    }

    #[test]
    fn test_init_sequence_selects_page_zero_before_clear() {
        let steps: heapless::Vec<InitStep, 32> = legacy_init_sequence().collect();
        let page_zero = steps
            .iter()
            .position(|s| {
                s.write.register() == PAGE_SELECT_REGISTER as u16 && s.write.data() == [PIXEL_PAGE]
            })
            .unwrap();
        let first_clear = steps
            .iter()
            .position(|s| s.write.data() == ZEROS)
            .unwrap();
        assert!(page_zero < first_clear);
    }

    #[test]
    fn test_init_sequence_length() {
        // 6 prologue writes, 12 clear writes (0x00..=0xB0), 1 enable write
        assert_eq!(legacy_init_sequence().count(), 6 + 12 + 1);
    }
}
