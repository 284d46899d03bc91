//! SSD1306 command protocol encoder.
//!
//! Pure translation of controller operations into the byte sequences the
//! controller expects on its command channel. Nothing here touches the
//! bus, and every function is total: ranges are validated by the driver
//! before a [`Command`] is built.
//!
//! The I2C control byte (0x00 / 0x40) and the SPI D/C line are applied by
//! the transport, not here.

use heapless::Vec;

use crate::config::{AddressingMode, DisplayConfig};

// ---------------------------------------------------------------------------
// Opcodes
// ---------------------------------------------------------------------------

const SET_CONTRAST: u8 = 0x81;
const SET_ENTIRE_ON: u8 = 0xA4;
const SET_NORM_INV: u8 = 0xA6;
const SET_DISP: u8 = 0xAE;
const SET_MEM_ADDR: u8 = 0x20;
const SET_COL_ADDR: u8 = 0x21;
const SET_PAGE_ADDR: u8 = 0x22;
const SET_DISP_START_LINE: u8 = 0x40;
const SET_SEG_REMAP: u8 = 0xA0;
const SET_MUX_RATIO: u8 = 0xA8;
const SET_COM_OUT_DIR: u8 = 0xC0;
const SET_DISP_OFFSET: u8 = 0xD3;
const SET_COM_PIN_CFG: u8 = 0xDA;
const SET_DISP_CLK_DIV: u8 = 0xD5;
const SET_PRECHARGE: u8 = 0xD9;
const SET_VCOM_DESEL: u8 = 0xDB;
const SET_CHARGE_PUMP: u8 = 0x8D;
const SET_PAGE_START: u8 = 0xB0;
const SET_LOW_COLUMN: u8 = 0x00;
const SET_HIGH_COLUMN: u8 = 0x10;
const SET_SCROLL_RIGHT: u8 = 0x26;
const SET_SCROLL_LEFT: u8 = 0x27;
const DEACTIVATE_SCROLL: u8 = 0x2E;
const ACTIVATE_SCROLL: u8 = 0x2F;

// ---------------------------------------------------------------------------
// Protocol constants
// ---------------------------------------------------------------------------

/// Longest single command, in bytes (the scroll setup).
pub const MAX_COMMAND_LEN: usize = 7;

/// Number of commands in the power-on sequence.
pub const INIT_SEQUENCE_LEN: usize = 16;

/// Clock divide ratio sent at power-on (divide by 1).
const CLOCK_DIVIDE: u8 = 0x0;

/// Oscillator frequency nibble sent at power-on (reset default).
const CLOCK_FREQUENCY: u8 = 0x8;

/// VCOMH deselect level, ~0.77 × VCC.
const VCOMH_LEVEL: u8 = 0x30;

/// Encoded bytes of one command.
pub type CommandBytes = Vec<u8, MAX_COMMAND_LEN>;

/// Direction of a continuous horizontal hardware scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollDirection {
    /// Content moves towards higher columns.
    Right,
    /// Content moves towards lower columns.
    Left,
}

/// Frames between scroll steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollInterval {
    Frames2,
    Frames3,
    Frames4,
    Frames5,
    Frames25,
    Frames64,
    Frames128,
    Frames256,
}

impl ScrollInterval {
    /// The 3-bit interval code; the controller's ordering is not monotonic.
    fn bits(self) -> u8 {
        match self {
            ScrollInterval::Frames5 => 0b000,
            ScrollInterval::Frames64 => 0b001,
            ScrollInterval::Frames128 => 0b010,
            ScrollInterval::Frames256 => 0b011,
            ScrollInterval::Frames3 => 0b100,
            ScrollInterval::Frames4 => 0b101,
            ScrollInterval::Frames25 => 0b110,
            ScrollInterval::Frames2 => 0b111,
        }
    }
}

impl AddressingMode {
    /// Value of the memory addressing mode register (0x20).
    fn bits(self) -> u8 {
        match self {
            AddressingMode::Horizontal => 0x00,
            AddressingMode::Vertical => 0x01,
            AddressingMode::Page => 0x02,
        }
    }
}

/// One controller command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Panel on (`true`) or sleep (`false`).
    DisplayOn(bool),
    /// Clock divide ratio (low nibble) and oscillator frequency (high nibble).
    ClockDivide { divide: u8, frequency: u8 },
    /// Multiplex ratio: number of active COM lines minus one.
    Multiplex(u8),
    /// Vertical shift of the COM mapping.
    DisplayOffset(u8),
    /// RAM row shown on the first COM line (0–63).
    StartLine(u8),
    /// Internal charge pump regulator.
    ChargePump(bool),
    /// Column 127 mapped to SEG0 when `true`.
    SegmentRemap(bool),
    /// COM scan from COM[N-1] to COM0 when `true`.
    ReverseComDir(bool),
    /// COM pins hardware configuration.
    ComPinConfig { alternative: bool, remap: bool },
    /// Contrast level.
    Contrast(u8),
    /// Pre-charge phase 1 and phase 2 periods, in DCLKs (1–15 each).
    PreChargePeriod(u8, u8),
    /// VCOMH deselect level register value.
    VcomhDeselect(u8),
    /// Light every pixel regardless of RAM when `true`; follow RAM when `false`.
    AllOn(bool),
    /// Invert the meaning of RAM bits when `true`.
    Invert(bool),
    /// Memory addressing mode.
    AddressMode(AddressingMode),
    /// Column window for horizontal/vertical addressing, inclusive.
    ColumnAddress(u8, u8),
    /// Page window for horizontal/vertical addressing, inclusive.
    PageAddress(u8, u8),
    /// Page pointer for page addressing.
    PageStart(u8),
    /// Column pointer for page addressing.
    ColumnStart(u8),
    /// Continuous horizontal scroll over a page range.
    HorizontalScrollSetup {
        direction: ScrollDirection,
        start_page: u8,
        end_page: u8,
        interval: ScrollInterval,
    },
    /// Start (`true`) or stop (`false`) the configured scroll.
    EnableScroll(bool),
}

impl Command {
    /// Serialise this command to its bytes on the command channel.
    pub fn encode(&self) -> CommandBytes {
        match *self {
            Command::DisplayOn(on) => bytes(&[SET_DISP | on as u8]),
            Command::ClockDivide { divide, frequency } => bytes(&[
                SET_DISP_CLK_DIV,
                ((frequency & 0x0F) << 4) | (divide & 0x0F),
            ]),
            Command::Multiplex(ratio) => bytes(&[SET_MUX_RATIO, ratio & 0x3F]),
            Command::DisplayOffset(offset) => bytes(&[SET_DISP_OFFSET, offset & 0x3F]),
            Command::StartLine(line) => bytes(&[SET_DISP_START_LINE | (line & 0x3F)]),
            Command::ChargePump(on) => bytes(&[SET_CHARGE_PUMP, if on { 0x14 } else { 0x10 }]),
            Command::SegmentRemap(remap) => bytes(&[SET_SEG_REMAP | remap as u8]),
            Command::ReverseComDir(rev) => bytes(&[SET_COM_OUT_DIR | ((rev as u8) << 3)]),
            Command::ComPinConfig { alternative, remap } => bytes(&[
                SET_COM_PIN_CFG,
                0x02 | ((alternative as u8) << 4) | ((remap as u8) << 5),
            ]),
            Command::Contrast(level) => bytes(&[SET_CONTRAST, level]),
            Command::PreChargePeriod(phase1, phase2) => bytes(&[
                SET_PRECHARGE,
                ((phase2 & 0x0F) << 4) | (phase1 & 0x0F),
            ]),
            Command::VcomhDeselect(level) => bytes(&[SET_VCOM_DESEL, level]),
            Command::AllOn(on) => bytes(&[SET_ENTIRE_ON | on as u8]),
            Command::Invert(inv) => bytes(&[SET_NORM_INV | inv as u8]),
            Command::AddressMode(mode) => bytes(&[SET_MEM_ADDR, mode.bits()]),
            Command::ColumnAddress(start, end) => {
                bytes(&[SET_COL_ADDR, start & 0x7F, end & 0x7F])
            }
            Command::PageAddress(start, end) => {
                bytes(&[SET_PAGE_ADDR, start & 0x07, end & 0x07])
            }
            Command::PageStart(page) => bytes(&[SET_PAGE_START | (page & 0x07)]),
            Command::ColumnStart(column) => bytes(&[
                SET_LOW_COLUMN | (column & 0x0F),
                SET_HIGH_COLUMN | ((column >> 4) & 0x07),
            ]),
            Command::HorizontalScrollSetup {
                direction,
                start_page,
                end_page,
                interval,
            } => bytes(&[
                match direction {
                    ScrollDirection::Right => SET_SCROLL_RIGHT,
                    ScrollDirection::Left => SET_SCROLL_LEFT,
                },
                0x00,
                start_page & 0x07,
                interval.bits(),
                end_page & 0x07,
                0x00,
                0xFF,
            ]),
            Command::EnableScroll(on) => bytes(&[if on {
                ACTIVATE_SCROLL
            } else {
                DEACTIVATE_SCROLL
            }]),
        }
    }
}

fn bytes(slice: &[u8]) -> CommandBytes {
    debug_assert!(slice.len() <= MAX_COMMAND_LEN);
    CommandBytes::from_slice(slice).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Encoder operations
// ---------------------------------------------------------------------------

/// The power-on sequence for `config`, in the order the controller
/// requires.
///
/// For the default 128×64 configuration the concatenated bytes are
/// `AE D5 80 A8 3F D3 00 40 8D 14 A1 C8 DA 12 81 FF D9 F1 DB 30 A4 A6 20 00 AF`.
pub fn encode_init(config: &DisplayConfig) -> [Command; INIT_SEQUENCE_LEN] {
    let (flip_h, flip_v) = config.orientation.flip_flags();
    let [segment_remap, com_dir] = encode_flip(flip_h, flip_v);
    let precharge = if config.external_vcc {
        Command::PreChargePeriod(2, 2)
    } else {
        Command::PreChargePeriod(1, 15)
    };

    [
        encode_display_on(false),
        Command::ClockDivide {
            divide: CLOCK_DIVIDE,
            frequency: CLOCK_FREQUENCY,
        },
        Command::Multiplex((config.height - 1) as u8),
        Command::DisplayOffset(0),
        Command::StartLine(0),
        Command::ChargePump(!config.external_vcc),
        segment_remap,
        com_dir,
        Command::ComPinConfig {
            // Wide, short panels wire COM lines sequentially.
            alternative: config.width <= 2 * config.height,
            remap: false,
        },
        encode_set_contrast(config.contrast),
        precharge,
        Command::VcomhDeselect(VCOMH_LEVEL),
        Command::AllOn(false),
        Command::Invert(false),
        encode_set_addressing_mode(config.addressing_mode),
        encode_display_on(true),
    ]
}

/// Contrast (brightness) level.
pub fn encode_set_contrast(level: u8) -> Command {
    Command::Contrast(level)
}

/// Memory addressing mode.
pub fn encode_set_addressing_mode(mode: AddressingMode) -> Command {
    Command::AddressMode(mode)
}

/// Page-addressing write pointer: page, then column.
pub fn encode_set_position(column: u8, page: u8) -> [Command; 2] {
    [Command::PageStart(page), Command::ColumnStart(column)]
}

/// Horizontal/vertical-addressing write window. Both ranges are
/// inclusive; the pointer starts at `(column_start, page_start)`.
pub fn encode_set_window(
    column_start: u8,
    column_end: u8,
    page_start: u8,
    page_end: u8,
) -> [Command; 2] {
    [
        Command::ColumnAddress(column_start, column_end),
        Command::PageAddress(page_start, page_end),
    ]
}

/// Panel on or asleep.
pub fn encode_display_on(on: bool) -> Command {
    Command::DisplayOn(on)
}

/// Segment remap and COM scan direction, relative to the normal
/// orientation (remapped segments, reversed COM scan).
pub fn encode_flip(horizontal: bool, vertical: bool) -> [Command; 2] {
    [
        Command::SegmentRemap(!horizontal),
        Command::ReverseComDir(!vertical),
    ]
}

/// Hardware invert (`true`) or normal display mode.
pub fn encode_invert(inverted: bool) -> Command {
    Command::Invert(inverted)
}

/// Scroll setup followed by activation. The scroll must be stopped before
/// it is reconfigured.
pub fn encode_start_scroll(
    direction: ScrollDirection,
    start_page: u8,
    end_page: u8,
    interval: ScrollInterval,
) -> [Command; 3] {
    [
        Command::EnableScroll(false),
        Command::HorizontalScrollSetup {
            direction,
            start_page,
            end_page,
            interval,
        },
        Command::EnableScroll(true),
    ]
}

/// Deactivate any running scroll.
pub fn encode_stop_scroll() -> Command {
    Command::EnableScroll(false)
}

#[cfg(test)]
mod tests {
    use std::vec::Vec;

    use super::*;
    use crate::config::Orientation;

    fn concat(commands: &[Command]) -> Vec<u8> {
        commands
            .iter()
            .flat_map(|c| c.encode().into_iter())
            .collect()
    }

    #[test]
    fn init_sequence_128x64_golden_trace() {
        let trace = concat(&encode_init(&DisplayConfig::default()));
        assert_eq!(
            trace,
            [
                0xAE, 0xD5, 0x80, 0xA8, 0x3F, 0xD3, 0x00, 0x40, 0x8D, 0x14, 0xA1, 0xC8,
                0xDA, 0x12, 0x81, 0xFF, 0xD9, 0xF1, 0xDB, 0x30, 0xA4, 0xA6, 0x20, 0x00,
                0xAF,
            ]
        );
    }

    #[test]
    fn init_sequence_128x32_uses_sequential_com_pins() {
        let cmds = encode_init(&DisplayConfig::with_size(128, 32));
        assert_eq!(cmds[2].encode().as_slice(), &[0xA8, 0x1F]);
        assert_eq!(cmds[8].encode().as_slice(), &[0xDA, 0x02]);
    }

    #[test]
    fn init_sequence_flipped_external_vcc_page_mode() {
        let config = DisplayConfig {
            orientation: Orientation::Flipped,
            external_vcc: true,
            addressing_mode: AddressingMode::Page,
            contrast: 0x7F,
            ..DisplayConfig::default()
        };
        let cmds = encode_init(&config);
        assert_eq!(cmds[5].encode().as_slice(), &[0x8D, 0x10]);
        assert_eq!(cmds[6].encode().as_slice(), &[0xA0]);
        assert_eq!(cmds[7].encode().as_slice(), &[0xC0]);
        assert_eq!(cmds[9].encode().as_slice(), &[0x81, 0x7F]);
        assert_eq!(cmds[10].encode().as_slice(), &[0xD9, 0x22]);
        assert_eq!(cmds[14].encode().as_slice(), &[0x20, 0x02]);
    }

    #[test]
    fn init_starts_off_and_ends_on() {
        let cmds = encode_init(&DisplayConfig::default());
        assert_eq!(cmds[0], Command::DisplayOn(false));
        assert_eq!(cmds[INIT_SEQUENCE_LEN - 1], Command::DisplayOn(true));
    }

    #[test]
    fn addressing_mode_values() {
        assert_eq!(
            encode_set_addressing_mode(AddressingMode::Horizontal).encode().as_slice(),
            &[0x20, 0x00]
        );
        assert_eq!(
            encode_set_addressing_mode(AddressingMode::Vertical).encode().as_slice(),
            &[0x20, 0x01]
        );
        assert_eq!(
            encode_set_addressing_mode(AddressingMode::Page).encode().as_slice(),
            &[0x20, 0x02]
        );
    }

    #[test]
    fn page_mode_position_splits_column_nibbles() {
        assert_eq!(concat(&encode_set_position(0x5A, 3)), [0xB3, 0x0A, 0x15]);
        assert_eq!(concat(&encode_set_position(0, 0)), [0xB0, 0x00, 0x10]);
    }

    #[test]
    fn window_position() {
        assert_eq!(
            concat(&encode_set_window(0, 127, 0, 7)),
            [0x21, 0x00, 0x7F, 0x22, 0x00, 0x07]
        );
    }

    #[test]
    fn flip_combinations() {
        assert_eq!(concat(&encode_flip(false, false)), [0xA1, 0xC8]);
        assert_eq!(concat(&encode_flip(true, false)), [0xA0, 0xC8]);
        assert_eq!(concat(&encode_flip(false, true)), [0xA1, 0xC0]);
        assert_eq!(concat(&encode_flip(true, true)), [0xA0, 0xC0]);
    }

    #[test]
    fn power_contrast_invert() {
        assert_eq!(encode_display_on(true).encode().as_slice(), &[0xAF]);
        assert_eq!(encode_display_on(false).encode().as_slice(), &[0xAE]);
        assert_eq!(encode_set_contrast(0x42).encode().as_slice(), &[0x81, 0x42]);
        assert_eq!(encode_invert(true).encode().as_slice(), &[0xA7]);
        assert_eq!(encode_invert(false).encode().as_slice(), &[0xA6]);
    }

    #[test]
    fn scroll_sequence() {
        let trace = concat(&encode_start_scroll(
            ScrollDirection::Left,
            1,
            6,
            ScrollInterval::Frames2,
        ));
        assert_eq!(
            trace,
            [0x2E, 0x27, 0x00, 0x01, 0x07, 0x06, 0x00, 0xFF, 0x2F]
        );
        assert_eq!(encode_stop_scroll().encode().as_slice(), &[0x2E]);
    }

    #[test]
    fn every_command_fits_one_batch() {
        let longest = Command::HorizontalScrollSetup {
            direction: ScrollDirection::Right,
            start_page: 0,
            end_page: 7,
            interval: ScrollInterval::Frames5,
        };
        assert_eq!(longest.encode().len(), MAX_COMMAND_LEN);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn over_long_command_bytes_are_caught() {
        bytes(&[0u8; MAX_COMMAND_LEN + 1]);
    }
}
