//! Controller register mirror and flush planning.
//!
//! The SSD1306 cannot be read back over I2C or 4-wire SPI, so every
//! register the driver depends on is mirrored in [`ControllerState`] and
//! updated whenever a command changes it.
//!
//! Flushes always cover whole pages: a page byte is the smallest unit the
//! controller accepts, so a dirty rectangle is widened to the 8-pixel
//! strips it touches ([`FlushWindow`]). How that window reaches the panel
//! depends on the addressing mode:
//!
//! - **Horizontal** — one column/page window, then the window's bytes
//!   page by page in a single data write.
//! - **Vertical** — the same window, bytes column by column.
//! - **Page** — for each page, a page/column pointer and that page's run
//!   of bytes; the pointer does not advance to the next page on its own.

use display_interface::DisplayError;

use crate::command::{encode_set_position, encode_set_window};
use crate::config::{AddressingMode, DisplayConfig, MAX_BUFFER_SIZE, PAGE_HEIGHT};
use crate::framebuffer::Framebuffer;
use crate::region::Rect;
use crate::transport::{send_commands, Transport};

/// Contrast the controller uses after reset.
const RESET_CONTRAST: u8 = 0x7F;

/// Local copy of the controller's write-only registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerState {
    pub addressing_mode: AddressingMode,
    /// Logical column the next data byte lands in (`0..width`).
    pub column: u32,
    /// Page the next data byte lands in (`0..pages`).
    pub page: u32,
    pub contrast: u8,
    pub display_on: bool,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Hardware invert (0xA7) active.
    pub display_inverted: bool,
    /// A hardware scroll is running.
    pub scrolling: bool,
}

impl Default for ControllerState {
    /// Register values after a controller reset.
    fn default() -> Self {
        Self {
            addressing_mode: AddressingMode::Page,
            column: 0,
            page: 0,
            contrast: RESET_CONTRAST,
            display_on: false,
            flip_horizontal: false,
            flip_vertical: false,
            display_inverted: false,
            scrolling: false,
        }
    }
}

impl ControllerState {
    /// Register values once the power-on sequence for `config` completed.
    pub fn after_init(config: &DisplayConfig) -> Self {
        let (flip_horizontal, flip_vertical) = config.orientation.flip_flags();
        Self {
            addressing_mode: config.addressing_mode,
            column: 0,
            page: 0,
            contrast: config.contrast,
            display_on: true,
            flip_horizontal,
            flip_vertical,
            display_inverted: false,
            scrolling: false,
        }
    }

    /// Write the bytes covered by `window` from `frame` to the panel, and
    /// track where the controller's pointer ends up.
    ///
    /// On failure the pointer position is unknown; the next flush always
    /// repositions before writing, so no state needs rolling back.
    pub(crate) fn write_window<T>(
        &mut self,
        transport: &mut T,
        frame: &Framebuffer,
        window: &FlushWindow,
        column_offset: u8,
    ) -> Result<(), DisplayError>
    where
        T: Transport + ?Sized,
    {
        let offset = column_offset as u32;
        let first_column = (window.first_column + offset) as u8;
        let last_column = (window.last_column + offset) as u8;

        match self.addressing_mode {
            AddressingMode::Horizontal | AddressingMode::Vertical => {
                send_commands(
                    transport,
                    &encode_set_window(
                        first_column,
                        last_column,
                        window.first_page as u8,
                        window.last_page as u8,
                    ),
                )?;

                if self.addressing_mode == AddressingMode::Horizontal
                    && window.spans_width(frame.width())
                {
                    let start = (window.first_page * frame.width()) as usize;
                    let end = ((window.last_page + 1) * frame.width()) as usize;
                    transport.write_data(&frame.as_bytes()[start..end])?;
                } else {
                    let mut payload = [0u8; MAX_BUFFER_SIZE];
                    let len = self.gather(frame, window, &mut payload);
                    transport.write_data(&payload[..len])?;
                }

                // Writing exactly one window's worth wraps the pointer
                // back to the window origin.
                self.column = window.first_column;
                self.page = window.first_page;
            }
            AddressingMode::Page => {
                for page in window.first_page..=window.last_page {
                    send_commands(transport, &encode_set_position(first_column, page as u8))?;
                    transport.write_data(frame.page_slice(
                        page,
                        window.first_column,
                        window.last_column,
                    ))?;
                    self.page = page;
                    self.column = (window.last_column + 1) % frame.width();
                }
            }
        }
        Ok(())
    }

    /// Copy the window's bytes into `payload` in the order the current
    /// addressing mode consumes them. Returns the number of bytes.
    fn gather(&self, frame: &Framebuffer, window: &FlushWindow, payload: &mut [u8]) -> usize {
        let mut len = 0;
        match self.addressing_mode {
            AddressingMode::Vertical => {
                for column in window.first_column..=window.last_column {
                    for page in window.first_page..=window.last_page {
                        payload[len] = frame.page_byte(page, column);
                        len += 1;
                    }
                }
            }
            AddressingMode::Horizontal | AddressingMode::Page => {
                for page in window.first_page..=window.last_page {
                    let row = frame.page_slice(page, window.first_column, window.last_column);
                    payload[len..len + row.len()].copy_from_slice(row);
                    len += row.len();
                }
            }
        }
        len
    }
}

/// A dirty rectangle widened to whole pages. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushWindow {
    pub first_column: u32,
    pub last_column: u32,
    pub first_page: u32,
    pub last_page: u32,
}

impl FlushWindow {
    /// The pages touched by `dirty`, over the same columns.
    pub fn covering(dirty: &Rect) -> Self {
        Self {
            first_column: dirty.x0,
            last_column: dirty.x1,
            first_page: dirty.y0 / PAGE_HEIGHT,
            last_page: dirty.y1 / PAGE_HEIGHT,
        }
    }

    pub fn columns(&self) -> u32 {
        self.last_column - self.first_column + 1
    }

    pub fn pages(&self) -> u32 {
        self.last_page - self.first_page + 1
    }

    /// Bytes the window occupies in display RAM.
    pub fn byte_len(&self) -> usize {
        (self.columns() * self.pages()) as usize
    }

    fn spans_width(&self, width: u32) -> bool {
        self.first_column == 0 && self.last_column + 1 == width
    }
}
