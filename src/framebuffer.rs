//! Off-screen pixel buffer mirroring the panel's display RAM.
//!
//! The buffer uses the controller's own layout so it can be streamed to
//! the panel unchanged: one byte per 8-pixel vertical strip, bit 0 at the
//! top, `width` bytes per page and pages top to bottom. Pixel `(x, y)`
//! lives in byte `x + (y / 8) * width`, bit `y % 8`. That mapping is
//! confined to [`Framebuffer::locate`]; everything else goes through
//! [`Framebuffer::set_pixel`] / [`Framebuffer::get_pixel`].

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use heapless::Vec;

use crate::bitmap::Bitmap;
use crate::config::{MAX_BUFFER_SIZE, MAX_HEIGHT, MAX_WIDTH, PAGE_HEIGHT};
use crate::error::OledError;
use crate::font::Font;
use crate::primitives::{self, SetPixel};
use crate::region::{DirtyRegion, Rect};

/// Packed 1-bit-per-pixel frame with dirty-region tracking.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    inverted: bool,
    buffer: Vec<u8, MAX_BUFFER_SIZE>,
    dirty: DirtyRegion,
}

impl Framebuffer {
    /// Allocate a cleared `width × height` frame.
    ///
    /// With `inverted` set, cleared pixels read as lit and bitmaps are
    /// blitted complemented.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] if the size is zero or
    /// larger than 128×64.
    pub fn new(width: u32, height: u32, inverted: bool) -> Result<Self, OledError> {
        if width == 0 || width > MAX_WIDTH || height == 0 || height > MAX_HEIGHT {
            return Err(OledError::InvalidParameter);
        }
        let mut buffer = Vec::new();
        let size = (width * height.div_ceil(PAGE_HEIGHT)) as usize;
        buffer
            .resize(size, Self::clear_byte(inverted))
            .map_err(|_| OledError::InvalidParameter)?;

        Ok(Self {
            width,
            height,
            inverted,
            buffer,
            dirty: DirtyRegion::default(),
        })
    }

    fn clear_byte(inverted: bool) -> u8 {
        if inverted {
            0xFF
        } else {
            0x00
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of 8-pixel pages.
    pub fn pages(&self) -> u32 {
        self.height.div_ceil(PAGE_HEIGHT)
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// The raw buffer, `width * pages()` bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes of columns `first_column..=last_column` within `page`.
    pub fn page_slice(&self, page: u32, first_column: u32, last_column: u32) -> &[u8] {
        let base = (page * self.width) as usize;
        &self.buffer[base + first_column as usize..=base + last_column as usize]
    }

    /// Byte holding column `column` of `page`.
    pub fn page_byte(&self, page: u32, column: u32) -> u8 {
        self.buffer[(page * self.width + column) as usize]
    }

    pub fn dirty_region(&self) -> &DirtyRegion {
        &self.dirty
    }

    /// Flag the whole frame for the next flush.
    pub fn mark_all_dirty(&mut self) {
        self.dirty.include(Rect::full(self.width, self.height));
    }

    /// Forget the dirty region once it has reached the panel.
    pub fn mark_clean(&mut self) {
        self.dirty.reset();
    }

    /// Byte index and bit mask of `(x, y)`, or `None` outside the frame.
    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = (x + (y / PAGE_HEIGHT) * self.width) as usize;
        Some((index, 1 << (y % PAGE_HEIGHT)))
    }

    fn write(&mut self, index: usize, mask: u8, on: bool) {
        if on {
            self.buffer[index] |= mask;
        } else {
            self.buffer[index] &= !mask;
        }
    }

    // -----------------------------------------------------------------------
    // Pixel contract
    // -----------------------------------------------------------------------

    /// Reset every pixel to the clear value (off, or on when inverted).
    pub fn clear(&mut self) {
        self.fill(self.inverted);
    }

    /// Set every pixel to `on`.
    pub fn fill(&mut self, on: bool) {
        let byte = if on { 0xFF } else { 0x00 };
        self.buffer.iter_mut().for_each(|b| *b = byte);
        self.mark_all_dirty();
    }

    /// Set (`on = true`) or clear the pixel at `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::OutOfBounds`] if `x >= width` or
    /// `y >= height`; nothing is modified.
    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> Result<(), OledError> {
        let (index, mask) = self.locate(x, y).ok_or(OledError::OutOfBounds)?;
        self.write(index, mask, on);
        self.dirty.include(Rect::point(x, y));
        Ok(())
    }

    /// Whether the pixel at `(x, y)` is lit.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::OutOfBounds`] if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> Result<bool, OledError> {
        let (index, mask) = self.locate(x, y).ok_or(OledError::OutOfBounds)?;
        Ok(self.buffer[index] & mask != 0)
    }

    // -----------------------------------------------------------------------
    // Bitmaps and text
    // -----------------------------------------------------------------------

    /// Copy `bitmap` with its top-left corner at `(x, y)`.
    ///
    /// Source pixels that fall outside the frame are dropped; a bitmap
    /// entirely off-screen is a no-op. Only the visible part is marked
    /// dirty.
    pub fn blit(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32) {
        // Clip in i64 so origins near i32::MAX cannot overflow.
        let (x, y) = (x as i64, y as i64);
        let left = x.max(0);
        let top = y.max(0);
        let right = (x + bitmap.width() as i64).min(self.width as i64);
        let bottom = (y + bitmap.height() as i64).min(self.height as i64);
        if left >= right || top >= bottom {
            return;
        }

        for dy in top..bottom {
            for dx in left..right {
                let on = bitmap.pixel((dx - x) as u32, (dy - y) as u32) ^ self.inverted;
                if let Some((index, mask)) = self.locate(dx as u32, dy as u32) {
                    self.write(index, mask, on);
                }
            }
        }
        self.dirty.include(Rect {
            x0: left as u32,
            y0: top as u32,
            x1: (right - 1) as u32,
            y1: (bottom - 1) as u32,
        });
    }

    /// Render `text` starting at `(x, y)` and return the cursor position
    /// after the last glyph.
    ///
    /// Each glyph is blitted and the cursor advances by its width plus the
    /// font spacing. Characters the font lacks use its fallback glyph.
    /// There is no wrapping: text running past the right edge is clipped.
    pub fn draw_text<F>(&mut self, x: i32, y: i32, text: &str, font: &F) -> i32
    where
        F: Font + ?Sized,
    {
        let mut cursor = x;
        for c in text.chars() {
            if let Some(glyph) = font.glyph(c).or_else(|| font.fallback()) {
                self.blit(&glyph, cursor, y);
                let advance = glyph.width().saturating_add(font.spacing());
                cursor = cursor.saturating_add(i32::try_from(advance).unwrap_or(i32::MAX));
            }
        }
        cursor
    }

    // -----------------------------------------------------------------------
    // Shapes
    // -----------------------------------------------------------------------

    pub fn draw_line(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, on: bool) -> Result<(), OledError> {
        primitives::draw_line(self, x0, y0, x1, y1, on)
    }

    pub fn draw_hline(&mut self, x: u32, y: u32, length: u32, on: bool) -> Result<(), OledError> {
        primitives::draw_hline(self, x, y, length, on)
    }

    pub fn draw_vline(&mut self, x: u32, y: u32, length: u32, on: bool) -> Result<(), OledError> {
        primitives::draw_vline(self, x, y, length, on)
    }

    pub fn draw_rect(&mut self, x: u32, y: u32, width: u32, height: u32, on: bool) -> Result<(), OledError> {
        primitives::draw_rect(self, x, y, width, height, on)
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, on: bool) -> Result<(), OledError> {
        primitives::fill_rect(self, x, y, width, height, on)
    }

    pub fn draw_circle(&mut self, cx: u32, cy: u32, radius: u32, on: bool) -> Result<(), OledError> {
        primitives::draw_circle(self, cx, cy, radius, on)
    }
}

impl SetPixel for Framebuffer {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> Result<(), OledError> {
        Framebuffer::set_pixel(self, x, y, on)
    }
}

// ── embedded-graphics integration ───────────────────────────────────────

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Pixels outside the frame are clipped, matching [`Framebuffer::blit`].
impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if let Some((index, mask)) = self.locate(x, y) {
                self.write(index, mask, color.is_on());
                self.dirty.include(Rect::point(x, y));
            }
        }
        Ok(())
    }
}
