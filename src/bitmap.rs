//! Read-only source bitmaps for [`Framebuffer::blit`](crate::Framebuffer::blit).

use crate::config::PAGE_HEIGHT;
use crate::error::OledError;

/// A monochrome bitmap in the controller's own layout: one byte per
/// 8-pixel vertical strip, bit 0 at the top, strips ordered column by
/// column within each page and pages top to bottom.
///
/// Glyphs and icons stored this way can be copied into the framebuffer
/// without reshuffling bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bitmap<'a> {
    width: u32,
    height: u32,
    data: &'a [u8],
}

impl<'a> Bitmap<'a> {
    /// Wrap `data` as a `width × height` bitmap.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] unless `data` holds exactly
    /// `width * ceil(height / 8)` bytes.
    pub fn new(width: u32, height: u32, data: &'a [u8]) -> Result<Self, OledError> {
        if Self::byte_len(width, height) != Some(data.len()) {
            return Err(OledError::InvalidParameter);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Bytes needed for a `width × height` bitmap, or `None` if that
    /// overflows.
    pub const fn byte_len(width: u32, height: u32) -> Option<usize> {
        match width.checked_mul(height.div_ceil(PAGE_HEIGHT)) {
            Some(len) => Some(len as usize),
            None => None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel at `(x, y)`; `false` outside the bitmap.
    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = (x + (y / PAGE_HEIGHT) * self.width) as usize;
        self.data[index] & (1 << (y % PAGE_HEIGHT)) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            Bitmap::new(5, 8, &[0; 4]),
            Err(OledError::InvalidParameter)
        ));
        assert!(matches!(
            Bitmap::new(3, 9, &[0; 3]),
            Err(OledError::InvalidParameter)
        ));
        assert!(Bitmap::new(3, 9, &[0; 6]).is_ok());
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(Bitmap::byte_len(u32::MAX, 16), None);
        assert!(matches!(
            Bitmap::new(u32::MAX, 16, &[]),
            Err(OledError::InvalidParameter)
        ));
        // 2^31 × 2 pages wraps to zero in 32 bits.
        assert!(matches!(
            Bitmap::new(1 << 31, 16, &[]),
            Err(OledError::InvalidParameter)
        ));
    }

    #[test]
    fn reads_column_major_strips() {
        // 2 × 10: column 0 top pixel, column 1 pixel at y = 9.
        let data = [0x01, 0x00, 0x00, 0x02];
        let bmp = Bitmap::new(2, 10, &data).unwrap();
        assert!(bmp.pixel(0, 0));
        assert!(!bmp.pixel(1, 0));
        assert!(bmp.pixel(1, 9));
        assert!(!bmp.pixel(0, 9));
        assert!(!bmp.pixel(2, 0));
        assert!(!bmp.pixel(0, 10));
    }
}
