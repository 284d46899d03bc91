//! Panel geometry and power-on configuration.

use crate::error::OledError;

/// Widest panel the controller can drive, in pixels (columns).
pub const MAX_WIDTH: u32 = 128;

/// Tallest panel the controller can drive, in pixels (COM lines).
pub const MAX_HEIGHT: u32 = 64;

/// Smallest supported panel height: one page.
pub const MIN_HEIGHT: u32 = PAGE_HEIGHT;

/// Pixels per controller page (one byte of display RAM, vertically).
pub const PAGE_HEIGHT: u32 = 8;

/// Largest framebuffer in bytes (`MAX_WIDTH * MAX_HEIGHT / 8`).
pub const MAX_BUFFER_SIZE: usize = (MAX_WIDTH * MAX_HEIGHT / PAGE_HEIGHT) as usize;

/// Physical panel orientation applied at initialisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Orientation {
    /// Column 0 on the left, row 0 at the top.
    #[default]
    Normal,
    /// Rotated 180°: both axes mirrored.
    Flipped,
}

impl Orientation {
    /// `(flip_horizontal, flip_vertical)` flags this orientation maps to.
    pub fn flip_flags(self) -> (bool, bool) {
        match self {
            Orientation::Normal => (false, false),
            Orientation::Flipped => (true, true),
        }
    }
}

/// How the controller's write pointer advances after each data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    /// Column advances; at the end of the column window it wraps to the
    /// next page.
    #[default]
    Horizontal,
    /// Page advances; at the end of the page window it wraps to the next
    /// column.
    Vertical,
    /// Column advances within the current page only. Each page must be
    /// selected explicitly.
    Page,
}

/// Configuration for one OLED panel.
///
/// [`DisplayConfig::default()`] describes the common 128×64 I2C module
/// with internal charge pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// Panel width in pixels. Default: 128.
    pub width: u32,
    /// Panel height in pixels. Default: 64.
    pub height: u32,
    /// Orientation sent during initialisation. Default: `Normal`.
    pub orientation: Orientation,
    /// Addressing mode sent during initialisation. Default: `Horizontal`.
    pub addressing_mode: AddressingMode,
    /// When `true`, cleared pixels read as lit (`clear()` fills with
    /// `0xFF`). Default: `false`.
    pub inverted: bool,
    /// Contrast level sent during initialisation. Default: `0xFF`.
    pub contrast: u8,
    /// Panel supplies its own VCC, so the internal charge pump stays off.
    /// Default: `false`.
    pub external_vcc: bool,
    /// Controller column that logical column 0 is wired to. 64-pixel-wide
    /// modules usually sit at column 32. Default: 0.
    pub column_offset: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            orientation: Orientation::Normal,
            addressing_mode: AddressingMode::Horizontal,
            inverted: false,
            contrast: 0xFF,
            external_vcc: false,
            column_offset: 0,
        }
    }
}

impl DisplayConfig {
    /// Configuration for a panel of the given size, everything else default.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Number of 8-pixel pages: `ceil(height / 8)`.
    pub fn pages(&self) -> u32 {
        self.height.div_ceil(PAGE_HEIGHT)
    }

    /// Framebuffer size in bytes: `width * ceil(height / 8)`.
    pub fn buffer_size(&self) -> usize {
        (self.width * self.pages()) as usize
    }

    /// Check the geometry against what the controller can address.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] if the width is not in
    /// `1..=128`, the height is not in `8..=64`, or the column offset
    /// pushes the panel past controller column 127.
    pub fn validate(&self) -> Result<(), OledError> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(OledError::InvalidParameter);
        }
        if self.height < MIN_HEIGHT || self.height > MAX_HEIGHT {
            return Err(OledError::InvalidParameter);
        }
        if self.width + self.column_offset as u32 > MAX_WIDTH {
            return Err(OledError::InvalidParameter);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let c = DisplayConfig::default();
        assert_eq!(c.width, 128);
        assert_eq!(c.height, 64);
        assert_eq!(c.orientation, Orientation::Normal);
        assert_eq!(c.addressing_mode, AddressingMode::Horizontal);
        assert!(!c.inverted);
        assert_eq!(c.contrast, 0xFF);
        assert!(!c.external_vcc);
        assert_eq!(c.column_offset, 0);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn buffer_size_rounds_pages_up() {
        assert_eq!(DisplayConfig::with_size(128, 64).buffer_size(), 1024);
        assert_eq!(DisplayConfig::with_size(128, 32).buffer_size(), 512);
        assert_eq!(DisplayConfig::with_size(72, 40).buffer_size(), 360);
        assert_eq!(DisplayConfig::with_size(10, 12).pages(), 2);
        assert_eq!(MAX_BUFFER_SIZE, 1024);
    }

    #[test]
    fn rejects_oversized_and_empty_panels() {
        assert!(matches!(
            DisplayConfig::with_size(0, 64).validate(),
            Err(OledError::InvalidParameter)
        ));
        assert!(matches!(
            DisplayConfig::with_size(129, 64).validate(),
            Err(OledError::InvalidParameter)
        ));
        assert!(matches!(
            DisplayConfig::with_size(128, 65).validate(),
            Err(OledError::InvalidParameter)
        ));
        assert!(matches!(
            DisplayConfig::with_size(128, 4).validate(),
            Err(OledError::InvalidParameter)
        ));
    }

    #[test]
    fn column_offset_must_fit_controller() {
        let ok = DisplayConfig {
            column_offset: 32,
            ..DisplayConfig::with_size(64, 48)
        };
        assert!(ok.validate().is_ok());

        let too_far = DisplayConfig {
            column_offset: 1,
            ..DisplayConfig::default()
        };
        assert!(matches!(
            too_far.validate(),
            Err(OledError::InvalidParameter)
        ));
    }

    #[test]
    fn orientation_flags() {
        assert_eq!(Orientation::Normal.flip_flags(), (false, false));
        assert_eq!(Orientation::Flipped.flip_flags(), (true, true));
    }
}
