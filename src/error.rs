//! Error types for the OLED display driver.

use core::fmt;

use display_interface::DisplayError;

/// Errors that can occur during OLED display operations.
///
/// The transport crates wrap all underlying I2C/SPI bus errors into
/// [`DisplayError`], so this enum is non-generic.
#[derive(Debug, Clone)]
pub enum OledError {
    /// A value was outside its declared range (panel geometry, scroll
    /// pages, bitmap length, ...). Nothing was modified.
    InvalidParameter,
    /// A pixel or shape addressed a coordinate beyond the framebuffer
    /// extent. The buffer is left unchanged.
    OutOfBounds,
    /// Display interface error (wraps I2C and other bus-level failures).
    Transport(DisplayError),
    /// An operation was attempted before a successful
    /// [`OledDriver::init()`](crate::OledDriver::init), or after an
    /// initialisation fault.
    NotReady,
}

impl From<DisplayError> for OledError {
    fn from(e: DisplayError) -> Self {
        OledError::Transport(e)
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::InvalidParameter => write!(f, "Invalid parameter"),
            OledError::OutOfBounds => write!(f, "Coordinate out of bounds"),
            OledError::Transport(e) => write!(f, "Transport error: {:?}", e),
            OledError::NotReady => write!(f, "Display not ready"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::InvalidParameter => defmt::write!(f, "Invalid parameter"),
            OledError::OutOfBounds => defmt::write!(f, "Coordinate out of bounds"),
            OledError::Transport(_e) => defmt::write!(f, "Display interface error"),
            OledError::NotReady => defmt::write!(f, "Not ready"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_error_converts_to_transport() {
        let err: OledError = DisplayError::BusWriteError.into();
        assert!(matches!(
            err,
            OledError::Transport(DisplayError::BusWriteError)
        ));
    }

    #[test]
    fn display_messages() {
        assert_eq!(OledError::NotReady.to_string(), "Display not ready");
        assert_eq!(
            OledError::OutOfBounds.to_string(),
            "Coordinate out of bounds"
        );
    }
}
