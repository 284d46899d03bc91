//! Buffered SSD1306 driver.
//!
//! [`OledDriver`] owns the transport, the [`Framebuffer`] and the
//! [`ControllerState`] mirror. Drawing calls only touch the buffer;
//! [`flush()`](OledDriver::flush) sends the dirty part of it, and the
//! configuration calls (contrast, power, flip, ...) write their command
//! immediately.

use crate::addressing::{ControllerState, FlushWindow};
use crate::bitmap::Bitmap;
use crate::command::{
    encode_display_on, encode_flip, encode_init, encode_invert, encode_set_addressing_mode,
    encode_set_contrast, encode_start_scroll, encode_stop_scroll, ScrollDirection, ScrollInterval,
};
use crate::config::{AddressingMode, DisplayConfig};
use crate::error::OledError;
use crate::font::{Font, FONT_5X7};
use crate::framebuffer::Framebuffer;
use crate::layout::{render_lines, LayoutConfig, ScreenState};
use crate::region::Rect;
use crate::transport::{send_commands, Transport};

/// Lifecycle of an [`OledDriver`].
///
/// ```text
/// Uninitialized ──init()──▶ Initializing ──ok──▶ Ready ◀──set_power(true)──┐
///                                  │               │                       │
///                                  └──error──▶ Faulted   set_power(false)──▶ PoweredOff
/// ```
///
/// `init()` may be called again from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    Uninitialized,
    Initializing,
    Ready,
    PoweredOff,
    Faulted,
}

/// Driver for an SSD1306 OLED panel over any [`Transport`].
///
/// # Lifecycle
///
/// 1. [`OledDriver::new()`] — validates the geometry; no bus traffic.
/// 2. [`OledDriver::init()`] — sends the power-on command sequence.
/// 3. Draw into the frame buffer ([`set_pixel`](Self::set_pixel),
///    [`draw_text`](Self::draw_text), or `embedded-graphics` through
///    [`display_mut()`](Self::display_mut)).
/// 4. [`OledDriver::flush()`] — transfers the dirty region to the panel.
///
/// # Example
///
/// ```no_run
/// use oled_display_rs::{i2c_transport, DisplayConfig, OledDriver, FONT_5X7};
///
/// # fn example(i2c: impl embedded_hal::i2c::I2c) -> Result<(), oled_display_rs::OledError> {
/// let mut oled = OledDriver::new(i2c_transport(i2c, 0x3C), DisplayConfig::default())?;
/// oled.init()?;
/// oled.clear()?;
/// oled.draw_text(0, 0, "Distance: 42 cm", &FONT_5X7)?;
/// oled.flush()?;
/// # Ok(())
/// # }
/// ```
pub struct OledDriver<T> {
    transport: T,
    config: DisplayConfig,
    framebuffer: Framebuffer,
    controller: ControllerState,
    state: DriverState,
}

impl<T> OledDriver<T>
where
    T: Transport,
{
    /// Construct an uninitialised driver.
    ///
    /// No bus traffic is generated. You **must** call [`init()`](Self::init)
    /// before any drawing or display operations.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] if `config` describes a
    /// panel the controller cannot drive.
    pub fn new(transport: T, config: DisplayConfig) -> Result<Self, OledError> {
        config.validate()?;
        let framebuffer = Framebuffer::new(config.width, config.height, config.inverted)?;

        Ok(Self {
            transport,
            config,
            framebuffer,
            controller: ControllerState::default(),
            state: DriverState::Uninitialized,
        })
    }

    /// Send the power-on command sequence.
    ///
    /// On success the whole frame buffer is marked dirty, since the
    /// panel's RAM content is undefined after power-on.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::Transport`] if any command fails. The driver is
    /// then [`Faulted`](DriverState::Faulted) and only `init()` is accepted;
    /// none of the sequence may be assumed to have taken effect.
    pub fn init(&mut self) -> Result<(), OledError> {
        self.state = DriverState::Initializing;

        if let Err(e) = send_commands(&mut self.transport, &encode_init(&self.config)) {
            self.state = DriverState::Faulted;
            #[cfg(feature = "defmt")]
            defmt::error!("OLED init failed, driver faulted");
            return Err(e.into());
        }

        self.controller = ControllerState::after_init(&self.config);
        self.framebuffer.mark_all_dirty();
        self.state = DriverState::Ready;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "OLED initialised: {}x{}, {}",
            self.config.width,
            self.config.height,
            self.config.addressing_mode
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // State
    // -----------------------------------------------------------------------

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// `true` once initialised and not faulted (the panel may be off).
    pub fn is_ready(&self) -> bool {
        matches!(self.state, DriverState::Ready | DriverState::PoweredOff)
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// The driver's copy of the controller registers.
    pub fn controller_state(&self) -> &ControllerState {
        &self.controller
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Region that the next [`flush()`](Self::flush) will send, if any.
    pub fn dirty_region(&self) -> Option<Rect> {
        self.framebuffer.dirty_region().bounds()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Returns a mutable reference to the frame buffer, allowing direct
    /// use of `embedded-graphics` [`DrawTarget`] APIs.
    ///
    /// Returns `None` if the driver has not been initialised.
    ///
    /// [`DrawTarget`]: embedded_graphics::draw_target::DrawTarget
    pub fn display_mut(&mut self) -> Option<&mut Framebuffer> {
        if self.is_ready() {
            Some(&mut self.framebuffer)
        } else {
            None
        }
    }

    /// Give back the transport.
    pub fn release(self) -> T {
        self.transport
    }

    fn ensure_ready(&self) -> Result<(), OledError> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(OledError::NotReady)
        }
    }

    fn drawable(&mut self) -> Result<&mut Framebuffer, OledError> {
        self.ensure_ready()?;
        Ok(&mut self.framebuffer)
    }

    // -----------------------------------------------------------------------
    // Drawing (buffer only, no bus traffic)
    // -----------------------------------------------------------------------

    /// Clear the frame buffer to the configured clear value.
    pub fn clear(&mut self) -> Result<(), OledError> {
        self.drawable()?.clear();
        Ok(())
    }

    pub fn fill(&mut self, on: bool) -> Result<(), OledError> {
        self.drawable()?.fill(on);
        Ok(())
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.set_pixel(x, y, on)
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Result<bool, OledError> {
        self.ensure_ready()?;
        self.framebuffer.get_pixel(x, y)
    }

    /// Copy `bitmap` to `(x, y)`, clipping at the panel edges.
    pub fn blit(&mut self, bitmap: &Bitmap<'_>, x: i32, y: i32) -> Result<(), OledError> {
        self.drawable()?.blit(bitmap, x, y);
        Ok(())
    }

    /// Render `text` at `(x, y)`; returns the cursor after the last glyph.
    pub fn draw_text<F>(&mut self, x: i32, y: i32, text: &str, font: &F) -> Result<i32, OledError>
    where
        F: Font + ?Sized,
    {
        Ok(self.drawable()?.draw_text(x, y, text, font))
    }

    pub fn draw_line(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.draw_line(x0, y0, x1, y1, on)
    }

    pub fn draw_hline(&mut self, x: u32, y: u32, length: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.draw_hline(x, y, length, on)
    }

    pub fn draw_vline(&mut self, x: u32, y: u32, length: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.draw_vline(x, y, length, on)
    }

    pub fn draw_rect(&mut self, x: u32, y: u32, width: u32, height: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.draw_rect(x, y, width, height, on)
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.fill_rect(x, y, width, height, on)
    }

    pub fn draw_circle(&mut self, cx: u32, cy: u32, radius: u32, on: bool) -> Result<(), OledError> {
        self.drawable()?.draw_circle(cx, cy, radius, on)
    }

    // -----------------------------------------------------------------------
    // Flush
    // -----------------------------------------------------------------------

    /// Send the dirty part of the frame buffer to the panel.
    ///
    /// Does nothing if nothing changed since the last successful flush.
    ///
    /// # Errors
    ///
    /// * [`OledError::NotReady`] before initialisation, after a fault, or
    ///   while a hardware scroll is running (display RAM must not be
    ///   written during a scroll).
    /// * [`OledError::Transport`] on a bus failure. The dirty region is
    ///   kept, so calling `flush()` again resends the same data.
    pub fn flush(&mut self) -> Result<(), OledError> {
        self.ensure_ready()?;
        if self.controller.scrolling {
            return Err(OledError::NotReady);
        }
        let Some(dirty) = self.framebuffer.dirty_region().bounds() else {
            return Ok(());
        };

        let window = FlushWindow::covering(&dirty);
        if let Err(e) = self.controller.write_window(
            &mut self.transport,
            &self.framebuffer,
            &window,
            self.config.column_offset,
        ) {
            #[cfg(feature = "defmt")]
            defmt::warn!("OLED flush of {} failed, region kept dirty", window);
            return Err(e.into());
        }

        self.framebuffer.mark_clean();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Immediate configuration
    // -----------------------------------------------------------------------

    /// Set the contrast (brightness) level.
    pub fn set_contrast(&mut self, level: u8) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &[encode_set_contrast(level)])?;
        self.controller.contrast = level;
        Ok(())
    }

    /// Turn the panel on or put it to sleep. Display RAM is retained while
    /// the panel is off, so drawing and flushing keep working.
    pub fn set_power(&mut self, on: bool) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &[encode_display_on(on)])?;
        self.controller.display_on = on;
        self.state = if on {
            DriverState::Ready
        } else {
            DriverState::PoweredOff
        };
        Ok(())
    }

    /// Mirror the image horizontally and/or vertically, relative to the
    /// normal orientation.
    ///
    /// The segment remap only affects data written afterwards, so changing
    /// the horizontal flip marks the whole frame dirty.
    pub fn set_flip(&mut self, horizontal: bool, vertical: bool) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &encode_flip(horizontal, vertical))?;
        if self.controller.flip_horizontal != horizontal {
            self.framebuffer.mark_all_dirty();
        }
        self.controller.flip_horizontal = horizontal;
        self.controller.flip_vertical = vertical;
        Ok(())
    }

    /// Hardware colour inversion; the frame buffer is untouched.
    pub fn set_display_inverted(&mut self, inverted: bool) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &[encode_invert(inverted)])?;
        self.controller.display_inverted = inverted;
        Ok(())
    }

    /// Switch the controller's addressing mode. Subsequent flushes follow
    /// the new mode.
    pub fn set_addressing_mode(&mut self, mode: AddressingMode) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &[encode_set_addressing_mode(mode)])?;
        self.controller.addressing_mode = mode;
        Ok(())
    }

    /// Continuously scroll pages `start_page..=end_page` horizontally.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] unless
    /// `start_page <= end_page < pages`.
    pub fn start_scroll(
        &mut self,
        direction: ScrollDirection,
        start_page: u8,
        end_page: u8,
        interval: ScrollInterval,
    ) -> Result<(), OledError> {
        self.ensure_ready()?;
        if start_page > end_page || end_page as u32 >= self.config.pages() {
            return Err(OledError::InvalidParameter);
        }
        // The deactivate command is first in the sequence; if anything
        // fails the scroll state is unknown, so assume it may be running.
        let result = send_commands(
            &mut self.transport,
            &encode_start_scroll(direction, start_page, end_page, interval),
        );
        self.controller.scrolling = true;
        result?;
        Ok(())
    }

    /// Stop any hardware scroll. The scrolled RAM no longer matches the
    /// frame buffer, so the whole frame is marked dirty.
    pub fn stop_scroll(&mut self) -> Result<(), OledError> {
        self.ensure_ready()?;
        send_commands(&mut self.transport, &[encode_stop_scroll()])?;
        self.controller.scrolling = false;
        self.framebuffer.mark_all_dirty();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Text screen
    // -----------------------------------------------------------------------

    /// Replace the screen with `lines` (at most six, 21 characters each)
    /// and flush.
    pub fn show_lines(&mut self, lines: &[&str]) -> Result<(), OledError> {
        let state = ScreenState::from_lines(lines);
        self.show_screen(&state, &LayoutConfig::default())
    }

    /// Clear, render `state` with the built-in font, and flush.
    pub fn show_screen(&mut self, state: &ScreenState, layout: &LayoutConfig) -> Result<(), OledError> {
        let frame = self.drawable()?;
        frame.clear();
        render_lines(frame, state, layout, &FONT_5X7);
        self.flush()
    }
}
