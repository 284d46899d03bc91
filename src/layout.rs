//! Text screen layout and rendering.
//!
//! This module defines the immutable [`ScreenState`] snapshot of a status
//! screen (up to six short text lines), the [`ScreenChanges`] diff, and the
//! [`render_lines`] function that draws a snapshot into a [`Framebuffer`].

use core::fmt::{self, Write};

use heapless::String;

use crate::error::OledError;
use crate::font::Font;
use crate::framebuffer::Framebuffer;

/// Number of text lines on a screen.
pub const MAX_LINES: usize = 6;

/// Usable characters per line: 21 glyphs of the 5×7 font fill 126 of
/// 128 columns.
pub const MAX_LINE_CHARS: usize = 21;

const LINE_BUFFER: usize = MAX_LINE_CHARS + 1;

/// Separator between lines in [`ScreenState::joined`].
pub const LINE_SEPARATOR: &str = " | ";

/// Capacity of [`ScreenState::joined`]: every line full, plus separators.
pub const JOINED_CAPACITY: usize = MAX_LINES * MAX_LINE_CHARS + (MAX_LINES - 1) * LINE_SEPARATOR.len();

// ── LayoutConfig ─────────────────────────────────────────────────────────

/// Geometry of the text screen and the refresh rate of the update task.
///
/// [`LayoutConfig::default()`] puts line `i` at `y = 10 * i`, flush
/// left, refreshed at 30 Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LayoutConfig {
    /// Display refresh rate in Hz. Default: 30. Max: 60.
    pub update_frequency_hz: u32,
    /// Vertical distance between the tops of consecutive lines. Default: 10.
    pub line_pitch: u32,
    /// X coordinate of the first glyph on every line. Default: 0.
    pub left_margin: i32,
    /// Y coordinate of the first line. Default: 0.
    pub top_margin: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            update_frequency_hz: 30,
            line_pitch: 10,
            left_margin: 0,
            top_margin: 0,
        }
    }
}

impl LayoutConfig {
    /// Convert the configured frequency to a timer period in milliseconds.
    ///
    /// Formula: `1000 / update_frequency_hz`, with a floor of 1 Hz.
    pub fn update_period_ms(&self) -> u64 {
        1000 / self.update_frequency_hz.max(1) as u64
    }

    /// Y coordinate of the top of line `index`.
    pub fn line_y(&self, index: usize) -> i32 {
        self.top_margin + (index as u32 * self.line_pitch) as i32
    }
}

// ── ScreenState ──────────────────────────────────────────────────────────

/// Immutable snapshot of everything the text screen shows.
///
/// Fixed-size arrays avoid heap allocation. Lines are stored as
/// null-padded UTF-8 byte buffers holding at most [`MAX_LINE_CHARS`]
/// bytes (the last byte is always `\0`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScreenState {
    pub lines: [[u8; LINE_BUFFER]; MAX_LINES],
}

impl ScreenState {
    /// A blank screen; usable in `static` initialisers.
    pub const fn new() -> Self {
        Self {
            lines: [[0; LINE_BUFFER]; MAX_LINES],
        }
    }

    /// Build a screen from `lines`.
    ///
    /// Lines beyond [`MAX_LINES`] are dropped and each line is silently
    /// truncated to [`MAX_LINE_CHARS`] bytes, at a character boundary.
    pub fn from_lines(lines: &[&str]) -> Self {
        let mut state = Self::default();
        for (slot, text) in state.lines.iter_mut().zip(lines) {
            copy_truncated(slot, text);
        }
        state
    }

    /// Replace line `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] if `index >= MAX_LINES`.
    pub fn set_line(&mut self, index: usize, text: &str) -> Result<(), OledError> {
        let slot = self
            .lines
            .get_mut(index)
            .ok_or(OledError::InvalidParameter)?;
        *slot = [0; LINE_BUFFER];
        copy_truncated(slot, text);
        Ok(())
    }

    /// Replace line `index` with formatted text, e.g.
    /// `state.format_line(1, format_args!("Dist: {} cm", d))`.
    ///
    /// Output that does not fit is truncated.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::InvalidParameter`] if `index >= MAX_LINES`.
    pub fn format_line(&mut self, index: usize, args: fmt::Arguments<'_>) -> Result<(), OledError> {
        let mut buf: String<64> = String::new();
        // Overflow leaves the prefix that fit, which is truncated below.
        let _ = buf.write_fmt(args);
        self.set_line(index, &buf)
    }

    /// Text of line `index`; `""` for blank or out-of-range lines.
    pub fn line(&self, index: usize) -> &str {
        self.lines
            .get(index)
            .map_or("", |bytes| Self::bytes_to_str(bytes))
    }

    /// All lines up to the last non-blank one, joined with
    /// [`LINE_SEPARATOR`], for logging the screen as a single line.
    pub fn joined(&self) -> String<JOINED_CAPACITY> {
        let count = (0..MAX_LINES)
            .rposition(|i| !self.line(i).is_empty())
            .map_or(0, |last| last + 1);

        let mut out = String::new();
        for i in 0..count {
            if i > 0 {
                // Capacity covers six full lines and their separators.
                let _ = out.push_str(LINE_SEPARATOR);
            }
            let _ = out.push_str(self.line(i));
        }
        out
    }

    /// Convert a fixed-size null-padded byte array back to a `&str`.
    ///
    /// Stops at the first null byte. Returns `""` if the first byte is
    /// null or the slice is not valid UTF-8.
    pub fn bytes_to_str(bytes: &[u8]) -> &str {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        core::str::from_utf8(&bytes[..end]).unwrap_or("")
    }
}

fn copy_truncated(slot: &mut [u8; LINE_BUFFER], text: &str) {
    let mut len = text.len().min(MAX_LINE_CHARS);
    while !text.is_char_boundary(len) {
        len -= 1;
    }
    slot[..len].copy_from_slice(&text.as_bytes()[..len]);
}

// ── ScreenChanges ────────────────────────────────────────────────────────

/// Identifies which lines changed between two [`ScreenState`] snapshots.
pub struct ScreenChanges {
    /// Per-line flag: `true` if the text differs.
    pub line_changed: [bool; MAX_LINES],
}

impl ScreenChanges {
    /// Diff two states line by line.
    pub fn detect(old: &ScreenState, new: &ScreenState) -> Self {
        let mut line_changed = [false; MAX_LINES];
        for (i, changed) in line_changed.iter_mut().enumerate() {
            *changed = old.lines[i] != new.lines[i];
        }
        Self { line_changed }
    }

    /// Returns `true` if any line changed.
    pub fn any_changed(&self) -> bool {
        self.line_changed.iter().any(|&c| c)
    }
}

/// Semantic wrapper around `old != new`.
pub fn screen_state_changed(old: &ScreenState, new: &ScreenState) -> bool {
    old != new
}

// ── Rendering ────────────────────────────────────────────────────────────

/// Draw every non-blank line of `state` into `frame`.
///
/// The frame is not cleared first. Lines falling below the panel are
/// clipped away.
///
/// # Layout
///
/// ```text
/// ┌──────────────────────────────┐
/// │ line 0                       │  ← top_margin
/// │ line 1                       │  ← top_margin + line_pitch
/// │ ...                          │
/// │ line 5                       │  ← top_margin + 5 * line_pitch
/// └──────────────────────────────┘
/// ```
pub fn render_lines<F>(frame: &mut Framebuffer, state: &ScreenState, config: &LayoutConfig, font: &F)
where
    F: Font + ?Sized,
{
    for i in 0..MAX_LINES {
        let text = state.line(i);
        if !text.is_empty() {
            frame.draw_text(config.left_margin, config.line_y(i), text, font);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FONT_5X7;

    #[test]
    fn default_screen_state_is_empty() {
        let state = ScreenState::default();
        for i in 0..MAX_LINES {
            assert_eq!(state.line(i), "");
        }
    }

    #[test]
    fn from_lines_copies_strings() {
        let state = ScreenState::from_lines(&["Rotary", "Count: 3"]);
        assert_eq!(state.line(0), "Rotary");
        assert_eq!(state.line(1), "Count: 3");
        assert_eq!(state.line(2), "");
        assert_eq!(state.line(MAX_LINES), "");
    }

    #[test]
    fn from_lines_drops_extra_lines() {
        let state = ScreenState::from_lines(&["1", "2", "3", "4", "5", "6", "7"]);
        assert_eq!(state.line(5), "6");
        assert_eq!(state, ScreenState::from_lines(&["1", "2", "3", "4", "5", "6"]));
    }

    #[test]
    fn from_lines_truncates_long_strings() {
        let state = ScreenState::from_lines(&["ABCDEFGHIJKLMNOPQRSTUVWXYZ"]);
        assert_eq!(state.line(0), "ABCDEFGHIJKLMNOPQRSTU");
        assert_eq!(state.lines[0][MAX_LINE_CHARS], 0);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // 20 ASCII bytes followed by a two-byte character.
        let state = ScreenState::from_lines(&["ABCDEFGHIJKLMNOPQRSTé"]);
        assert_eq!(state.line(0), "ABCDEFGHIJKLMNOPQRST");
    }

    #[test]
    fn set_and_format_line() {
        let mut state = ScreenState::from_lines(&["old text here"]);
        state.set_line(0, "new").unwrap();
        assert_eq!(state.line(0), "new");

        state.format_line(2, format_args!("Dist: {} cm", 42)).unwrap();
        assert_eq!(state.line(2), "Dist: 42 cm");

        assert!(matches!(
            state.set_line(MAX_LINES, "x"),
            Err(OledError::InvalidParameter)
        ));
    }

    #[test]
    fn joined_uses_separator_and_drops_trailing_blanks() {
        let state = ScreenState::from_lines(&["Rotary", "", "Count: 3", ""]);
        assert_eq!(state.joined().as_str(), "Rotary |  | Count: 3");
        assert_eq!(ScreenState::default().joined().as_str(), "");
    }

    #[test]
    fn joined_fits_a_full_screen() {
        let full = "ABCDEFGHIJKLMNOPQRSTU";
        let state = ScreenState::from_lines(&[full; MAX_LINES]);
        let joined = state.joined();
        assert_eq!(joined.len(), JOINED_CAPACITY);
        assert!(joined.starts_with(full) && joined.ends_with(full));
    }

    #[test]
    fn bytes_to_str_handles_null_padding() {
        let mut buf = [0u8; LINE_BUFFER];
        buf[0] = b'H';
        buf[1] = b'i';
        assert_eq!(ScreenState::bytes_to_str(&buf), "Hi");
        assert_eq!(ScreenState::bytes_to_str(&[0u8; LINE_BUFFER]), "");
    }

    #[test]
    fn screen_changes_per_line() {
        let a = ScreenState::from_lines(&["A", "B", "C"]);
        let b = ScreenState::from_lines(&["A", "X", "C"]);
        let changes = ScreenChanges::detect(&a, &b);
        assert_eq!(changes.line_changed, [false, true, false, false, false, false]);
        assert!(changes.any_changed());
        assert!(screen_state_changed(&a, &b));

        assert!(!ScreenChanges::detect(&a, &a).any_changed());
        assert!(!screen_state_changed(&a, &a));
    }

    #[test]
    fn default_config_values() {
        let c = LayoutConfig::default();
        assert_eq!(c.update_frequency_hz, 30);
        assert_eq!(c.line_pitch, 10);
        assert_eq!(c.left_margin, 0);
        assert_eq!(c.line_y(5), 50);
    }

    #[test]
    fn update_period() {
        assert_eq!(LayoutConfig::default().update_period_ms(), 33);
        let c = LayoutConfig {
            update_frequency_hz: 0,
            ..LayoutConfig::default()
        };
        assert_eq!(c.update_period_ms(), 1000);
    }

    #[test]
    fn render_places_lines_at_pitch() {
        let mut fb = Framebuffer::new(128, 64, false).unwrap();
        let state = ScreenState::from_lines(&["I", "", "I"]);
        render_lines(&mut fb, &state, &LayoutConfig::default(), &FONT_5X7);

        // 'I' is 0x00 0x41 0x7F 0x41 0x00: column 2 lit for rows 0..=6.
        for y in 0..7 {
            assert!(fb.get_pixel(2, y).unwrap());
            assert!(!fb.get_pixel(2, 10 + y).unwrap());
            assert!(fb.get_pixel(2, 20 + y).unwrap());
        }
        assert!(!fb.get_pixel(0, 0).unwrap());
    }

    #[test]
    fn render_clips_below_panel() {
        let mut fb = Framebuffer::new(128, 32, false).unwrap();
        let state = ScreenState::from_lines(&["", "", "", "", "", "I"]);
        render_lines(&mut fb, &state, &LayoutConfig::default(), &FONT_5X7);
        assert!(fb.dirty_region().is_empty());
    }
}
