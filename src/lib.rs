//! Buffered driver for SSD1306-class monochrome OLED panels.
//!
//! This crate provides [`OledDriver`], which keeps a local frame buffer,
//! tracks the region changed since the last transfer, and flushes only
//! that region to the controller over I2C or SPI. Text uses the built-in
//! [`FONT_5X7`]; the [`Framebuffer`] is also an `embedded-graphics`
//! draw target.
//!
//! # Quick Start
//!
//! ```ignore
//! use oled_display_rs::{i2c_transport, DisplayConfig, OledDriver, DEFAULT_I2C_ADDRESS};
//!
//! let mut oled = OledDriver::new(
//!     i2c_transport(i2c, DEFAULT_I2C_ADDRESS),
//!     DisplayConfig::default(),
//! )?;
//! oled.init()?;
//! oled.show_lines(&["Rotary encoder", "Count: 12"])?;
//!
//! // Or draw freely and flush the changed part:
//! oled.draw_rect(0, 30, 128, 10, true)?;
//! oled.fill_rect(2, 32, 60, 6, true)?;
//! oled.flush()?;
//! ```
//!
//! With the `task` feature, [`display_update_task`] runs the driver from
//! an Embassy task and redraws whenever a shared [`ScreenState`] changes.
//!
//! # Crate Features
//!
//! - **`defmt`** — structured logging via [`defmt`].
//! - **`task`** — the Embassy periodic update task.
//!
//! [`defmt`]: https://docs.rs/defmt

#![cfg_attr(not(test), no_std)]

pub mod addressing;
pub mod bitmap;
pub mod command;
pub mod config;
#[cfg(feature = "task")]
pub mod display_task;
pub mod driver;
pub mod error;
pub mod font;
pub mod framebuffer;
pub mod layout;
pub mod primitives;
pub mod region;
pub mod transport;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use addressing::{ControllerState, FlushWindow};
pub use bitmap::Bitmap;
pub use command::{Command, ScrollDirection, ScrollInterval};
pub use config::{AddressingMode, DisplayConfig, Orientation};
#[cfg(feature = "task")]
pub use display_task::{display_update_task, publish_lines, SharedScreen};
pub use driver::{DriverState, OledDriver};
pub use error::OledError;
pub use font::{Font, MonoFont, FONT_5X7};
pub use framebuffer::Framebuffer;
pub use layout::{render_lines, screen_state_changed, LayoutConfig, ScreenChanges, ScreenState};
pub use primitives::SetPixel;
pub use region::{DirtyRegion, Rect};
pub use transport::{i2c_transport, spi_transport, Transport, DEFAULT_I2C_ADDRESS};
