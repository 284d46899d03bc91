//! Status lines example
//!
//! Standalone hardware demonstration that exercises [`OledDriver`] directly.
//! Shows a few lines of sensor-style status text with a counter that
//! ticks once a second, and a bar graph underneath that is redrawn with
//! partial flushes in between.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes           |
//! |-----------|------------|-----------------|
//! | I2C0 SDA  | GP20       |                 |
//! | I2C0 SCL  | GP21       |                 |
//! | OLED VCC  | 3V3        |                 |
//! | OLED GND  | GND        |                 |
//!
//! # Screen Layout
//!
//! | Rows    | Content                                  |
//! |---------|------------------------------------------|
//! | 0–29    | Three text lines, 10 px apart            |
//! | 48–57   | Bar outline, 128 × 10                    |
//! | 50–55   | Bar fill, width `value` (0–124)          |

#![no_std]
#![no_main]

use core::fmt::Write;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_time::{Duration, Timer};
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use oled_display_rs::{i2c_transport, DisplayConfig, OledDriver, DEFAULT_I2C_ADDRESS};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

// ---------------------------------------------------------------------------
// Hardware pin assignments — change here for hardware revisions
// I2C bus is used exclusively by the OLED display in this example
// ---------------------------------------------------------------------------
// I2C_SDA → GP20 (p.PIN_20)
// I2C_SCL → GP21 (p.PIN_21)
// ---------------------------------------------------------------------------

const BAR_Y: u32 = 48;
const BAR_MAX: u32 = 124;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Status lines example starting");

    // --- I2C bus (GP20 = SDA, GP21 = SCL) ---
    let mut config = i2c::Config::default();
    config.frequency = 400_000;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, config);

    let mut oled = unwrap!(OledDriver::new(
        i2c_transport(i2c, DEFAULT_I2C_ADDRESS),
        DisplayConfig::default(),
    ));
    unwrap!(oled.init());

    let mut seconds: u32 = 0;
    let mut bar: u32 = 0;

    loop {
        if bar % 30 == 0 {
            let mut uptime: String<24> = String::new();
            let _ = write!(uptime, "Uptime: {} s", seconds);
            if let Err(e) = oled.show_lines(&["OLED demo", "Addr: 0x3C", uptime.as_str()]) {
                warn!("show_lines failed: {}", e);
            }
            seconds += 1;
            // show_lines cleared the screen; the whole bar is redrawn below.
            oled.draw_rect(0, BAR_Y, 128, 10, true).ok();
        }

        // Only the bar rows are dirty here, so the flush covers two pages.
        oled.fill_rect(2, BAR_Y + 2, BAR_MAX, 6, false).ok();
        if bar % BAR_MAX > 0 {
            oled.fill_rect(2, BAR_Y + 2, bar % BAR_MAX, 6, true).ok();
        }
        if let Err(e) = oled.flush() {
            warn!("flush failed: {}", e);
        }

        bar += 1;
        Timer::after(Duration::from_millis(33)).await; // ~30 Hz
    }
}
