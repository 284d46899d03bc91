//! Periodic display update task.
//!
//! [`display_update_task`] owns an [`OledDriver`], periodically reads a
//! shared [`ScreenState`] and flushes changed frames to the panel. Other
//! tasks update the screen through [`publish_lines`] or by locking the
//! mutex directly.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Timer};

use crate::driver::OledDriver;
use crate::error::OledError;
use crate::layout::{screen_state_changed, LayoutConfig, ScreenState};
use crate::transport::Transport;

/// Shared screen contents, read by [`display_update_task`].
pub type SharedScreen = Mutex<CriticalSectionRawMutex, ScreenState>;

// ── Display update task ──────────────────────────────────────────────────

/// Periodic display update loop.
///
/// This is a regular `async fn` — **not** an Embassy `#[task]`. Callers
/// should create a thin, concrete task wrapper that calls this function,
/// since Embassy tasks cannot be generic:
///
/// ```ignore
/// static SCREEN: SharedScreen = Mutex::new(ScreenState::new());
///
/// #[embassy_executor::task]
/// async fn oled_task(driver: OledDriver<MyConcreteInterface>) {
///     display_update_task(driver, &SCREEN, LayoutConfig::default()).await;
/// }
/// ```
///
/// # Control flow
///
/// 1. Initialise the display hardware.
/// 2. Loop at `config.update_frequency_hz`:
///    - **Step 1** — Lock `screen`, copy the snapshot, release the mutex.
///    - **Step 2** — Skip if the snapshot matches the last frame shown.
///    - **Step 3** — Clear, render and flush (no mutex held).
///
/// Driver calls are synchronous; the task only yields at the timer and
/// while waiting for the mutex.
///
/// # Errors
///
/// * Initialisation failure: logs the error and keeps running without the
///   panel. Each changed screen is then logged as one line, its lines
///   joined with `" | "`, so status output stays visible over the
///   `defmt` channel.
/// * Flush failure: logs the error and retries on the next cycle. The
///   frame is not recorded as shown, and the driver keeps its dirty
///   region.
pub async fn display_update_task<T>(
    mut driver: OledDriver<T>,
    screen: &'static SharedScreen,
    config: LayoutConfig,
) where
    T: Transport,
{
    // ── Initialisation ───────────────────────────────────────────────
    if let Err(_e) = driver.init() {
        #[cfg(feature = "defmt")]
        defmt::warn!("OLED init failed: {}, logging screen updates instead", _e);
    }

    let period = Duration::from_millis(config.update_period_ms());
    let mut last_state: Option<ScreenState> = None;

    // ── Main loop ────────────────────────────────────────────────────
    loop {
        Timer::after(period).await;

        // ── Step 1: snapshot (mutex held briefly) ────────────────────
        let snapshot = *screen.lock().await;

        // ── Step 2: skip if nothing changed ──────────────────────────
        if let Some(last) = &last_state {
            if !screen_state_changed(last, &snapshot) {
                continue;
            }
        }

        // ── Step 3: render and flush, or log ─────────────────────────
        if let Err(_e) = present(&mut driver, &snapshot, &config) {
            #[cfg(feature = "defmt")]
            defmt::warn!("OLED update failed: {}", _e);
            continue;
        }

        last_state = Some(snapshot);
    }
}

/// Show `state` on the panel, or log it when the driver never came up.
fn present<T>(
    driver: &mut OledDriver<T>,
    state: &ScreenState,
    config: &LayoutConfig,
) -> Result<(), OledError>
where
    T: Transport,
{
    if driver.is_ready() {
        return driver.show_screen(state, config);
    }

    #[cfg(feature = "defmt")]
    defmt::info!("display: {}", state.joined().as_str());
    Ok(())
}

/// Replace the shared screen contents with `lines`.
///
/// The update task picks the change up on its next cycle.
pub async fn publish_lines(screen: &SharedScreen, lines: &[&str]) {
    *screen.lock().await = ScreenState::from_lines(lines);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DisplayConfig;
    use crate::transport::mock::RecordingInterface;

    #[test]
    fn present_draws_when_ready() {
        let mut driver = OledDriver::new(RecordingInterface::new(), DisplayConfig::default()).unwrap();
        driver.init().unwrap();
        let state = ScreenState::from_lines(&["Ready"]);
        present(&mut driver, &state, &LayoutConfig::default()).unwrap();
        assert_eq!(driver.dirty_region(), None);
        assert!(driver.get_pixel(0, 0).unwrap());
    }

    #[test]
    fn present_falls_back_to_log_after_failed_init() {
        let mut di = RecordingInterface::new();
        di.fail_command_at = Some(0);
        let mut driver = OledDriver::new(di, DisplayConfig::default()).unwrap();
        assert!(driver.init().is_err());

        let state = ScreenState::from_lines(&["Rotary", "Count: 3"]);
        present(&mut driver, &state, &LayoutConfig::default()).unwrap();

        let di = driver.release();
        assert!(di.events.is_empty());
    }
}
