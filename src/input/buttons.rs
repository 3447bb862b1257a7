//! GPIO button input with async debouncing.
//!
//! Button 1 on the DK is active-low with an internal pull-up. The task
//! waits for any edge, lets the contacts settle, samples once and reports
//! the settled level to [`ButtonState`].

use embassy_nrf::gpio::{AnyPin, Input, Pull};
use embassy_time::{Duration, Timer};

use super::debounce::DebouncedLevel;
use super::ButtonState;
use crate::config::BUTTON_DEBOUNCE_MS;

/// Run the button edge loop forever.
pub async fn button_task(pin: AnyPin, state: &'static ButtonState) -> ! {
    let mut btn = Input::new(pin, Pull::Up);
    let mut level = DebouncedLevel::new(btn.is_low());

    loop {
        btn.wait_for_any_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;

        let (pressed, changed) = level.settle(btn.is_low());
        state.on_input_edge(pressed, changed);
    }
}
