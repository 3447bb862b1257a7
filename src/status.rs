//! Board LEDs - run-status blinker and active-low polarity.

use embedded_hal::digital::{ErrorType, OutputPin};

/// Inverts an active-low LED so `set_high` means "lit".
pub struct ActiveLow<P>(P);

impl<P> ActiveLow<P> {
    pub fn new(pin: P) -> Self {
        Self(pin)
    }
}

impl<P: ErrorType> ErrorType for ActiveLow<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for ActiveLow<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }
}

pub struct RunStatus<P> {
    led: P,
    ticks: u32,
}

impl<P: OutputPin> RunStatus<P> {
    pub fn new(led: P) -> Self {
        Self { led, ticks: 0 }
    }

    /// Advance one blink period; the LED is lit on odd ticks.
    pub fn tick(&mut self) -> bool {
        self.ticks = self.ticks.wrapping_add(1);
        let on = self.ticks % 2 == 1;
        // Status blinking is best-effort.
        let _ = if on { self.led.set_high() } else { self.led.set_low() };
        on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::PinState;

    struct Pin<'a>(&'a mut std::vec::Vec<bool>);

    impl ErrorType for Pin<'_> {
        type Error = Infallible;
    }

    impl OutputPin for Pin<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.push(true);
            Ok(())
        }
    }

    #[test]
    fn alternates_starting_lit() {
        let mut levels = std::vec::Vec::new();
        let mut status = RunStatus::new(Pin(&mut levels));
        assert!(status.tick());
        assert!(!status.tick());
        assert!(status.tick());
        drop(status);
        assert_eq!(levels, [true, false, true]);
    }

    #[test]
    fn active_low_inverts() {
        let mut levels = std::vec::Vec::new();
        let mut led = ActiveLow::new(Pin(&mut levels));
        led.set_state(PinState::High).unwrap();
        led.set_low().unwrap();
        drop(led);
        assert_eq!(levels, [false, true]);
    }
}
