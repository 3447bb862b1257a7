//! Hobby-servo driver on the nRF52840 PWM peripheral.

use embassy_nrf::pwm::{Instance, Prescaler, SimplePwm};

use super::program::{check_pulse_width, period_ticks, pulse_width_to_ticks};
use super::Servo;
use crate::error::ServoError;

/// Servo on channel 0 of a `SimplePwm`.
///
/// Div16 gives a 1 µs tick, so a 20 ms frame is 20 000 counts.
pub struct PwmServo<'d, T: Instance> {
    pwm: SimplePwm<'d, T>,
    top: u16,
}

impl<'d, T: Instance> PwmServo<'d, T> {
    pub fn new(mut pwm: SimplePwm<'d, T>) -> Self {
        let top = period_ticks();
        pwm.set_prescaler(Prescaler::Div16);
        pwm.set_max_duty(top);
        Self { pwm, top }
    }
}

impl<T: Instance> Servo for PwmServo<'_, T> {
    fn set_pulse_width(&mut self, pulse_width_ns: u32) -> Result<(), ServoError> {
        let pulse = check_pulse_width(pulse_width_ns)?;
        // SimplePwm counts the low part of the frame.
        self.pwm.set_duty(0, self.top - pulse_width_to_ticks(pulse));
        debug!("Servo pulse {} ns", pulse);
        Ok(())
    }
}
