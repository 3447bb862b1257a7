//! Fixed motion programs and pulse-width arithmetic.

use crate::config::{
    PWM_TICK_NS, SERVO_HOLD_IN_MS, SERVO_HOLD_OUT_MS, SERVO_MAX_PULSE_NS, SERVO_MIN_PULSE_NS,
    SERVO_PERIOD_NS, SERVO_POSITION_IN_NS, SERVO_POSITION_OUT_NS,
};
use crate::error::ServoError;

/// One servo command followed by a hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionStep {
    pub pulse_width_ns: u32,
    /// Hold after the command before the next step (ms). The last step's
    /// hold is zero.
    pub hold_ms: u32,
}

impl MotionStep {
    pub const fn new(pulse_width_ns: u32, hold_ms: u32) -> Self {
        Self {
            pulse_width_ns,
            hold_ms,
        }
    }
}

/// In → out → in swing triggered by an LED write of 1.
pub const FORWARD_PROGRAM: [MotionStep; 3] = [
    MotionStep::new(SERVO_POSITION_IN_NS, SERVO_HOLD_IN_MS),
    MotionStep::new(SERVO_POSITION_OUT_NS, SERVO_HOLD_OUT_MS),
    MotionStep::new(SERVO_POSITION_IN_NS, 0),
];

/// Park at the device minimum, triggered by an LED write of 0.
pub const IDLE_PROGRAM: [MotionStep; 1] = [MotionStep::new(SERVO_MIN_PULSE_NS, 0)];

/// Reject pulses outside the device-declared limits.
pub fn check_pulse_width(pulse_width_ns: u32) -> Result<u32, ServoError> {
    if (SERVO_MIN_PULSE_NS..=SERVO_MAX_PULSE_NS).contains(&pulse_width_ns) {
        Ok(pulse_width_ns)
    } else {
        Err(ServoError::PulseOutOfRange(pulse_width_ns))
    }
}

/// PWM compare value for a pulse width.
pub const fn pulse_width_to_ticks(pulse_width_ns: u32) -> u16 {
    (pulse_width_ns / PWM_TICK_NS) as u16
}

/// PWM top value for one servo frame.
pub const fn period_ticks() -> u16 {
    (SERVO_PERIOD_NS / PWM_TICK_NS) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_program_shape() {
        let pulses: [u32; 3] = FORWARD_PROGRAM.map(|s| s.pulse_width_ns);
        assert_eq!(pulses, [1_125_000, 1_875_000, 1_125_000]);
        let holds: [u32; 3] = FORWARD_PROGRAM.map(|s| s.hold_ms);
        assert_eq!(holds, [50, 750, 0]);
    }

    #[test]
    fn every_programmed_pulse_is_in_range() {
        for step in FORWARD_PROGRAM.iter().chain(IDLE_PROGRAM.iter()) {
            assert!(check_pulse_width(step.pulse_width_ns).is_ok());
        }
    }

    #[test]
    fn out_of_range_pulses_are_rejected() {
        assert_eq!(
            check_pulse_width(999_999),
            Err(ServoError::PulseOutOfRange(999_999))
        );
        assert_eq!(
            check_pulse_width(2_000_001),
            Err(ServoError::PulseOutOfRange(2_000_001))
        );
        assert_eq!(check_pulse_width(2_000_000), Ok(2_000_000));
    }

    #[test]
    fn tick_conversion() {
        assert_eq!(period_ticks(), 20_000);
        assert_eq!(pulse_width_to_ticks(1_125_000), 1_125);
        assert_eq!(pulse_width_to_ticks(SERVO_MAX_PULSE_NS), 2_000);
    }
}
