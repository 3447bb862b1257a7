//! Servo actuation - fixed, timed motion programs.
//!
//! LED writes arrive inside the SoftDevice GATT callback, which must not
//! block for the ~0.8 s a forward swing takes. The write handler
//! ([`MotionQueue`]) therefore only enqueues a [`MotionCommand`]; the
//! motion task drains the queue and runs each program to completion on
//! an [`ActuatorSequencer`], then mirrors the written value on the
//! indicator LED.

pub mod program;
#[cfg(feature = "embedded")]
pub mod pwm;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_async::delay::DelayNs;

use crate::error::{Error, ServoError};
use crate::lbs::ActuatorWrite;
use program::{MotionStep, FORWARD_PROGRAM, IDLE_PROGRAM};

/// Physical actuator accepting a pulse-width command.
pub trait Servo {
    fn set_pulse_width(&mut self, pulse_width_ns: u32) -> Result<(), ServoError>;
}

/// What an LED write asks the actuator to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionCommand {
    /// Run the forward swing (LED = 1).
    Forward,
    /// Return to the idle position (LED = 0).
    Idle,
}

impl MotionCommand {
    /// Indicator level to show once the command has run.
    pub fn led_state(self) -> bool {
        matches!(self, MotionCommand::Forward)
    }
}

impl From<bool> for MotionCommand {
    fn from(on: bool) -> Self {
        if on {
            MotionCommand::Forward
        } else {
            MotionCommand::Idle
        }
    }
}

/// Runs motion programs on a servo and mirrors the result on an
/// indicator pin. Holds no state between commands.
pub struct ActuatorSequencer<S, L, D> {
    servo: S,
    indicator: L,
    delay: D,
}

impl<S, L, D> ActuatorSequencer<S, L, D>
where
    S: Servo,
    L: OutputPin,
    D: DelayNs,
{
    pub fn new(servo: S, indicator: L, delay: D) -> Self {
        Self {
            servo,
            indicator,
            delay,
        }
    }

    /// In → hold → out → hold → in. Stops at the first failed command.
    pub async fn run_forward_sequence(&mut self) -> Result<(), ServoError> {
        info!("Starting servo cycle");
        self.run_program(&FORWARD_PROGRAM).await?;
        info!("Servo cycle complete");
        Ok(())
    }

    /// Single command to the idle position.
    pub async fn reset_to_idle(&mut self) -> Result<(), ServoError> {
        self.run_program(&IDLE_PROGRAM).await
    }

    /// Run the program for `command`, then set the indicator.
    ///
    /// The indicator is set even when the program failed; its own failure
    /// is logged and not reported.
    pub async fn execute(&mut self, command: MotionCommand) -> Result<(), Error> {
        let result = match command {
            MotionCommand::Forward => self.run_forward_sequence().await,
            MotionCommand::Idle => self.reset_to_idle().await,
        };
        if let Err(e) = result {
            error!("Motion {} failed: {}", command, e);
        }

        let on = command.led_state();
        if self.indicator.set_state(PinState::from(on)).is_err() {
            error!("{}", Error::Indicator);
        } else {
            info!("Indicator LED {}", if on { "ON" } else { "OFF" });
        }

        result.map_err(Error::from)
    }

    async fn run_program(&mut self, program: &[MotionStep]) -> Result<(), ServoError> {
        for step in program {
            self.servo
                .set_pulse_width(step.pulse_width_ns)
                .inspect_err(|e| error!("Servo command {} failed: {}", step.pulse_width_ns, e))?;
            if step.hold_ms > 0 {
                self.delay.delay_ms(step.hold_ms).await;
            }
        }
        Ok(())
    }
}

/// LED write notifier that hands commands to the motion task.
pub struct MotionQueue<'a, M: RawMutex, const N: usize> {
    sender: Sender<'a, M, MotionCommand, N>,
}

impl<'a, M: RawMutex, const N: usize> MotionQueue<'a, M, N> {
    pub fn new(sender: Sender<'a, M, MotionCommand, N>) -> Self {
        Self { sender }
    }
}

impl<M: RawMutex, const N: usize> ActuatorWrite for MotionQueue<'_, M, N> {
    fn on_actuator_write(&mut self, on: bool) -> Result<(), Error> {
        let command = MotionCommand::from(on);
        self.sender.try_send(command).map_err(|_| {
            warn!("Motion queue full, dropping {}", command);
            Error::MotionQueueFull
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use embassy_sync::channel::Channel;
    use embedded_hal::digital::ErrorType;
    use std::cell::RefCell;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Pulse(u32),
        Hold(u32),
        Led(bool),
    }

    type Log = RefCell<Vec<Op>>;

    struct MockServo<'a> {
        log: &'a Log,
        fail_on: Option<u32>,
    }

    impl Servo for MockServo<'_> {
        fn set_pulse_width(&mut self, ns: u32) -> Result<(), ServoError> {
            if self.fail_on == Some(ns) {
                return Err(ServoError::Driver(-5));
            }
            self.log.borrow_mut().push(Op::Pulse(ns));
            Ok(())
        }
    }

    struct MockDelay<'a>(&'a Log);

    impl DelayNs for MockDelay<'_> {
        async fn delay_ns(&mut self, ns: u32) {
            self.0.borrow_mut().push(Op::Hold(ns / 1_000_000));
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.0.borrow_mut().push(Op::Hold(ms));
        }
    }

    struct MockLed<'a>(&'a Log);

    impl ErrorType for MockLed<'_> {
        type Error = Infallible;
    }

    impl OutputPin for MockLed<'_> {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().push(Op::Led(false));
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.borrow_mut().push(Op::Led(true));
            Ok(())
        }
    }

    fn sequencer(log: &Log, fail_on: Option<u32>) -> ActuatorSequencer<MockServo<'_>, MockLed<'_>, MockDelay<'_>> {
        ActuatorSequencer::new(MockServo { log, fail_on }, MockLed(log), MockDelay(log))
    }

    #[test]
    fn forward_sequence_order() {
        let log = Log::default();
        block_on(sequencer(&log, None).run_forward_sequence()).unwrap();
        assert_eq!(
            log.into_inner(),
            [
                Op::Pulse(1_125_000),
                Op::Hold(50),
                Op::Pulse(1_875_000),
                Op::Hold(750),
                Op::Pulse(1_125_000),
            ]
        );
    }

    #[test]
    fn reset_to_idle_is_single_command() {
        let log = Log::default();
        block_on(sequencer(&log, None).reset_to_idle()).unwrap();
        assert_eq!(log.into_inner(), [Op::Pulse(1_000_000)]);
    }

    #[test]
    fn failure_aborts_remaining_steps() {
        let log = Log::default();
        let result = block_on(sequencer(&log, Some(1_875_000)).run_forward_sequence());
        assert_eq!(result, Err(ServoError::Driver(-5)));
        assert_eq!(log.into_inner(), [Op::Pulse(1_125_000), Op::Hold(50)]);
    }

    #[test]
    fn execute_sets_indicator_after_motion() {
        let log = Log::default();
        let mut seq = sequencer(&log, None);
        block_on(seq.execute(MotionCommand::Forward)).unwrap();
        block_on(seq.execute(MotionCommand::Idle)).unwrap();
        drop(seq);
        let ops = log.into_inner();
        assert_eq!(ops[5], Op::Led(true));
        assert_eq!(&ops[6..], [Op::Pulse(1_000_000), Op::Led(false)]);
    }

    #[test]
    fn execute_sets_indicator_even_if_motion_fails() {
        let log = Log::default();
        let result = block_on(sequencer(&log, Some(1_125_000)).execute(MotionCommand::Forward));
        assert_eq!(result, Err(Error::Servo(ServoError::Driver(-5))));
        assert_eq!(log.into_inner(), [Op::Led(true)]);
    }

    #[test]
    fn queue_maps_writes_to_commands() {
        let channel: Channel<NoopRawMutex, MotionCommand, 2> = Channel::new();
        let mut queue = MotionQueue::new(channel.sender());

        queue.on_actuator_write(true).unwrap();
        queue.on_actuator_write(false).unwrap();
        assert_eq!(queue.on_actuator_write(true), Err(Error::MotionQueueFull));

        assert_eq!(channel.try_receive().ok(), Some(MotionCommand::Forward));
        assert_eq!(channel.try_receive().ok(), Some(MotionCommand::Idle));
        assert!(channel.try_receive().is_err());
    }
}
