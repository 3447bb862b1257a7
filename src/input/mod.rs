//! Button input subsystem - debounced edges feeding the Button
//! characteristic.
//!
//! The edge handler runs in GPIO/interrupt task context while the read
//! provider runs inside the SoftDevice GATT callback, so the pressed
//! flag lives in an atomic.

#[cfg(feature = "embedded")]
pub mod buttons;
pub mod debounce;

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;
use crate::lbs::SensorRead;

/// Debounced edge on the monitored input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Released → pressed.
    Rising,
    /// Pressed → released.
    Falling,
}

impl Edge {
    /// Classify a handler invocation.
    ///
    /// `level` is the current (pressed) level, `changed` tells whether it
    /// moved since the previous report. Unchanged inputs never produce an
    /// edge, whatever their level.
    pub fn classify(level: bool, changed: bool) -> Option<Edge> {
        match (changed, level) {
            (true, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            (false, _) => None,
        }
    }

    /// Classify a transition between two sampled levels.
    pub fn between(previous: bool, current: bool) -> Option<Edge> {
        Edge::classify(current, previous != current)
    }
}

/// Last known logical state of the monitored button.
pub struct ButtonState {
    pressed: AtomicBool,
    mask: u32,
}

impl ButtonState {
    /// Button state watching `mask` in the board button bitmask.
    pub const fn new(mask: u32) -> Self {
        Self {
            pressed: AtomicBool::new(false),
            mask,
        }
    }

    /// Edge handler: updates the stored level on debounced edges only.
    pub fn on_input_edge(&self, level: bool, changed: bool) {
        match Edge::classify(level, changed) {
            Some(Edge::Rising) => {
                info!("Button pressed");
                self.pressed.store(true, Ordering::Release);
            }
            Some(Edge::Falling) => {
                debug!("Button released");
                self.pressed.store(false, Ordering::Release);
            }
            None => {}
        }
    }

    /// Board-level handler taking whole button bitmasks; only the bit in
    /// `mask` is considered.
    pub fn on_buttons_changed(&self, state: u32, has_changed: u32) {
        self.on_input_edge(state & self.mask != 0, has_changed & self.mask != 0);
    }

    /// Current debounced level. No side effects.
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }
}

impl SensorRead for &ButtonState {
    fn read_sensor(&mut self) -> Result<bool, Error> {
        Ok(self.is_pressed())
    }
}
