//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// BLE

/// Complete local name carried in the advertising payload.
pub const DEVICE_NAME: &str = "LBS_Servo";

/// Advertising interval bounds (in 0.625 ms units).
/// 800 = 500 ms, 801 = 500.625 ms.
pub const ADV_INTERVAL_MIN: u32 = 800;
pub const ADV_INTERVAL_MAX: u32 = 801;

/// Legacy advertising / scan-response payload capacity (bytes).
pub const ADV_PAYLOAD_MAX: usize = 31;

/// Motion commands that may be queued behind a running program.
pub const MOTION_QUEUE_DEPTH: usize = 4;

// Servo

/// PWM period (ns). 20 ms = 50 Hz, standard hobby servo frame.
pub const SERVO_PERIOD_NS: u32 = 20_000_000;

/// Device-declared pulse width limits (ns). 1 ms / 2 ms.
pub const SERVO_MIN_PULSE_NS: u32 = 1_000_000;
pub const SERVO_MAX_PULSE_NS: u32 = 2_000_000;

/// Motion program positions (ns). ~22.5° and ~157.5° on a 0-180° servo.
pub const SERVO_POSITION_IN_NS: u32 = 1_125_000;
pub const SERVO_POSITION_OUT_NS: u32 = 1_875_000;

/// Hold after moving to the "in" position before swinging out (ms).
pub const SERVO_HOLD_IN_MS: u32 = 50;

/// Hold at the "out" position before returning (ms).
pub const SERVO_HOLD_OUT_MS: u32 = 750;

/// PWM counter tick (ns). 16 MHz / 16 prescaler = 1 MHz.
pub const PWM_TICK_NS: u32 = 1_000;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Button 1          → P0.11
//   Run status LED    → P0.13 (LED1)
//   Indicator LED     → P0.14 (LED2, mirrors the LED characteristic)
//   Servo PWM signal  → P0.03

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Bit of the monitored button in the board button mask.
pub const BUTTON1_MASK: u32 = 1 << 0;

/// Run-status LED toggle period (ms).
pub const RUN_STATUS_BLINK_MS: u64 = 1_000;
