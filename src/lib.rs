//! BLE LED Button Service peripheral with a servo trigger.
//!
//! This library holds the protocol, state and actuation logic so it can
//! be tested on the host (no embedded hardware required). The embedded
//! binary in `main.rs` wires it to the nRF52840 SoftDevice, PWM and GPIO
//! behind the `embedded` feature.
//!
//! Usage: `cargo test` (host) or
//! `cargo run --release --features embedded --target thumbv7em-none-eabihf`.
//!
//! ## Components
//!
//! - [`lbs`]: GATT service schema and the [`lbs::ServiceEndpoint`] that
//!   validates and dispatches attribute reads and writes.
//! - [`actuator`]: timed servo motion programs, run off the GATT callback.
//! - [`input`]: debounced button state read by the Button characteristic.
//! - [`ble`]: deferred advertising and the connection lifecycle.
//! - [`status`]: run-status LED.

#![cfg_attr(not(test), no_std)]

// Must come first so the logging macros are visible to every module.
#[macro_use]
mod fmt;

pub mod actuator;
pub mod ble;
pub mod config;
pub mod error;
pub mod input;
pub mod lbs;
pub mod status;

pub use error::Error;
