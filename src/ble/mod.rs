//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role:
//!
//! 1. **Advertising** - a single deferred work item that (re)starts
//!    connectable advertising outside of stack callback context.
//! 2. **Lifecycle** - the advertise → connect → disconnect → recycle
//!    state machine that decides when advertising must restart.
//! 3. **Payloads** - advertising and scan-response AD structures.
//!
//! The LED Button Service itself lives in [`crate::lbs`].

pub mod adv_payload;
pub mod advertising;
pub mod lifecycle;
#[cfg(feature = "embedded")]
pub mod softdevice;

pub use advertising::{Advertiser, AdvertisingParams, AdvertisingScheduler, AdvertisingSet};
pub use lifecycle::{ConnectionLifecycleManager, ConnectionState, LifecycleEvent};
