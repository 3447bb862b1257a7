//! Unified error type for lbs-servo.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` (behind the `defmt` feature) for
//! efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // BLE
    /// An attribute operation was rejected with an ATT error code.
    Att(AttError),

    /// A callback slot was never registered.
    MissingCallback(Callback),

    /// The stack refused to start advertising (raw stack code, if any).
    AdvertisingFailed(Option<u32>),

    /// A lifecycle event arrived that has no transition from the current state.
    InvalidTransition,

    /// Advertising payload does not fit in a legacy PDU.
    BufferOverflow,

    // Actuation
    /// The servo driver rejected a command.
    Servo(ServoError),

    /// The indicator LED could not be driven.
    Indicator,

    /// A motion command was dropped because the queue is full.
    MotionQueueFull,

    // Startup
    /// A peripheral or the radio stack could not be brought up.
    Startup(StartupError),
}

/// Attribute protocol errors reported to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AttError {
    ReadNotPermitted,
    WriteNotPermitted,
    InvalidOffset,
    InvalidAttributeLength,
    ValueNotAllowed,
}

impl AttError {
    /// ATT error code as sent on the wire.
    pub const fn code(self) -> u8 {
        match self {
            AttError::ReadNotPermitted => 0x02,
            AttError::WriteNotPermitted => 0x03,
            AttError::InvalidOffset => 0x07,
            AttError::InvalidAttributeLength => 0x0D,
            AttError::ValueNotAllowed => 0x13,
        }
    }

    /// SoftDevice GATT status for this error (`BLE_GATT_STATUS_ATTERR_*`).
    pub const fn gatt_status(self) -> u16 {
        0x0100 | self.code() as u16
    }
}

/// Which registered callback was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Callback {
    /// LED / trigger write notifier.
    ActuatorWrite,
    /// Button read provider.
    SensorRead,
}

/// Servo driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Commanded pulse width (ns) is outside the device limits.
    PulseOutOfRange(u32),
    /// Raw driver error code.
    Driver(i32),
}

/// Fatal initialisation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartupError {
    /// Servo could not be parked at its minimum position.
    Servo,
    /// GATT service registration failed.
    ServiceRegistration,
}

// Convenience conversions

impl From<AttError> for Error {
    fn from(e: AttError) -> Self {
        Error::Att(e)
    }
}

impl From<ServoError> for Error {
    fn from(e: ServoError) -> Self {
        Error::Servo(e)
    }
}

impl From<StartupError> for Error {
    fn from(e: StartupError) -> Self {
        Error::Startup(e)
    }
}
