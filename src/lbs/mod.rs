//! LED Button Service (LBS) endpoint.
//!
//! Owns the two characteristic values, validates every attribute
//! operation against [`schema::LBS_SCHEMA`], and dispatches:
//!
//! - **Button** (read): asks the registered [`SensorRead`] provider for
//!   the current level and serves it as one byte.
//! - **LED** (write / write without response): checks length, offset and
//!   value, then hands the boolean to the registered [`ActuatorWrite`]
//!   notifier.
//!
//! The endpoint is transport-agnostic; the SoftDevice glue in
//! `ble::softdevice` maps GATT handles onto [`LbsCharacteristic`].

pub mod att;
pub mod schema;

use crate::error::{AttError, Callback, Error};
use schema::{CharacteristicSchema, LbsCharacteristic, Properties, LBS_LED, LBS_SCHEMA};

/// Receives validated LED characteristic writes.
pub trait ActuatorWrite {
    fn on_actuator_write(&mut self, on: bool) -> Result<(), Error>;
}

/// Supplies the Button characteristic value.
pub trait SensorRead {
    fn read_sensor(&mut self) -> Result<bool, Error>;
}

/// The two callback slots handed to the endpoint at startup.
///
/// Either slot may be absent; the matching operation then degrades and
/// logs a configuration error instead of failing hard.
pub struct Callbacks<W, R> {
    pub actuator: Option<W>,
    pub sensor: Option<R>,
}

impl<W, R> Callbacks<W, R> {
    pub fn new(actuator: W, sensor: R) -> Self {
        Self {
            actuator: Some(actuator),
            sensor: Some(sensor),
        }
    }

    pub fn none() -> Self {
        Self {
            actuator: None,
            sensor: None,
        }
    }
}

/// A one-byte boolean characteristic value; only 0x00 and 0x01 are ever
/// stored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicValue(bool);

impl CharacteristicValue {
    pub const OFF: CharacteristicValue = CharacteristicValue(false);
    pub const ON: CharacteristicValue = CharacteristicValue(true);

    pub const fn is_on(self) -> bool {
        self.0
    }

    pub const fn as_byte(self) -> u8 {
        self.0 as u8
    }
}

impl From<bool> for CharacteristicValue {
    fn from(on: bool) -> Self {
        CharacteristicValue(on)
    }
}

impl TryFrom<u8> for CharacteristicValue {
    type Error = AttError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0x00 => Ok(CharacteristicValue::OFF),
            0x01 => Ok(CharacteristicValue::ON),
            _ => Err(AttError::ValueNotAllowed),
        }
    }
}

/// An incoming attribute write.
#[derive(Clone, Copy, Debug)]
pub struct WriteRequest<'a> {
    pub data: &'a [u8],
    pub offset: u16,
}

impl<'a> WriteRequest<'a> {
    pub fn new(data: &'a [u8], offset: u16) -> Self {
        Self { data, offset }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check the write shape against `schema` and decode its value.
    ///
    /// Order matters: length, then offset, then value.
    pub fn validate(&self, schema: &CharacteristicSchema) -> Result<CharacteristicValue, AttError> {
        if self.len() != schema.value_len {
            info!("LED write: incorrect data length {}", self.len());
            return Err(AttError::InvalidAttributeLength);
        }
        if self.offset != 0 {
            info!("LED write: incorrect data offset {}", self.offset);
            return Err(AttError::InvalidOffset);
        }
        CharacteristicValue::try_from(self.data[0]).inspect_err(|_| {
            info!("LED write: value {=u8:#x} not allowed", self.data[0]);
        })
    }
}

/// GATT-side endpoint of the LED Button Service.
pub struct ServiceEndpoint<W, R> {
    callbacks: Callbacks<W, R>,
    button: CharacteristicValue,
    led: CharacteristicValue,
}

impl<W: ActuatorWrite, R: SensorRead> ServiceEndpoint<W, R> {
    pub fn new(callbacks: Callbacks<W, R>) -> Self {
        if callbacks.actuator.is_none() {
            error!("No LED callback registered");
        }
        if callbacks.sensor.is_none() {
            error!("No button callback registered");
        }
        Self {
            callbacks,
            button: CharacteristicValue::OFF,
            led: CharacteristicValue::OFF,
        }
    }

    /// Last value served from the Button characteristic.
    pub fn button_value(&self) -> CharacteristicValue {
        self.button
    }

    /// Last value accepted on the LED characteristic.
    pub fn led_value(&self) -> CharacteristicValue {
        self.led
    }

    /// Dispatch a read; rejects characteristics the schema marks unreadable.
    pub fn read(
        &mut self,
        characteristic: LbsCharacteristic,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<usize, AttError> {
        match LBS_SCHEMA.characteristic(characteristic) {
            Some(schema) if schema.properties.readable() => {}
            _ => return Err(AttError::ReadNotPermitted),
        }

        match characteristic {
            LbsCharacteristic::Button => self.read_button(offset, buf),
            LbsCharacteristic::Led => Err(AttError::ReadNotPermitted),
        }
    }

    /// Dispatch a write; rejects characteristics the schema marks unwritable.
    pub fn write(
        &mut self,
        characteristic: LbsCharacteristic,
        request: WriteRequest<'_>,
    ) -> Result<usize, AttError> {
        match LBS_SCHEMA.characteristic(characteristic) {
            Some(schema) if schema.properties.writable() => {}
            _ => return Err(AttError::WriteNotPermitted),
        }

        match characteristic {
            LbsCharacteristic::Led => self.write_led(request),
            LbsCharacteristic::Button => Err(AttError::WriteNotPermitted),
        }
    }

    /// Apply a write without response.
    ///
    /// The peer gets no reply, so rejections are only logged. Writes to a
    /// characteristic that doesn't allow write commands are dropped.
    pub fn write_command(&mut self, characteristic: LbsCharacteristic, request: WriteRequest<'_>) {
        let permitted = LBS_SCHEMA
            .characteristic(characteristic)
            .is_some_and(|c| c.properties.contains(Properties::WRITE_WITHOUT_RESPONSE));
        if !permitted {
            info!("Write command on {} not permitted", characteristic);
            return;
        }

        if let Err(e) = self.write(characteristic, request) {
            info!("Write command on {} rejected: {}", characteristic, e);
        }
    }

    /// Serve the Button characteristic.
    ///
    /// Without a provider (or if it fails) zero bytes are returned and the
    /// stored value is left alone.
    pub fn read_button(&mut self, offset: u16, buf: &mut [u8]) -> Result<usize, AttError> {
        let Some(sensor) = self.callbacks.sensor.as_mut() else {
            error!("{}", Error::MissingCallback(Callback::SensorRead));
            return Ok(0);
        };

        match sensor.read_sensor() {
            Ok(pressed) => {
                self.button = CharacteristicValue::from(pressed);
                info!("Button state read: {}", pressed);
            }
            Err(e) => {
                error!("Button read failed: {}", e);
                return Ok(0);
            }
        }

        att::read_attribute(buf, offset, &[self.button.as_byte()])
    }

    /// Accept an LED characteristic write.
    ///
    /// Rejections leave the stored value untouched. A missing or failing
    /// notifier is logged but the write is still acknowledged.
    pub fn write_led(&mut self, request: WriteRequest<'_>) -> Result<usize, AttError> {
        let value = request.validate(&LBS_LED)?;
        self.led = value;
        info!("LED characteristic write: {}", value.is_on());

        match self.callbacks.actuator.as_mut() {
            Some(actuator) => {
                if let Err(e) = actuator.on_actuator_write(value.is_on()) {
                    error!("LED callback failed: {}", e);
                }
            }
            None => error!("{}", Error::MissingCallback(Callback::ActuatorWrite)),
        }

        Ok(request.len())
    }
}
