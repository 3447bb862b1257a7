//! SoftDevice S140 glue - GATT server registration, attribute callbacks
//! and the connectable advertiser.
//!
//! Both characteristics use deferred (authorized) access so every read
//! and write request goes through [`ServiceEndpoint`] and can be answered
//! with a proper ATT error code. Write commands are not authorized by the
//! SoftDevice; they arrive as plain writes and are applied without a reply.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use nrf_softdevice::ble::gatt_server::builder::ServiceBuilder;
use nrf_softdevice::ble::gatt_server::characteristic::{Attribute, Metadata, Properties};
use nrf_softdevice::ble::gatt_server::{
    self, DeferredReadReply, DeferredWriteReply, RegisterError, WriteOp,
};
use nrf_softdevice::ble::{peripheral, Connection, GattError, SecurityMode, Uuid};
use nrf_softdevice::Softdevice;

use super::advertising::{Advertiser, AdvertisingParams};
use crate::actuator::MotionQueue;
use crate::config::MOTION_QUEUE_DEPTH;
use crate::error::{AttError, Error};
use crate::input::ButtonState;
use crate::lbs::schema::{LbsCharacteristic, LBS_BUTTON_UUID, LBS_LED_UUID, LBS_SCHEMA};
use crate::lbs::{ServiceEndpoint, WriteRequest};

/// Endpoint wired to the motion queue and the debounced button.
pub type LbsEndpoint =
    ServiceEndpoint<MotionQueue<'static, CriticalSectionRawMutex, MOTION_QUEUE_DEPTH>, &'static ButtonState>;

/// Largest read payload with the default 23-byte ATT MTU.
const READ_BUF_LEN: usize = 22;

/// Registered LBS service and its attribute handles.
pub struct LbsServer {
    endpoint: Mutex<CriticalSectionRawMutex, RefCell<LbsEndpoint>>,
    button_handle: u16,
    led_handle: u16,
}

impl LbsServer {
    /// Register the service with the SoftDevice. Must run before the
    /// SoftDevice task starts.
    pub fn new(sd: &mut Softdevice, endpoint: LbsEndpoint) -> Result<Self, RegisterError> {
        let mut service = ServiceBuilder::new(sd, uuid(LBS_SCHEMA.uuid.to_le_bytes()))?;

        let button = service
            .add_characteristic(
                uuid(LBS_BUTTON_UUID.to_le_bytes()),
                Attribute::new([0u8])
                    .read_security(SecurityMode::Open)
                    .deferred_read(),
                Metadata::new(Properties::new().read()),
            )?
            .build();

        let led = service
            .add_characteristic(
                uuid(LBS_LED_UUID.to_le_bytes()),
                Attribute::new([0u8])
                    .write_security(SecurityMode::Open)
                    .deferred_write(),
                Metadata::new(Properties::new().write().write_without_response()),
            )?
            .build();

        let _service = service.build();

        Ok(Self {
            endpoint: Mutex::new(RefCell::new(endpoint)),
            button_handle: button.value_handle,
            led_handle: led.value_handle,
        })
    }

    fn characteristic(&self, handle: u16) -> Option<LbsCharacteristic> {
        if handle == self.button_handle {
            Some(LbsCharacteristic::Button)
        } else if handle == self.led_handle {
            Some(LbsCharacteristic::Led)
        } else {
            None
        }
    }
}

fn uuid(bytes: [u8; 16]) -> Uuid {
    Uuid::new_128(&bytes)
}

fn gatt_error(e: AttError) -> GattError {
    GattError::from(e.gatt_status())
}

impl gatt_server::Server for LbsServer {
    type Event = ();

    fn on_write(
        &self,
        _conn: &Connection,
        handle: u16,
        op: WriteOp,
        offset: usize,
        data: &[u8],
    ) -> Option<Self::Event> {
        // Write commands bypass write authorization and land here.
        match (self.characteristic(handle), op) {
            (Some(characteristic), WriteOp::Command) => {
                info!("Attribute write command, handle: {}, len: {}", handle, data.len());
                let offset = u16::try_from(offset).unwrap_or(u16::MAX);
                self.endpoint.lock(|ep| {
                    ep.borrow_mut()
                        .write_command(characteristic, WriteRequest::new(data, offset))
                });
            }
            _ => debug!("Ignoring plain write, handle: {}", handle),
        }
        None
    }

    fn on_deferred_read(
        &self,
        handle: u16,
        offset: usize,
        reply: DeferredReadReply,
    ) -> Option<Self::Event> {
        info!("Attribute read, handle: {}", handle);
        let mut buf = [0u8; READ_BUF_LEN];
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);

        let result = match self.characteristic(handle) {
            Some(characteristic) => self
                .endpoint
                .lock(|ep| ep.borrow_mut().read(characteristic, offset, &mut buf)),
            None => Err(AttError::ReadNotPermitted),
        };

        let reply_result = match result {
            Ok(len) => reply.reply(Ok(&buf[..len])),
            Err(e) => reply.reply(Err(gatt_error(e))),
        };
        if let Err(e) = reply_result {
            warn!("Read reply failed: {}", e);
        }
        None
    }

    fn on_deferred_write(
        &self,
        handle: u16,
        _op: WriteOp,
        offset: usize,
        data: &[u8],
        reply: DeferredWriteReply,
    ) -> Option<Self::Event> {
        info!("Attribute write, handle: {}, len: {}", handle, data.len());
        let offset = u16::try_from(offset).unwrap_or(u16::MAX);

        let result = match self.characteristic(handle) {
            Some(characteristic) => self.endpoint.lock(|ep| {
                ep.borrow_mut()
                    .write(characteristic, WriteRequest::new(data, offset))
            }),
            None => Err(AttError::WriteNotPermitted),
        };

        let reply_result = match result {
            Ok(_) => reply.reply(Ok(None)),
            Err(e) => reply.reply(Err(gatt_error(e))),
        };
        if let Err(e) = reply_result {
            warn!("Write reply failed: {}", e);
        }
        None
    }
}

/// Connectable, scannable undirected advertising on the SoftDevice.
pub struct SoftdeviceAdvertiser {
    sd: &'static Softdevice,
}

impl SoftdeviceAdvertiser {
    pub fn new(sd: &'static Softdevice) -> Self {
        Self { sd }
    }
}

impl Advertiser for SoftdeviceAdvertiser {
    type Link = Connection;

    async fn advertise(
        &mut self,
        params: &AdvertisingParams,
        adv_data: &[u8],
        scan_data: &[u8],
    ) -> Result<Connection, Error> {
        // The SoftDevice takes a single interval; use the lower bound.
        let config = peripheral::Config {
            interval: params.interval_min,
            ..Default::default()
        };
        let adv = peripheral::ConnectableAdvertisement::ScannableUndirected { adv_data, scan_data };

        peripheral::advertise_connectable(self.sd, adv, &config)
            .await
            .map_err(|e| {
                error!("advertise_connectable: {}", e);
                Error::AdvertisingFailed(None)
            })
    }
}
