//! AD structure encoding (Core Spec Supplement Part A) for the
//! advertising and scan-response payloads, plus the matching parsers.

use heapless::{String, Vec};

use crate::config::ADV_PAYLOAD_MAX;
use crate::error::Error;
use crate::lbs::schema::Uuid128;

pub const AD_TYPE_FLAGS: u8 = 0x01;
pub const AD_TYPE_UUID128_ALL: u8 = 0x07;
pub const AD_TYPE_SHORT_NAME: u8 = 0x08;
pub const AD_TYPE_COMPLETE_NAME: u8 = 0x09;

/// LE General Discoverable Mode.
pub const FLAG_LE_GENERAL_DISC: u8 = 0x02;
/// BR/EDR Not Supported.
pub const FLAG_NO_BREDR: u8 = 0x04;

/// One legacy advertising or scan-response payload.
pub type AdvPayload = Vec<u8, ADV_PAYLOAD_MAX>;

/// Appends AD structures, failing once the 31-byte limit is exceeded.
#[derive(Default)]
pub struct AdvPayloadBuilder {
    buf: AdvPayload,
}

impl AdvPayloadBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(self, flags: u8) -> Result<Self, Error> {
        self.push(AD_TYPE_FLAGS, &[flags])
    }

    pub fn complete_name(self, name: &str) -> Result<Self, Error> {
        self.push(AD_TYPE_COMPLETE_NAME, name.as_bytes())
    }

    pub fn uuid128_all(self, uuid: Uuid128) -> Result<Self, Error> {
        self.push(AD_TYPE_UUID128_ALL, &uuid.to_le_bytes())
    }

    pub fn build(self) -> AdvPayload {
        self.buf
    }

    fn push(mut self, ad_type: u8, data: &[u8]) -> Result<Self, Error> {
        let len = u8::try_from(data.len() + 1).map_err(|_| Error::BufferOverflow)?;
        self.buf.push(len).map_err(|_| Error::BufferOverflow)?;
        self.buf.push(ad_type).map_err(|_| Error::BufferOverflow)?;
        self.buf
            .extend_from_slice(data)
            .map_err(|_| Error::BufferOverflow)?;
        Ok(self)
    }
}

/// Walk AD structures, yielding `(type, data)`. Stops at a zero length or
/// a structure running past the end.
fn ad_structures(data: &[u8]) -> impl Iterator<Item = (u8, &[u8])> {
    let mut i = 0;
    core::iter::from_fn(move || {
        let len = *data.get(i)? as usize;
        if len == 0 || i + len >= data.len() {
            return None;
        }
        let item = (data[i + 1], &data[i + 2..i + 1 + len]);
        i += len + 1;
        Some(item)
    })
}

/// Check if raw advertisement data lists `uuid` as a 128-bit service UUID.
pub fn contains_service_uuid128(data: &[u8], uuid: Uuid128) -> bool {
    let wanted = uuid.to_le_bytes();
    ad_structures(data)
        .filter(|(ad_type, _)| *ad_type == 0x06 || *ad_type == AD_TYPE_UUID128_ALL)
        .any(|(_, uuids)| uuids.chunks_exact(16).any(|chunk| chunk == wanted))
}

/// Extract complete/shortened local name from advertisement data.
pub fn extract_device_name(data: &[u8]) -> String<32> {
    let found = ad_structures(data)
        .find(|(ad_type, _)| *ad_type == AD_TYPE_SHORT_NAME || *ad_type == AD_TYPE_COMPLETE_NAME);

    let mut name = String::new();
    match found {
        Some((_, bytes)) => {
            for &b in bytes {
                if name.push(b as char).is_err() {
                    break;
                }
            }
        }
        None => {
            let _ = name.push_str("Unknown");
        }
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lbs::schema::LBS_SERVICE_UUID;

    #[test]
    fn flags_and_name() {
        let payload = AdvPayloadBuilder::new()
            .flags(FLAG_LE_GENERAL_DISC | FLAG_NO_BREDR)
            .and_then(|b| b.complete_name("Servo"))
            .unwrap()
            .build();
        assert_eq!(
            payload.as_slice(),
            &[0x02, 0x01, 0x06, 0x06, 0x09, b'S', b'e', b'r', b'v', b'o']
        );
        assert_eq!(extract_device_name(&payload).as_str(), "Servo");
    }

    #[test]
    fn uuid128_scan_response() {
        let payload = AdvPayloadBuilder::new()
            .uuid128_all(LBS_SERVICE_UUID)
            .unwrap()
            .build();
        assert_eq!(payload.len(), 18);
        assert_eq!(&payload[..2], &[0x11, 0x07]);
        assert!(contains_service_uuid128(&payload, LBS_SERVICE_UUID));
    }

    #[test]
    fn other_uuid_is_not_matched() {
        let payload = AdvPayloadBuilder::new()
            .uuid128_all(Uuid128::new(1))
            .unwrap()
            .build();
        assert!(!contains_service_uuid128(&payload, LBS_SERVICE_UUID));
    }

    #[test]
    fn overlong_payload_is_rejected() {
        let name = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123";
        let result = AdvPayloadBuilder::new()
            .flags(FLAG_LE_GENERAL_DISC)
            .and_then(|b| b.complete_name(name));
        assert!(matches!(result, Err(Error::BufferOverflow)));
    }

    #[test]
    fn malformed_lengths_stop_parsing() {
        assert!(!contains_service_uuid128(&[0x00], LBS_SERVICE_UUID));
        assert!(!contains_service_uuid128(&[0x11, 0x07, 0x23], LBS_SERVICE_UUID));
        assert_eq!(extract_device_name(&[0x05, 0x09, b'a']).as_str(), "Unknown");
    }

    #[test]
    fn missing_name_is_unknown() {
        assert_eq!(extract_device_name(&[0x02, 0x01, 0x06]).as_str(), "Unknown");
    }
}
