//! Declared layout of the LED Button Service.

/// 128-bit Bluetooth UUID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Uuid128(u128);

impl Uuid128 {
    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    /// Little-endian byte order, as carried in AD structures and by the
    /// SoftDevice.
    pub const fn to_le_bytes(self) -> [u8; 16] {
        self.0.to_le_bytes()
    }
}

/// Primary service.
pub const LBS_SERVICE_UUID: Uuid128 = Uuid128::new(0x00001523_1212_efde_1523_785feabcd123);

/// Button characteristic (read).
pub const LBS_BUTTON_UUID: Uuid128 = Uuid128::new(0x00001525_1212_efde_1523_785feabcd123);

/// LED / trigger characteristic (write, write without response).
pub const LBS_LED_UUID: Uuid128 = Uuid128::new(0x00001524_1212_efde_1523_785feabcd123);

/// Characteristic property bits (Core Spec Vol 3 Part G 3.3.1.1).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Properties(u8);

impl Properties {
    pub const READ: Properties = Properties(0x02);
    pub const WRITE_WITHOUT_RESPONSE: Properties = Properties(0x04);
    pub const WRITE: Properties = Properties(0x08);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Properties) -> Properties {
        Properties(self.0 | other.0)
    }

    pub const fn contains(self, other: Properties) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn readable(self) -> bool {
        self.contains(Properties::READ)
    }

    pub const fn writable(self) -> bool {
        self.0 & (Properties::WRITE.0 | Properties::WRITE_WITHOUT_RESPONSE.0) != 0
    }
}

/// Characteristics exposed by the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LbsCharacteristic {
    Button,
    Led,
}

#[derive(Clone, Copy, Debug)]
pub struct CharacteristicSchema {
    pub kind: LbsCharacteristic,
    pub uuid: Uuid128,
    pub properties: Properties,
    /// Fixed value length in bytes.
    pub value_len: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct ServiceSchema {
    pub uuid: Uuid128,
    pub characteristics: &'static [CharacteristicSchema],
}

impl ServiceSchema {
    pub fn characteristic(&self, kind: LbsCharacteristic) -> Option<&CharacteristicSchema> {
        self.characteristics.iter().find(|c| c.kind == kind)
    }

    pub fn find(&self, uuid: Uuid128) -> Option<&CharacteristicSchema> {
        self.characteristics.iter().find(|c| c.uuid == uuid)
    }
}

pub const LBS_BUTTON: CharacteristicSchema = CharacteristicSchema {
    kind: LbsCharacteristic::Button,
    uuid: LBS_BUTTON_UUID,
    properties: Properties::READ,
    value_len: 1,
};

pub const LBS_LED: CharacteristicSchema = CharacteristicSchema {
    kind: LbsCharacteristic::Led,
    uuid: LBS_LED_UUID,
    properties: Properties::WRITE.union(Properties::WRITE_WITHOUT_RESPONSE),
    value_len: 1,
};

pub const LBS_SCHEMA: ServiceSchema = ServiceSchema {
    uuid: LBS_SERVICE_UUID,
    characteristics: &[LBS_BUTTON, LBS_LED],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_bytes_are_little_endian() {
        let bytes = LBS_SERVICE_UUID.to_le_bytes();
        assert_eq!(bytes[0], 0x23);
        assert_eq!(bytes[1], 0xd1);
        assert_eq!(bytes[12], 0x23);
        assert_eq!(bytes[15], 0x00);
    }

    #[test]
    fn schema_properties() {
        let button = LBS_SCHEMA.characteristic(LbsCharacteristic::Button).unwrap();
        assert!(button.properties.readable());
        assert!(!button.properties.writable());

        let led = LBS_SCHEMA.characteristic(LbsCharacteristic::Led).unwrap();
        assert!(!led.properties.readable());
        assert!(led.properties.writable());
        assert_eq!(led.properties.bits(), 0x0C);
    }

    #[test]
    fn find_by_uuid() {
        assert_eq!(
            LBS_SCHEMA.find(LBS_LED_UUID).map(|c| c.kind),
            Some(LbsCharacteristic::Led)
        );
        assert!(LBS_SCHEMA.find(LBS_SERVICE_UUID).is_none());
    }
}
