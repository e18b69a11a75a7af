//! Light status and accessory info as reported by the device.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::Error;
use crate::types::{PowerMode, device_to_kelvin};

type Result<T> = std::result::Result<T, Error>;

/// The last status a light reported.
///
/// `temperature` is in Kelvin, already converted from the device encoding.
/// This is a cache of the last reply, not live state: another controller can
/// change the light without this value noticing.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LightStatus {
    on: u8,
    brightness: u8,
    temperature: u16,
}

impl LightStatus {
    /// Raw power value, 0 or 1.
    pub fn on(&self) -> u8 {
        self.on
    }

    /// Check if the light is emitting.
    pub fn is_on(&self) -> bool {
        self.on != 0
    }

    pub fn power(&self) -> PowerMode {
        if self.is_on() {
            PowerMode::On
        } else {
            PowerMode::Off
        }
    }

    /// Brightness in percent.
    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Colour temperature in Kelvin.
    pub fn temperature(&self) -> u16 {
        self.temperature
    }
}

impl From<&DeviceLight> for LightStatus {
    fn from(light: &DeviceLight) -> Self {
        LightStatus {
            on: light.on,
            brightness: light.brightness,
            temperature: device_to_kelvin(light.temperature),
        }
    }
}

/// Reply body of the `lights` endpoint, for both reads and writes.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LightsReply {
    #[serde(default)]
    pub number_of_lights: Option<u8>,
    pub lights: Vec<DeviceLight>,
}

impl LightsReply {
    pub fn parse(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::JsonLoad)
    }

    /// Status of the first light, with temperature converted to Kelvin.
    pub fn first_status(&self) -> Result<LightStatus> {
        if let Some(n) = self.number_of_lights
            && usize::from(n) != self.lights.len()
        {
            debug!("Reply claims {} lights but carries {}", n, self.lights.len());
        }
        self.lights
            .first()
            .map(LightStatus::from)
            .ok_or(Error::NoLights)
    }
}

/// One light entry in device units.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DeviceLight {
    pub on: u8,
    pub brightness: u8,
    pub temperature: u16,
}

/// Request body of a `lights` write.
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LightsUpdate {
    pub number_of_lights: u8,
    pub lights: Vec<LightUpdate>,
}

impl LightsUpdate {
    pub fn single(light: LightUpdate) -> Self {
        LightsUpdate {
            number_of_lights: 1,
            lights: vec![light],
        }
    }
}

/// The fields of one light to change, in device units.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Clone, PartialEq)]
pub(crate) struct LightUpdate {
    pub on: Option<u8>,
    pub brightness: Option<u8>,
    pub temperature: Option<u16>,
}

/// Static accessory information reported by a light.
///
/// Kept verbatim as a flat map. Most values are strings, but devices also
/// report numbers (board type, build number) and arrays (features).
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AccessoryInfo(BTreeMap<String, Value>);

impl AccessoryInfo {
    pub(crate) fn parse(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(Error::JsonLoad)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the value for `key` if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn product_name(&self) -> Option<&str> {
        self.get_str("productName")
    }

    pub fn serial_number(&self) -> Option<&str> {
        self.get_str("serialNumber")
    }

    pub fn firmware_version(&self) -> Option<&str> {
        self.get_str("firmwareVersion")
    }

    pub fn display_name(&self) -> Option<&str> {
        self.get_str("displayName")
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.0
    }

    /// Mutable access for callers working on their own copy.
    pub fn entries_mut(&mut self) -> &mut BTreeMap<String, Value> {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_status_converts_temperature() {
        let reply = LightsReply::parse(json!({
            "numberOfLights": 1,
            "lights": [{"on": 1, "brightness": 20, "temperature": 213}]
        }))
        .unwrap();
        let status = reply.first_status().unwrap();
        assert!(status.is_on());
        assert_eq!(status.brightness(), 20);
        assert_eq!(status.temperature(), 4695);
    }

    #[test]
    fn test_number_of_lights_is_optional() {
        let reply = LightsReply::parse(json!({
            "lights": [{"on": 0, "brightness": 3, "temperature": 344}]
        }))
        .unwrap();
        assert_eq!(reply.number_of_lights, None);
        assert_eq!(reply.first_status().unwrap().power(), PowerMode::Off);
    }

    #[test]
    fn test_missing_keys_are_parse_errors() {
        let err = LightsReply::parse(json!({"lights": [{"on": 1}]})).unwrap_err();
        assert!(matches!(err, Error::JsonLoad(_)));

        let err = LightsReply::parse(json!({"numberOfLights": 1})).unwrap_err();
        assert!(matches!(err, Error::JsonLoad(_)));
    }

    #[test]
    fn test_empty_lights_array() {
        let reply = LightsReply::parse(json!({"numberOfLights": 0, "lights": []})).unwrap();
        assert_eq!(reply.first_status().unwrap_err(), Error::NoLights);
    }

    #[test]
    fn test_accessory_info_is_verbatim() {
        let raw = json!({
            "productName": "Elgato Key Light",
            "hardwareBoardType": 53,
            "firmwareBuildNumber": 192,
            "firmwareVersion": "1.0.3",
            "serialNumber": "BW33J1A02167",
            "displayName": "",
            "features": ["lights"]
        });
        let info = AccessoryInfo::parse(raw.clone()).unwrap();
        assert_eq!(info.product_name(), Some("Elgato Key Light"));
        assert_eq!(info.serial_number(), Some("BW33J1A02167"));
        assert_eq!(info.get("hardwareBoardType"), Some(&json!(53)));
        assert_eq!(info.get_str("hardwareBoardType"), None);
        assert_eq!(serde_json::to_value(&info).unwrap(), raw);
    }
}
