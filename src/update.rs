//! Partial status updates for Elgato lights.

use log::error;

use crate::status::{LightUpdate, LightsUpdate};
use crate::types::{Brightness, Kelvin, PowerMode};

/// A set of changes to send to a light.
///
/// Values are stored as given and only checked when the update is sent.
/// A value outside its range is dropped from the request and logged; the
/// remaining values are still applied.
///
/// # Creating Updates
///
/// 1. **From a single attribute** using the [`From`] trait:
///    ```
///    use elgato_lights_rs::{PowerMode, StatusUpdate};
///    let update = StatusUpdate::from(&PowerMode::On);
///    assert_eq!(update.get_on(), Some(1));
///    ```
///
/// 2. **Builder pattern** for combining multiple attributes:
///    ```
///    use elgato_lights_rs::StatusUpdate;
///    let mut update = StatusUpdate::new();
///    update.brightness(80).temperature(4000);
///    assert!(!update.is_empty());
///    ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    on: Option<i32>,
    brightness: Option<i32>,
    temperature: Option<i32>,
}

impl StatusUpdate {
    /// Create a new empty update.
    ///
    /// # Examples
    ///
    /// ```
    /// use elgato_lights_rs::StatusUpdate;
    ///
    /// assert!(StatusUpdate::new().is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether no attribute has been set.
    pub fn is_empty(&self) -> bool {
        self.on.is_none() && self.brightness.is_none() && self.temperature.is_none()
    }

    /// Set the power state, 0 for off and 1 for on.
    pub fn on(&mut self, on: i32) -> &mut Self {
        self.on = Some(on);
        self
    }

    /// Set the brightness, 0 to 100.
    pub fn brightness(&mut self, brightness: i32) -> &mut Self {
        self.brightness = Some(brightness);
        self
    }

    /// Set the colour temperature in Kelvin, 2900 to 7000.
    pub fn temperature(&mut self, kelvin: i32) -> &mut Self {
        self.temperature = Some(kelvin);
        self
    }

    pub fn get_on(&self) -> Option<i32> {
        self.on
    }

    pub fn get_brightness(&self) -> Option<i32> {
        self.brightness
    }

    pub fn get_temperature(&self) -> Option<i32> {
        self.temperature
    }

    /// Builds the request body, dropping each field that fails validation.
    pub(crate) fn to_request(&self) -> LightsUpdate {
        let mut light = LightUpdate::default();

        if let Some(on) = self.on {
            match PowerMode::create(on) {
                Some(power) => light.on = Some(power.value()),
                None => error!("Invalid on value {} - must be 0 or 1", on),
            }
        }

        if let Some(brightness) = self.brightness {
            match Brightness::create(brightness) {
                Some(b) => light.brightness = Some(b.value()),
                None => error!(
                    "Invalid brightness {} - must be {}-{}",
                    brightness,
                    Brightness::MIN,
                    Brightness::MAX
                ),
            }
        }

        if let Some(temperature) = self.temperature {
            match Kelvin::create(temperature) {
                Some(k) => light.temperature = Some(k.to_device()),
                None => error!(
                    "Invalid temperature {} - must be {}-{}",
                    temperature,
                    Kelvin::MIN,
                    Kelvin::MAX
                ),
            }
        }

        LightsUpdate::single(light)
    }
}

impl From<&PowerMode> for StatusUpdate {
    fn from(power: &PowerMode) -> Self {
        let mut update = StatusUpdate::new();
        update.on(i32::from(power.value()));
        update
    }
}

impl From<&Brightness> for StatusUpdate {
    fn from(brightness: &Brightness) -> Self {
        let mut update = StatusUpdate::new();
        update.brightness(i32::from(brightness.value()));
        update
    }
}

impl From<&Kelvin> for StatusUpdate {
    fn from(kelvin: &Kelvin) -> Self {
        let mut update = StatusUpdate::new();
        update.temperature(i32::from(kelvin.kelvin()));
        update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(update: &StatusUpdate) -> serde_json::Value {
        serde_json::to_value(update.to_request()).unwrap()
    }

    #[test]
    fn test_only_supplied_fields_are_sent() {
        let mut update = StatusUpdate::new();
        update.on(1);
        assert_eq!(
            body(&update),
            json!({"numberOfLights": 1, "lights": [{"on": 1}]})
        );
    }

    #[test]
    fn test_temperature_is_sent_in_device_units() {
        let mut update = StatusUpdate::new();
        update.brightness(40).temperature(4000);
        assert_eq!(
            body(&update),
            json!({"numberOfLights": 1, "lights": [{"brightness": 40, "temperature": 249}]})
        );
    }

    #[test]
    fn test_invalid_fields_are_dropped_individually() {
        let mut update = StatusUpdate::new();
        update.on(2).brightness(150).temperature(4000);
        assert_eq!(
            body(&update),
            json!({"numberOfLights": 1, "lights": [{"temperature": 249}]})
        );

        let mut update = StatusUpdate::new();
        update.brightness(-1).temperature(7001);
        assert_eq!(body(&update), json!({"numberOfLights": 1, "lights": [{}]}));
    }

    #[test]
    fn test_from_value_types() {
        assert_eq!(StatusUpdate::from(&PowerMode::Off).get_on(), Some(0));
        assert_eq!(
            StatusUpdate::from(&Brightness::clamped(250)).get_brightness(),
            Some(100)
        );
        assert_eq!(
            StatusUpdate::from(&Kelvin::clamped(1000)).get_temperature(),
            Some(2900)
        );
    }
}
