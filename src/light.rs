//! Individual light control.

use std::fmt;

use log::debug;
use serde_json::Value;

use crate::config::DEFAULT_PORT;
use crate::errors::Error;
use crate::runtime::Mutex;
use crate::status::{AccessoryInfo, LightStatus, LightsReply};
use crate::transport::{Endpoint, HttpTransport, Transport};
use crate::types::{Brightness, Kelvin, PowerMode};
use crate::update::StatusUpdate;

type Result<T> = std::result::Result<T, Error>;

/// Represents a single Elgato light.
///
/// A `Light` talks to the device's REST API through a [`Transport`] and
/// keeps two caches: the static accessory info, fetched once and kept for
/// the handle's lifetime, and the last status the device reported.
///
/// The status cache is only refreshed by [`get_status`](Light::get_status)
/// on an empty cache, by [`refresh_status`](Light::refresh_status), and by
/// every successful write. If something else changes the light, the cache
/// goes stale until one of those happens.
///
/// # Example
///
/// ```
/// use elgato_lights_rs::Light;
///
/// let light = Light::new("192.168.1.20", 9123, "Key Light", "elgato-key-light.local.");
/// assert_eq!(light.to_string(), "Elgato Light Key Light @ 192.168.1.20:9123");
/// ```
pub struct Light<T: Transport = HttpTransport> {
    address: String,
    port: u16,
    name: String,
    server: String,
    info: Mutex<Option<AccessoryInfo>>,
    status: Mutex<Option<LightStatus>>,
    transport: T,
}

impl<T: Transport + Clone> Clone for Light<T> {
    fn clone(&self) -> Self {
        // A cache that is locked right now is left empty in the copy; it
        // will be fetched again on first use.
        let info = self.info.try_lock().ok().and_then(|guard| guard.clone());
        let status = self.status.try_lock().ok().and_then(|guard| *guard);
        Light {
            address: self.address.clone(),
            port: self.port,
            name: self.name.clone(),
            server: self.server.clone(),
            info: Mutex::new(info),
            status: Mutex::new(status),
            transport: self.transport.clone(),
        }
    }
}

impl<T: Transport> fmt::Debug for Light<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> fmt::Display for Light<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Elgato Light {} @ {}:{}", self.name, self.address, self.port)
    }
}

impl Light {
    pub fn new(address: &str, port: u16, name: &str, server: &str) -> Self {
        Self::with_transport(address, port, name, server, HttpTransport::new())
    }

    /// A light at `address` on the default port, named after its address.
    pub fn from_address(address: &str) -> Self {
        Self::new(address, DEFAULT_PORT, address, "")
    }
}

impl<T: Transport> Light<T> {
    pub fn with_transport(address: &str, port: u16, name: &str, server: &str, transport: T) -> Self {
        Light {
            address: address.to_string(),
            port,
            name: name.to_string(),
            server: server.to_string(),
            info: Mutex::new(None),
            status: Mutex::new(None),
            transport,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Host name of the advertising server.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Cached status, without touching the network.
    pub async fn cached_status(&self) -> Option<LightStatus> {
        *self.status.lock().await
    }

    /// Cached accessory info, without touching the network.
    pub async fn cached_info(&self) -> Option<AccessoryInfo> {
        self.info.lock().await.clone()
    }

    /// Returns the accessory info, fetching it on first use only.
    pub async fn get_info(&self) -> Result<AccessoryInfo> {
        debug!("Populating info for {}", self);
        if let Some(info) = self.info.lock().await.as_ref() {
            return Ok(info.clone());
        }

        let resp = self.send(Endpoint::AccessoryInfo, None).await?;
        let info = AccessoryInfo::parse(resp)?;
        *self.info.lock().await = Some(info.clone());
        Ok(info)
    }

    /// Returns the cached status, or queries the light if nothing is cached.
    pub async fn get_status(&self) -> Result<LightStatus> {
        debug!("Getting status for {}", self);
        if let Some(status) = *self.status.lock().await {
            return Ok(status);
        }
        self.refresh_status().await
    }

    /// Queries the light and replaces the cached status (live network call).
    pub async fn refresh_status(&self) -> Result<LightStatus> {
        let resp = self.send(Endpoint::Lights, None).await?;
        self.store_status(resp).await
    }

    /// Sends an update and caches the status the light replies with.
    ///
    /// Out-of-range values are logged and left out of the request; the rest
    /// of the update is still sent.
    pub async fn set_status(&self, update: &StatusUpdate) -> Result<LightStatus> {
        debug!("Setting status for {} - {:?}", self, update);
        let body = serde_json::to_value(update.to_request()).map_err(Error::JsonDump)?;
        let resp = self.send(Endpoint::Lights, Some(&body)).await?;
        self.store_status(resp).await
    }

    pub async fn set_power(&self, power: &PowerMode) -> Result<LightStatus> {
        self.set_status(&StatusUpdate::from(power)).await
    }

    pub async fn power_on(&self) -> Result<LightStatus> {
        debug!("Turning on {}", self);
        self.set_power(&PowerMode::On).await
    }

    pub async fn power_off(&self) -> Result<LightStatus> {
        debug!("Turning off {}", self);
        self.set_power(&PowerMode::Off).await
    }

    /// Flips the power state, based on the cached status.
    pub async fn toggle(&self) -> Result<LightStatus> {
        match self.get_status().await?.power() {
            PowerMode::On => self.power_off().await,
            PowerMode::Off => self.power_on().await,
        }
    }

    /// Sets the brightness, 0 to 100.
    pub async fn set_brightness(&self, brightness: i32) -> Result<LightStatus> {
        debug!("Setting brightness {} on {}", brightness, self);
        let mut update = StatusUpdate::new();
        update.brightness(brightness);
        self.set_status(&update).await
    }

    /// Changes the brightness by `delta`, pinned to 0-100.
    pub async fn increment_brightness(&self, delta: i32) -> Result<LightStatus> {
        let current = self.get_status().await?;
        let target = Brightness::clamped(i32::from(current.brightness()).saturating_add(delta));
        self.set_brightness(i32::from(target.value())).await
    }

    /// Sets the colour temperature in Kelvin, 2900 to 7000.
    pub async fn set_temperature(&self, kelvin: i32) -> Result<LightStatus> {
        debug!("Setting temperature {}K on {}", kelvin, self);
        let mut update = StatusUpdate::new();
        update.temperature(kelvin);
        self.set_status(&update).await
    }

    /// Changes the colour temperature by `delta` Kelvin, pinned to 2900-7000.
    pub async fn increment_temperature(&self, delta: i32) -> Result<LightStatus> {
        let current = self.get_status().await?;
        let target = Kelvin::clamped(i32::from(current.temperature()).saturating_add(delta));
        self.set_temperature(i32::from(target.kelvin())).await
    }

    async fn store_status(&self, resp: Value) -> Result<LightStatus> {
        let status = LightsReply::parse(resp)?.first_status()?;
        *self.status.lock().await = Some(status);
        Ok(status)
    }

    async fn send(&self, endpoint: Endpoint, body: Option<&Value>) -> Result<Value> {
        self.transport
            .request(&self.address, self.port, endpoint, body)
            .await
    }
}
